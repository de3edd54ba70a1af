use crate::finder::PageFinder;

use anyhow::{Context, Result};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use std::time::Duration;

/// Runs the bulk update.
///
/// Downloads the pages archive into the cache root, replacing the page
/// tree, then rebuilds the command index.
pub fn run(finder: &PageFinder) -> Result<()> {
    let location = finder.cache().location().display().to_string();

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.bold.cyan} {msg}")?.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ "),
    );
    spinner.set_message(format!("{} {}", "Updating".cyan().bold(), location.bold()));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let synced = finder.sync();
    spinner.finish_and_clear();
    synced.context("Failed to update local cache")?;

    println!("{} {}", "✓".green().bold(), "Finish cache update.".green().bold());
    Ok(())
}
