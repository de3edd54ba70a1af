use crate::config::Config;
use crate::finder::PageFinder;
use crate::format::{Formatter, PageFormatter};
use crate::parse::{self, PLATFORMS};

use anyhow::{Context, Result};
use clap::Args;
use clap::builder::PossibleValuesParser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use std::process::ExitCode;
use std::time::Duration;

const ISSUES_URL: &str = "https://github.com/tldr-pages/tldr/issues";

/// Arguments selecting the page to show.
#[derive(Args)]
pub struct FindArgs {
    /// Command to show the page for, multiple words are joined with `-`
    pub command: Vec<String>,

    /// Override current operating system
    #[arg(short, long, ignore_case = true, value_parser = PossibleValuesParser::new(PLATFORMS.iter().copied()))]
    pub platform: Option<String>,

    /// Use a specific language instead of the locale, e.g. `de` or `pt_BR`
    #[arg(short = 'L', long)]
    pub language: Option<String>,
}

/// Runs a page lookup and prints the result.
///
/// Exits with `1` when no page exists for the query; download and cache
/// failures are returned as errors.
pub fn run(args: &FindArgs, config: &Config, finder: &PageFinder) -> Result<ExitCode> {
    let name = parse::parse_command(&args.command);
    let platform = parse::parse_platform(args.platform.as_deref(), &config.platform);
    let languages = parse::parse_language(args.language.as_deref(), &config.language, |key| {
        std::env::var(key).ok()
    });
    debug!(name, platform, ?languages, "looking up page");

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.bold.cyan} {msg}")?.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ "),
    );
    spinner.set_message(format!("{} {}", "Searching".cyan().bold(), name.bold()));
    spinner.enable_steady_tick(Duration::from_millis(80));

    let lookup = finder.find(&name, &platform, &languages);
    spinner.finish_and_clear();
    let lookup = lookup.with_context(|| format!("Failed to look up '{name}'"))?;

    let Some(content) = lookup.content() else {
        debug!(?lookup, "no page");
        let message = format!("There is no available pages right now.\nYou can create an issue via {ISSUES_URL}.");
        eprint!("{}", Formatter::new().format(&message).yellow().bold());
        return Ok(ExitCode::from(1));
    };

    let formatter = PageFormatter::new(Formatter::new().indent(4).start_with_new_line(true));
    println!("{}", formatter.format(content));
    Ok(ExitCode::SUCCESS)
}
