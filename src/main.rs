use anyhow::Result;
use clap::{CommandFactory, Parser};
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod cache;
mod commands;
mod config;
mod download;
mod error;
mod finder;
mod format;
mod index;
mod parse;

use commands::{find, update};
use config::{CLIENT_SPEC_VERSION, Config};
use error::TldrError;
use finder::PageFinder;

#[derive(Parser)]
#[command(name = "tldr")]
#[command(about = "Collaborative cheatsheets for console commands", long_about = None)]
#[command(after_help = "For subcommands such as `git commit`, just keep as it is:\n\n    tldr git commit")]
struct Cli {
    #[command(flatten)]
    find: find::FindArgs,

    /// Update local cache with all pages
    #[arg(short, long)]
    update: bool,

    /// Specify a config file to use
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Show version info and exit
    #[arg(short = 'v', long)]
    version: bool,
}

/// Logging is off unless `TLDR_DEBUG` or `RUST_LOG` is set.
fn init_tracing() {
    let filter = if std::env::var_os("TLDR_DEBUG").is_some() {
        EnvFilter::new("tldr=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("off"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    if cli.version {
        println!("tldr version {}", env!("CARGO_PKG_VERSION"));
        println!("client specification version {CLIENT_SPEC_VERSION}");
        return ExitCode::SUCCESS;
    }

    if cli.find.command.is_empty() && !cli.update {
        let _ = Cli::command().print_help();
        return ExitCode::SUCCESS;
    }

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{} {:#}", "✗".red().bold(), err);
            if matches!(err.downcast_ref::<TldrError>(), Some(TldrError::Download(_))) {
                eprintln!("{}", "Check your network connection or the proxy_url setting.".dimmed());
            }
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = Config::load_or_init(cli.config.as_deref())?;
    let settings = config.settings()?;
    let finder = PageFinder::from_settings(&settings);

    if cli.update {
        update::run(&finder)?;
    }

    if cli.find.command.is_empty() {
        return Ok(ExitCode::SUCCESS);
    }

    find::run(&cli.find, &config, &finder)
}
