//! dotlink CLI
//!
//! Command-line interface for linking configuration packages.

use anyhow::Result;
use clap::{Parser, Subcommand};
use is_terminal::IsTerminal;
use std::env;
use std::path::PathBuf;

use dotlink::prompt::TerminalInput;
use dotlink::{ConflictStrategy, Prompter, Variables};

mod commands;

#[derive(Parser)]
#[command(name = "dotlink")]
#[command(
    author,
    version,
    about = "Link configuration packages into place using symbolic links"
)]
#[command(propagate_version = true)]
struct Cli {
    /// Directory containing the packages (default: current directory)
    #[arg(short = 'C', long, global = true)]
    dir: Option<PathBuf>,

    /// Show what would be done without making changes
    #[arg(long, global = true)]
    dry_run: bool,

    /// Answer every prompt with its default
    #[arg(short, long, global = true)]
    yes: bool,

    /// Show detailed output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Link packages into their target directories
    Install {
        /// Packages to install (default: every package in the directory)
        packages: Vec<String>,

        /// Resolve conflicts this way instead of asking
        #[arg(long, value_enum)]
        on_conflict: Option<ConflictStrategy>,
    },

    /// Remove the links a package created
    Uninstall {
        /// Packages to uninstall (default: every package in the directory)
        packages: Vec<String>,
    },

    /// Show the link state of every file in a package
    Status {
        /// Packages to inspect (default: every package in the directory)
        packages: Vec<String>,

        /// Output machine-readable JSON
        #[arg(long)]
        json: bool,
    },

    /// List the packages in the directory
    List,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let base_dir = match cli.dir {
        Some(dir) => dir,
        None => env::current_dir()?,
    };
    let ctx = commands::Context {
        base_dir,
        vars: Variables::detect()?,
        dry_run: cli.dry_run,
        verbose: cli.verbose,
    };

    // Without a terminal there is nobody to answer, so take the defaults.
    let assume_yes = cli.yes || !std::io::stdin().is_terminal();
    let mut prompter = Prompter::new(assume_yes, Box::new(TerminalInput));

    match cli.command {
        Commands::Install {
            packages,
            on_conflict,
        } => commands::install::run(&ctx, &packages, on_conflict, &mut prompter),
        Commands::Uninstall { packages } => {
            commands::uninstall::run(&ctx, &packages, &mut prompter)
        }
        Commands::Status { packages, json } => commands::status::run(&ctx, &packages, json),
        Commands::List => commands::list::run(&ctx),
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
