//! CLI frontend for the Meridian game-session engine.

mod commands;
mod render;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "meridian",
    about = "Meridian: load game data and run headless game sessions",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load game data and build a session without running it
    Check {
        /// Directory containing .json definition files (default: current directory)
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },

    /// List definitions in the game data
    List {
        /// Filter by kind (settings, player, unit, terrain, win_condition)
        kind: Option<String>,

        /// Directory containing .json definition files
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },

    /// Run a session on a fresh event loop
    Simulate {
        /// Simulation time to run until
        #[arg(short, long, default_value = "100")]
        until: u64,

        /// Attach a text renderer that records what each entity presents
        #[arg(short, long)]
        render: bool,

        /// Show every dispatched event
        #[arg(short, long)]
        verbose: bool,

        /// Directory containing .json definition files
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check { dir } => commands::check::run(&dir),
        Commands::List { kind, dir } => commands::list::run(&dir, kind.as_deref()),
        Commands::Simulate {
            until,
            render,
            verbose,
            dir,
        } => commands::simulate::run(&dir, until, render, verbose),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
