//! Stackview CLI - stackview command

use anyhow::Result;
use clap::{Parser, Subcommand};
use cli_lib::{system_config, util};
use std::path::PathBuf;
use tracing::Level;

mod cmd;

/// Stackview - Animated view of a stacked-branch graph
#[derive(Parser)]
#[command(name = "stackview")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// More log output on stderr (repeat for more)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Draw a snapshot once and exit
    Render {
        /// Snapshot JSON file (default: stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Reveal one more page of commits for a branch (repeatable)
        #[arg(long, value_name = "BRANCH")]
        expand: Vec<String>,

        /// Hide commit lists
        #[arg(long)]
        no_commits: bool,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },
    /// Redraw whenever the snapshot file changes
    Watch {
        /// Snapshot JSON file
        #[arg(short, long)]
        input: PathBuf,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },
    /// View and edit configuration
    Config {
        /// List all values (the default)
        #[arg(long)]
        list: bool,

        /// Print one value
        #[arg(long, value_name = "KEY")]
        get: Option<String>,

        /// Set one value
        #[arg(long, num_args = 2, value_names = ["KEY", "VALUE"])]
        set: Option<Vec<String>>,

        /// Print the config file location
        #[arg(long)]
        path: bool,

        /// With --path, create the file if missing
        #[arg(long, requires = "path")]
        create: bool,

        /// Print an annotated example configuration
        #[arg(long)]
        example: bool,
    },
}

fn log_level(verbose: u8, quiet: bool) -> Level {
    match (quiet, verbose) {
        (true, _) => Level::ERROR,
        (false, 0) => Level::WARN,
        (false, 1) => Level::INFO,
        (false, 2) => Level::DEBUG,
        (false, _) => Level::TRACE,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing; stdout is reserved for the drawing
    tracing_subscriber::fmt()
        .with_max_level(log_level(cli.verbose, cli.quiet))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Render { input, expand, no_commits, no_color } => {
            cmd::render::run(cmd::render::RenderOptions {
                input,
                expand,
                no_commits,
                no_color,
            })
            .await
        }
        Commands::Watch { input, no_color } => {
            cmd::watch::run(cmd::watch::WatchOptions { input, no_color }).await
        }
        Commands::Config { get, set, path, create, example, .. } => {
            if let Some(key) = get {
                cmd::config::run_get(&key).await
            } else if let Some([key, value]) = set.as_deref() {
                cmd::config::run_set(key, value).await
            } else if path {
                cmd::config::run_path(create).await
            } else if example {
                cmd::config::run_example().await
            } else {
                cmd::config::run_list().await
            }
        }
    }
}
