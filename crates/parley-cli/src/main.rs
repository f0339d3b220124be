mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::config::ConfigSubcommand;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "parley",
    about = "Practice difficult workplace conversations against scripted counterparts",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .parley/)
    #[arg(long, global = true, env = "PARLEY_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the web shell
    Serve {
        /// Port to listen on (default: server.port from config)
        #[arg(long)]
        port: Option<u16>,
        /// Open the browser once the server is listening
        #[arg(long)]
        open: bool,
    },

    /// List the scenario catalog
    Scenarios {
        /// Show the catalog as a premium subscriber sees it
        #[arg(long)]
        premium: bool,
    },

    /// Practice a scenario in the terminal (one response per line, /quit to stop)
    Practice {
        /// Scenario id, e.g. negotiation
        id: String,
        /// Unlock premium scenarios for this session
        #[arg(long)]
        premium: bool,
        /// Pause before each reply, in milliseconds (default: from config)
        #[arg(long)]
        delay_ms: Option<u64>,
    },

    /// Manage .parley/config.yaml
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Serve { port, open } => cmd::serve::run(&root, port, open),
        Commands::Scenarios { premium } => cmd::scenarios::run(&root, premium, cli.json),
        Commands::Practice {
            id,
            premium,
            delay_ms,
        } => cmd::practice::run(&root, &id, premium, delay_ms, cli.json),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
