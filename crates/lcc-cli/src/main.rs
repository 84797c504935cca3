mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{config::ConfigSubcommand, workflow::WorkflowSubcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "lcc",
    about = "Offline assistant: canned answers from a rule table and guided workflows",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .lcc/ or .git/)
    #[arg(long, global = true, env = "LCC_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create .lcc/ with a default config and a sample workflow
    Init,

    /// Answer a single question
    Ask {
        /// Question text (joined with spaces)
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Answer questions read line by line from stdin
    Chat,

    /// List the effective rule table in match order
    Rules,

    /// List, inspect, and run workflows
    Workflow {
        #[command(subcommand)]
        subcommand: WorkflowSubcommand,
    },

    /// Validate the project configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init => cmd::init::run(&root, cli.json),
        Commands::Ask { text } => cmd::ask::run(&root, &text.join(" "), cli.json),
        Commands::Chat => cmd::chat::run(&root, cli.json),
        Commands::Rules => cmd::rules::run(&root, cli.json),
        Commands::Workflow { subcommand } => cmd::workflow::run(&root, subcommand, cli.json),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
