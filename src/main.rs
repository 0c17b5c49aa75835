//! Thicket CLI entry point

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use thicket_emit::Format;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "thicket")]
#[command(about = "Build rule generator for C/C++ source trees", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Project root path (defaults to current directory)
    #[arg(short, long, default_value = ".", global = true)]
    root: PathBuf,

    /// Config file (defaults to thicket.toml in the project root)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Synthesize the build description and write it
    Generate {
        /// Output path, relative to the project root
        #[arg(short, long, default_value = "Makefile")]
        output: PathBuf,

        /// Output format: make or json
        #[arg(long, default_value = "make")]
        format: Format,
    },
    /// Print the link set of an entry file
    Closure {
        /// Entry file, relative to the project root
        file: String,
    },
    /// Print the dependency graph reachable from a file as DOT
    Graph {
        /// Start file, relative to the project root
        file: String,
    },
    /// List synthesized target names
    Targets,
    /// Show version
    Version,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!(
            "thicket={0},thicket_core={0},thicket_indexer={0},thicket_emit={0}",
            log_level
        ))
    });
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!("Thicket v{}", env!("CARGO_PKG_VERSION"));
    tracing::debug!("Project root: {}", cli.root.display());

    let config = cli.config.as_deref();
    match cli.command {
        Commands::Generate { output, format } => commands::generate(&cli.root, config, &output, format),
        Commands::Closure { file } => commands::closure(&cli.root, config, &file),
        Commands::Graph { file } => commands::graph(&cli.root, config, &file),
        Commands::Targets => commands::targets(&cli.root, config),
        Commands::Version => {
            println!("Thicket v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
