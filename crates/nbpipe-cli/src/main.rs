//! nbpipe CLI - turn tagged notebooks into pipelines.

mod backend;
mod compile;
mod inspect;
mod marshal;
mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "nbpipe")]
#[command(about = "Turn tagged notebooks into pipelines")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the RPC server for editor extensions
    Serve {
        /// Host address to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to listen on
        #[arg(short, long, default_value = "8888")]
        port: u16,

        /// Converter program used by `nb.compile_notebook`
        #[arg(long)]
        converter: Option<PathBuf>,

        /// Packaging program (name on PATH or a path)
        #[arg(long, default_value = nbpipe_core::compile::DEFAULT_PACKAGER)]
        packager: String,
    },

    /// Show the parameters declared in `pipeline-parameters` cells
    Parameters {
        /// Path to the notebook (.ipynb file)
        notebook: PathBuf,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show the metrics reported by `pipeline-metrics` cells
    Metrics {
        /// Path to the notebook (.ipynb file)
        notebook: PathBuf,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Compile a notebook into a pipeline package
    Compile {
        /// Path to the notebook (.ipynb file)
        notebook: PathBuf,

        /// Converter program that builds and renders the pipeline
        #[arg(long)]
        converter: PathBuf,

        /// Packaging program (name on PATH or a path)
        #[arg(long, default_value = nbpipe_core::compile::DEFAULT_PACKAGER)]
        packager: String,

        /// Override a pipeline metadata entry (KEY=VALUE, VALUE parsed as JSON when possible)
        #[arg(long = "set", value_name = "KEY=VALUE")]
        overrides: Vec<String>,

        /// Generate a pipeline with debugging enabled
        #[arg(long)]
        debug: bool,

        /// Snapshot volumes between steps
        #[arg(long)]
        auto_snapshot: bool,
    },

    /// Report whether this process is exploring a pipeline step
    Explore {
        /// Path to the notebook (.ipynb file)
        notebook: PathBuf,
    },

    /// Print the variables stored in the notebook's marshal directory
    Unmarshal {
        /// Path to the notebook (.ipynb file)
        notebook: PathBuf,
    },

    /// Delete the notebook's marshal directory
    Purge {
        /// Path to the notebook (.ipynb file)
        notebook: PathBuf,
    },

    /// Print the notebook an editor should reopen, relative to home
    ResumePath,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = match (&cli.command, cli.verbose) {
        (_, true) => tracing::Level::DEBUG,
        (Commands::Serve { .. }, false) => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };
    let filter =
        tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Serve {
            host,
            port,
            converter,
            packager,
        } => {
            serve::execute(host, port, converter.as_deref(), &packager).await?;
        }

        Commands::Parameters { notebook, json } => inspect::parameters(&notebook, json)?,

        Commands::Metrics { notebook, json } => inspect::metrics(&notebook, json)?,

        Commands::Compile {
            notebook,
            converter,
            packager,
            overrides,
            debug,
            auto_snapshot,
        } => {
            compile::execute(
                notebook,
                &converter,
                &packager,
                &overrides,
                debug,
                auto_snapshot,
            )?;
        }

        Commands::Explore { notebook } => marshal::explore(&notebook)?,

        Commands::Unmarshal { notebook } => marshal::unmarshal(&notebook)?,

        Commands::Purge { notebook } => marshal::purge(&notebook)?,

        Commands::ResumePath => marshal::resume_path()?,
    }

    Ok(())
}
