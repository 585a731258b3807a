mod analyze;
mod catalogue;
mod merge;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "wayfind-cli")]
#[command(about = "Extract, verify and merge places from travel content")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Extract places from content with the model and merge them into a catalogue
    Analyze {
        /// Content file to analyze, or `-` for stdin
        #[arg(long, default_value = "-")]
        input: PathBuf,

        /// Catalogue file to merge the new places into
        #[arg(long)]
        catalogue: Option<PathBuf>,

        /// Where to write the result (defaults to the catalogue, else stdout)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Deduplicate several catalogue files into one, without calling the model
    Merge {
        /// Catalogue files, earliest first
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Where to write the merged catalogue (defaults to stdout)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Show place counts per region and subregion
    Regions {
        /// Catalogue file
        file: PathBuf,
    },
}

fn init_tracing(default_level: &str) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Analyze {
            input,
            catalogue,
            output,
        }) => {
            let config = wayfind_core::load_app_config()?;
            init_tracing(&config.log_level)?;
            analyze::run_analyze(&config, &input, catalogue.as_ref(), output.as_ref()).await?;
        }
        Some(Commands::Merge { files, output }) => {
            init_tracing(&log_level_from_env())?;
            merge::run_merge(&files, output.as_ref())?;
        }
        Some(Commands::Regions { file }) => {
            init_tracing(&log_level_from_env())?;
            merge::run_regions(&file)?;
        }
        None => println!("wayfind-cli: run with --help to list commands"),
    }

    Ok(())
}

/// Offline commands need no API key, so they read the log level directly
/// instead of loading the full config.
fn log_level_from_env() -> String {
    std::env::var("WAYFIND_LOG_LEVEL").unwrap_or_else(|_| "info".to_string())
}
