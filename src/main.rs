use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use laborstats::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for laborstats::AppCommand {
    fn from(cmd: Commands) -> laborstats::AppCommand {
        match cmd {
            Commands::Show { raw } => laborstats::AppCommand::Show { raw },
            Commands::Refresh => laborstats::AppCommand::Refresh,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Display the labor statistics dashboard
    Show {
        /// Also print the raw data table
        #[arg(short, long)]
        raw: bool,
    },
    /// Refetch all series and overwrite the cache file
    Refresh,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => match cli.config_path.as_deref() {
            Some(path) => laborstats::cli::setup::setup_at_path(path),
            None => laborstats::cli::setup::setup(),
        },
        Some(cmd) => laborstats::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
