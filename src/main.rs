use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use fundlens::core::log::init_logging;

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

impl From<Commands> for fundlens::AppCommand {
    fn from(cmd: Commands) -> fundlens::AppCommand {
        match cmd {
            Commands::Compare { fund_ids, json } => fundlens::AppCommand::Compare { fund_ids, json },
            Commands::Overlap { fund_ids, json } => fundlens::AppCommand::Overlap { fund_ids, json },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Rank 2 to 5 funds on returns, cost, size and risk
    Compare {
        /// Fund ids or AMFI codes
        #[arg(required = true)]
        fund_ids: Vec<String>,

        /// Print the response as JSON
        #[arg(long)]
        json: bool,
    },
    /// Analyze holdings and sector overlap across 2 to 5 funds
    Overlap {
        /// Fund ids or AMFI codes
        #[arg(required = true)]
        fund_ids: Vec<String>,

        /// Print the response as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => fundlens::cli::setup::setup(),
        Some(cmd) => fundlens::run_command(cmd.into(), cli.config_path.as_deref()).await,
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
