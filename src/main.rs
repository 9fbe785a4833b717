use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use zai::core::log::init_logging;

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

impl From<Commands> for zai::AppCommand {
    fn from(cmd: Commands) -> zai::AppCommand {
        match cmd {
            Commands::Summary => zai::AppCommand::Summary,
            Commands::Import => zai::AppCommand::Import,
            Commands::Prices => zai::AppCommand::Prices,
            Commands::Portfolio => zai::AppCommand::Portfolio,
            Commands::Streaks => zai::AppCommand::Streaks,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Display dashboard with price, portfolio and streaks
    Summary,
    /// Validate contributions and show round-ups
    Import,
    /// Display latest quote and recent closes
    Prices,
    /// Display simulated portfolio history
    Portfolio,
    /// Display weekly contribution streaks
    Streaks,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => match cli.config_path.as_deref() {
            Some(path) => zai::cli::setup::setup_at_path(path),
            None => zai::cli::setup::setup(),
        },
        Some(cmd) => zai::run_command(cmd.into(), cli.config_path.as_deref()).await,
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
