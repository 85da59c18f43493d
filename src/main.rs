use anyhow::Result;
use bullion::log::init_logging;
use clap::{CommandFactory, Parser, Subcommand};

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

impl From<Commands> for bullion::AppCommand {
    fn from(cmd: Commands) -> bullion::AppCommand {
        match cmd {
            Commands::Summary => bullion::AppCommand::Summary,
            Commands::Metals => bullion::AppCommand::Metals,
            Commands::Coins => bullion::AppCommand::Coins,
            Commands::Goldbacks => bullion::AppCommand::Goldbacks,
            Commands::Prices { refresh } => bullion::AppCommand::Prices { refresh },
            Commands::Watch => bullion::AppCommand::Watch,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Display the stack dashboard
    Summary,
    /// Display bulk metal holdings
    Metals,
    /// Display coin holdings
    Coins,
    /// Display Goldback holdings
    Goldbacks,
    /// Print the spot price snapshot as JSON
    Prices {
        /// Run a fetch cycle before printing (may take a few seconds)
        #[arg(long)]
        refresh: bool,
    },
    /// Refresh prices on the configured interval until interrupted
    Watch,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => setup(),
        Some(cmd) => bullion::run_command(cmd.into(), cli.config_path.as_deref()).await,
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

fn setup() -> anyhow::Result<()> {
    use anyhow::Context;

    let path = bullion::config::AppConfig::default_config_path()?;

    if path.exists() {
        anyhow::bail!("Configuration file already exists at {}", path.display());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let default_config = r#"---
metals:
  - name: gold
    symbol: "GC=F"
    fallback_price: 2050.00
  - name: silver
    symbol: "SI=F"
    fallback_price: 23.50

providers:
  yahoo:
    base_url: "https://query1.finance.yahoo.com"

refresh_interval_minutes: 30

holdings:
  metals: []
  coins: []
  goldbacks: []
"#;

    std::fs::write(&path, default_config)
        .with_context(|| format!("Failed to write config file to {}", path.display()))?;

    tracing::info!("Created default configuration at {}", path.display());
    Ok(())
}
