use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use xconv::core::Currency;
use xconv::core::log::init_logging;

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

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Convert an amount into every tracked currency
    Convert {
        /// Currency of the amount, e.g. USD
        currency: Currency,
        /// Amount to convert
        amount: String,
        /// Fetch the latest rates first
        #[arg(short, long)]
        refresh: bool,
        /// Override a rate for this run, e.g. --rate EUR=0.91
        #[arg(long = "rate", value_name = "CODE=RATE", value_parser = parse_rate_override)]
        rates: Vec<(Currency, f64)>,
    },
    /// Show the exchange-rate table
    Rates {
        /// Fetch the latest rates first
        #[arg(short, long)]
        refresh: bool,
    },
    /// Ask the provider for a direct pair rate
    Pair { from: Currency, to: Currency },
    /// Convert interactively, one line at a time
    Interactive,
}

impl From<Commands> for xconv::AppCommand {
    fn from(cmd: Commands) -> xconv::AppCommand {
        match cmd {
            Commands::Convert {
                currency,
                amount,
                refresh,
                rates,
            } => xconv::AppCommand::Convert {
                currency,
                amount,
                refresh,
                rates,
            },
            Commands::Rates { refresh } => xconv::AppCommand::Rates { refresh },
            Commands::Pair { from, to } => xconv::AppCommand::Pair { from, to },
            Commands::Interactive => xconv::AppCommand::Interactive,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

fn parse_rate_override(s: &str) -> Result<(Currency, f64), String> {
    let (code, rate) = s
        .split_once('=')
        .ok_or_else(|| format!("expected CODE=RATE, got `{s}`"))?;
    let currency = code.parse::<Currency>().map_err(|e| e.to_string())?;
    let rate = rate
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid rate `{rate}`: {e}"))?;
    Ok((currency, rate))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => xconv::cli::setup::setup(),
        Some(cmd) => xconv::run_command(cmd.into(), cli.config_path.as_deref()).await,
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
