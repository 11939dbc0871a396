pub mod cli;
pub mod core;
pub mod providers;

use crate::core::config::AppConfig;
use crate::core::{Converter, Currency};
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

pub enum AppCommand {
    Convert {
        currency: Currency,
        amount: String,
        refresh: bool,
        rates: Vec<(Currency, f64)>,
    },
    Rates {
        refresh: bool,
    },
    Pair {
        from: Currency,
        to: Currency,
    },
    Interactive,
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Currency converter starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let provider = Arc::new(providers::ErApiProvider::new(&config.er_api())?);
    let converter = Converter::new(provider.clone(), config.locale());

    if config.refresh_on_start {
        cli::rates::refresh(&converter).await?;
    }

    match command {
        AppCommand::Convert {
            currency,
            amount,
            refresh,
            rates,
        } => {
            let refresh = refresh && !config.refresh_on_start;
            cli::convert::run(&converter, currency, &amount, &rates, refresh).await
        }
        AppCommand::Rates { refresh } => {
            let refresh = refresh && !config.refresh_on_start;
            cli::rates::run(&converter, refresh).await
        }
        AppCommand::Pair { from, to } => {
            cli::rates::pair(provider.as_ref(), from, to, converter.locale()).await
        }
        AppCommand::Interactive => cli::interactive::run(&converter).await,
    }
}
