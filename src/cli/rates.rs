use super::ui;
use crate::core::format::format_rate;
use crate::core::{
    AppState, Converter, Currency, NumberLocale, REFERENCE_CURRENCY, RateOrigin, RateProvider,
    UpdateStatus,
};
use anyhow::{Context, Result};
use comfy_table::{Cell, CellAlignment, Color, Table};

/// Prints the current rate table, optionally refreshing it first.
pub async fn run(converter: &Converter, refresh_rates: bool) -> Result<()> {
    if refresh_rates {
        refresh(converter).await?;
    }

    let state = converter.snapshot();
    println!(
        "\n{}",
        ui::style_text(
            &format!("Exchange Rates ({REFERENCE_CURRENCY} Base)"),
            ui::StyleType::Title
        )
    );
    println!("{}", rates_table(&state, converter.locale()));
    print_status(&state);
    Ok(())
}

/// Asks the provider directly for one pair rate.
pub async fn pair(
    provider: &dyn RateProvider,
    from: Currency,
    to: Currency,
    locale: &NumberLocale,
) -> Result<()> {
    let rate = provider
        .fetch_pair_rate(from.code(), to.code())
        .await
        .with_context(|| format!("Failed to fetch {from}/{to} rate"))?;
    println!("1 {} = {} {}", from, format_rate(rate, 4, locale), to);
    Ok(())
}

/// Runs a refresh in the background while a spinner is shown.
pub async fn refresh(converter: &Converter) -> Result<UpdateStatus> {
    let Some(handle) = converter.on_refresh_requested() else {
        return Ok(converter.snapshot().last_update);
    };
    let pb = ui::new_spinner("Updating rates");
    let status = handle.await.context("Rate refresh task failed");
    pb.finish_and_clear();
    status
}

pub fn rates_table(state: &AppState, locale: &NumberLocale) -> Table {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Currency"),
        ui::header_cell("Rate"),
        ui::header_cell("Source"),
        ui::header_cell("Override"),
    ]);

    for (currency, entry) in state.rates.rates() {
        let source_color = match entry.origin {
            RateOrigin::Default => Color::DarkGrey,
            RateOrigin::Provider => Color::Green,
            RateOrigin::Manual => Color::Yellow,
        };
        table.add_row(vec![
            Cell::new(currency.code()),
            Cell::new(format_rate(entry.rate, 4, locale)).set_alignment(CellAlignment::Right),
            Cell::new(entry.origin.to_string()).fg(source_color),
            ui::amount_cell(state.fetched_rate(currency), false),
        ]);
    }
    table
}

pub fn print_status(state: &AppState) {
    let message = state.last_update.to_string();
    if message.is_empty() {
        return;
    }
    let style_type = if state.last_update.is_failure() {
        ui::StyleType::Error
    } else {
        ui::StyleType::Subtle
    };
    println!("{}", ui::style_text(&message, style_type));
}
