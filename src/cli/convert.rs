use super::rates::{print_status, refresh};
use super::ui;
use crate::core::format::group_input;
use crate::core::{AppState, Converter, Currency, NumberLocale};
use anyhow::Result;
use comfy_table::{Cell, Table};

/// Converts `amount` of `currency` into every tracked currency and prints it.
pub async fn run(
    converter: &Converter,
    currency: Currency,
    amount: &str,
    overrides: &[(Currency, f64)],
    refresh_rates: bool,
) -> Result<()> {
    if refresh_rates {
        refresh(converter).await?;
    }

    for (code, rate) in overrides {
        if !converter.on_manual_rate_set(*code, *rate) {
            println!(
                "{}",
                ui::style_text(
                    &format!("Ignoring rate override {code}={rate}"),
                    ui::StyleType::Error
                )
            );
        }
    }

    converter.on_user_edit(currency, amount);
    let state = converter.snapshot();

    println!("{}", values_table(&state, converter.locale()));
    print_status(&state);
    Ok(())
}

/// Renders every currency's display value; the typed field is highlighted.
pub fn values_table(state: &AppState, locale: &NumberLocale) -> Table {
    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Currency"), ui::header_cell("Amount")]);

    for value in state.values.values() {
        let text = if value.user_input {
            group_input(&value.text, locale)
        } else {
            value.text.clone()
        };
        table.add_row(vec![
            Cell::new(value.currency.code()),
            ui::amount_cell(&text, value.user_input),
        ]);
    }
    table
}
