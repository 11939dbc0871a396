use super::convert::values_table;
use super::rates::{print_status, rates_table};
use super::ui;
use crate::core::format::parse_amount;
use crate::core::{AppState, Converter, Currency, NumberLocale};
use anyhow::{Context, Result, anyhow, bail};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

#[derive(Debug, PartialEq)]
enum Command {
    Edit(Currency, String),
    SetRate(Currency, f64),
    Refresh,
    Rates,
    Help,
    Quit,
}

const HELP: &str = "\
Commands:
  <CODE> <amount>    convert an amount, e.g. `USD 100`
  set <CODE> <rate>  override a rate, e.g. `set EUR 0.91`
  refresh            fetch the latest rates in the background
  rates              show the rate table
  help               show this message
  quit               exit";

fn parse_command(line: &str, locale: &NumberLocale) -> Result<Command> {
    let line = line.trim();
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };

    match head.to_lowercase().as_str() {
        "" | "help" | "?" => Ok(Command::Help),
        "quit" | "exit" | "q" => Ok(Command::Quit),
        "refresh" => Ok(Command::Refresh),
        "rates" => Ok(Command::Rates),
        "set" => {
            let (code, rate) = rest
                .split_once(char::is_whitespace)
                .ok_or_else(|| anyhow!("Usage: set <CODE> <rate>"))?;
            let currency: Currency = code.parse()?;
            let Some(rate) = parse_amount(rate, locale) else {
                bail!("Not a number: {}", rate.trim());
            };
            Ok(Command::SetRate(currency, rate))
        }
        _ => {
            let currency: Currency = head.parse()?;
            Ok(Command::Edit(currency, rest.to_string()))
        }
    }
}

/// Line-driven converter. Edits are applied immediately, even while a refresh
/// is running; every published state change is rendered as it arrives.
pub async fn run(converter: &Converter) -> Result<()> {
    println!("{}", ui::style_text("Currency Converter", ui::StyleType::Title));
    println!("{}", ui::style_text(HELP, ui::StyleType::Subtle));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut updates = converter.subscribe();
    let mut last = converter.snapshot();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read input")? else {
                    break;
                };
                match parse_command(&line, converter.locale()) {
                    Ok(Command::Quit) => break,
                    Ok(Command::Help) => println!("{HELP}"),
                    Ok(Command::Rates) => {
                        println!("{}", rates_table(&converter.snapshot(), converter.locale()));
                    }
                    Ok(Command::Edit(currency, text)) => converter.on_user_edit(currency, &text),
                    Ok(Command::SetRate(currency, rate)) => {
                        if !converter.on_manual_rate_set(currency, rate) {
                            println!(
                                "{}",
                                ui::style_text(
                                    &format!("Rate for {currency} not changed"),
                                    ui::StyleType::Error
                                )
                            );
                        }
                    }
                    Ok(Command::Refresh) => {
                        if converter.on_refresh_requested().is_none() {
                            println!(
                                "{}",
                                ui::style_text("Refresh already in progress", ui::StyleType::Subtle)
                            );
                        }
                    }
                    Err(e) => println!("{}", ui::style_text(&e.to_string(), ui::StyleType::Error)),
                }
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = updates.borrow_and_update().clone();
                render_changes(&last, &state, converter.locale());
                last = state;
            }
        }
    }

    debug!("Interactive session ended");
    Ok(())
}

fn render_changes(previous: &AppState, current: &AppState, locale: &NumberLocale) {
    if current.is_loading && !previous.is_loading {
        println!("{}", ui::style_text("Updating rates...", ui::StyleType::Subtle));
    }
    if previous.is_loading && !current.is_loading {
        print_status(current);
    }
    if current.rates != previous.rates && !current.is_loading {
        println!("{}", rates_table(current, locale));
    }
    if current.values != previous.values {
        println!("{}", values_table(current, locale));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Result<Command> {
        parse_command(line, &NumberLocale::default())
    }

    #[test]
    fn test_parse_edit() {
        assert_eq!(
            parse("usd 100").unwrap(),
            Command::Edit(Currency::Usd, "100".to_string())
        );
        assert_eq!(
            parse("ARS   1 500 ").unwrap(),
            Command::Edit(Currency::Ars, "1 500".to_string())
        );
        assert_eq!(
            parse("EUR").unwrap(),
            Command::Edit(Currency::Eur, String::new())
        );
        assert_eq!(
            parse("EUR abc").unwrap(),
            Command::Edit(Currency::Eur, "abc".to_string())
        );
    }

    #[test]
    fn test_parse_set_rate() {
        assert_eq!(
            parse("set brl 5.3").unwrap(),
            Command::SetRate(Currency::Brl, 5.3)
        );
        assert_eq!(
            parse_command("set EUR 0,91", &NumberLocale::new(',')).unwrap(),
            Command::SetRate(Currency::Eur, 0.91)
        );
        assert!(parse("set EUR").is_err());
        assert!(parse("set EUR lots").is_err());
        assert!(parse("set GBP 0.8").is_err());
    }

    #[test]
    fn test_parse_keywords() {
        assert_eq!(parse("refresh").unwrap(), Command::Refresh);
        assert_eq!(parse("RATES").unwrap(), Command::Rates);
        assert_eq!(parse("").unwrap(), Command::Help);
        assert_eq!(parse("q").unwrap(), Command::Quit);
        assert!(parse("GBP 10").is_err());
    }
}
