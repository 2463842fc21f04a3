use clap::Parser;
use marketpulse::cli::commands::{parse_date, Cli, Commands};
use marketpulse::config::AppConfig;
use marketpulse::domain::values::symbol::Symbol;
use marketpulse::MarketPulse;
use serde::Serialize;
use std::time::Duration;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() {
    // Missing .env is fine.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let config = match AppConfig::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            std::process::exit(1);
        }
    };

    let mp = match MarketPulse::new(&config) {
        Ok(mp) => mp,
        Err(e) => {
            eprintln!("Error initializing MarketPulse: {e}");
            std::process::exit(1);
        }
    };

    let result = run_command(mp, &config, cli.command).await;
    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_tracing(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("marketpulse=info,warn"));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .init();
    }
}

async fn run_command(
    mp: MarketPulse,
    config: &AppConfig,
    cmd: Commands,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        Commands::Ingest {
            symbols,
            as_of,
            no_indices,
        } => {
            let watchlist = symbols_or(&symbols, &config.watchlist)?;
            let indices = if no_indices {
                Vec::new()
            } else {
                config.index_symbols()
            };
            let as_of = match as_of {
                Some(s) => parse_date(&s)?,
                None => mp.now(),
            };
            let report = mp.run_cycle(&watchlist, &indices, as_of).await;
            print_json(&report)?;
        }
        Commands::Watch {
            interval,
            no_immediate,
        } => {
            let interval = interval
                .map(Duration::from_secs)
                .unwrap_or_else(|| config.refresh_interval());
            let watch = mp.watch(
                config.watchlist.clone(),
                config.index_symbols(),
                interval,
                !no_immediate,
                None,
            );
            tokio::select! {
                res = watch => { res?; }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("interrupted, stopping scheduler");
                }
            }
        }
        Commands::Prices { symbol, range } => {
            let symbol = Symbol::new(&symbol)?;
            let range = range.resolve(mp.now(), config.lookback_days)?;
            print_json(&mp.prices(&symbol, range)?)?;
        }
        Commands::News { symbol, range } => {
            let symbol = Symbol::new(&symbol)?;
            let range = range.resolve(mp.now(), config.lookback_days)?;
            print_json(&mp.news(&symbol, range)?)?;
        }
        Commands::Sentiment { symbol, range } => {
            let symbol = symbol.map(|s| Symbol::new(&s)).transpose()?;
            let range = range.resolve(mp.now(), config.lookback_days)?;
            print_json(&mp.daily_sentiment(symbol.as_ref(), range)?)?;
        }
        Commands::Summary { symbols } => {
            let watchlist = symbols_or(&symbols, &config.watchlist)?;
            print_json(&mp.summary(&watchlist)?)?;
        }
        Commands::Compare { range } => {
            let range = range.resolve(mp.now(), config.lookback_days)?;
            print_json(&mp.compare(&config.indices, range)?)?;
        }
        Commands::Stats => {
            print_json(&mp.stats()?)?;
        }
    }
    Ok(())
}

fn symbols_or(raw: &Option<String>, fallback: &[Symbol]) -> Result<Vec<Symbol>, String> {
    match raw {
        Some(list) => Symbol::parse_list(list),
        None => Ok(fallback.to_vec()),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
