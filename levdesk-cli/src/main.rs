//! LevDesk CLI — position report, price history, and coin listing.
//!
//! Commands:
//! - `calc` — evaluate a positions JSON file: report table, summary,
//!   optional scenario PnL at a uniform move, optional CSV artifact
//! - `history` — print the 7-day price series for a coin
//! - `coins` — list the top coins with spot prices
//!
//! A dead price API degrades the output (price columns show as
//! unavailable) but never fails the command; only unreadable input files
//! and invalid arguments exit non-zero.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use levdesk_core::data::{
    fetch_history, fetch_spot_prices, GeckoProvider, PaprikaProvider, PriceProvider,
    DEFAULT_HISTORY_DAYS,
};
use levdesk_core::domain::{CoinMap, Session};
use levdesk_core::engine::{evaluate, evaluate_scenario, EvaluationReport, RiskPolicy};
use levdesk_core::export::{export_report_csv, import_positions_json};

#[derive(Parser)]
#[command(
    name = "levdesk",
    about = "LevDesk CLI — leveraged position calculator"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a positions file and print the report.
    Calc {
        /// Path to a positions JSON file (as written by the TUI's 'w' key).
        #[arg(long)]
        positions: PathBuf,

        /// Apply a uniform hypothetical move (%) to every coin and print
        /// the scenario PnL.
        #[arg(long = "move", allow_hyphen_values = true)]
        move_pct: Option<f64>,

        /// Risk policy TOML file. Defaults to built-in tiers (3x / 10x).
        #[arg(long)]
        policy: Option<PathBuf>,

        /// Write the report as CSV to this path.
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Skip the network; price-dependent columns show as unavailable.
        #[arg(long, default_value_t = false)]
        offline: bool,

        /// Maintenance margin percentage for liquidation prices.
        #[arg(long, default_value_t = 0.5)]
        maintenance_margin: f64,
    },
    /// Print the price history for a coin symbol.
    History {
        /// Coin symbol, e.g. BTC.
        symbol: String,

        /// Lookback window in days.
        #[arg(long, default_value_t = DEFAULT_HISTORY_DAYS)]
        days: u32,
    },
    /// List the top coins with current spot prices.
    Coins {
        /// Number of coins to list.
        #[arg(long, default_value_t = 50)]
        limit: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Calc {
            positions,
            move_pct,
            policy,
            csv,
            offline,
            maintenance_margin,
        } => run_calc(positions, move_pct, policy, csv, offline, maintenance_margin),
        Commands::History { symbol, days } => run_history(&symbol, days),
        Commands::Coins { limit } => run_coins(limit),
    }
}

fn providers() -> Vec<Box<dyn PriceProvider>> {
    vec![
        Box::new(PaprikaProvider::new()),
        Box::new(GeckoProvider::new()),
    ]
}

/// Spot prices through the fallback chain; failure prints a warning and
/// returns an empty map.
fn spot_prices_or_warn(limit: usize) -> CoinMap {
    let owned = providers();
    let refs: Vec<&dyn PriceProvider> = owned.iter().map(|p| p.as_ref()).collect();
    let fetch = fetch_spot_prices(&refs, limit);

    if fetch.failed() {
        for (name, e) in &fetch.errors {
            eprintln!("warning: {name}: {e}");
        }
        eprintln!("warning: continuing without spot prices");
    } else if let Some(source) = &fetch.source {
        println!("Price data source: {source}");
    }
    fetch.coins
}

fn run_calc(
    positions_path: PathBuf,
    move_pct: Option<f64>,
    policy_path: Option<PathBuf>,
    csv_path: Option<PathBuf>,
    offline: bool,
    maintenance_margin: f64,
) -> Result<()> {
    let json = std::fs::read_to_string(&positions_path)
        .with_context(|| format!("failed to read {}", positions_path.display()))?;
    let positions = import_positions_json(&json)?;

    let policy = match policy_path {
        Some(path) => RiskPolicy::from_file(&path)
            .with_context(|| format!("failed to load policy from {}", path.display()))?,
        None => RiskPolicy::default(),
    };

    let mut session = Session {
        positions,
        maintenance_margin_pct: maintenance_margin,
        ..Session::default()
    };

    let coins = if offline {
        CoinMap::default()
    } else {
        spot_prices_or_warn(50)
    };

    let report = evaluate(&session, &coins, &policy);
    print_report(&report);

    if let Some(mv) = move_pct {
        let coins_in_book: Vec<String> =
            session.coins().iter().map(|s| s.to_string()).collect();
        for coin in coins_in_book {
            session.set_move(&coin, mv);
        }
        let scenario = evaluate_scenario(&session);
        println!("\nScenario at {mv:+.1}% move:");
        for c in &scenario.coins {
            let closed = if c.closed > 0 {
                format!(" ({} closed at threshold)", c.closed)
            } else {
                String::new()
            };
            println!("  {:<6} {:>12}{closed}", c.coin, format!("${:+.2}", c.pnl));
        }
        println!("  Net portfolio P/L: ${:+.2}", scenario.net_pnl);
    }

    if let Some(path) = csv_path {
        let csv = export_report_csv(&report.rows)?;
        std::fs::write(&path, csv)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("\nWrote {} data rows to {}", report.rows.len(), path.display());
    }

    Ok(())
}

fn opt_cell(v: Option<f64>, decimals: usize) -> String {
    v.map(|x| format!("{x:.decimals$}")).unwrap_or_else(|| "-".into())
}

fn print_report(report: &EvaluationReport) {
    println!(
        "{:<6} {:<5} {:>10} {:>7} {:>6} {:>6} {:>12} {:>12} {:>12} {:>7}",
        "Coin", "Dir", "Margin", "Lev", "SL%", "TP%", "Price", "Notional", "Liq", "Risk"
    );
    for r in &report.rows {
        println!(
            "{:<6} {:<5} {:>10.2} {:>6.2}x {:>6} {:>6} {:>12} {:>12.2} {:>12} {:>7}",
            r.coin,
            r.direction.label(),
            r.margin,
            r.leverage,
            opt_cell(r.stop_loss_pct, 1),
            opt_cell(r.take_profit_pct, 1),
            opt_cell(r.price_usd, 4),
            r.notional_usd,
            opt_cell(r.liquidation_price, 4),
            r.risk.label(),
        );
    }

    if report.skipped_count() > 0 {
        println!(
            "\n{} position(s) excluded (invalid margin/leverage or thresholds):",
            report.skipped_count()
        );
        for (idx, reason) in &report.skipped {
            println!("  position {}: {}", idx + 1, reason);
        }
    }

    let s = &report.summary;
    println!(
        "\nTotal margin ${:.2} | exposure ${:.2} | weighted leverage {:.2}x | open {}",
        s.total_margin, s.total_exposure, s.weighted_leverage, s.open_positions
    );
    if !s.composition.is_empty() {
        let comp: Vec<String> = s
            .composition
            .iter()
            .map(|c| format!("{} {:.1}%", c.coin, c.share_pct))
            .collect();
        println!("Composition: {}", comp.join(", "));
    }
}

fn run_history(symbol: &str, days: u32) -> Result<()> {
    let coins = spot_prices_or_warn(50);

    let provider = PaprikaProvider::new();
    let series = match coins.get(symbol) {
        Some(info) => fetch_history(&provider, &info.id, days),
        None => {
            // Unknown or unresolvable symbol: show the sample series so the
            // command still demonstrates the window, and say why.
            let mut s = levdesk_core::data::sample_history(symbol, days);
            s.error = Some(format!("could not resolve symbol {symbol:?}"));
            s
        }
    };

    println!(
        "History for {} over {days} days ({})",
        symbol.to_uppercase(),
        series.source.label()
    );
    if let Some(err) = &series.error {
        eprintln!("warning: {err}");
    }
    for point in &series.points {
        println!("  {}  {:.6}", point.time.format("%Y-%m-%d %H:%M"), point.price);
    }
    Ok(())
}

fn run_coins(limit: usize) -> Result<()> {
    let coins = spot_prices_or_warn(limit);
    if coins.is_empty() {
        println!("No coin data available.");
        return Ok(());
    }

    println!("{:<8} {:<24} {:>14}", "Symbol", "Id", "Price (USD)");
    for coin in coins.iter() {
        println!(
            "{:<8} {:<24} {:>14.6}",
            coin.symbol, coin.id, coin.price_usd
        );
    }
    Ok(())
}
