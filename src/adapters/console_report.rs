//! Plain-text summaries for the terminal.

use std::fmt::Write as _;

use crate::domain::backtest::BacktestResult;
use crate::domain::metrics::MetricsReport;
use crate::domain::signal::transitions;
use crate::domain::sweep::SweepOutcome;
use crate::domain::trade::round_trips;
use crate::ports::report_port::ReportContext;

/// `₹` for NSE listings (`.NS`), `$` otherwise.
pub fn currency_symbol(code: &str) -> &'static str {
    if code.to_uppercase().ends_with(".NS") {
        "₹"
    } else {
        "$"
    }
}

/// Groups the integer part in thousands: `1234567.891` → `1,234,567.89`.
pub fn format_thousands(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let negative = value < 0.0 && formatted.chars().any(|c| c != '0' && c != '.');
    let sign = if negative { "-" } else { "" };
    match frac_part {
        Some(frac) => format!("{sign}{grouped}.{frac}"),
        None => format!("{sign}{grouped}"),
    }
}

pub fn format_currency(value: f64, symbol: &str) -> String {
    if !value.is_finite() {
        return format!("{symbol} N/A");
    }
    format!("{symbol} {}", format_thousands(value, 2))
}

pub fn format_pct(fraction: f64) -> String {
    format!("{:.2}%", fraction * 100.0)
}

fn metric_row(out: &mut String, label: &str, strategy: &str, benchmark: &str) {
    let _ = writeln!(out, "{:<24}{:>20}{:>20}", label, strategy, benchmark);
}

pub fn render_summary(result: &BacktestResult, ctx: &ReportContext<'_>) -> String {
    let m: &MetricsReport = &result.metrics;
    let b: &MetricsReport = &result.benchmark_metrics;
    let cur = ctx.currency;
    let mut out = String::new();

    let _ = writeln!(
        out,
        "=== {} SMA({}/{}) {} to {} ===",
        ctx.code, ctx.config.short_window, ctx.config.long_window, ctx.start_date, ctx.end_date
    );
    metric_row(&mut out, "", "Strategy", "Buy & Hold");
    metric_row(
        &mut out,
        "Initial Capital",
        &format_currency(m.initial_equity, cur),
        &format_currency(b.initial_equity, cur),
    );
    metric_row(
        &mut out,
        "Final Value",
        &format_currency(m.final_equity, cur),
        &format_currency(b.final_equity, cur),
    );
    metric_row(
        &mut out,
        "Cumulative Return",
        &format_pct(m.cumulative_return),
        &format_pct(b.cumulative_return),
    );
    metric_row(
        &mut out,
        "Annualized Return",
        &format_pct(m.annualized_return),
        &format_pct(b.annualized_return),
    );
    metric_row(
        &mut out,
        "Annualized Volatility",
        &format_pct(m.annualized_volatility),
        &format_pct(b.annualized_volatility),
    );
    metric_row(
        &mut out,
        "Sharpe Ratio",
        &format!("{:.2}", m.sharpe_ratio),
        &format!("{:.2}", b.sharpe_ratio),
    );
    metric_row(
        &mut out,
        "Max Drawdown",
        &format!("-{}", format_pct(m.max_drawdown)),
        &format!("-{}", format_pct(b.max_drawdown)),
    );
    metric_row(
        &mut out,
        "Max DD Duration (bars)",
        &m.max_drawdown_duration.to_string(),
        &b.max_drawdown_duration.to_string(),
    );
    let bars_long = result.signals.iter().filter(|s| s.position.is_long()).count();
    metric_row(
        &mut out,
        "Bars Long",
        &format!("{} / {}", bars_long, result.signals.len()),
        &format!("{0} / {0}", result.benchmark_curve.len()),
    );
    metric_row(
        &mut out,
        "Signal Changes",
        &transitions(&result.signals).len().to_string(),
        "1",
    );
    metric_row(&mut out, "Trades", &result.trades.len().to_string(), "1");
    out
}

/// One line per trade, with realised or open P&L per round trip.
pub fn render_trades(result: &BacktestResult, currency: &str) -> String {
    let mut out = String::new();
    if result.trades.is_empty() {
        out.push_str("No trades.\n");
        return out;
    }

    let _ = writeln!(
        out,
        "{:<12}{:<6}{:>16}{:>16}{:>20}",
        "Date", "Side", "Price", "Shares", "Notional"
    );
    for trade in &result.trades {
        let _ = writeln!(
            out,
            "{:<12}{:<6}{:>16}{:>16.4}{:>20}",
            trade.date.to_string(),
            trade.side.to_string(),
            format_thousands(trade.price, 2),
            trade.shares,
            format_currency(trade.notional(), currency)
        );
    }

    let last_close = result.equity_curve.last().map_or(0.0, |s| s.close);
    let trips = round_trips(&result.trades);
    let pnl: f64 = trips.iter().map(|t| t.pnl(last_close)).sum();
    let open = trips.iter().filter(|t| t.is_open()).count();
    let _ = writeln!(
        out,
        "{} round trips ({} open), P&L {}",
        trips.len(),
        open,
        format_currency(pnl, currency)
    );
    out
}

/// Top `top` successful runs, best Sharpe first.
pub fn render_sweep(ranked: &[&SweepOutcome], top: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>6}{:>6}{:>14}{:>14}{:>10}{:>12}{:>8}",
        "short", "long", "cumulative", "annualized", "sharpe", "max dd", "trades"
    );
    for outcome in ranked.iter().take(top) {
        if let Ok(run) = &outcome.result {
            let m = &run.metrics;
            let _ = writeln!(
                out,
                "{:>6}{:>6}{:>14}{:>14}{:>10.2}{:>12}{:>8}",
                outcome.short_window,
                outcome.long_window,
                format_pct(m.cumulative_return),
                format_pct(m.annualized_return),
                m.sharpe_ratio,
                format_pct(m.max_drawdown),
                run.trade_count
            );
        }
    }
    out
}
