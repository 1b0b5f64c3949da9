//! HTML report adapter implementing ReportPort.
//!
//! A single self-contained page: run parameters, a strategy vs buy-and-hold
//! metrics table, three inline SVG charts and the trade log.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::adapters::chart_svg::{self, escape};
use crate::adapters::console_report::{format_currency, format_pct, format_thousands};
use crate::domain::backtest::BacktestResult;
use crate::domain::error::SmacrossError;
use crate::domain::metrics::MetricsReport;
use crate::ports::report_port::{ReportContext, ReportPort};

const STYLE: &str = "body{font-family:sans-serif;margin:2em;color:#222}\
table{border-collapse:collapse;margin:1em 0}\
th,td{border:1px solid #ddd;padding:4px 10px;text-align:right}\
th:first-child,td:first-child{text-align:left}\
h2{margin-top:1.5em}";

fn metrics_table(out: &mut String, m: &MetricsReport, b: &MetricsReport, currency: &str) {
    let rows: [(&str, String, String); 9] = [
        (
            "Initial Capital",
            format_currency(m.initial_equity, currency),
            format_currency(b.initial_equity, currency),
        ),
        (
            "Final Value",
            format_currency(m.final_equity, currency),
            format_currency(b.final_equity, currency),
        ),
        (
            "Cumulative Return",
            format_pct(m.cumulative_return),
            format_pct(b.cumulative_return),
        ),
        (
            "Annualized Return",
            format_pct(m.annualized_return),
            format_pct(b.annualized_return),
        ),
        (
            "Annualized Volatility",
            format_pct(m.annualized_volatility),
            format_pct(b.annualized_volatility),
        ),
        (
            "Sharpe Ratio",
            format!("{:.2}", m.sharpe_ratio),
            format!("{:.2}", b.sharpe_ratio),
        ),
        (
            "Max Drawdown",
            format!("-{}", format_pct(m.max_drawdown)),
            format!("-{}", format_pct(b.max_drawdown)),
        ),
        (
            "Max Drawdown Duration",
            format!("{} bars", m.max_drawdown_duration),
            format!("{} bars", b.max_drawdown_duration),
        ),
        ("Periods", m.periods.to_string(), b.periods.to_string()),
    ];

    out.push_str("<table class=\"metrics\">\n");
    out.push_str("<tr><th>Metric</th><th>Strategy</th><th>Buy &amp; Hold</th></tr>\n");
    for (label, strategy, benchmark) in rows {
        let _ = writeln!(
            out,
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
            label, strategy, benchmark
        );
    }
    out.push_str("</table>\n");
}

fn trade_table(out: &mut String, result: &BacktestResult, currency: &str) {
    if result.trades.is_empty() {
        out.push_str("<p>No trades were executed.</p>\n");
        return;
    }
    out.push_str("<table class=\"trades\">\n<tr><th>Date</th><th>Side</th><th>Price</th>");
    out.push_str("<th>Shares</th><th>Notional</th></tr>\n");
    for trade in &result.trades {
        let _ = writeln!(
            out,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{:.4}</td><td>{}</td></tr>",
            trade.date,
            trade.side,
            format_thousands(trade.price, 2),
            trade.shares,
            format_currency(trade.notional(), currency)
        );
    }
    out.push_str("</table>\n");
}

pub fn render(result: &BacktestResult, ctx: &ReportContext<'_>) -> String {
    let code = escape(ctx.code);
    let currency = escape(ctx.currency);
    let currency = currency.as_str();
    let config = ctx.config;

    let mut out = String::new();
    let _ = write!(
        out,
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Backtest Report: {code}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n"
    );
    let _ = writeln!(out, "<h1>Backtest Report: {code}</h1>");
    let _ = writeln!(
        out,
        "<p>SMA crossover {} / {} &middot; {} to {} &middot; \
         initial capital {} &middot; {} periods per year</p>",
        config.short_window,
        config.long_window,
        ctx.start_date,
        ctx.end_date,
        format_currency(config.initial_capital, currency),
        config.periods_per_year
    );

    out.push_str("<h2>Performance</h2>\n");
    metrics_table(&mut out, &result.metrics, &result.benchmark_metrics, currency);

    out.push_str("<h2>Price and Moving Averages</h2>\n");
    out.push_str(&chart_svg::price_chart(
        &result.equity_curve,
        &result.signals,
        &result.trades,
        ctx.currency,
    ));
    out.push_str("\n<h2>Equity Chart</h2>\n");
    out.push_str(&chart_svg::equity_chart(
        &result.equity_curve,
        &result.benchmark_curve,
        ctx.currency,
    ));
    out.push_str("\n<h2>Drawdown</h2>\n");
    out.push_str(&chart_svg::drawdown_chart(&result.equity_curve));

    let _ = writeln!(out, "\n<h2>Trade Log ({})</h2>", result.trades.len());
    trade_table(&mut out, result, currency);

    out.push_str("</body>\n</html>\n");
    out
}

#[derive(Debug, Default)]
pub struct HtmlReportAdapter;

impl HtmlReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl ReportPort for HtmlReportAdapter {
    fn write(
        &self,
        result: &BacktestResult,
        ctx: &ReportContext<'_>,
        output_path: &Path,
    ) -> Result<(), SmacrossError> {
        let html = render(result, ctx);
        if let Some(parent) = output_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(output_path, html)?;
        Ok(())
    }
}
