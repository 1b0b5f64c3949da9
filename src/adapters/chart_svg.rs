//! Inline SVG charts for the HTML report.

use chrono::NaiveDate;

use crate::adapters::console_report::format_currency;
use crate::domain::metrics::drawdown_series;
use crate::domain::portfolio::LedgerState;
use crate::domain::signal::SignalPoint;
use crate::domain::trade::{Side, Trade};

const CHART_WIDTH: f64 = 800.0;
const CHART_HEIGHT: f64 = 300.0;
const MARGIN_LEFT: f64 = 80.0;
const MARGIN_RIGHT: f64 = 20.0;
const MARGIN_TOP: f64 = 30.0;
const MARGIN_BOTTOM: f64 = 40.0;

/// One polyline; `None` values break the line.
struct Line<'a> {
    label: &'a str,
    color: &'a str,
    values: Vec<Option<f64>>,
}

struct Marker {
    index: usize,
    value: f64,
    side: Side,
}

struct Frame {
    len: usize,
    min: f64,
    range: f64,
}

impl Frame {
    fn plot_width() -> f64 {
        CHART_WIDTH - MARGIN_LEFT - MARGIN_RIGHT
    }

    fn plot_height() -> f64 {
        CHART_HEIGHT - MARGIN_TOP - MARGIN_BOTTOM
    }

    fn x(&self, i: usize) -> f64 {
        MARGIN_LEFT + (i as f64 / (self.len - 1).max(1) as f64) * Self::plot_width()
    }

    fn y(&self, v: f64) -> f64 {
        MARGIN_TOP + Self::plot_height() - ((v - self.min) / self.range) * Self::plot_height()
    }
}

fn open_svg(svg: &mut String, title: &str) {
    svg.push_str(&format!(
        r##"<svg width="{}" height="{}" viewBox="0 0 {} {}" xmlns="http://www.w3.org/2000/svg">"##,
        CHART_WIDTH, CHART_HEIGHT, CHART_WIDTH, CHART_HEIGHT
    ));
    svg.push_str("\n  <rect width=\"100%\" height=\"100%\" fill=\"white\"/>\n");
    svg.push_str(&format!(
        "  <text x=\"{}\" y=\"15\" text-anchor=\"end\" font-size=\"12\" fill=\"#666\">{}</text>\n",
        CHART_WIDTH - MARGIN_RIGHT,
        title
    ));
    svg.push_str(&format!(
        "  <line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"#ccc\" stroke-width=\"1\"/>\n",
        MARGIN_LEFT,
        MARGIN_TOP,
        MARGIN_LEFT,
        CHART_HEIGHT - MARGIN_BOTTOM
    ));
    svg.push_str(&format!(
        "  <line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"#ccc\" stroke-width=\"1\"/>\n",
        MARGIN_LEFT,
        CHART_HEIGHT - MARGIN_BOTTOM,
        CHART_WIDTH - MARGIN_RIGHT,
        CHART_HEIGHT - MARGIN_BOTTOM
    ));
}

/// Escapes text for HTML and SVG markup.
pub(crate) fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn y_label(svg: &mut String, y: f64, text: &str) {
    svg.push_str(&format!(
        "  <text x=\"{}\" y=\"{:.1}\" text-anchor=\"end\" \
         font-size=\"10\" fill=\"#666\">{}</text>\n",
        MARGIN_LEFT - 5.0,
        y,
        escape(text)
    ));
}

fn date_labels(svg: &mut String, dates: &[NaiveDate]) {
    let (Some(first), Some(last)) = (dates.first(), dates.last()) else {
        return;
    };
    let mid = dates[dates.len() / 2];
    for (x, date) in [
        (MARGIN_LEFT, first),
        (MARGIN_LEFT + Frame::plot_width() / 2.0, &mid),
        (CHART_WIDTH - MARGIN_RIGHT, last),
    ] {
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" text-anchor=\"middle\" \
             font-size=\"10\" fill=\"#666\">{}</text>\n",
            x, CHART_HEIGHT, date
        ));
    }
}

fn path_data(frame: &Frame, values: &[Option<f64>]) -> String {
    let mut data = String::new();
    let mut pen_down = false;
    for (i, value) in values.iter().enumerate() {
        match value {
            Some(v) => {
                let cmd = if pen_down { " L" } else if data.is_empty() { "M" } else { " M" };
                data.push_str(&format!("{} {:.1} {:.1}", cmd, frame.x(i), frame.y(*v)));
                pen_down = true;
            }
            None => pen_down = false,
        }
    }
    data
}

fn legend(svg: &mut String, lines: &[Line<'_>]) {
    for (i, line) in lines.iter().enumerate() {
        let x = MARGIN_LEFT + 10.0 + i as f64 * 140.0;
        svg.push_str(&format!(
            "  <rect x=\"{:.1}\" y=\"6\" width=\"12\" height=\"3\" fill=\"{}\"/>\n",
            x, line.color
        ));
        svg.push_str(&format!(
            "  <text x=\"{:.1}\" y=\"12\" font-size=\"10\" fill=\"#333\">{}</text>\n",
            x + 16.0,
            line.label
        ));
    }
}

fn line_chart(
    title: &str,
    currency: &str,
    dates: &[NaiveDate],
    lines: &[Line<'_>],
    markers: &[Marker],
) -> String {
    let values = lines.iter().flat_map(|l| l.values.iter().flatten().copied());
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if dates.is_empty() || !min.is_finite() {
        return String::new();
    }

    let frame = Frame {
        len: dates.len(),
        min,
        range: (max - min).max(f64::EPSILON.max(max.abs() * 1e-9)),
    };

    let mut svg = String::new();
    open_svg(&mut svg, title);
    y_label(&mut svg, MARGIN_TOP + 5.0, &format_currency(max, currency));
    y_label(
        &mut svg,
        MARGIN_TOP + Frame::plot_height() / 2.0,
        &format_currency((max + min) / 2.0, currency),
    );
    y_label(
        &mut svg,
        CHART_HEIGHT - MARGIN_BOTTOM - 5.0,
        &format_currency(min, currency),
    );
    date_labels(&mut svg, dates);
    legend(&mut svg, lines);

    for line in lines {
        svg.push_str(&format!(
            "  <path d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"1.5\"/>\n",
            path_data(&frame, &line.values),
            line.color
        ));
    }

    for marker in markers {
        let (x, y) = (frame.x(marker.index), frame.y(marker.value));
        let (points, color) = match marker.side {
            Side::Buy => (
                format!(
                    "{:.1},{:.1} {:.1},{:.1} {:.1},{:.1}",
                    x,
                    y - 6.0,
                    x - 5.0,
                    y + 4.0,
                    x + 5.0,
                    y + 4.0
                ),
                "#16a34a",
            ),
            Side::Sell => (
                format!(
                    "{:.1},{:.1} {:.1},{:.1} {:.1},{:.1}",
                    x,
                    y + 6.0,
                    x - 5.0,
                    y - 4.0,
                    x + 5.0,
                    y - 4.0
                ),
                "#dc2626",
            ),
        };
        svg.push_str(&format!(
            "  <polygon class=\"marker-{}\" points=\"{}\" fill=\"{}\"/>\n",
            marker.side.to_string().to_lowercase(),
            points,
            color
        ));
    }

    svg.push_str("</svg>");
    svg
}

/// Close price with both moving averages and buy/sell markers.
pub fn price_chart(
    equity_curve: &[LedgerState],
    signals: &[SignalPoint],
    trades: &[Trade],
    currency: &str,
) -> String {
    let dates: Vec<NaiveDate> = equity_curve.iter().map(|s| s.date).collect();
    let markers = trades
        .iter()
        .filter_map(|t| {
            dates.binary_search(&t.date).ok().map(|index| Marker {
                index,
                value: t.price,
                side: t.side,
            })
        })
        .collect::<Vec<_>>();

    let lines = [
        Line {
            label: "Close",
            color: "#64748b",
            values: equity_curve.iter().map(|s| Some(s.close)).collect(),
        },
        Line {
            label: "Short SMA",
            color: "#f59e0b",
            values: signals.iter().map(|s| s.short_avg).collect(),
        },
        Line {
            label: "Long SMA",
            color: "#7c3aed",
            values: signals.iter().map(|s| s.long_avg).collect(),
        },
    ];
    line_chart("Price", currency, &dates, &lines, &markers)
}

/// Strategy equity against the buy-and-hold benchmark.
pub fn equity_chart(
    strategy: &[LedgerState],
    benchmark: &[LedgerState],
    currency: &str,
) -> String {
    let dates: Vec<NaiveDate> = strategy.iter().map(|s| s.date).collect();
    let lines = [
        Line {
            label: "Strategy",
            color: "#2563eb",
            values: strategy.iter().map(|s| Some(s.equity)).collect(),
        },
        Line {
            label: "Buy &amp; Hold",
            color: "#9ca3af",
            values: benchmark.iter().map(|s| Some(s.equity)).collect(),
        },
    ];
    line_chart("Equity", currency, &dates, &lines, &[])
}

pub fn drawdown_chart(equity_curve: &[LedgerState]) -> String {
    if equity_curve.len() < 2 {
        return String::new();
    }

    let values: Vec<f64> = equity_curve.iter().map(|s| s.equity).collect();
    let drawdowns = drawdown_series(&values);
    let max_dd = drawdowns.iter().cloned().fold(0.0, f64::max).max(0.01);

    let x_scale = |i: usize| -> f64 {
        MARGIN_LEFT + (i as f64 / (drawdowns.len() - 1) as f64) * Frame::plot_width()
    };
    let y_scale = |dd: f64| -> f64 { MARGIN_TOP + (dd / max_dd) * Frame::plot_height() };

    let mut path = format!("M {:.1} {:.1}", x_scale(0), y_scale(0.0));
    for (i, &dd) in drawdowns.iter().enumerate() {
        path.push_str(&format!(" L {:.1} {:.1}", x_scale(i), y_scale(dd)));
    }
    path.push_str(&format!(
        " L {:.1} {:.1} Z",
        x_scale(drawdowns.len() - 1),
        y_scale(0.0)
    ));

    let dates: Vec<NaiveDate> = equity_curve.iter().map(|s| s.date).collect();
    let mut svg = String::new();
    open_svg(&mut svg, "Drawdown (%)");
    y_label(&mut svg, MARGIN_TOP + 5.0, "0%");
    y_label(
        &mut svg,
        MARGIN_TOP + Frame::plot_height() / 2.0,
        &format!("-{:.1}%", max_dd * 50.0),
    );
    y_label(
        &mut svg,
        CHART_HEIGHT - MARGIN_BOTTOM - 5.0,
        &format!("-{:.1}%", max_dd * 100.0),
    );
    date_labels(&mut svg, &dates);
    svg.push_str(&format!(
        "  <path d=\"{}\" fill=\"rgba(239,68,68,0.3)\" stroke=\"#dc2626\" stroke-width=\"1\"/>\n",
        path
    ));
    svg.push_str("</svg>");
    svg
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::signal::PositionSignal;

    fn state(day: u32, close: f64, equity: f64) -> LedgerState {
        LedgerState {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            close,
            cash: 0.0,
            shares: equity / close,
            equity,
        }
    }

    fn signal(day: u32, short: Option<f64>, long: Option<f64>) -> SignalPoint {
        SignalPoint {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            short_avg: short,
            long_avg: long,
            position: PositionSignal::Flat,
        }
    }

    #[test]
    fn empty_inputs_render_nothing() {
        assert!(equity_chart(&[], &[], "$").is_empty());
        assert!(price_chart(&[], &[], &[], "$").is_empty());
        assert!(drawdown_chart(&[state(1, 10.0, 100.0)]).is_empty());
    }

    #[test]
    fn equity_chart_has_both_series() {
        let strategy = vec![state(1, 10.0, 100.0), state(2, 11.0, 110.0), state(3, 12.0, 105.0)];
        let benchmark = vec![state(1, 10.0, 100.0), state(2, 11.0, 110.0), state(3, 12.0, 120.0)];
        let svg = equity_chart(&strategy, &benchmark, "$");
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert_eq!(svg.matches("<path").count(), 2);
        assert!(svg.contains("Buy &amp; Hold"));
        assert!(svg.contains("$ 120.00"));
        assert!(svg.contains("2024-01-01"));
        assert!(svg.contains("2024-01-03"));
    }

    #[test]
    fn currency_labels_are_escaped() {
        let curve = vec![state(1, 10.0, 100.0), state(2, 11.0, 110.0)];
        let svg = equity_chart(&curve, &curve, "A&B");
        assert!(svg.contains("A&amp;B 110.00"));
        assert!(!svg.contains("A&B"));
    }

    #[test]
    fn price_chart_breaks_lines_on_warmup_and_marks_trades() {
        let curve = vec![state(1, 10.0, 100.0), state(2, 11.0, 100.0), state(3, 12.0, 100.0)];
        let signals = vec![
            signal(1, None, None),
            signal(2, Some(10.5), None),
            signal(3, Some(11.5), Some(11.0)),
        ];
        let trades = vec![Trade {
            date: NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
            side: Side::Buy,
            price: 12.0,
            shares: 8.0,
        }];
        let svg = price_chart(&curve, &signals, &trades, "$");
        assert_eq!(svg.matches("<path").count(), 3);
        assert_eq!(svg.matches("marker-buy").count(), 1);
        assert!(!svg.contains("marker-sell"));
    }

    #[test]
    fn path_data_restarts_after_gap() {
        let frame = Frame {
            len: 4,
            min: 0.0,
            range: 1.0,
        };
        let data = path_data(&frame, &[Some(0.0), None, Some(1.0), Some(0.5)]);
        assert_eq!(data.matches('M').count(), 2);
        assert_eq!(data.matches('L').count(), 1);
    }

    #[test]
    fn drawdown_chart_labels_depth() {
        let curve = vec![state(1, 10.0, 100.0), state(2, 8.0, 80.0), state(3, 9.0, 90.0)];
        let svg = drawdown_chart(&curve);
        assert!(svg.contains("Drawdown (%)"));
        assert!(svg.contains("-20.0%"));
    }

    #[test]
    fn flat_series_does_not_divide_by_zero() {
        let curve = vec![state(1, 10.0, 100.0), state(2, 10.0, 100.0)];
        let svg = equity_chart(&curve, &curve, "$");
        assert!(!svg.contains("NaN"));
        assert!(!svg.contains("inf"));
    }
}
