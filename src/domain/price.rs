//! Closing-price bars and validated price series.

use chrono::NaiveDate;

use super::error::SmacrossError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    pub date: NaiveDate,
    pub close: f64,
}

impl Bar {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Bar { date, close }
    }
}

/// An ordered, validated sequence of bars for a single instrument.
///
/// Dates are strictly increasing and every close is finite and positive.
/// The series never repairs data: construction fails on the first offending
/// index.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    bars: Vec<Bar>,
}

impl PriceSeries {
    pub fn new(bars: Vec<Bar>) -> Result<Self, SmacrossError> {
        for (i, bar) in bars.iter().enumerate() {
            if !bar.close.is_finite() {
                return Err(SmacrossError::data_integrity(i, "close must be finite"));
            }
            if bar.close <= 0.0 {
                return Err(SmacrossError::data_integrity(
                    i,
                    format!("close must be positive, got {}", bar.close),
                ));
            }
            if i > 0 && bar.date <= bars[i - 1].date {
                return Err(SmacrossError::data_integrity(
                    i,
                    format!(
                        "dates must be strictly increasing ({} follows {})",
                        bar.date,
                        bars[i - 1].date
                    ),
                ));
            }
        }
        Ok(PriceSeries { bars })
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }
}
