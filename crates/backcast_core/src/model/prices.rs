use jiff::civil::Date;
use serde::{Deserialize, Serialize};

/// Daily close for one ticker
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: Date,
    pub close: f64,
}

/// Ordered daily closes for one ticker, strictly increasing by date.
///
/// The trading calendar is whatever the data contains; nothing is filled in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    pub ticker: String,
    pub points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(ticker: impl Into<String>, points: Vec<PricePoint>) -> Self {
        Self {
            ticker: ticker.into(),
            points,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_date(&self) -> Option<Date> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<Date> {
        self.points.last().map(|p| p.date)
    }

    /// Copy of the observations within `[start, end]`
    #[must_use]
    pub fn window(&self, start: Date, end: Date) -> PriceSeries {
        let lo = self.points.partition_point(|p| p.date < start);
        let hi = self.points.partition_point(|p| p.date <= end);
        PriceSeries {
            ticker: self.ticker.clone(),
            points: self.points[lo..hi.max(lo)].to_vec(),
        }
    }

    /// Whether dates are strictly increasing
    pub fn is_ordered(&self) -> bool {
        self.points.windows(2).all(|w| w[0].date < w[1].date)
    }
}
