use jiff::civil::Date;
use thiserror::Error;

/// Errors raised while validating a request, before any simulation runs.
///
/// Every variant names the offending field so callers can surface it directly.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("allocation: weights must sum to 1.0 (got {sum})")]
    InvalidWeightSum { sum: f64 },

    #[error("allocation: coarse buckets must sum to 100 (got {sum})")]
    InvalidBucketSum { sum: u32 },

    #[error("allocation: unknown asset class {0:?}")]
    UnknownAssetClass(String),

    #[error("allocation: at least one weight is required")]
    EmptyAllocation,

    #[error("{field}: {reason} (got {value})")]
    OutOfRange {
        field: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("end_date: {end} is before start_date {start}")]
    InvalidDateRange { start: Date, end: Date },
}

impl ValidationError {
    /// Name of the request field the error refers to.
    #[must_use]
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::InvalidWeightSum { .. }
            | ValidationError::InvalidBucketSum { .. }
            | ValidationError::UnknownAssetClass(_)
            | ValidationError::EmptyAllocation => "allocation",
            ValidationError::OutOfRange { field, .. } => *field,
            ValidationError::InvalidDateRange { .. } => "end_date",
        }
    }
}

/// Errors from the market-data collaborator. All of them are fatal to the request.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MarketDataError {
    #[error("market data unavailable for {ticker}")]
    Unavailable { ticker: String },

    #[error("market data for {ticker} has an invalid close {close} on {date}")]
    InvalidPrice {
        ticker: String,
        date: Date,
        close: f64,
    },

    #[error("no trading dates common to all tickers between {start} and {end}")]
    NoCommonDates { start: Date, end: Date },

    #[error("market data provider error: {0}")]
    Provider(String),
}

/// Errors from the result cache. These never reach the caller of the engine;
/// they are logged and treated as a miss.
#[derive(Debug, Clone, Error)]
pub enum CacheError {
    #[error("cache lock poisoned")]
    Poisoned,

    #[error("cache backend error: {0}")]
    Backend(String),

    #[error("cache payload could not be (de)serialized: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for CacheError {
    fn from(err: serde_json::Error) -> Self {
        CacheError::Serialization(err.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for CacheError {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        CacheError::Poisoned
    }
}

/// Top-level error returned by every engine operation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    MarketData(#[from] MarketDataError),

    /// The caller abandoned the request through its cancellation token
    #[error("run cancelled")]
    Cancelled,

    #[error("configuration error: {0}")]
    Config(String),

    /// A projection step produced a value outside the finite range
    #[error("monte carlo path left the finite range in year {year}")]
    NonFiniteValue { year: u32 },
}

pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_field_names() {
        assert_eq!(
            ValidationError::InvalidWeightSum { sum: 0.9 }.field(),
            "allocation"
        );
        let err = ValidationError::OutOfRange {
            field: "initial_capital",
            value: -1.0,
            reason: "must be positive",
        };
        assert_eq!(err.field(), "initial_capital");
        assert_eq!(
            err.to_string(),
            "initial_capital: must be positive (got -1)"
        );
    }

    #[test]
    fn test_engine_error_is_transparent() {
        let err: EngineError = MarketDataError::Unavailable {
            ticker: "SPY".into(),
        }
        .into();
        assert_eq!(err.to_string(), "market data unavailable for SPY");
    }
}
