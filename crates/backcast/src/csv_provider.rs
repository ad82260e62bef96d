//! Market data read from a directory of per-ticker CSV files
//!
//! Each ticker lives in `<dir>/<TICKER>.csv` with a header row. Only the date and
//! close columns are used; the usual OHLCV header spellings are accepted.

use std::path::{Path, PathBuf};

use backcast_core::{MarketDataError, MarketDataProvider, PricePoint, PriceSeries};
use csv::ReaderBuilder;
use jiff::civil::Date;
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(alias = "Date", alias = "DATE", alias = "timestamp", alias = "Timestamp")]
    date: String,
    #[serde(alias = "Close", alias = "CLOSE")]
    close: f64,
}

#[derive(Debug, Clone)]
pub struct CsvMarketData {
    dir: PathBuf,
}

impl CsvMarketData {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, ticker: &str) -> PathBuf {
        self.dir.join(format!("{ticker}.csv"))
    }

    /// Every row of a ticker's file, sorted by date with duplicate dates
    /// collapsed to the last row seen.
    pub fn read_all(&self, ticker: &str) -> Result<PriceSeries, MarketDataError> {
        let path = self.path_for(ticker);
        if !path.exists() {
            return Err(MarketDataError::Unavailable {
                ticker: ticker.to_string(),
            });
        }

        let provider_err =
            |msg: String| MarketDataError::Provider(format!("{}: {msg}", path.display()));

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(&path)
            .map_err(|e| provider_err(e.to_string()))?;

        let mut points = Vec::new();
        for (row_num, result) in reader.deserialize::<CsvRow>().enumerate() {
            let row = result.map_err(|e| provider_err(format!("row {}: {e}", row_num + 1)))?;
            let date: Date = row
                .date
                .get(..10)
                .unwrap_or(row.date.as_str())
                .parse()
                .map_err(|e| {
                    provider_err(format!("row {}: bad date {:?}: {e}", row_num + 1, row.date))
                })?;
            points.push(PricePoint {
                date,
                close: row.close,
            });
        }

        // Stable sort keeps file order among equal dates; keep the last of each
        points.sort_by_key(|p| p.date);
        points.reverse();
        points.dedup_by_key(|p| p.date);
        points.reverse();

        debug!(ticker, rows = points.len(), path = %path.display(), "read price file");
        Ok(PriceSeries::new(ticker, points))
    }
}

impl MarketDataProvider for CsvMarketData {
    fn load_series(
        &self,
        ticker: &str,
        start: Date,
        end: Date,
    ) -> Result<PriceSeries, MarketDataError> {
        Ok(self.read_all(ticker)?.window(start, end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::civil::date;

    fn write(dir: &Path, ticker: &str, body: &str) {
        std::fs::write(dir.join(format!("{ticker}.csv")), body).unwrap();
    }

    #[test]
    fn test_reads_and_windows_series() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "SPY",
            "date,open,high,low,close,volume\n\
             2020-01-06,1,1,1,101.5,10\n\
             2020-01-02,1,1,1,100.0,10\n\
             2020-01-03,1,1,1,99.0,10\n\
             2020-01-07,1,1,1,102.0,10\n",
        );
        let provider = CsvMarketData::new(dir.path());

        let all = provider.read_all("SPY").unwrap();
        assert!(all.is_ordered());
        assert_eq!(all.first_date(), Some(date(2020, 1, 2)));

        let window = provider
            .load_series("SPY", date(2020, 1, 3), date(2020, 1, 6))
            .unwrap();
        let closes: Vec<f64> = window.points.iter().map(|p| p.close).collect();
        assert_eq!(closes, vec![99.0, 101.5]);
    }

    #[test]
    fn test_accepts_capitalized_headers_and_timestamps() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "AGG",
            "Date,Open,High,Low,Close,Volume\n\
             2021-03-01T00:00:00,1,1,1,110.25,5\n\
             2021-03-01T00:00:00,1,1,1,110.50,5\n",
        );
        let series = CsvMarketData::new(dir.path()).read_all("AGG").unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series.points[0].date, date(2021, 3, 1));
        assert_eq!(series.points[0].close, 110.50);
    }

    #[test]
    fn test_missing_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let err = CsvMarketData::new(dir.path())
            .load_series("TLT", date(2020, 1, 1), date(2020, 12, 31))
            .unwrap_err();
        assert_eq!(
            err,
            MarketDataError::Unavailable {
                ticker: "TLT".into()
            }
        );
    }

    #[test]
    fn test_bad_rows_are_provider_errors() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "GLD", "date,close\nnot-a-date,10.0\n");
        let err = CsvMarketData::new(dir.path()).read_all("GLD").unwrap_err();
        assert!(matches!(err, MarketDataError::Provider(_)), "{err}");
    }
}
