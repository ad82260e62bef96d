use crate::model::{AnnualReturn, PortfolioStatistics, YearReturn};

/// Summary statistics over calendar-year returns.
///
/// Ties for best or worst year go to the earliest year. An empty slice yields
/// all-zero statistics.
pub fn summarize(annual_returns: &[AnnualReturn]) -> PortfolioStatistics {
    let Some(first) = annual_returns.first() else {
        let zero = YearReturn {
            year: 0,
            return_pct: 0.0,
        };
        return PortfolioStatistics {
            best_year: zero,
            worst_year: zero,
            average_return: 0.0,
            volatility: 0.0,
            positive_years: 0,
            negative_years: 0,
        };
    };

    let mut best = first;
    let mut worst = first;
    for r in &annual_returns[1..] {
        if r.return_pct > best.return_pct {
            best = r;
        }
        if r.return_pct < worst.return_pct {
            worst = r;
        }
    }

    let n = annual_returns.len() as f64;
    let mean = annual_returns.iter().map(|r| r.return_pct).sum::<f64>() / n;
    let variance = annual_returns
        .iter()
        .map(|r| (r.return_pct - mean).powi(2))
        .sum::<f64>()
        / n;

    PortfolioStatistics {
        best_year: YearReturn {
            year: best.year,
            return_pct: best.return_pct,
        },
        worst_year: YearReturn {
            year: worst.year,
            return_pct: worst.return_pct,
        },
        average_return: mean,
        volatility: variance.sqrt(),
        positive_years: annual_returns.iter().filter(|r| r.return_pct > 0.0).count(),
        negative_years: annual_returns.iter().filter(|r| r.return_pct < 0.0).count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn year(year: i16, return_pct: f64) -> AnnualReturn {
        AnnualReturn {
            year,
            return_pct,
            start_value: 100.0,
            end_value: 100.0 * (1.0 + return_pct / 100.0),
        }
    }

    #[test]
    fn test_summary() {
        let returns = [year(2019, 10.0), year(2020, -20.0), year(2021, 30.0), year(2022, 0.0)];
        let stats = summarize(&returns);

        assert_eq!(stats.best_year.year, 2021);
        assert_eq!(stats.worst_year.year, 2020);
        assert!((stats.average_return - 5.0).abs() < 1e-12);
        // deviations 5, -25, 25, -5 → variance (25 + 625 + 625 + 25) / 4 = 325
        assert!((stats.volatility - 325f64.sqrt()).abs() < 1e-12);
        assert_eq!(stats.positive_years, 2);
        assert_eq!(stats.negative_years, 1);
    }

    #[test]
    fn test_ties_keep_first_year() {
        let returns = [year(2010, 5.0), year(2011, 5.0), year(2012, 5.0)];
        let stats = summarize(&returns);
        assert_eq!(stats.best_year.year, 2010);
        assert_eq!(stats.worst_year.year, 2010);
        assert_eq!(stats.volatility, 0.0);
    }

    #[test]
    fn test_empty_is_zeroed() {
        let stats = summarize(&[]);
        assert_eq!(stats.positive_years, 0);
        assert_eq!(stats.volatility, 0.0);
        assert_eq!(stats.best_year.year, 0);
    }
}
