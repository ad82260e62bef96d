use serde::{Deserialize, Serialize};

/// One granular allocation entry. `weight` is a fraction in [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationWeight {
    pub asset_class_id: String,
    pub weight: f64,
}

impl AllocationWeight {
    pub fn new(asset_class_id: impl Into<String>, weight: f64) -> Self {
        Self {
            asset_class_id: asset_class_id.into(),
            weight,
        }
    }
}

/// Legacy four-bucket allocation, each bucket an integer percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CoarseAllocation {
    #[serde(default)]
    pub stocks: u32,
    #[serde(default)]
    pub bonds: u32,
    #[serde(default)]
    pub alternatives: u32,
    #[serde(default)]
    pub cash: u32,
}

impl CoarseAllocation {
    #[must_use]
    pub fn new(stocks: u32, bonds: u32, alternatives: u32, cash: u32) -> Self {
        Self {
            stocks,
            bonds,
            alternatives,
            cash,
        }
    }
}

/// Allocation as accepted from a request: either the coarse bucket map or the
/// granular asset-class array. Both resolve through the same path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AllocationInput {
    Granular(Vec<AllocationWeight>),
    Coarse(CoarseAllocation),
}

impl From<CoarseAllocation> for AllocationInput {
    fn from(coarse: CoarseAllocation) -> Self {
        AllocationInput::Coarse(coarse)
    }
}

impl From<Vec<AllocationWeight>> for AllocationInput {
    fn from(weights: Vec<AllocationWeight>) -> Self {
        AllocationInput::Granular(weights)
    }
}

/// Aggregate weight of every asset class that maps onto one benchmark ticker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerWeight {
    pub ticker: String,
    pub weight: f64,
}

/// A validated allocation ready for simulation.
///
/// `tickers` is sorted by ticker and its weights sum to 1 up to rounding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedAllocation {
    pub weights: Vec<AllocationWeight>,
    pub tickers: Vec<TickerWeight>,
}

impl ResolvedAllocation {
    /// Distinct tickers the allocation needs price data for
    pub fn ticker_names(&self) -> impl Iterator<Item = &str> {
        self.tickers.iter().map(|t| t.ticker.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untagged_input_accepts_both_forms() {
        let coarse: AllocationInput =
            serde_json::from_str(r#"{"stocks": 60, "bonds": 30, "alternatives": 5, "cash": 5}"#)
                .unwrap();
        assert_eq!(
            coarse,
            AllocationInput::Coarse(CoarseAllocation::new(60, 30, 5, 5))
        );

        let granular: AllocationInput = serde_json::from_str(
            r#"[{"asset_class_id": "US_LARGE_CAP", "weight": 0.6},
                {"asset_class_id": "CORE_BONDS", "weight": 0.4}]"#,
        )
        .unwrap();
        match granular {
            AllocationInput::Granular(weights) => assert_eq!(weights.len(), 2),
            AllocationInput::Coarse(_) => panic!("expected granular form"),
        }
    }

    #[test]
    fn test_coarse_rejects_unknown_bucket() {
        let parsed: Result<AllocationInput, _> = serde_json::from_str(r#"{"crypto": 100}"#);
        assert!(parsed.is_err());
    }
}
