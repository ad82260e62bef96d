//! Allocation validation and asset-class resolution
//!
//! Both request forms end up here. The coarse four-bucket map is expanded into
//! granular asset-class weights through [`COARSE_SPLITS`] and then validated
//! exactly like a granular request, so there is a single path into the
//! simulators.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use rustc_hash::FxHashMap;

use crate::error::ValidationError;
use crate::model::{
    AllocationInput, AllocationWeight, CoarseAllocation, ResolvedAllocation, TickerWeight,
};

/// Tolerance on the sum of granular weights
pub const WEIGHT_SUM_TOLERANCE: f64 = 0.01;

/// Semantic asset class → benchmark ticker. Several classes share a ticker.
pub const ASSET_CLASS_TICKERS: &[(&str, &str)] = &[
    // Equities
    ("US_LARGE_CAP", "SPY"),
    ("US_MID_CAP", "IWM"),
    ("US_SMALL_CAP", "IWM"),
    ("US_EQUITY", "SPY"),
    ("INTL_DEVELOPED", "EFA"),
    ("INTL_EQUITY", "EFA"),
    ("EMERGING_MARKETS", "EEM"),
    ("GLOBAL_EQUITY", "SPY"),
    // Fixed income
    ("CORE_BONDS", "AGG"),
    ("INVESTMENT_GRADE", "AGG"),
    ("GOVERNMENT_BONDS", "AGG"),
    ("TREASURY_LONG", "TLT"),
    ("TREASURY_SHORT", "AGG"),
    ("FIXED_INCOME", "AGG"),
    // Alternatives
    ("REAL_ESTATE", "VNQ"),
    ("COMMODITIES", "GLD"),
    ("GOLD", "GLD"),
    ("ALTERNATIVES", "VNQ"),
    // Cash proxies
    ("CASH", "AGG"),
    ("MONEY_MARKET", "AGG"),
];

/// Intra-bucket split used to expand a coarse allocation.
///
/// Each bucket's fractions sum to 1.
pub const COARSE_SPLITS: CoarseSplits = CoarseSplits {
    stocks: &[
        ("US_EQUITY", 0.70),
        ("INTL_DEVELOPED", 0.20),
        ("EMERGING_MARKETS", 0.10),
    ],
    bonds: &[("CORE_BONDS", 0.80), ("TREASURY_LONG", 0.20)],
    alternatives: &[("REAL_ESTATE", 0.60), ("COMMODITIES", 0.40)],
    cash: &[("CASH", 1.0)],
};

pub struct CoarseSplits {
    pub stocks: &'static [(&'static str, f64)],
    pub bonds: &'static [(&'static str, f64)],
    pub alternatives: &'static [(&'static str, f64)],
    pub cash: &'static [(&'static str, f64)],
}

static TICKER_LOOKUP: LazyLock<FxHashMap<&'static str, &'static str>> =
    LazyLock::new(|| ASSET_CLASS_TICKERS.iter().copied().collect());

/// Benchmark ticker for an asset class, if the class is known
pub fn ticker_for(asset_class_id: &str) -> Option<&'static str> {
    TICKER_LOOKUP.get(asset_class_id).copied()
}

/// Validate and normalize an allocation in either form.
pub fn resolve(input: &AllocationInput) -> Result<ResolvedAllocation, ValidationError> {
    match input {
        AllocationInput::Granular(weights) => resolve_granular(weights.clone()),
        AllocationInput::Coarse(coarse) => resolve_granular(expand_coarse(coarse)?),
    }
}

/// Expand the four-bucket form into granular weights.
///
/// Buckets at zero contribute no entries.
pub fn expand_coarse(coarse: &CoarseAllocation) -> Result<Vec<AllocationWeight>, ValidationError> {
    let buckets = [
        ("stocks", coarse.stocks, COARSE_SPLITS.stocks),
        ("bonds", coarse.bonds, COARSE_SPLITS.bonds),
        ("alternatives", coarse.alternatives, COARSE_SPLITS.alternatives),
        ("cash", coarse.cash, COARSE_SPLITS.cash),
    ];

    let mut sum = 0u32;
    for (field, pct, _) in buckets {
        if pct > 100 {
            return Err(ValidationError::OutOfRange {
                field,
                value: f64::from(pct),
                reason: "bucket must be between 0 and 100",
            });
        }
        sum += pct;
    }
    if sum != 100 {
        return Err(ValidationError::InvalidBucketSum { sum });
    }

    let mut weights = Vec::new();
    for (_, pct, splits) in buckets {
        if pct == 0 {
            continue;
        }
        for (asset_class_id, fraction) in splits {
            weights.push(AllocationWeight::new(
                *asset_class_id,
                f64::from(pct) * fraction / 100.0,
            ));
        }
    }
    Ok(weights)
}

fn resolve_granular(weights: Vec<AllocationWeight>) -> Result<ResolvedAllocation, ValidationError> {
    if weights.is_empty() {
        return Err(ValidationError::EmptyAllocation);
    }

    let mut by_ticker: BTreeMap<&'static str, f64> = BTreeMap::new();
    let mut total = 0.0;
    for w in &weights {
        if !(w.weight.is_finite() && (0.0..=1.0).contains(&w.weight)) {
            return Err(ValidationError::OutOfRange {
                field: "allocation.weight",
                value: w.weight,
                reason: "weights must be fractions in [0, 1]",
            });
        }
        let ticker = ticker_for(&w.asset_class_id)
            .ok_or_else(|| ValidationError::UnknownAssetClass(w.asset_class_id.clone()))?;
        total += w.weight;
        if w.weight > 0.0 {
            *by_ticker.entry(ticker).or_insert(0.0) += w.weight;
        }
    }

    if (total - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        return Err(ValidationError::InvalidWeightSum { sum: total });
    }

    let tickers = by_ticker
        .into_iter()
        .map(|(ticker, weight)| TickerWeight {
            ticker: ticker.to_string(),
            weight: weight / total,
        })
        .collect();

    Ok(ResolvedAllocation { weights, tickers })
}
