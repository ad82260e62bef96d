use crate::model::{ValuePoint, VolatilityBand};

/// Trading days per year used to scale annual volatility to daily
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// ±1σ envelope around the realized path.
///
/// `annual_volatility` is a fraction (0.15 for 15%). The centre line at step `i`
/// is the initial value grown by the cumulative simple daily return, and the
/// half-width widens with `√i`. Neither bound goes below zero.
pub fn volatility_bands(path: &[ValuePoint], annual_volatility: f64) -> Vec<VolatilityBand> {
    let Some(first) = path.first() else {
        return Vec::new();
    };
    let daily_vol = annual_volatility / TRADING_DAYS_PER_YEAR.sqrt();

    let mut bands = Vec::with_capacity(path.len());
    bands.push(VolatilityBand {
        date: first.date,
        upper: first.value,
        lower: first.value,
    });

    let mut cumulative = 0.0;
    for (i, w) in path.windows(2).enumerate() {
        let step = (i + 1) as f64;
        if w[0].value > 0.0 {
            cumulative += w[1].value / w[0].value - 1.0;
        }
        let expected = first.value * (1.0 + cumulative);
        let half_width = expected * daily_vol * step.sqrt();
        bands.push(VolatilityBand {
            date: w[1].date,
            upper: (expected + half_width).max(0.0),
            lower: (expected - half_width).max(0.0),
        });
    }
    bands
}
