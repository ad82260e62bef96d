use crate::model::{CrisisImpact, CrisisWindow, ValuePoint};

/// Portfolio behavior inside each stress window the path covers.
///
/// A window is bounded by the first observation on or after its start and the
/// first on or after its end. Windows the path does not reach, or that closed
/// before the path began, are left out. Return and drawdown are measured
/// against the value at the window's first observation.
///
/// A window with no observation inside it is still reported when a later one
/// exists: both bounds land on that first observation after the window, so the
/// impact shows a flat 0% from a point outside the interval.
pub fn crisis_impact(path: &[ValuePoint], windows: &[CrisisWindow]) -> Vec<CrisisImpact> {
    let Some(first) = path.first() else {
        return Vec::new();
    };

    windows
        .iter()
        .filter(|w| first.date <= w.end)
        .filter_map(|w| {
            let start_idx = path.iter().position(|p| p.date >= w.start)?;
            let end_idx = path.iter().position(|p| p.date >= w.end)?;
            let inside = &path[start_idx..=end_idx.max(start_idx)];

            let start_value = path[start_idx].value;
            let end_value = path[end_idx].value;
            let lowest = inside
                .iter()
                .fold(inside[0], |low, p| if p.value < low.value { *p } else { low });

            let (return_pct, max_drawdown) = if start_value > 0.0 {
                (
                    (end_value / start_value - 1.0) * 100.0,
                    ((start_value - lowest.value) / start_value * 100.0).max(0.0),
                )
            } else {
                (0.0, 0.0)
            };

            Some(CrisisImpact {
                name: w.name.to_string(),
                start: w.start,
                end: w.end,
                start_value,
                end_value,
                lowest_value: lowest.value,
                lowest_date: lowest.date,
                return_pct,
                max_drawdown,
                color: w.color.to_string(),
            })
        })
        .collect()
}
