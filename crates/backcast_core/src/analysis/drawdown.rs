use crate::model::{DrawdownEpisode, ValuePoint};

/// Deepest peak-to-trough decline of `path`, or `None` for an empty path.
///
/// One forward pass with a running peak. Only the deepest episode is kept: its
/// recovery date is the first later date whose value exceeds the episode's own
/// peak, and is cleared again whenever a deeper trough replaces the episode.
pub fn max_drawdown(path: &[ValuePoint]) -> Option<DrawdownEpisode> {
    let first = path.first()?;

    let mut peak = first.value;
    let mut peak_date = first.date;
    let mut worst = DrawdownEpisode {
        max_drawdown_pct: 0.0,
        peak_date: first.date,
        trough_date: first.date,
        recovery_date: None,
        peak_value: first.value,
        trough_value: first.value,
    };

    for point in path {
        if point.value > peak {
            peak = point.value;
            peak_date = point.date;
        }

        let drawdown = if peak > 0.0 {
            ((peak - point.value) / peak * 100.0).clamp(0.0, 100.0)
        } else {
            0.0
        };

        if drawdown > worst.max_drawdown_pct {
            worst = DrawdownEpisode {
                max_drawdown_pct: drawdown,
                peak_date,
                trough_date: point.date,
                recovery_date: None,
                peak_value: peak,
                trough_value: point.value,
            };
        } else if worst.recovery_date.is_none()
            && worst.max_drawdown_pct > 0.0
            && point.value > worst.peak_value
        {
            worst.recovery_date = Some(point.date);
        }
    }

    Some(worst)
}
