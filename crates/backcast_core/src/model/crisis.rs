use jiff::civil::{Date, date};
use serde::Serialize;

/// A fixed historical stress interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CrisisWindow {
    pub name: &'static str,
    pub start: Date,
    pub end: Date,
    /// Chart annotation color
    pub color: &'static str,
}

/// Stress windows evaluated by every backtest
pub const CRISIS_WINDOWS: [CrisisWindow; 4] = [
    CrisisWindow {
        name: "Dot-com Crash",
        start: date(2000, 3, 1),
        end: date(2002, 10, 1),
        color: "#ef4444",
    },
    CrisisWindow {
        name: "2008 Financial Crisis",
        start: date(2007, 10, 1),
        end: date(2009, 3, 1),
        color: "#dc2626",
    },
    CrisisWindow {
        name: "COVID-19 Crash",
        start: date(2020, 2, 1),
        end: date(2020, 3, 31),
        color: "#f97316",
    },
    CrisisWindow {
        name: "2022 Bear Market",
        start: date(2022, 1, 1),
        end: date(2022, 10, 1),
        color: "#fb923c",
    },
];
