//! Integration tests for the backcast engine
//!
//! Tests are organized by topic:
//! - `fixtures` - Deterministic synthetic market data and engine builders
//! - `backtest` - Historical replay, analytics and determinism
//! - `monte_carlo` - Distribution properties of the forward projection
//! - `engine` - Caching, comparison, concurrency and cancellation through the facade

mod fixtures;
mod monte_carlo;
