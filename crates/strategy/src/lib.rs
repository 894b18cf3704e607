pub mod config;
pub mod evaluator;
pub mod indicators;
pub mod registry;
pub mod watch;

pub use config::{ProParams, RsiWatchParams, StrategyConfig, StrategyFileConfig};
pub use evaluator::{evaluate, ProStrategy, TradeLevels};
pub use indicators::IndicatorSet;
pub use registry::{build_strategy, STRATEGY_TYPES};
pub use watch::{evaluate_watch, RsiWatchStrategy};

use common::{Alert, Series};

/// All strategy implementations must satisfy this trait.
///
/// A strategy is a pure function of the series: no state is kept between
/// calls, so one instance can serve every symbol of a cycle concurrently.
pub trait Strategy: Send + Sync {
    /// Human-readable name of this strategy instance.
    fn name(&self) -> &str;

    /// Bars needed before the strategy can say anything.
    fn min_history(&self) -> usize;

    /// Evaluate the latest bar of `series` and optionally emit an alert.
    fn evaluate(&self, series: &Series) -> Option<Alert>;
}
