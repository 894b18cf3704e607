use std::sync::Arc;

use tracing::info;

use common::{Error, Result};

use crate::config::{ProParams, RsiWatchParams, StrategyConfig};
use crate::evaluator::ProStrategy;
use crate::watch::RsiWatchStrategy;
use crate::Strategy;

/// Strategy type identifiers accepted in the config file.
pub const STRATEGY_TYPES: &[&str] = &["pro", "rsi"];

/// Build the configured strategy, validating its parameters.
pub fn build_strategy(cfg: &StrategyConfig) -> Result<Arc<dyn Strategy>> {
    let strategy: Arc<dyn Strategy> = match cfg.strategy_type.as_str() {
        "pro" => {
            let params = ProParams::from_params(&cfg.params)?;
            let name = cfg
                .name
                .clone()
                .unwrap_or_else(|| "EMA200 + RSI + MACD".to_string());
            Arc::new(ProStrategy::new(name, params))
        }
        "rsi" => {
            let params = RsiWatchParams::from_params(&cfg.params)?;
            let name = cfg.name.clone().unwrap_or_else(|| {
                format!("RSI {} ({}/{})", params.window, params.low, params.high)
            });
            Arc::new(RsiWatchStrategy::new(name, params))
        }
        other => {
            return Err(Error::Config(format!(
                "unknown strategy type '{other}', expected one of {STRATEGY_TYPES:?}"
            )))
        }
    };

    info!(
        name = %strategy.name(),
        min_history = strategy.min_history(),
        "Strategy configured"
    );
    Ok(strategy)
}
