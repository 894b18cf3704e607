use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use common::{Error, Result};

/// Strategy config file (TOML).
///
/// Example `config/strategy.toml`:
/// ```toml
/// [strategy]
/// type = "pro"
/// name = "EMA200 + RSI + MACD"
///
/// [strategy.params]
/// rsi_low = 25.0
/// rsi_high = 75.0
/// atr_mult = 1.5
/// rr_ratio = 2.0
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StrategyFileConfig {
    #[serde(default)]
    pub strategy: StrategyConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StrategyConfig {
    /// Strategy type identifier: "pro" or "rsi".
    #[serde(rename = "type")]
    pub strategy_type: String,
    /// Human-readable name shown in logs and status replies.
    #[serde(default)]
    pub name: Option<String>,
    /// Strategy-specific parameters. Unknown keys are ignored.
    #[serde(default)]
    pub params: HashMap<String, toml::Value>,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            strategy_type: "pro".to_string(),
            name: None,
            params: HashMap::new(),
        }
    }
}

impl StrategyFileConfig {
    /// Load from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("failed to read strategy config at '{path}': {e}"))
        })?;
        Self::parse(&content)
            .map_err(|e| Error::Config(format!("failed to parse strategy config at '{path}': {e}")))
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }
}

impl StrategyConfig {
    /// Apply RSI threshold overrides (from the environment) on top of the file.
    pub fn with_rsi_overrides(mut self, low: Option<f64>, high: Option<f64>) -> Self {
        if let Some(low) = low {
            self.params.insert("rsi_low".into(), toml::Value::Float(low));
        }
        if let Some(high) = high {
            self.params.insert("rsi_high".into(), toml::Value::Float(high));
        }
        self
    }
}

/// Parameters of the EMA200 + RSI + MACD + ATR strategy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProParams {
    pub rsi_low: f64,
    pub rsi_high: f64,
    pub rsi_window: usize,
    pub ema_span: usize,
    pub atr_window: usize,
    pub atr_mult: f64,
    pub rr_ratio: f64,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    /// Fewer bars than this and the strategy stays silent.
    pub min_history: usize,
}

impl Default for ProParams {
    fn default() -> Self {
        Self {
            rsi_low: 25.0,
            rsi_high: 75.0,
            rsi_window: 14,
            ema_span: 200,
            atr_window: 14,
            atr_mult: 1.5,
            rr_ratio: 2.0,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            min_history: 210,
        }
    }
}

impl ProParams {
    pub fn from_params(params: &HashMap<String, toml::Value>) -> Result<Self> {
        let d = Self::default();
        let parsed = Self {
            rsi_low: param_f64(params, "rsi_low", d.rsi_low),
            rsi_high: param_f64(params, "rsi_high", d.rsi_high),
            rsi_window: param_usize(params, "rsi_window", d.rsi_window),
            ema_span: param_usize(params, "ema_span", d.ema_span),
            atr_window: param_usize(params, "atr_window", d.atr_window),
            atr_mult: param_f64(params, "atr_mult", d.atr_mult),
            rr_ratio: param_f64(params, "rr_ratio", d.rr_ratio),
            macd_fast: param_usize(params, "macd_fast", d.macd_fast),
            macd_slow: param_usize(params, "macd_slow", d.macd_slow),
            macd_signal: param_usize(params, "macd_signal", d.macd_signal),
            min_history: param_usize(params, "min_history", d.min_history),
        };
        parsed.validate()?;
        Ok(parsed)
    }

    pub fn validate(&self) -> Result<()> {
        check_thresholds(self.rsi_low, self.rsi_high)?;
        for (key, value) in [
            ("rsi_window", self.rsi_window),
            ("ema_span", self.ema_span),
            ("atr_window", self.atr_window),
            ("macd_fast", self.macd_fast),
            ("macd_slow", self.macd_slow),
            ("macd_signal", self.macd_signal),
        ] {
            if value == 0 {
                return Err(Error::Config(format!("{key} must be at least 1")));
            }
        }
        if self.macd_fast >= self.macd_slow {
            return Err(Error::Config(
                "macd_fast must be less than macd_slow".to_string(),
            ));
        }
        if !(self.atr_mult.is_finite() && self.atr_mult > 0.0) {
            return Err(Error::Config("atr_mult must be positive".to_string()));
        }
        if !(self.rr_ratio.is_finite() && self.rr_ratio > 0.0) {
            return Err(Error::Config("rr_ratio must be positive".to_string()));
        }
        Ok(())
    }
}

/// Parameters of the RSI-only watch strategy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RsiWatchParams {
    pub low: f64,
    pub high: f64,
    pub window: usize,
}

impl Default for RsiWatchParams {
    fn default() -> Self {
        Self {
            low: 30.0,
            high: 70.0,
            window: 14,
        }
    }
}

impl RsiWatchParams {
    pub fn from_params(params: &HashMap<String, toml::Value>) -> Result<Self> {
        let d = Self::default();
        let parsed = Self {
            low: param_f64(params, "rsi_low", d.low),
            high: param_f64(params, "rsi_high", d.high),
            window: param_usize(params, "rsi_window", d.window),
        };
        parsed.validate()?;
        Ok(parsed)
    }

    pub fn validate(&self) -> Result<()> {
        check_thresholds(self.low, self.high)?;
        if self.window == 0 {
            return Err(Error::Config("rsi_window must be at least 1".to_string()));
        }
        Ok(())
    }
}

fn check_thresholds(low: f64, high: f64) -> Result<()> {
    let in_range = |v: f64| (0.0..=100.0).contains(&v);
    if !in_range(low) || !in_range(high) || low >= high {
        return Err(Error::Config(format!(
            "RSI thresholds must satisfy 0 <= low < high <= 100, got low={low} high={high}"
        )));
    }
    Ok(())
}

fn param_f64(params: &HashMap<String, toml::Value>, key: &str, default: f64) -> f64 {
    params
        .get(key)
        .and_then(|v| v.as_float().or_else(|| v.as_integer().map(|i| i as f64)))
        .unwrap_or(default)
}

fn param_usize(params: &HashMap<String, toml::Value>, key: &str, default: usize) -> usize {
    params
        .get(key)
        .and_then(|v| v.as_integer())
        .and_then(|v| usize::try_from(v).ok())
        .unwrap_or(default)
}
