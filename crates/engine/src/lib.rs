pub mod alpha_vantage;
pub mod cycle;
pub mod lifecycle;
pub mod retry;

pub use alpha_vantage::AlphaVantageClient;
pub use cycle::{CycleDriver, CycleReport, SymbolOutcome, SymbolReport};
pub use lifecycle::{Engine, EngineHandle, SinkBuilder};
pub use retry::{RetryPolicy, Retrying};
