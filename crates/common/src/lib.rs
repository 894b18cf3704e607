pub mod config;
pub mod error;
pub mod provider;
pub mod sink;
pub mod store;
pub mod types;

pub use config::{Config, DashboardConfig, OutputSize};
pub use error::{Error, ProviderError, Result, SeriesError};
pub use provider::PriceSeriesProvider;
pub use sink::SignalSink;
pub use store::{normalize_pairs, SubscriptionStore};
pub use types::*;
