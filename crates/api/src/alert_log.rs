use std::collections::VecDeque;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;

use common::{Alert, Result, SignalSink};

/// One published alert as shown on the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct AlertRecord {
    pub symbol: String,
    pub received_at: DateTime<Utc>,
    pub alert: Alert,
}

/// Bounded in-memory history of published alerts. Oldest entries are evicted.
pub struct AlertLog {
    capacity: usize,
    entries: RwLock<VecDeque<AlertRecord>>,
}

impl AlertLog {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: RwLock::new(VecDeque::with_capacity(capacity)),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Up to `limit` records, newest first.
    pub async fn recent(&self, limit: usize) -> Vec<AlertRecord> {
        self.entries
            .read()
            .await
            .iter()
            .rev()
            .take(limit)
            .cloned()
            .collect()
    }

    pub async fn record(&self, symbol: &str, alert: &Alert) {
        let mut entries = self.entries.write().await;
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(AlertRecord {
            symbol: symbol.to_string(),
            received_at: Utc::now(),
            alert: *alert,
        });
    }
}

#[async_trait]
impl SignalSink for AlertLog {
    fn describe(&self) -> String {
        "dashboard-log".into()
    }

    async fn publish(&self, symbol: &str, alert: &Alert) -> Result<()> {
        self.record(symbol, alert).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::RsiWatch;

    fn alert(rsi: f64) -> Alert {
        Alert::Watch(RsiWatch::Oversold { rsi })
    }

    #[tokio::test]
    async fn keeps_newest_first_and_evicts_oldest() {
        let log = AlertLog::new(2);
        log.publish("EURUSD", &alert(20.0)).await.unwrap();
        log.publish("GBPUSD", &alert(21.0)).await.unwrap();
        log.publish("USDJPY", &alert(22.0)).await.unwrap();

        let recent = log.recent(10).await;
        let symbols: Vec<&str> = recent.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["USDJPY", "GBPUSD"]);
        assert_eq!(log.len().await, 2);
    }

    #[tokio::test]
    async fn limit_caps_the_result() {
        let log = AlertLog::new(10);
        for i in 0..5 {
            log.record("EURUSD", &alert(i as f64)).await;
        }
        assert_eq!(log.recent(3).await.len(), 3);
        assert_eq!(log.recent(0).await.len(), 0);
    }

    #[tokio::test]
    async fn zero_capacity_is_clamped() {
        let log = AlertLog::new(0);
        assert_eq!(log.capacity(), 1);
        assert!(log.is_empty().await);
    }
}
