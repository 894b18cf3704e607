use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch, RwLock};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use common::{CycleSummary, EngineCommand, EngineState, SignalSink, Subscriptions, SubscriptionStore};

use crate::cycle::CycleDriver;

/// Shortest period the scheduler accepts; `interval_at` panics on zero.
const MIN_PERIOD: Duration = Duration::from_secs(1);

/// Builds the sinks for one cycle from the current subscription snapshot.
pub type SinkBuilder = Box<dyn Fn(&Subscriptions) -> Vec<Arc<dyn SignalSink>> + Send + Sync>;

/// Cloneable handle passed to other crates (Telegram, API).
#[derive(Clone)]
pub struct EngineHandle {
    command_tx: mpsc::Sender<EngineCommand>,
    state: Arc<RwLock<EngineState>>,
    last_cycle: Arc<RwLock<Option<CycleSummary>>>,
}

impl EngineHandle {
    pub async fn send(&self, cmd: EngineCommand) {
        let _ = self.command_tx.send(cmd).await;
    }

    pub async fn state(&self) -> EngineState {
        *self.state.read().await
    }

    pub async fn last_cycle(&self) -> Option<CycleSummary> {
        self.last_cycle.read().await.clone()
    }
}

/// The scheduler: runs a cycle every period and on demand.
pub struct Engine {
    driver: CycleDriver,
    store: Arc<dyn SubscriptionStore>,
    period: Duration,
    first_delay: Duration,
    state: Arc<RwLock<EngineState>>,
    last_cycle: Arc<RwLock<Option<CycleSummary>>>,
    command_rx: mpsc::Receiver<EngineCommand>,
    #[allow(dead_code)] // kept to prevent channel close
    command_tx: mpsc::Sender<EngineCommand>,
    shutdown: watch::Receiver<bool>,
    sink_builder: SinkBuilder,
}

impl Engine {
    pub fn new(
        driver: CycleDriver,
        store: Arc<dyn SubscriptionStore>,
        period: Duration,
        shutdown: watch::Receiver<bool>,
    ) -> (Self, EngineHandle) {
        if period < MIN_PERIOD {
            warn!(
                requested_ms = period.as_millis() as u64,
                "Scheduler period too short, using {}s",
                MIN_PERIOD.as_secs()
            );
        }
        let period = period.max(MIN_PERIOD);

        let (command_tx, command_rx) = mpsc::channel(32);
        let state = Arc::new(RwLock::new(EngineState::Stopped));
        let last_cycle = Arc::new(RwLock::new(None));

        let handle = EngineHandle {
            command_tx: command_tx.clone(),
            state: state.clone(),
            last_cycle: last_cycle.clone(),
        };

        let engine = Engine {
            driver,
            store,
            period,
            first_delay: Duration::ZERO,
            state,
            last_cycle,
            command_rx,
            command_tx,
            shutdown,
            sink_builder: Box::new(|_| Vec::new()),
        };

        (engine, handle)
    }

    /// Delay before the first scheduled cycle.
    pub fn set_first_delay(&mut self, delay: Duration) {
        self.first_delay = delay;
    }

    /// Hook called at the start of every cycle to build its sinks.
    pub fn on_cycle_sinks<F>(&mut self, f: F)
    where
        F: Fn(&Subscriptions) -> Vec<Arc<dyn SignalSink>> + Send + Sync + 'static,
    {
        self.sink_builder = Box::new(f);
    }

    /// Run until shutdown is signalled. Call from `tokio::spawn`.
    pub async fn run(mut self) {
        info!(
            period_secs = self.period.as_secs(),
            first_delay_secs = self.first_delay.as_secs(),
            strategy = self.driver.strategy().name(),
            "Scheduler started"
        );
        *self.state.write().await = EngineState::Running;

        let mut ticker = tokio::time::interval_at(Instant::now() + self.first_delay, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            if *self.shutdown.borrow() {
                break;
            }

            tokio::select! {
                _ = ticker.tick() => {
                    if *self.state.read().await == EngineState::Running {
                        self.run_cycle().await;
                    } else {
                        debug!("Engine paused — skipping scheduled check");
                    }
                }

                cmd = self.command_rx.recv() => match cmd {
                    Some(EngineCommand::CheckNow) => {
                        info!("Manual check requested");
                        self.run_cycle().await;
                    }

                    Some(EngineCommand::Pause) => {
                        let current = *self.state.read().await;
                        if current == EngineState::Running {
                            info!("Engine paused — scheduled checks suppressed");
                            *self.state.write().await = EngineState::Paused;
                        }
                    }

                    Some(EngineCommand::Resume) => {
                        let current = *self.state.read().await;
                        if current == EngineState::Paused {
                            info!("Engine resumed");
                            *self.state.write().await = EngineState::Running;
                        }
                    }

                    None => {
                        warn!("Engine command channel closed — shutting down");
                        break;
                    }
                },

                changed = self.shutdown.changed() => {
                    if changed.is_err() {
                        warn!("Shutdown channel dropped — stopping scheduler");
                        break;
                    }
                }
            }
        }

        *self.state.write().await = EngineState::Stopped;
        info!("Scheduler stopped");
    }

    async fn run_cycle(&mut self) {
        let subs = match self.store.snapshot().await {
            Ok(subs) => subs,
            Err(e) => {
                warn!(error = %e, "Could not load subscriptions — skipping cycle");
                return;
            }
        };

        if subs.chats.is_empty() {
            debug!("No subscribers — skipping cycle");
            return;
        }

        let sinks = (self.sink_builder)(&subs);
        let report = self
            .driver
            .run(&subs.pairs, subs.interval, &sinks, &self.shutdown)
            .await;
        *self.last_cycle.write().await = Some(report.summary());
    }
}
