use std::sync::Arc;

use anyhow::Context;
use teloxide::{types::ChatId, Bot};
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use api::{AlertLog, AppState};
use common::{Config, SignalSink, SubscriptionStore};
use engine::{AlphaVantageClient, CycleDriver, Engine, RetryPolicy, Retrying};
use store::JsonFileStore;
use strategy::{build_strategy, StrategyConfig, StrategyFileConfig};
use telegram_ctrl::{start_bot, BotDeps, TelegramSink};

const ALERT_LOG_CAPACITY: usize = 500;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── Logging ──────────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // ── Config ────────────────────────────────────────────────────────────────
    let cfg = Config::from_env();
    info!(
        interval_minutes = cfg.interval_minutes,
        admins = cfg.admin_chat_ids.len(),
        dashboard = cfg.dashboard.is_some(),
        "FX signal bot starting"
    );

    // ── Strategy ──────────────────────────────────────────────────────────────
    let strategy_cfg = match &cfg.strategy_config_path {
        Some(path) => {
            StrategyFileConfig::load(path)
                .with_context(|| format!("loading strategy config from {path}"))?
                .strategy
        }
        None => StrategyConfig::default(),
    };
    let strategy = build_strategy(&strategy_cfg.with_rsi_overrides(cfg.rsi_low, cfg.rsi_high))
        .context("building strategy")?;
    let strategy_name = strategy.name().to_string();

    // ── Subscriptions ─────────────────────────────────────────────────────────
    let store: Arc<dyn SubscriptionStore> = Arc::new(JsonFileStore::new(&cfg.subscriptions_path));
    let subs = store.snapshot().await.context("reading subscriptions")?;
    info!(pairs = ?subs.pairs, chats = subs.chats.len(), interval = %subs.interval, "Subscriptions loaded");

    // ── Price provider ────────────────────────────────────────────────────────
    let client = AlphaVantageClient::new(
        cfg.alphavantage_api_key.clone(),
        cfg.output_size,
        cfg.fetch_timeout,
    )
    .context("building Alpha Vantage client")?;
    let provider = Retrying::new(client, RetryPolicy::with_max_attempts(cfg.fetch_max_retries));

    // ── Engine ────────────────────────────────────────────────────────────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let driver = CycleDriver::new(Arc::new(provider), strategy)
        .with_concurrency(cfg.cycle_concurrency);
    let (mut engine, engine_handle) =
        Engine::new(driver, store.clone(), cfg.check_period(), shutdown_rx.clone());
    engine.set_first_delay(cfg.first_check_delay);

    let bot = Bot::new(cfg.telegram_token.clone());
    let alert_log = Arc::new(AlertLog::new(ALERT_LOG_CAPACITY));
    {
        let bot = bot.clone();
        let alert_log = alert_log.clone();
        engine.on_cycle_sinks(move |subs| {
            let mut sinks: Vec<Arc<dyn SignalSink>> = subs
                .chats
                .iter()
                .map(|&chat| Arc::new(TelegramSink::new(bot.clone(), ChatId(chat))) as Arc<dyn SignalSink>)
                .collect();
            sinks.push(alert_log.clone());
            sinks
        });
    }

    // ── Telegram ──────────────────────────────────────────────────────────────
    let bot_deps = BotDeps {
        engine: engine_handle.clone(),
        store: store.clone(),
        admin_chat_ids: Arc::new(cfg.admin_chat_ids.clone()),
        strategy_name: strategy_name.clone(),
        interval_minutes: cfg.interval_minutes,
    };

    // ── Spawn all tasks ───────────────────────────────────────────────────────
    let engine_task = tokio::spawn(engine.run());
    tokio::spawn(start_bot(bot, bot_deps));

    if let Some(dashboard) = &cfg.dashboard {
        let api_state = AppState {
            engine: engine_handle.clone(),
            store: store.clone(),
            alerts: alert_log.clone(),
            strategy_name: strategy_name.clone(),
            dashboard_token: dashboard.token.clone(),
        };
        let port = dashboard.port;
        let shutdown = shutdown_rx.clone();
        tokio::spawn(async move {
            if let Err(e) = api::serve(api_state, port, shutdown).await {
                error!(error = %e, "Dashboard API failed");
            }
        });
    } else {
        info!("DASHBOARD_TOKEN not set — dashboard API disabled");
    }

    info!(strategy = %strategy_name, "All subsystems started. Waiting for shutdown signal.");
    tokio::signal::ctrl_c()
        .await
        .context("listening for shutdown signal")?;

    info!("Shutdown signal received. Stopping scheduler.");
    let _ = shutdown_tx.send(true);
    engine_task.await.context("scheduler task panicked")?;
    info!("Exiting.");
    Ok(())
}
