use std::sync::Arc;

use teloxide::{dispatching::UpdateHandler, prelude::*, utils::command::BotCommands};
use tracing::{info, warn};

use chrono::Utc;
use common::{EngineCommand, SubscriptionStore};
use engine::EngineHandle;

use crate::format::{format_status, format_test_alert, parse_pairs, StatusView};

type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Dependencies injected into every handler via `dptree`.
#[derive(Clone)]
pub struct BotDeps {
    pub engine: EngineHandle,
    pub store: Arc<dyn SubscriptionStore>,
    /// Chats allowed to change settings. Empty means everyone.
    pub admin_chat_ids: Arc<Vec<i64>>,
    pub strategy_name: String,
    pub interval_minutes: u64,
}

impl BotDeps {
    pub fn is_admin(&self, chat_id: i64) -> bool {
        is_authorized(&self.admin_chat_ids, chat_id)
    }
}

pub fn is_authorized(admins: &[i64], chat_id: i64) -> bool {
    admins.is_empty() || admins.contains(&chat_id)
}

/// Telegram bot commands.
#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase", description = "FX signal bot commands:")]
pub enum Command {
    #[command(description = "Show this help")]
    Start,
    #[command(description = "Show this help")]
    Help,
    #[command(description = "Receive alerts in this chat")]
    Subscribe,
    #[command(description = "Stop receiving alerts")]
    Unsubscribe,
    #[command(description = "Show or replace tracked pairs, e.g. /pairs EURUSD GBPUSD")]
    Pairs(String),
    #[command(description = "Show engine status and last check")]
    Status,
    #[command(description = "Send a test alert to all subscribers")]
    Test,
    #[command(description = "Run a check now")]
    Check,
    #[command(description = "Suspend scheduled checks")]
    Pause,
    #[command(description = "Resume scheduled checks")]
    Resume,
}

/// Start the Telegram bot in long-polling mode.
pub async fn start_bot(bot: Bot, deps: BotDeps) {
    let deps = Arc::new(deps);

    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        warn!(error = %e, "Failed to register bot command menu");
    }

    info!("Telegram bot starting (long-polling)");

    Dispatcher::builder(bot, schema())
        .dependencies(dptree::deps![deps])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}

fn schema() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync>> {
    use dptree::case;

    let admin_only = dptree::filter_async(admin_filter)
        .branch(case![Command::Subscribe].endpoint(handle_subscribe))
        .branch(case![Command::Test].endpoint(handle_test))
        .branch(case![Command::Check].endpoint(handle_check))
        .branch(case![Command::Pause].endpoint(handle_pause))
        .branch(case![Command::Resume].endpoint(handle_resume));

    let command_handler = teloxide::filter_command::<Command, _>()
        .branch(case![Command::Start].endpoint(handle_help))
        .branch(case![Command::Help].endpoint(handle_help))
        .branch(case![Command::Unsubscribe].endpoint(handle_unsubscribe))
        .branch(case![Command::Pairs(args)].endpoint(handle_pairs))
        .branch(case![Command::Status].endpoint(handle_status))
        .branch(admin_only)
        .branch(dptree::endpoint(handle_denied));

    Update::filter_message().branch(command_handler)
}

/// Admin-only commands fall through to `handle_denied` for everyone else.
async fn admin_filter(msg: Message, deps: Arc<BotDeps>) -> bool {
    let chat_id = msg.chat.id.0;
    let allowed = deps.is_admin(chat_id);
    if !allowed {
        warn!(chat_id, "Unauthorized Telegram command attempt");
    }
    allowed
}

async fn handle_denied(bot: Bot, msg: Message) -> HandlerResult {
    bot.send_message(msg.chat.id, "Not authorized.").await?;
    Ok(())
}

async fn handle_help(bot: Bot, msg: Message) -> HandlerResult {
    bot.send_message(msg.chat.id, Command::descriptions().to_string())
        .await?;
    Ok(())
}

async fn handle_subscribe(bot: Bot, msg: Message, deps: Arc<BotDeps>) -> HandlerResult {
    let chat_id = msg.chat.id.0;
    let text = match deps.store.add_chat(chat_id).await {
        Ok(true) => {
            info!(chat_id, "Chat subscribed");
            "Subscribed. Alerts will arrive in this chat."
        }
        Ok(false) => "This chat is already subscribed.",
        Err(e) => {
            warn!(chat_id, error = %e, "Subscribe failed");
            "Could not save the subscription, try again later."
        }
    };
    bot.send_message(msg.chat.id, text).await?;
    Ok(())
}

async fn handle_unsubscribe(bot: Bot, msg: Message, deps: Arc<BotDeps>) -> HandlerResult {
    let chat_id = msg.chat.id.0;
    let text = match deps.store.remove_chat(chat_id).await {
        Ok(true) => {
            info!(chat_id, "Chat unsubscribed");
            "Unsubscribed."
        }
        Ok(false) => "This chat was not subscribed.",
        Err(e) => {
            warn!(chat_id, error = %e, "Unsubscribe failed");
            "Could not update the subscription, try again later."
        }
    };
    bot.send_message(msg.chat.id, text).await?;
    Ok(())
}

async fn handle_pairs(bot: Bot, msg: Message, args: String, deps: Arc<BotDeps>) -> HandlerResult {
    let requested = parse_pairs(&args);

    let text = if requested.is_empty() {
        match deps.store.snapshot().await {
            Ok(subs) => format!("Tracked pairs: {}", subs.pairs.join(", ")),
            Err(e) => format!("Could not load pairs: {e}"),
        }
    } else if !deps.is_admin(msg.chat.id.0) {
        "Not authorized.".to_string()
    } else {
        match deps.store.set_pairs(requested).await {
            Ok(pairs) => {
                info!(chat_id = msg.chat.id.0, pairs = ?pairs, "Tracked pairs updated");
                format!("Tracked pairs set to: {}", pairs.join(", "))
            }
            Err(e) => format!("Could not update pairs: {e}"),
        }
    };

    bot.send_message(msg.chat.id, text).await?;
    Ok(())
}

async fn handle_status(bot: Bot, msg: Message, deps: Arc<BotDeps>) -> HandlerResult {
    let subs = match deps.store.snapshot().await {
        Ok(subs) => subs,
        Err(e) => {
            bot.send_message(msg.chat.id, format!("Could not load subscriptions: {e}"))
                .await?;
            return Ok(());
        }
    };
    let last_cycle = deps.engine.last_cycle().await;

    let text = format_status(&StatusView {
        state: deps.engine.state().await,
        strategy: &deps.strategy_name,
        interval_minutes: deps.interval_minutes,
        subs: &subs,
        last_cycle: last_cycle.as_ref(),
        chat_id: msg.chat.id.0,
    });
    bot.send_message(msg.chat.id, text).await?;
    Ok(())
}

async fn handle_test(bot: Bot, msg: Message, deps: Arc<BotDeps>) -> HandlerResult {
    let subs = deps.store.snapshot().await?;
    if subs.chats.is_empty() {
        bot.send_message(msg.chat.id, "No subscribers to send a test alert to.")
            .await?;
        return Ok(());
    }

    let text = format_test_alert(Utc::now());
    let mut delivered = 0;
    for &chat in &subs.chats {
        match bot.send_message(ChatId(chat), text.clone()).await {
            Ok(_) => delivered += 1,
            Err(e) => warn!(chat_id = chat, error = %e, "Test alert failed"),
        }
    }

    bot.send_message(
        msg.chat.id,
        format!("Test alert delivered to {delivered} of {} chats.", subs.chats.len()),
    )
    .await?;
    Ok(())
}

async fn handle_check(bot: Bot, msg: Message, deps: Arc<BotDeps>) -> HandlerResult {
    deps.engine.send(EngineCommand::CheckNow).await;
    bot.send_message(msg.chat.id, "Check started. Alerts, if any, follow shortly.")
        .await?;
    Ok(())
}

async fn handle_pause(bot: Bot, msg: Message, deps: Arc<BotDeps>) -> HandlerResult {
    deps.engine.send(EngineCommand::Pause).await;
    bot.send_message(msg.chat.id, "Scheduled checks paused.").await?;
    Ok(())
}

async fn handle_resume(bot: Bot, msg: Message, deps: Arc<BotDeps>) -> HandlerResult {
    deps.engine.send(EngineCommand::Resume).await;
    bot.send_message(msg.chat.id, "Scheduled checks resumed.").await?;
    Ok(())
}
