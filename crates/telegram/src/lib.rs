pub mod commands;
pub mod format;
pub mod sink;

pub use commands::{start_bot, BotDeps, Command};
pub use format::{format_alert, format_test_alert};
pub use sink::TelegramSink;
