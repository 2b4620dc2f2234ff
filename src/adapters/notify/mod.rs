//! Alert Notifier Adapters
//!
//! - `TelegramNotifier`: Telegram Bot API delivery
//! - `LogNotifier`: structured-log sink for dry runs

pub mod format;
pub mod log;
pub mod telegram;

pub use log::LogNotifier;
pub use telegram::{TelegramCredentials, TelegramNotifier};
