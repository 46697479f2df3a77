//! Hourly reminders about open transactions.

use std::time::Duration;

use chrono::{DateTime, TimeZone, Timelike, Utc};
use engine::Engine;
use teloxide::{ApiError, RequestError, prelude::*};

use crate::ConfigParameters;

pub(crate) async fn run(bot: Bot, cfg: ConfigParameters) {
    tracing::info!("Starting notification loop ({})", cfg.timezone);

    loop {
        tokio::time::sleep(until_next_hour(Utc::now().with_timezone(&cfg.timezone))).await;

        let now = Utc::now();
        let hour = now.with_timezone(&cfg.timezone).hour() as i32;
        send_reminders(&bot, &cfg, hour, now).await;
    }
}

/// Time left until the next full hour, rounded up to the second.
fn until_next_hour<Tz: TimeZone>(now: DateTime<Tz>) -> Duration {
    let elapsed = u64::from(now.minute() * 60 + now.second());
    Duration::from_secs(3600 - elapsed)
}

async fn send_reminders(bot: &Bot, cfg: &ConfigParameters, hour: i32, now: DateTime<Utc>) {
    let chats = match cfg
        .engine
        .individuals_with_notifications(None, hour, now)
        .await
    {
        Ok(chats) => chats,
        Err(err) => {
            tracing::error!("Could not load notification schedules: {err}");
            return;
        }
    };
    tracing::debug!("{} chat(s) due for a reminder at hour {hour}", chats.len());

    for chat in chats {
        let open = match cfg.engine.open_transaction_count(chat).await {
            Ok(open) => open,
            Err(err) => {
                tracing::error!("Could not count open transactions of chat {chat}: {err}");
                continue;
            }
        };
        deliver(bot, &cfg.engine, ChatId(chat), &reminder_text(open)).await;
    }
}

fn reminder_text(open: u64) -> String {
    format!(
        "This is your reminder to inform you that you currently have {open} open transaction{}. \
         Check /list to see them or /archiveAll once you have copied them to your ledger.",
        if open == 1 { "" } else { "s" }
    )
}

/// Send `text` to a chat, logging failures. A chat that blocked the bot is
/// removed with all its data. Returns whether the message was delivered.
pub(crate) async fn deliver(bot: &Bot, engine: &Engine, chat_id: ChatId, text: &str) -> bool {
    match bot.send_message(chat_id, text).await {
        Ok(_) => true,
        Err(RequestError::Api(ApiError::BotBlocked)) => {
            tracing::info!("Chat {chat_id} blocked the bot, deleting its data");
            if let Err(err) = engine.delete_user(chat_id.0).await {
                tracing::error!("Could not delete data of chat {chat_id}: {err}");
            }
            false
        }
        Err(err) => {
            tracing::warn!("Sending bot message failed: {err}");
            false
        }
    }
}
