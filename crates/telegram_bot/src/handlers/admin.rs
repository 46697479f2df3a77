//! Handler for the `/admin` command

use teloxide::{prelude::*, types::ChatId};

use crate::{ConfigParameters, notifications::deliver, ui::Reply};

/// Users active within this many hours count as active in the health report.
const ACTIVE_WINDOW_HOURS: i64 = 24;

fn usage() -> Reply {
    Reply::text(
        "Usage help for /admin:\n\n\
         /admin health - Show usage statistics\n\
         /admin notify <message> - Send a message to every user",
    )
}

pub(crate) async fn admin_reply(
    bot: &Bot,
    cfg: &ConfigParameters,
    chat_id: ChatId,
    args: &str,
) -> Reply {
    if !is_admin(cfg, chat_id).await {
        tracing::warn!("Chat {chat_id} tried to use an admin command");
        return Reply::text("This command is only available to administrators.");
    }

    let args = args.trim();
    let (name, rest) = args
        .split_once(char::is_whitespace)
        .map_or((args, ""), |(name, rest)| (name, rest.trim()));

    match name.to_ascii_lowercase().as_str() {
        "health" if rest.is_empty() => health_reply(cfg).await,
        "notify" if !rest.is_empty() => {
            let (sent, failed) = broadcast(bot, cfg, rest).await;
            Reply::text(format!(
                "Message sent to {sent} user(s), {failed} failed."
            ))
        }
        _ => usage(),
    }
}

/// Configured admins are always admins, everybody else needs the stored flag.
async fn is_admin(cfg: &ConfigParameters, chat_id: ChatId) -> bool {
    if cfg.admins.contains(&chat_id.0) {
        if let Err(err) = cfg.engine.user_set_admin(chat_id.0, true).await {
            tracing::warn!("Could not flag chat {chat_id} as admin: {err}");
        }
        return true;
    }
    cfg.engine
        .user_is_admin(chat_id.0)
        .await
        .unwrap_or_else(|err| {
            tracing::error!("Could not read admin flag of chat {chat_id}: {err}");
            false
        })
}

async fn health_reply(cfg: &ConfigParameters) -> Reply {
    let engine = &cfg.engine;
    let report = async {
        let users = engine.health_user_count().await?;
        let active = engine.health_active_user_count(ACTIVE_WINDOW_HOURS).await?;
        let (open, archived) = engine.health_transaction_counts().await?;
        let cache = engine.health_cache_stats().await?;
        Ok::<_, engine::EngineError>(format!(
            "Health report\n\n\
             Users: {users} ({active} active in the last {ACTIVE_WINDOW_HOURS} hours)\n\
             Transactions: {open} open, {archived} archived\n\
             Suggestions: {} from, {} to, {} description, {} other",
            cache.account_from, cache.account_to, cache.description, cache.other
        ))
    };

    match report.await {
        Ok(text) => Reply::text(text),
        Err(err) => {
            tracing::error!("Could not build health report: {err}");
            Reply::text(format!("Could not build the health report: {err}"))
        }
    }
}

/// Send `message` to every known chat. Returns `(sent, failed)`.
async fn broadcast(bot: &Bot, cfg: &ConfigParameters, message: &str) -> (usize, usize) {
    let chats = match cfg.engine.all_chat_ids().await {
        Ok(chats) => chats,
        Err(err) => {
            tracing::error!("Could not load chats for broadcast: {err}");
            return (0, 0);
        }
    };
    tracing::info!("Broadcasting admin message to {} chat(s)", chats.len());

    let mut sent = 0;
    for chat in &chats {
        if deliver(bot, &cfg.engine, ChatId(*chat), message).await {
            sent += 1;
        }
    }
    (sent, chats.len() - sent)
}
