use chrono::{NaiveDate, Utc};
use engine::Transaction;
use teloxide::{prelude::*, types::User};

use crate::{
    ConfigParameters,
    commands::{Command, params},
    transaction::{SimpleTx, TxField},
    ui::{self, Reply},
};

mod admin;
mod config;
mod suggestions;

const GENERIC_FAILURE: &str = "Sorry, something went wrong on my side. Please try again later.";

pub(crate) async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    cfg: ConfigParameters,
) -> ResponseResult<()> {
    let Some(chat_id) = prepare(&bot, &msg, &cfg).await? else {
        return Ok(());
    };
    tracing::debug!("Command from chat {chat_id}: {cmd:?}");

    let replies = match cmd {
        Command::Help => vec![Reply::text(ui::help_text())],
        Command::Start => vec![Reply::text(ui::welcome_text())],
        Command::Cancel => vec![cancel_reply(&cfg, chat_id).await],
        Command::Simple(args) => vec![start_draft(&cfg, chat_id, &args).await],
        Command::List(args) => list_replies(&cfg, chat_id, &args).await,
        Command::ArchiveAll => vec![archive_reply(&cfg, chat_id).await],
        Command::DeleteAll(args) => vec![delete_reply(&cfg, chat_id, &args).await],
        Command::Suggestions(args) => {
            vec![suggestions::suggestions_reply(&cfg, chat_id, &args).await]
        }
        Command::Config(args) => vec![config::config_reply(&cfg, chat_id, &args).await],
        Command::Admin(args) => vec![admin::admin_reply(&bot, &cfg, chat_id, &args).await],
    };

    for reply in replies {
        send_reply(&bot, chat_id, reply).await?;
    }
    Ok(())
}

/// Everything that is not a known command: input for the current draft.
pub(crate) async fn handle_message(
    bot: Bot,
    msg: Message,
    cfg: ConfigParameters,
) -> ResponseResult<()> {
    let Some(chat_id) = prepare(&bot, &msg, &cfg).await? else {
        return Ok(());
    };
    let Some(text) = msg.text() else {
        return Ok(());
    };

    let reply = if text.trim_start().starts_with('/') {
        Reply::text("Unknown command or invalid parameters, see /help.")
    } else {
        draft_input(&cfg, chat_id, text).await
    };
    send_reply(&bot, chat_id, reply).await
}

fn is_allowed(cfg: &ConfigParameters, from: Option<&User>) -> bool {
    match (&cfg.allowed_users, from) {
        (None, _) => true,
        (Some(allowed), Some(user)) => allowed.contains(&user.id),
        (Some(_), None) => false,
    }
}

/// Filter senders and keep the user row current. Returns the chat to answer
/// to, `None` when the message must be ignored.
async fn prepare(bot: &Bot, msg: &Message, cfg: &ConfigParameters) -> ResponseResult<Option<ChatId>> {
    if !is_allowed(cfg, msg.from.as_ref()) {
        tracing::debug!("Ignoring message from chat {}", msg.chat.id);
        return Ok(None);
    }
    let Some(from) = msg.from.as_ref() else {
        return Ok(None);
    };

    let chat_id = msg.chat.id;
    if let Err(err) = cfg
        .engine
        .enrich_user_data(chat_id.0, from.id.0, from.username.as_deref())
        .await
    {
        tracing::error!("Could not store user of chat {chat_id}: {err}");
        bot.send_message(chat_id, GENERIC_FAILURE).await?;
        return Ok(None);
    }
    Ok(Some(chat_id))
}

async fn send_reply(bot: &Bot, chat_id: ChatId, reply: Reply) -> ResponseResult<()> {
    let mut request = bot.send_message(chat_id, reply.text);
    if let Some(mode) = reply.parse_mode {
        request = request.parse_mode(mode);
    }
    if let Some(markup) = reply.markup {
        request = request.reply_markup(markup);
    }
    request.await?;
    Ok(())
}

async fn cancel_reply(cfg: &ConfigParameters, chat_id: ChatId) -> Reply {
    if cfg.state.clear(chat_id).await {
        Reply::text("Cancelled the transaction you were entering.").remove_keyboard()
    } else {
        Reply::text("There is no transaction to cancel.").remove_keyboard()
    }
}

async fn start_draft(cfg: &ConfigParameters, chat_id: ChatId, args: &str) -> Reply {
    let date = match params(args).as_slice() {
        [] => None,
        [date] => match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
            Ok(date) => Some(date),
            Err(_) => {
                return Reply::text(format!(
                    "'{date}' is not a valid date, use the format YYYY-MM-DD, e.g. /simple 2024-05-01"
                ));
            }
        },
        _ => return Reply::text("Usage: /simple [YYYY-MM-DD]"),
    };

    cfg.state.simple_tx(chat_id, date).await;
    prompt(cfg, chat_id, TxField::Amount, None).await
}

/// Feed `text` to the chat's draft, starting one if there is none.
async fn draft_input(cfg: &ConfigParameters, chat_id: ChatId, text: &str) -> Reply {
    let existing = cfg.state.get_tx(chat_id).await;
    let started = existing.is_none();
    let mut tx = existing.unwrap_or_default();

    if let Err(err) = tx.fill(text) {
        if started {
            return Reply::text(format!(
                "{err}\n\nSend an amount like 12.50 to record a new transaction, or see /help."
            ));
        }
        let field = tx.next_field().unwrap_or(TxField::Description);
        return prompt(cfg, chat_id, field, Some(err.to_string())).await;
    }

    match tx.next_field() {
        Some(field) => {
            cfg.state.put_tx(chat_id, tx).await;
            prompt(cfg, chat_id, field, None).await
        }
        None => commit(cfg, chat_id, &tx).await,
    }
}

/// Ask for `field`, offering the cached suggestions for it as a keyboard.
async fn prompt(
    cfg: &ConfigParameters,
    chat_id: ChatId,
    field: TxField,
    error: Option<String>,
) -> Reply {
    let suggestions = match field.suggestion_kind() {
        Some(kind) => cfg
            .engine
            .get_suggestions(chat_id.0, kind)
            .await
            .unwrap_or_else(|err| {
                tracing::warn!("Could not load suggestions for chat {chat_id}: {err}");
                Vec::new()
            }),
        None => Vec::new(),
    };

    let text = match error {
        Some(error) => format!("{error}\n\n{}", ui::field_prompt(field)),
        None => ui::field_prompt(field).to_string(),
    };
    match ui::suggestions_keyboard(&suggestions) {
        Some(keyboard) => Reply::text(text).markup(keyboard),
        None => Reply::text(text).remove_keyboard(),
    }
}

/// Render the complete draft with the user's preferences and store it.
async fn commit(cfg: &ConfigParameters, chat_id: ChatId, tx: &SimpleTx) -> Reply {
    cfg.state.clear(chat_id).await;

    let preferences = async {
        let currency = cfg.engine.user_get_currency(chat_id.0).await?;
        let tag = cfg.engine.user_get_tag(chat_id.0).await?;
        Ok::<_, engine::EngineError>((currency, tag))
    };
    let (currency, tag) = match preferences.await {
        Ok(preferences) => preferences,
        Err(err) => {
            tracing::error!("Could not read preferences of chat {chat_id}: {err}");
            return Reply::text(GENERIC_FAILURE).remove_keyboard();
        }
    };

    let today = Utc::now().with_timezone(&cfg.timezone).date_naive();
    let body = match tx.render(&currency, tag.as_deref(), today) {
        Ok(body) => body,
        Err(err) => return Reply::text(err.to_string()).remove_keyboard(),
    };

    if let Err(err) = cfg.engine.record_transaction(chat_id.0, &body).await {
        tracing::error!("Could not record transaction of chat {chat_id}: {err}");
        return Reply::text(format!("Sorry, your transaction could not be saved: {err}"))
            .remove_keyboard();
    }

    let used = [
        (TxField::From, tx.from_account()),
        (TxField::To, tx.to_account()),
        (TxField::Description, tx.description()),
    ];
    for (field, value) in used {
        let (Some(kind), Some(value)) = (field.suggestion_kind(), value) else {
            continue;
        };
        if let Err(err) = cfg
            .engine
            .put_suggestion(chat_id.0, kind, value, cfg.suggestion_limit)
            .await
        {
            tracing::warn!("Could not cache {kind} suggestion for chat {chat_id}: {err}");
        }
    }

    Reply::text(format!(
        "Successfully recorded your transaction.\n\n{body}\n\
         Use /list to see all open transactions and /archiveAll once you have copied them \
         to your ledger."
    ))
    .remove_keyboard()
}

async fn list_replies(cfg: &ConfigParameters, chat_id: ChatId, args: &str) -> Vec<Reply> {
    let mut archived = false;
    let mut dated = false;
    for param in params(args) {
        match param.to_ascii_lowercase().as_str() {
            "archived" => archived = true,
            "dated" => dated = true,
            _ => return vec![Reply::text("Usage: /list [archived] [dated]")],
        }
    }

    let txs = match cfg.engine.list_transactions(chat_id.0, archived).await {
        Ok(txs) => txs,
        Err(err) => {
            tracing::error!("Could not list transactions of chat {chat_id}: {err}");
            return vec![Reply::text(GENERIC_FAILURE)];
        }
    };
    if txs.is_empty() {
        let which = if archived { "archived" } else { "open" };
        return vec![Reply::text(format!("You have no {which} transactions."))];
    }

    let entries = txs
        .iter()
        .map(|tx| list_entry(cfg, tx, dated))
        .collect::<Vec<_>>();
    ui::chunk_messages(&entries, "\n\n")
        .into_iter()
        .map(Reply::text)
        .collect()
}

fn list_entry(cfg: &ConfigParameters, tx: &Transaction, dated: bool) -> String {
    if dated {
        let recorded = tx.created_at.with_timezone(&cfg.timezone);
        format!("; recorded {}\n{}", recorded.format("%Y-%m-%d %H:%M"), tx.body)
    } else {
        tx.body.clone()
    }
}

async fn archive_reply(cfg: &ConfigParameters, chat_id: ChatId) -> Reply {
    match cfg.engine.archive_all(chat_id.0).await {
        Ok(0) => Reply::text("There are no open transactions to archive."),
        Ok(n) => Reply::text(format!(
            "Archived {n} transaction{}. New transactions will show up in /list again.",
            if n == 1 { "" } else { "s" }
        )),
        Err(err) => {
            tracing::error!("Could not archive transactions of chat {chat_id}: {err}");
            Reply::text(GENERIC_FAILURE)
        }
    }
}

async fn delete_reply(cfg: &ConfigParameters, chat_id: ChatId, args: &str) -> Reply {
    let confirmed = matches!(params(args).as_slice(), [yes] if yes.eq_ignore_ascii_case("yes"));
    if !confirmed {
        return Reply::text(
            "This permanently deletes all your transactions, open and archived. \
             To confirm send: /deleteAll yes",
        );
    }

    match cfg.engine.delete_all(chat_id.0).await {
        Ok(n) => Reply::text(format!(
            "Deleted {n} transaction{}.",
            if n == 1 { "" } else { "s" }
        )),
        Err(err) => {
            tracing::error!("Could not delete transactions of chat {chat_id}: {err}");
            Reply::text(GENERIC_FAILURE)
        }
    }
}

#[cfg(test)]
mod tests {
    use engine::SuggestionKind;

    use super::*;
    use crate::test_support;

    const CHAT: ChatId = ChatId(42);

    async fn compose(cfg: &ConfigParameters, inputs: &[&str]) -> Reply {
        let mut last = None;
        for input in inputs {
            last = Some(draft_input(cfg, CHAT, input).await);
        }
        last.unwrap()
    }

    #[tokio::test]
    async fn full_draft_is_recorded() {
        let cfg = test_support::parameters_with_user(CHAT).await;

        let reply = compose(
            &cfg,
            &["12,50", "Assets:Wallet", "Expenses:Food", "Groceries"],
        )
        .await;
        assert!(reply.text.starts_with("Successfully recorded your transaction."));

        let txs = cfg.engine.list_transactions(CHAT.0, false).await.unwrap();
        assert_eq!(txs.len(), 1);
        assert!(txs[0].body.contains("* \"Groceries\"\n"));
        assert!(txs[0].body.contains("-12.50 EUR\n"));
        assert!(cfg.state.get_tx(CHAT).await.is_none());
        assert_eq!(
            cfg.engine
                .get_suggestions(CHAT.0, SuggestionKind::AccountTo)
                .await
                .unwrap(),
            vec!["Expenses:Food".to_string()]
        );
    }

    #[tokio::test]
    async fn preferences_are_applied() {
        let cfg = test_support::parameters_with_user(CHAT).await;
        cfg.engine.user_set_currency(CHAT.0, "usd").await.unwrap();
        cfg.engine
            .user_set_tag(CHAT.0, Some("trip"))
            .await
            .unwrap();

        start_draft(&cfg, CHAT, "2024-05-01").await;
        compose(&cfg, &["3", "Assets:Cash", "Expenses:Coffee", "Espresso"]).await;

        let txs = cfg.engine.list_transactions(CHAT.0, false).await.unwrap();
        assert!(txs[0].body.starts_with("2024-05-01 * \"Espresso\" #trip\n"));
        assert!(txs[0].body.contains("-3.00 USD"));
    }

    #[tokio::test]
    async fn invalid_input_keeps_the_draft() {
        let cfg = test_support::parameters_with_user(CHAT).await;

        let reply = draft_input(&cfg, CHAT, "lunch").await;
        assert!(reply.text.contains("Send an amount"));
        assert!(cfg.state.get_tx(CHAT).await.is_none());

        draft_input(&cfg, CHAT, "10").await;
        let reply = draft_input(&cfg, CHAT, "not an account").await;
        assert!(reply.text.starts_with("'not an account' is not a valid account"));
        assert_eq!(
            cfg.state.get_tx(CHAT).await.and_then(|tx| tx.next_field()),
            Some(TxField::From)
        );
    }

    #[tokio::test]
    async fn multiline_description_is_refused() {
        let cfg = test_support::parameters_with_user(CHAT).await;

        compose(&cfg, &["5", "Assets:Cash", "Expenses:Food"]).await;
        let reply = draft_input(&cfg, CHAT, "Lunch\n2024-01-01 open Assets:Other").await;
        assert!(reply.text.starts_with("the description must fit on a single line"));
        assert_eq!(
            cfg.state.get_tx(CHAT).await.and_then(|tx| tx.next_field()),
            Some(TxField::Description)
        );
        assert!(cfg.engine.list_transactions(CHAT.0, false).await.unwrap().is_empty());
        assert!(
            cfg.engine
                .get_suggestions(CHAT.0, SuggestionKind::Description)
                .await
                .unwrap()
                .is_empty()
        );

        let reply = draft_input(&cfg, CHAT, "Lunch").await;
        assert!(reply.text.starts_with("Successfully recorded your transaction."));
    }

    #[tokio::test]
    async fn prompts_offer_suggestions() {
        let cfg = test_support::parameters_with_user(CHAT).await;
        cfg.engine
            .put_suggestion(CHAT.0, SuggestionKind::AccountFrom, "Assets:Bank", 10)
            .await
            .unwrap();

        let reply = draft_input(&cfg, CHAT, "5").await;
        assert!(matches!(
            reply.markup,
            Some(teloxide::types::ReplyMarkup::Keyboard(_))
        ));
    }

    #[tokio::test]
    async fn simple_rejects_bad_dates() {
        let cfg = test_support::parameters_with_user(CHAT).await;

        let reply = start_draft(&cfg, CHAT, "01.05.2024").await;
        assert!(reply.text.starts_with("'01.05.2024' is not a valid date"));
        assert!(cfg.state.get_tx(CHAT).await.is_none());

        start_draft(&cfg, CHAT, "").await;
        assert!(cfg.state.get_tx(CHAT).await.is_some());
    }

    #[tokio::test]
    async fn cancel_clears_the_draft() {
        let cfg = test_support::parameters_with_user(CHAT).await;

        assert_eq!(
            cancel_reply(&cfg, CHAT).await.text,
            "There is no transaction to cancel."
        );
        draft_input(&cfg, CHAT, "5").await;
        assert_eq!(
            cancel_reply(&cfg, CHAT).await.text,
            "Cancelled the transaction you were entering."
        );
        assert!(cfg.state.get_tx(CHAT).await.is_none());
    }

    #[tokio::test]
    async fn list_archive_delete() {
        let cfg = test_support::parameters_with_user(CHAT).await;

        assert_eq!(
            list_replies(&cfg, CHAT, "").await[0].text,
            "You have no open transactions."
        );
        cfg.engine.record_transaction(CHAT.0, "first").await.unwrap();
        cfg.engine.record_transaction(CHAT.0, "second").await.unwrap();

        let replies = list_replies(&cfg, CHAT, "").await;
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].text, "first\n\nsecond");
        assert!(
            list_replies(&cfg, CHAT, "dated").await[0]
                .text
                .starts_with("; recorded ")
        );
        assert!(
            list_replies(&cfg, CHAT, "everything").await[0]
                .text
                .starts_with("Usage:")
        );

        assert!(archive_reply(&cfg, CHAT).await.text.starts_with("Archived 2 transactions."));
        assert_eq!(
            archive_reply(&cfg, CHAT).await.text,
            "There are no open transactions to archive."
        );
        assert_eq!(
            list_replies(&cfg, CHAT, "archived").await[0].text,
            "first\n\nsecond"
        );

        assert!(delete_reply(&cfg, CHAT, "").await.text.contains("/deleteAll yes"));
        assert_eq!(
            cfg.engine.list_transactions(CHAT.0, true).await.unwrap().len(),
            2
        );
        assert_eq!(delete_reply(&cfg, CHAT, "yes").await.text, "Deleted 2 transactions.");
        assert!(cfg.engine.list_transactions(CHAT.0, true).await.unwrap().is_empty());
    }
}
