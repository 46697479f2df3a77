//! Handler for the `/suggestions` command

use engine::SuggestionKind;
use teloxide::types::ChatId;

use crate::{ConfigParameters, ui::Reply};

fn usage() -> Reply {
    Reply::text(
        "Usage help for /suggestions:\n\n\
         /suggestions list <type> - Show cached suggestions\n\
         /suggestions add <type> <value> - Add a suggestion\n\
         /suggestions rm <type> [value] - Remove one suggestion, or all of a type\n\n\
         <type> is one of: from, to, description",
    )
}

pub(crate) async fn suggestions_reply(
    cfg: &ConfigParameters,
    chat_id: ChatId,
    args: &str,
) -> Reply {
    let mut parts = args.split_whitespace();
    let (Some(action), Some(kind)) = (parts.next(), parts.next()) else {
        return usage();
    };
    let kind = match SuggestionKind::try_from(kind) {
        Ok(kind) => kind,
        Err(err) => return Reply::text(format!("{err}\n\n{}", usage().text)),
    };
    let value = parts.collect::<Vec<_>>().join(" ");

    match action.to_ascii_lowercase().as_str() {
        "list" if value.is_empty() => list(cfg, chat_id, kind).await,
        "add" if !value.is_empty() => {
            match cfg
                .engine
                .put_suggestion(chat_id.0, kind, &value, cfg.suggestion_limit)
                .await
            {
                Ok(()) => Reply::text(format!("Added '{value}' to the {kind} suggestions.")),
                Err(err) => Reply::text(format!("Could not add the suggestion: {err}")),
            }
        }
        "rm" => {
            let target = (!value.is_empty()).then_some(value.as_str());
            match cfg.engine.remove_suggestion(chat_id.0, kind, target).await {
                Ok(0) => Reply::text(format!("No matching {kind} suggestion found.")),
                Ok(n) => Reply::text(format!(
                    "Removed {n} {kind} suggestion{}.",
                    if n == 1 { "" } else { "s" }
                )),
                Err(err) => Reply::text(format!("Could not remove the suggestions: {err}")),
            }
        }
        _ => usage(),
    }
}

async fn list(cfg: &ConfigParameters, chat_id: ChatId, kind: SuggestionKind) -> Reply {
    match cfg.engine.get_suggestions(chat_id.0, kind).await {
        Ok(values) if values.is_empty() => {
            Reply::text(format!("There are no {kind} suggestions yet."))
        }
        Ok(values) => Reply::text(format!(
            "Your {kind} suggestions, most recent first:\n\n{}",
            values.join("\n")
        )),
        Err(err) => {
            tracing::error!("Could not read suggestions of chat {chat_id}: {err}");
            Reply::text("Sorry, the suggestions could not be loaded.")
        }
    }
}
