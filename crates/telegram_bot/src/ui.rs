use teloxide::{
    types::{KeyboardButton, KeyboardMarkup, KeyboardRemove, ParseMode, ReplyMarkup},
    utils::command::BotCommands,
};

use crate::{commands::Command, transaction::TxField};

/// Telegram rejects messages longer than this.
pub(crate) const MAX_MESSAGE_LEN: usize = 4096;

/// A text answer ready to be sent.
#[derive(Clone, Debug)]
pub(crate) struct Reply {
    pub text: String,
    pub parse_mode: Option<ParseMode>,
    pub markup: Option<ReplyMarkup>,
}

impl Reply {
    pub(crate) fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            parse_mode: None,
            markup: None,
        }
    }

    pub(crate) fn markdown(text: impl Into<String>) -> Self {
        Self {
            parse_mode: Some(ParseMode::MarkdownV2),
            ..Self::text(text)
        }
    }

    pub(crate) fn markup(mut self, markup: impl Into<ReplyMarkup>) -> Self {
        self.markup = Some(markup.into());
        self
    }

    /// Drop the suggestion keyboard left over from a transaction prompt.
    pub(crate) fn remove_keyboard(self) -> Self {
        self.markup(KeyboardRemove::new())
    }
}

/// One suggestion per row, most recent first.
pub(crate) fn suggestions_keyboard(suggestions: &[String]) -> Option<KeyboardMarkup> {
    if suggestions.is_empty() {
        return None;
    }
    let rows = suggestions
        .iter()
        .map(|s| vec![KeyboardButton::new(s.clone())])
        .collect::<Vec<_>>();
    Some(KeyboardMarkup::new(rows).resize_keyboard().one_time_keyboard())
}

pub(crate) fn field_prompt(field: TxField) -> &'static str {
    match field {
        TxField::Amount => "How much was it? Send an amount like 12.50 or 12.50 USD.",
        TxField::From => {
            "Which account did the money come from? E.g. Assets:Wallet (or pick one below)."
        }
        TxField::To => "Which account did the money go to? E.g. Expenses:Food (or pick one below).",
        TxField::Description => "Please enter a description (or pick one below).",
    }
}

pub(crate) fn welcome_text() -> String {
    format!(
        "Welcome! Send me an amount to start recording a transaction, \
         I will ask for the accounts and a description.\n\n{}",
        help_text()
    )
}

pub(crate) fn help_text() -> String {
    Command::descriptions().to_string()
}

/// Split `entries` into messages below Telegram's size limit without cutting
/// an entry in half. An entry longer than the limit is sent alone, truncated.
pub(crate) fn chunk_messages(entries: &[String], separator: &str) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for entry in entries {
        let entry = truncate(entry, MAX_MESSAGE_LEN);
        let extra = if current.is_empty() {
            entry.len()
        } else {
            separator.len() + entry.len()
        };
        if !current.is_empty() && current.len() + extra > MAX_MESSAGE_LEN {
            chunks.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push_str(separator);
        }
        current.push_str(entry);
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

fn truncate(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
