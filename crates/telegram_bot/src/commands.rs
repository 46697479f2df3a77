//! Command structs

use teloxide::utils::command::BotCommands;

/// Split the arguments of a command into whitespace separated parameters.
pub(crate) fn params(args: &str) -> Vec<&str> {
    args.split_whitespace().collect()
}

/// Route `args` to a subcommand: returns the subcommand name (lower case) and
/// its parameters, `None` when no subcommand was given.
pub(crate) fn subcommand(args: &str) -> Option<(String, Vec<&str>)> {
    let mut parts = params(args).into_iter();
    let name = parts.next()?.to_ascii_lowercase();
    Some((name, parts.collect()))
}

#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(
    rename_rule = "camelCase",
    description = "Record your spending as Beancount transactions:"
)]
pub enum Command {
    #[command(description = "Show this message.")]
    Help,
    #[command(description = "Register with the bot.")]
    Start,
    #[command(description = "Cancel the transaction you are entering.")]
    Cancel,
    #[command(description = "Start a new transaction, optionally dated: /simple 2024-05-01")]
    Simple(String),
    #[command(description = "List open transactions. Options: archived, dated")]
    List(String),
    #[command(description = "Archive all open transactions.")]
    ArchiveAll,
    #[command(description = "Delete all transactions: /deleteAll yes")]
    DeleteAll(String),
    #[command(description = "Manage suggestions: list|add|rm <from|to|description> [value]")]
    Suggestions(String),
    #[command(description = "Bot settings: currency, tag, notify, about")]
    Config(String),
    #[command(description = "Administration: health, notify <message>")]
    Admin(String),
}
