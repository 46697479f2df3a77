//! Handler for the `/config` command group

use std::num::ParseIntError;

use chrono::Utc;
use engine::{EngineError, NotificationSchedule};
use teloxide::{
    types::ChatId,
    utils::markdown::{escape, escape_link_url},
};

use crate::{About, ConfigParameters, commands::subcommand, ui::Reply};

const BOT_NAME: &str = "beancount_bot";

#[derive(Debug, thiserror::Error)]
enum ConfigError {
    #[error("invalid amount of parameters specified")]
    ParameterCount,
    #[error("invalid parameters")]
    InvalidParameters,
    #[error("no parameters expected")]
    NoParametersExpected,
    #[error("error converting {name} to number: {source}")]
    NotANumber {
        name: &'static str,
        source: ParseIntError,
    },
    #[error("error setting notification schedule: {0}")]
    Schedule(EngineError),
    #[error("an application error occurred while retrieving user information from database")]
    Retrieval,
}

pub(crate) async fn config_reply(cfg: &ConfigParameters, chat_id: ChatId, args: &str) -> Reply {
    let Some((name, params)) = subcommand(args) else {
        return config_help(cfg, None);
    };

    match name.as_str() {
        "currency" => currency(cfg, chat_id, &params).await,
        "tag" => tag(cfg, chat_id, &params).await,
        "notify" => notify(cfg, chat_id, &params).await,
        "about" => about(cfg, &params),
        _ => config_help(cfg, None),
    }
}

fn config_help(cfg: &ConfigParameters, err: Option<ConfigError>) -> Reply {
    let prefix = err
        .map(|err| format!("Error executing your command: {err}\n\n"))
        .unwrap_or_default();
    let tz = timezone_name(cfg);

    Reply::text(format!(
        "{prefix}Usage help for /config:\n\n\
         /config currency <c> - Change default currency\n\
         /config about - Display the version this bot is running on\n\n\
         Tags will be added to each new transaction with a '#':\n\n\
         /config tag - Get currently set tag\n\
         /config tag off - Turn off tag\n\
         /config tag <name> - Set tag to apply to new transactions, e.g. when on vacation\n\n\
         Create a schedule to be notified of open transactions (i.e. not archived or deleted):\n\n\
         /config notify - Get current notification status\n\
         /config notify off - Disable reminder notifications\n\
         /config notify <delay> <hour> - Notify of open transactions after <delay> days at <hour> of the day ({tz})"
    ))
}

/// Abbreviation of the bot's timezone as of now, e.g. `CET`.
fn timezone_name(cfg: &ConfigParameters) -> String {
    Utc::now()
        .with_timezone(&cfg.timezone)
        .format("%Z")
        .to_string()
}

async fn currency(cfg: &ConfigParameters, chat_id: ChatId, params: &[&str]) -> Reply {
    let current = match cfg.engine.user_get_currency(chat_id.0).await {
        Ok(current) => current,
        Err(err) => {
            tracing::error!("Could not read currency of chat {chat_id}: {err}");
            return config_help(cfg, Some(ConfigError::Retrieval));
        }
    };

    match params {
        [] => Reply::text(format!(
            "Your current currency is set to '{current}'. To change it add the new currency \
             to use to the command like this: '/config currency EUR'."
        )),
        [new] => match cfg.engine.user_set_currency(chat_id.0, new).await {
            Ok(new) => Reply::text(format!(
                "Changed default currency for all future transactions from '{current}' to '{new}'."
            )),
            Err(err) => Reply::text(format!(
                "An error occurred saving your currency preference: {err}"
            )),
        },
        _ => config_help(cfg, Some(ConfigError::ParameterCount)),
    }
}

async fn tag(cfg: &ConfigParameters, chat_id: ChatId, params: &[&str]) -> Reply {
    match params {
        [] => match cfg.engine.user_get_tag(chat_id.0).await {
            Ok(Some(tag)) => Reply::text(format!(
                "All new transactions automatically get the tag #{tag} added (vacation mode enabled)"
            )),
            Ok(None) => Reply::text(
                "No tags are currently added to new transactions (vacation mode disabled).",
            ),
            Err(err) => {
                tracing::error!("Could not read tag of chat {chat_id}: {err}");
                config_help(cfg, Some(ConfigError::Retrieval))
            }
        },
        ["off"] => {
            match cfg.engine.user_set_tag(chat_id.0, None).await {
                Ok(_) => Reply::text("Disabled automatically set tags on new transactions"),
                Err(err) => Reply::text(format!("An error occurred saving the tag: {err}")),
            }
        }
        [tag] => match cfg.engine.user_set_tag(chat_id.0, Some(*tag)).await {
            Ok(Some(tag)) => Reply::text(format!(
                "From now on all new transactions automatically get the tag #{tag} added \
                 (vacation mode enabled)"
            )),
            Ok(None) => Reply::text("Disabled automatically set tags on new transactions"),
            Err(err) => Reply::text(format!("An error occurred saving the tag: {err}")),
        },
        _ => config_help(cfg, Some(ConfigError::ParameterCount)),
    }
}

async fn notify(cfg: &ConfigParameters, chat_id: ChatId, params: &[&str]) -> Reply {
    match params {
        [] => {}
        ["off"] => {
            return match cfg.engine.user_set_notification_setting(chat_id.0, None).await {
                Ok(()) => Reply::text("Successfully disabled notifications for open transactions."),
                Err(err) => config_help(cfg, Some(ConfigError::Schedule(err))),
            };
        }
        [_] => return config_help(cfg, Some(ConfigError::InvalidParameters)),
        [days, hour] => {
            let schedule = match parse_schedule(days, hour) {
                Ok(schedule) => schedule,
                Err(err) => return config_help(cfg, Some(err)),
            };
            if let Err(err) = cfg
                .engine
                .user_set_notification_setting(chat_id.0, Some(schedule))
                .await
            {
                return config_help(cfg, Some(ConfigError::Schedule(err)));
            }
        }
        _ => return config_help(cfg, Some(ConfigError::ParameterCount)),
    }

    match cfg.engine.user_get_notification_setting(chat_id.0).await {
        Ok(None) => Reply::text("Notifications are disabled for open transactions."),
        Ok(Some(schedule)) => Reply::text(format!(
            "The bot will notify you daily at hour {} ({}) if transactions are open for more \
             than {} day{}",
            schedule.hour,
            timezone_name(cfg),
            schedule.days_delay,
            if schedule.days_delay == 1 { "" } else { "s" },
        )),
        Err(err) => {
            tracing::error!("Could not read notification schedule of chat {chat_id}: {err}");
            config_help(cfg, Some(ConfigError::Retrieval))
        }
    }
}

fn parse_schedule(days: &str, hour: &str) -> Result<NotificationSchedule, ConfigError> {
    let days_delay = days.parse().map_err(|source| ConfigError::NotANumber {
        name: "daysDelay",
        source,
    })?;
    let hour = hour.parse().map_err(|source| ConfigError::NotANumber {
        name: "hour",
        source,
    })?;
    Ok(NotificationSchedule { days_delay, hour })
}

fn about(cfg: &ConfigParameters, params: &[&str]) -> Reply {
    if !params.is_empty() {
        return config_help(cfg, Some(ConfigError::NoParametersExpected));
    }
    Reply::markdown(about_text(&cfg.about))
}

/// MarkdownV2 version information, linked to the repository when one is known.
fn about_text(about: &About) -> String {
    let version = about.version.as_deref();
    let repository = about.repository.as_deref();

    let name = match repository {
        Some(repo) => format!("[{}]({})", escape(BOT_NAME), escape_link_url(repo)),
        None => escape(BOT_NAME),
    };
    let version = match (version, repository) {
        (Some(version), Some(repo)) => {
            let mut url = format!("{repo}/releases/");
            if version.starts_with('v') {
                url.push_str("tag/");
                url.push_str(version);
            }
            format!("[{}]({})", escape(version), escape_link_url(&url))
        }
        (Some(version), None) => escape(version),
        (None, _) => escape("not specified"),
    };

    format!("Version information about {name}\n\nVersion: {version}")
}
