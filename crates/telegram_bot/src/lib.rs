//! Telegram bot.
//!
//! Users compose transactions in the chat, the bot renders them as Beancount
//! entries and keeps them in the engine until they are archived or deleted.

use std::sync::Arc;

use chrono_tz::Tz;
use engine::Engine;
use teloxide::{prelude::*, utils::command::BotCommands};

mod commands;
mod handlers;
mod notifications;
mod parsing;
mod state;
mod transaction;
mod ui;

pub use commands::Command;

/// Number of suggestions kept per kind when none is configured.
pub const DEFAULT_SUGGESTION_LIMIT: usize = 20;

#[derive(Debug, thiserror::Error)]
pub enum BotError {
    #[error("missing telegram token")]
    MissingToken,
    #[error("missing engine")]
    MissingEngine,
    #[error("unknown timezone '{0}'")]
    InvalidTimezone(String),
}

/// What `/config about` shows.
#[derive(Clone, Debug, Default)]
pub(crate) struct About {
    version: Option<String>,
    repository: Option<String>,
}

#[derive(Clone)]
pub struct ConfigParameters {
    allowed_users: Option<Vec<UserId>>,
    admins: Vec<i64>,
    engine: Arc<Engine>,
    state: state::StateHandler,
    timezone: Tz,
    suggestion_limit: usize,
    about: About,
}

pub struct Bot {
    token: String,
    parameters: ConfigParameters,
}

impl Bot {
    pub fn builder() -> BotBuilder {
        BotBuilder::default()
    }

    pub async fn run(&self) {
        tracing::info!("Starting telegram bot...");

        let bot = teloxide::Bot::new(&self.token);

        if let Err(err) = bot.set_my_commands(Command::bot_commands()).await {
            tracing::warn!("Could not register the command list: {err}");
        }

        for admin in &self.parameters.admins {
            if let Err(err) = self.parameters.engine.user_set_admin(*admin, true).await {
                tracing::debug!("Admin {admin} not flagged yet: {err}");
            }
        }

        tokio::spawn(notifications::run(bot.clone(), self.parameters.clone()));

        let handler = dptree::entry().branch(
            Update::filter_message()
                .branch(
                    dptree::entry()
                        .filter_command::<Command>()
                        .endpoint(handlers::handle_command),
                )
                .branch(dptree::endpoint(handlers::handle_message)),
        );

        Dispatcher::builder(bot, handler)
            .dependencies(dptree::deps![self.parameters.clone()])
            .default_handler(|upd| async move {
                tracing::debug!("Unhandled update: {:?}", upd);
            })
            .error_handler(LoggingErrorHandler::with_custom_text(
                "An error has occurred in the dispatcher",
            ))
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;
    }
}

#[derive(Default)]
pub struct BotBuilder {
    token: String,
    allowed_users: Option<Vec<UserId>>,
    admins: Vec<i64>,
    engine: Option<Arc<Engine>>,
    timezone: Option<String>,
    suggestion_limit: Option<usize>,
    about: About,
}

impl BotBuilder {
    pub fn token(mut self, token: &str) -> BotBuilder {
        self.token = token.to_string();
        self
    }

    /// Telegram user ids allowed to talk to the bot, everybody when empty.
    pub fn allowed_users(mut self, allowed_users: Vec<u64>) -> BotBuilder {
        if !allowed_users.is_empty() {
            self.allowed_users = Some(allowed_users.into_iter().map(UserId).collect());
        }
        self
    }

    /// Chats flagged as administrators at startup.
    pub fn admins(mut self, admins: Vec<i64>) -> BotBuilder {
        self.admins = admins;
        self
    }

    pub fn engine(mut self, engine: Arc<Engine>) -> BotBuilder {
        self.engine = Some(engine);
        self
    }

    /// IANA name, e.g. `Europe/Berlin`. Defaults to UTC.
    pub fn timezone(mut self, timezone: &str) -> BotBuilder {
        self.timezone = Some(timezone.to_string());
        self
    }

    pub fn suggestion_limit(mut self, limit: usize) -> BotBuilder {
        self.suggestion_limit = Some(limit);
        self
    }

    pub fn version(mut self, version: Option<String>) -> BotBuilder {
        self.about.version = version.filter(|v| !v.trim().is_empty());
        self
    }

    pub fn repository(mut self, repository: Option<String>) -> BotBuilder {
        self.about.repository = repository
            .map(|r| r.trim().trim_end_matches('/').to_string())
            .filter(|r| !r.is_empty());
        self
    }

    pub fn build(self) -> Result<Bot, BotError> {
        tracing::info!("Initializing telegram bot...");

        if self.token.is_empty() {
            return Err(BotError::MissingToken);
        }
        let engine = self.engine.ok_or(BotError::MissingEngine)?;
        let timezone = match self.timezone.as_deref() {
            None => chrono_tz::UTC,
            Some(name) => name
                .parse::<Tz>()
                .map_err(|_| BotError::InvalidTimezone(name.to_string()))?,
        };

        Ok(Bot {
            token: self.token,
            parameters: ConfigParameters {
                allowed_users: self.allowed_users,
                admins: self.admins,
                engine,
                state: state::StateHandler::default(),
                timezone,
                suggestion_limit: self.suggestion_limit.unwrap_or(DEFAULT_SUGGESTION_LIMIT),
                about: self.about,
            },
        })
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn builder_rejects_unknown_timezone() {
        let engine = test_support::parameters().await.engine;
        let result = Bot::builder()
            .token("123:abc")
            .engine(engine)
            .timezone("Mars/Olympus")
            .build();
        assert!(matches!(result, Err(BotError::InvalidTimezone(_))));
    }

    #[tokio::test]
    async fn builder_defaults() {
        let engine = test_support::parameters().await.engine;
        let bot = Bot::builder()
            .token("123:abc")
            .engine(engine)
            .repository(Some("https://example.com/bot/".to_string()))
            .build()
            .unwrap();
        assert_eq!(bot.parameters.timezone, chrono_tz::UTC);
        assert_eq!(bot.parameters.suggestion_limit, DEFAULT_SUGGESTION_LIMIT);
        assert_eq!(
            bot.parameters.about.repository.as_deref(),
            Some("https://example.com/bot")
        );
    }

    #[test]
    fn builder_requires_token_and_engine() {
        assert!(matches!(
            Bot::builder().build(),
            Err(BotError::MissingToken)
        ));
        assert!(matches!(
            Bot::builder().token("123:abc").build(),
            Err(BotError::MissingEngine)
        ));
    }
}
