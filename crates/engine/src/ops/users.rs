use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, QueryFilter, QuerySelect, TransactionTrait, prelude::*};

use crate::{
    ResultEngine, notification_schedules, suggestions, transactions, user_settings, users,
};

use super::{Engine, with_tx};

/// What the engine remembers about a chat between two messages.
#[derive(Clone, Debug)]
pub(crate) struct CachedUser {
    username: Option<String>,
    refreshed_at: DateTime<Utc>,
}

impl Engine {
    /// Make sure the chat has a `users` row carrying the current username.
    ///
    /// Called on every incoming message, so it first consults the in-memory
    /// user cache and only touches the database when the chat is unknown, the
    /// username changed or the cached entry expired.
    pub async fn enrich_user_data(
        &self,
        tg_chat_id: i64,
        tg_user_id: u64,
        tg_username: Option<&str>,
    ) -> ResultEngine<()> {
        let now = Utc::now();
        let username = tg_username.map(ToString::to_string);

        {
            let mut cache = self.user_cache();
            let ttl = self.user_cache_ttl;
            cache.retain(|_, entry| now - entry.refreshed_at < ttl);
            if cache
                .get(&tg_chat_id)
                .is_some_and(|entry| entry.username == username)
            {
                return Ok(());
            }
        }

        let existing = users::Entity::find_by_id(tg_chat_id)
            .one(&self.database)
            .await?;

        match existing {
            None => {
                tracing::info!("registering new chat {tg_chat_id}");
                users::ActiveModel {
                    tg_chat_id: ActiveValue::Set(tg_chat_id),
                    tg_user_id: ActiveValue::Set(tg_user_id as i64),
                    tg_username: ActiveValue::Set(username.clone()),
                    created_at: ActiveValue::Set(now),
                }
                .insert(&self.database)
                .await?;
            }
            Some(model) if model.tg_username != username => {
                tracing::debug!("username changed for chat {tg_chat_id}");
                users::ActiveModel {
                    tg_chat_id: ActiveValue::Unchanged(tg_chat_id),
                    tg_username: ActiveValue::Set(username.clone()),
                    ..Default::default()
                }
                .update(&self.database)
                .await?;
            }
            Some(_) => {}
        }

        self.user_cache().insert(
            tg_chat_id,
            CachedUser {
                username,
                refreshed_at: now,
            },
        );
        Ok(())
    }

    /// Remove a chat and everything stored for it.
    pub async fn delete_user(&self, tg_chat_id: i64) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            transactions::Entity::delete_many()
                .filter(transactions::Column::TgChatId.eq(tg_chat_id))
                .exec(&db_tx)
                .await?;
            suggestions::Entity::delete_many()
                .filter(suggestions::Column::TgChatId.eq(tg_chat_id))
                .exec(&db_tx)
                .await?;
            notification_schedules::Entity::delete_by_id(tg_chat_id)
                .exec(&db_tx)
                .await?;
            user_settings::Entity::delete_many()
                .filter(user_settings::Column::TgChatId.eq(tg_chat_id))
                .exec(&db_tx)
                .await?;
            users::Entity::delete_by_id(tg_chat_id).exec(&db_tx).await?;
            ResultEngine::Ok(())
        })?;

        self.user_cache().remove(&tg_chat_id);
        tracing::info!("deleted all data of chat {tg_chat_id}");
        Ok(())
    }

    /// Every chat known to the bot.
    pub async fn all_chat_ids(&self) -> ResultEngine<Vec<i64>> {
        let ids = users::Entity::find()
            .select_only()
            .column(users::Column::TgChatId)
            .into_tuple::<i64>()
            .all(&self.database)
            .await?;
        Ok(ids)
    }
}
