use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, SuggestionKind, suggestions};

use super::{Engine, with_tx};

impl Engine {
    /// Remember `value` as the most recently used entry of `kind`, keeping at
    /// most `limit` entries per kind.
    pub async fn put_suggestion(
        &self,
        tg_chat_id: i64,
        kind: SuggestionKind,
        value: &str,
        limit: usize,
    ) -> ResultEngine<()> {
        let value = value.trim();
        if value.is_empty() {
            return Err(EngineError::InvalidValue(
                "suggestion must not be empty".to_string(),
            ));
        }
        let now = Utc::now();

        with_tx!(self, |db_tx| {
            let existing = suggestions::Entity::find()
                .filter(suggestions::Column::TgChatId.eq(tg_chat_id))
                .filter(suggestions::Column::Kind.eq(kind.as_str()))
                .filter(suggestions::Column::Value.eq(value))
                .one(&db_tx)
                .await?;

            match existing {
                Some(model) => {
                    suggestions::ActiveModel {
                        id: ActiveValue::Unchanged(model.id),
                        last_used: ActiveValue::Set(now),
                        ..Default::default()
                    }
                    .update(&db_tx)
                    .await?;
                }
                None => {
                    suggestions::ActiveModel {
                        id: ActiveValue::Set(Uuid::new_v4().to_string()),
                        tg_chat_id: ActiveValue::Set(tg_chat_id),
                        kind: ActiveValue::Set(kind.as_str().to_string()),
                        value: ActiveValue::Set(value.to_string()),
                        last_used: ActiveValue::Set(now),
                    }
                    .insert(&db_tx)
                    .await?;
                }
            }

            let stale: Vec<String> = suggestions::Entity::find()
                .filter(suggestions::Column::TgChatId.eq(tg_chat_id))
                .filter(suggestions::Column::Kind.eq(kind.as_str()))
                .order_by_desc(suggestions::Column::LastUsed)
                .all(&db_tx)
                .await?
                .into_iter()
                .skip(limit)
                .map(|model| model.id)
                .collect();
            if !stale.is_empty() {
                suggestions::Entity::delete_many()
                    .filter(suggestions::Column::Id.is_in(stale))
                    .exec(&db_tx)
                    .await?;
            }
            ResultEngine::Ok(())
        })
    }

    /// Stored values of `kind`, most recently used first.
    pub async fn get_suggestions(
        &self,
        tg_chat_id: i64,
        kind: SuggestionKind,
    ) -> ResultEngine<Vec<String>> {
        let values = suggestions::Entity::find()
            .filter(suggestions::Column::TgChatId.eq(tg_chat_id))
            .filter(suggestions::Column::Kind.eq(kind.as_str()))
            .order_by_desc(suggestions::Column::LastUsed)
            .all(&self.database)
            .await?
            .into_iter()
            .map(|model| model.value)
            .collect();
        Ok(values)
    }

    /// Remove one value of `kind`, or all of them when `value` is `None`.
    /// Returns how many entries were removed.
    pub async fn remove_suggestion(
        &self,
        tg_chat_id: i64,
        kind: SuggestionKind,
        value: Option<&str>,
    ) -> ResultEngine<u64> {
        let mut query = suggestions::Entity::delete_many()
            .filter(suggestions::Column::TgChatId.eq(tg_chat_id))
            .filter(suggestions::Column::Kind.eq(kind.as_str()));
        if let Some(value) = value {
            query = query.filter(suggestions::Column::Value.eq(value.trim()));
        }
        let result = query.exec(&self.database).await?;
        Ok(result.rows_affected)
    }
}
