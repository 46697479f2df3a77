use chrono::{TimeDelta, Utc};
use sea_orm::{PaginatorTrait, QueryFilter, QuerySelect, prelude::*};

use crate::{ResultEngine, SuggestionKind, suggestions, transactions, users};

use super::Engine;

/// Number of cached suggestions per kind across all users.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub account_to: u64,
    pub account_from: u64,
    pub description: u64,
    /// Rows whose kind is none of the above.
    pub other: u64,
}

impl Engine {
    /// `(open, archived)` transaction counts across all users.
    pub async fn health_transaction_counts(&self) -> ResultEngine<(u64, u64)> {
        let open = transactions::Entity::find()
            .filter(transactions::Column::Archived.eq(false))
            .count(&self.database)
            .await?;
        let archived = transactions::Entity::find()
            .filter(transactions::Column::Archived.eq(true))
            .count(&self.database)
            .await?;
        Ok((open, archived))
    }

    pub async fn health_user_count(&self) -> ResultEngine<u64> {
        Ok(users::Entity::find().count(&self.database).await?)
    }

    pub async fn health_cache_stats(&self) -> ResultEngine<CacheStats> {
        let kinds: Vec<String> = suggestions::Entity::find()
            .select_only()
            .column(suggestions::Column::Kind)
            .into_tuple::<String>()
            .all(&self.database)
            .await?;

        let mut stats = CacheStats::default();
        for kind in kinds {
            match SuggestionKind::try_from(kind.as_str()) {
                Ok(SuggestionKind::AccountTo) => stats.account_to += 1,
                Ok(SuggestionKind::AccountFrom) => stats.account_from += 1,
                Ok(SuggestionKind::Description) => stats.description += 1,
                Err(_) => stats.other += 1,
            }
        }
        Ok(stats)
    }

    /// Users that recorded at least one transaction in the last `hours` hours.
    pub async fn health_active_user_count(&self, hours: i64) -> ResultEngine<u64> {
        let since = Utc::now() - TimeDelta::hours(hours);
        let active = transactions::Entity::find()
            .select_only()
            .column(transactions::Column::TgChatId)
            .filter(transactions::Column::CreatedAt.gte(since))
            .distinct()
            .into_tuple::<i64>()
            .all(&self.database)
            .await?;
        Ok(active.len() as u64)
    }
}
