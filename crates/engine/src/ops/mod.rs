use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

use chrono::TimeDelta;
use sea_orm::DatabaseConnection;

use crate::ResultEngine;

mod health;
mod notifications;
mod settings;
mod suggestions;
mod transactions;
mod users;

pub use health::CacheStats;
pub use settings::DEFAULT_CURRENCY;
use users::CachedUser;

/// Default time a cached user entry is trusted before hitting the database.
const DEFAULT_USER_CACHE_TTL: TimeDelta = TimeDelta::hours(1);

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    user_cache: Mutex<HashMap<i64, CachedUser>>,
    user_cache_ttl: TimeDelta,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    fn user_cache(&self) -> MutexGuard<'_, HashMap<i64, CachedUser>> {
        // Entries are independent, a poisoned map is still consistent.
        self.user_cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    user_cache_ttl: Option<TimeDelta>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// How long a cached user entry is trusted (default: one hour).
    pub fn user_cache_ttl(mut self, ttl: TimeDelta) -> EngineBuilder {
        self.user_cache_ttl = Some(ttl);
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            user_cache: Mutex::new(HashMap::new()),
            user_cache_ttl: self.user_cache_ttl.unwrap_or(DEFAULT_USER_CACHE_TTL),
        })
    }
}
