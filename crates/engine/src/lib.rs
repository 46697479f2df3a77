//! Storage layer of the bookkeeping bot.
//!
//! The [`Engine`] wraps a sea-orm connection and exposes the operations the
//! bot needs: user bookkeeping, per-user settings, notification schedules, the
//! suggestion cache, recorded transactions and a few health counters.

pub use error::EngineError;
pub use notification_schedules::NotificationSchedule;
pub use ops::{CacheStats, DEFAULT_CURRENCY, Engine, EngineBuilder};
pub use suggestions::SuggestionKind;
pub use transactions::Transaction;
pub use user_settings::SettingKey;
pub use util::normalize_commodity;

mod error;
mod notification_schedules;
mod ops;
mod suggestions;
mod transactions;
mod user_settings;
mod users;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
