use chrono::{DateTime, TimeDelta, Utc};
use sea_orm::{ActiveValue, PaginatorTrait, QueryFilter, TransactionTrait, prelude::*};

use crate::{
    EngineError, NotificationSchedule, ResultEngine, notification_schedules, transactions,
};

use super::{Engine, with_tx};

/// Keeps `delay_hours` well inside what a `TimeDelta` can hold.
const MAX_DELAY_DAYS: i64 = 36_500;

impl Engine {
    /// Current reminder schedule, `None` when reminders are disabled.
    pub async fn user_get_notification_setting(
        &self,
        tg_chat_id: i64,
    ) -> ResultEngine<Option<NotificationSchedule>> {
        let model = notification_schedules::Entity::find_by_id(tg_chat_id)
            .one(&self.database)
            .await?;
        Ok(model.map(NotificationSchedule::from))
    }

    /// Replace the reminder schedule; `None` disables reminders.
    pub async fn user_set_notification_setting(
        &self,
        tg_chat_id: i64,
        schedule: Option<NotificationSchedule>,
    ) -> ResultEngine<()> {
        if let Some(schedule) = schedule {
            validate_schedule(schedule)?;
        }

        with_tx!(self, |db_tx| {
            notification_schedules::Entity::delete_by_id(tg_chat_id)
                .exec(&db_tx)
                .await?;
            if let Some(schedule) = schedule {
                notification_schedules::ActiveModel {
                    tg_chat_id: ActiveValue::Set(tg_chat_id),
                    delay_hours: ActiveValue::Set(schedule.days_delay * 24),
                    notification_hour: ActiveValue::Set(schedule.hour),
                }
                .insert(&db_tx)
                .await?;
            }
            ResultEngine::Ok(())
        })
    }

    /// Chats that should get a reminder now.
    ///
    /// A chat is due when its schedule hour equals `hour` and it owns at least
    /// one open transaction created `delay_hours` or more before `now`.
    /// `only` restricts the lookup to a single chat.
    pub async fn individuals_with_notifications(
        &self,
        only: Option<i64>,
        hour: i32,
        now: DateTime<Utc>,
    ) -> ResultEngine<Vec<i64>> {
        let mut query = notification_schedules::Entity::find()
            .filter(notification_schedules::Column::NotificationHour.eq(hour));
        if let Some(tg_chat_id) = only {
            query = query.filter(notification_schedules::Column::TgChatId.eq(tg_chat_id));
        }
        let schedules = query.all(&self.database).await?;

        let mut due = Vec::new();
        for schedule in schedules {
            let threshold = now - TimeDelta::hours(schedule.delay_hours);
            let open = transactions::Entity::find()
                .filter(transactions::Column::TgChatId.eq(schedule.tg_chat_id))
                .filter(transactions::Column::Archived.eq(false))
                .filter(transactions::Column::CreatedAt.lte(threshold))
                .count(&self.database)
                .await?;
            if open > 0 {
                due.push(schedule.tg_chat_id);
            }
        }
        Ok(due)
    }
}

fn validate_schedule(schedule: NotificationSchedule) -> ResultEngine<()> {
    if !(0..=MAX_DELAY_DAYS).contains(&schedule.days_delay) {
        return Err(EngineError::InvalidValue(format!(
            "delay must be between 0 and {MAX_DELAY_DAYS} days, got {}",
            schedule.days_delay
        )));
    }
    if !(0..=23).contains(&schedule.hour) {
        return Err(EngineError::InvalidValue(format!(
            "hour must be between 0 and 23, got {}",
            schedule.hour
        )));
    }
    Ok(())
}
