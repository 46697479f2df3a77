//! Reminder schedule for open transactions.

use sea_orm::entity::prelude::*;

/// Notify about transactions open for more than `days_delay` days, once a day
/// at `hour`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NotificationSchedule {
    pub days_delay: i64,
    pub hour: i32,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "notification_schedules")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub tg_chat_id: i64,
    pub delay_hours: i64,
    pub notification_hour: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::TgChatId",
        to = "super::users::Column::TgChatId",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Users,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for NotificationSchedule {
    fn from(model: Model) -> Self {
        Self {
            days_delay: model.delay_hours / 24,
            hour: model.notification_hour,
        }
    }
}
