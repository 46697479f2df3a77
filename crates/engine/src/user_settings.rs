//! Per-user key/value preferences.

use sea_orm::entity::prelude::*;

/// Known setting keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SettingKey {
    /// Commodity used for new transactions.
    Currency,
    /// Tag appended to every new transaction ("vacation mode").
    VacationTag,
    /// Grants access to the `/admin` commands.
    IsAdmin,
}

impl SettingKey {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Currency => "user.currency",
            Self::VacationTag => "user.vacationTag",
            Self::IsAdmin => "user.isAdmin",
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "user_settings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub tg_chat_id: i64,
    #[sea_orm(primary_key, auto_increment = false)]
    pub setting: String,
    pub value: String,
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
