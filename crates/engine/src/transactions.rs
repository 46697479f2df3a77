//! Recorded ledger entries.
//!
//! The bot renders each transaction to Beancount text before storing it, so a
//! row only carries the rendered `body` plus bookkeeping columns.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

use crate::EngineError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    pub id: Uuid,
    pub tg_chat_id: i64,
    pub body: String,
    pub archived: bool,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    pub fn new(tg_chat_id: i64, body: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            tg_chat_id,
            body,
            archived: false,
            created_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub tg_chat_id: i64,
    pub body: String,
    pub archived: bool,
    pub created_at: DateTimeUtc,
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

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.id.to_string()),
            tg_chat_id: ActiveValue::Set(tx.tg_chat_id),
            body: ActiveValue::Set(tx.body.clone()),
            archived: ActiveValue::Set(tx.archived),
            created_at: ActiveValue::Set(tx.created_at),
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&model.id).map_err(|err| {
            EngineError::InvalidValue(format!("transaction id '{}' is not a uuid: {err}", model.id))
        })?;
        Ok(Self {
            id,
            tg_chat_id: model.tg_chat_id,
            body: model.body,
            archived: model.archived,
            created_at: model.created_at,
        })
    }
}
