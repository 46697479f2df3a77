//! Previously used accounts and descriptions, offered back as suggestions.

use sea_orm::entity::prelude::*;

use crate::EngineError;

/// Which field of a transaction a suggestion belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SuggestionKind {
    AccountFrom,
    AccountTo,
    Description,
}

impl SuggestionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AccountFrom => "account:from",
            Self::AccountTo => "account:to",
            Self::Description => "description:",
        }
    }
}

impl core::fmt::Display for SuggestionKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str().trim_end_matches(':'))
    }
}

impl TryFrom<&str> for SuggestionKind {
    type Error = EngineError;

    /// Accepts both the stored form (`account:from`) and the short one users
    /// type (`from`).
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "account:from" | "from" => Ok(Self::AccountFrom),
            "account:to" | "to" => Ok(Self::AccountTo),
            "description:" | "description" | "desc" => Ok(Self::Description),
            other => Err(EngineError::InvalidValue(format!(
                "unknown suggestion type: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "suggestions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub tg_chat_id: i64,
    pub kind: String,
    pub value: String,
    pub last_used: DateTimeUtc,
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_and_stored_names() {
        assert_eq!(
            SuggestionKind::try_from("from").unwrap(),
            SuggestionKind::AccountFrom
        );
        assert_eq!(
            SuggestionKind::try_from("account:to").unwrap(),
            SuggestionKind::AccountTo
        );
        assert_eq!(
            SuggestionKind::try_from("Description").unwrap(),
            SuggestionKind::Description
        );
        assert!(SuggestionKind::try_from("amount").is_err());
    }

    #[test]
    fn display_drops_trailing_colon() {
        assert_eq!(SuggestionKind::Description.to_string(), "description");
        assert_eq!(SuggestionKind::AccountFrom.to_string(), "account:from");
    }
}
