//! Initial schema.
//!
//! - `users`: one row per Telegram chat talking to the bot
//! - `user_settings`: key/value preferences (currency, vacation tag, admin flag)
//! - `notification_schedules`: reminder schedule for open transactions
//! - `suggestions`: previously used accounts and descriptions
//! - `transactions`: rendered ledger entries waiting to be exported

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    TgChatId,
    TgUserId,
    TgUsername,
    CreatedAt,
}

#[derive(Iden)]
enum UserSettings {
    Table,
    TgChatId,
    Setting,
    Value,
}

#[derive(Iden)]
enum NotificationSchedules {
    Table,
    TgChatId,
    DelayHours,
    NotificationHour,
}

#[derive(Iden)]
enum Suggestions {
    Table,
    Id,
    TgChatId,
    Kind,
    Value,
    LastUsed,
}

#[derive(Iden)]
enum Transactions {
    Table,
    Id,
    TgChatId,
    Body,
    Archived,
    CreatedAt,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::TgChatId)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::TgUserId).big_integer().not_null())
                    .col(ColumnDef::new(Users::TgUsername).string())
                    .col(ColumnDef::new(Users::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. User settings
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(UserSettings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserSettings::TgChatId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(UserSettings::Setting).string().not_null())
                    .col(ColumnDef::new(UserSettings::Value).string().not_null())
                    .primary_key(
                        Index::create()
                            .col(UserSettings::TgChatId)
                            .col(UserSettings::Setting),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-user_settings-tg_chat_id")
                            .from(UserSettings::Table, UserSettings::TgChatId)
                            .to(Users::Table, Users::TgChatId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Notification schedules
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(NotificationSchedules::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(NotificationSchedules::TgChatId)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(NotificationSchedules::DelayHours)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(NotificationSchedules::NotificationHour)
                            .integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-notification_schedules-tg_chat_id")
                            .from(NotificationSchedules::Table, NotificationSchedules::TgChatId)
                            .to(Users::Table, Users::TgChatId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Suggestions
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Suggestions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Suggestions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Suggestions::TgChatId).big_integer().not_null())
                    .col(ColumnDef::new(Suggestions::Kind).string().not_null())
                    .col(ColumnDef::new(Suggestions::Value).string().not_null())
                    .col(ColumnDef::new(Suggestions::LastUsed).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-suggestions-tg_chat_id")
                            .from(Suggestions::Table, Suggestions::TgChatId)
                            .to(Users::Table, Users::TgChatId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-suggestions-tg_chat_id-kind-value-unique")
                    .table(Suggestions::Table)
                    .col(Suggestions::TgChatId)
                    .col(Suggestions::Kind)
                    .col(Suggestions::Value)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Transactions
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Transactions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Transactions::TgChatId).big_integer().not_null())
                    .col(ColumnDef::new(Transactions::Body).text().not_null())
                    .col(
                        ColumnDef::new(Transactions::Archived)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Transactions::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transactions-tg_chat_id")
                            .from(Transactions::Table, Transactions::TgChatId)
                            .to(Users::Table, Users::TgChatId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-tg_chat_id-archived")
                    .table(Transactions::Table)
                    .col(Transactions::TgChatId)
                    .col(Transactions::Archived)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Suggestions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(NotificationSchedules::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UserSettings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
