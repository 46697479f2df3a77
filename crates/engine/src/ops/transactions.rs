use chrono::Utc;
use sea_orm::{PaginatorTrait, QueryFilter, QueryOrder, prelude::*, sea_query::Expr};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, Transaction, transactions};

use super::Engine;

impl Engine {
    /// Store a rendered transaction for the chat.
    pub async fn record_transaction(&self, tg_chat_id: i64, body: &str) -> ResultEngine<Uuid> {
        let body = body.trim_end();
        if body.trim().is_empty() {
            return Err(EngineError::InvalidValue(
                "transaction must not be empty".to_string(),
            ));
        }
        let tx = Transaction::new(tg_chat_id, body.to_string(), Utc::now());
        transactions::ActiveModel::from(&tx)
            .insert(&self.database)
            .await?;
        tracing::debug!("recorded transaction {} for chat {tg_chat_id}", tx.id);
        Ok(tx.id)
    }

    /// Open (or archived) transactions of the chat, oldest first.
    pub async fn list_transactions(
        &self,
        tg_chat_id: i64,
        archived: bool,
    ) -> ResultEngine<Vec<Transaction>> {
        let txs = transactions::Entity::find()
            .filter(transactions::Column::TgChatId.eq(tg_chat_id))
            .filter(transactions::Column::Archived.eq(archived))
            .order_by_asc(transactions::Column::CreatedAt)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Transaction::try_from)
            .collect::<ResultEngine<Vec<_>>>()?;
        Ok(txs)
    }

    /// Mark every open transaction of the chat as archived. Returns how many changed.
    pub async fn archive_all(&self, tg_chat_id: i64) -> ResultEngine<u64> {
        let result = transactions::Entity::update_many()
            .col_expr(transactions::Column::Archived, Expr::value(true))
            .filter(transactions::Column::TgChatId.eq(tg_chat_id))
            .filter(transactions::Column::Archived.eq(false))
            .exec(&self.database)
            .await?;
        Ok(result.rows_affected)
    }

    /// Delete every transaction of the chat, open and archived. Returns how many were removed.
    pub async fn delete_all(&self, tg_chat_id: i64) -> ResultEngine<u64> {
        let result = transactions::Entity::delete_many()
            .filter(transactions::Column::TgChatId.eq(tg_chat_id))
            .exec(&self.database)
            .await?;
        Ok(result.rows_affected)
    }

    pub async fn open_transaction_count(&self, tg_chat_id: i64) -> ResultEngine<u64> {
        let count = transactions::Entity::find()
            .filter(transactions::Column::TgChatId.eq(tg_chat_id))
            .filter(transactions::Column::Archived.eq(false))
            .count(&self.database)
            .await?;
        Ok(count)
    }
}
