use std::{collections::HashMap, sync::Arc};

use chrono::NaiveDate;
use teloxide::types::ChatId;
use tokio::sync::Mutex;

use crate::transaction::SimpleTx;

/// Transactions being composed, one optional draft per chat.
///
/// Each call replaces what the chat had before; there is no history.
#[derive(Clone, Default)]
pub(crate) struct StateHandler {
    inner: Arc<Mutex<HashMap<ChatId, SimpleTx>>>,
}

impl StateHandler {
    /// Start a new draft for the chat, dropping any previous one.
    pub(crate) async fn simple_tx(&self, chat_id: ChatId, date: Option<NaiveDate>) -> SimpleTx {
        let tx = SimpleTx::new(date);
        self.inner.lock().await.insert(chat_id, tx.clone());
        tx
    }

    pub(crate) async fn get_tx(&self, chat_id: ChatId) -> Option<SimpleTx> {
        self.inner.lock().await.get(&chat_id).cloned()
    }

    pub(crate) async fn put_tx(&self, chat_id: ChatId, tx: SimpleTx) {
        self.inner.lock().await.insert(chat_id, tx);
    }

    /// Forget the chat's draft. Returns whether there was one.
    pub(crate) async fn clear(&self, chat_id: ChatId) -> bool {
        self.inner.lock().await.remove(&chat_id).is_some()
    }
}
