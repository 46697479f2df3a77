use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{CacheStats, Engine, EngineError, SuggestionKind};
use migration::MigratorTrait;

const CHAT: i64 = 9123;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    engine
        .enrich_user_data(CHAT, 1, Some("alice"))
        .await
        .unwrap();
    (engine, db)
}

const TX: &str = "2024-05-01 * \"Groceries\"\n  Assets:Wallet  -12.50 EUR\n  Expenses:Food";

#[tokio::test]
async fn record_list_archive_delete() {
    let (engine, _db) = engine_with_db().await;

    engine.record_transaction(CHAT, TX).await.unwrap();
    engine
        .record_transaction(CHAT, "2024-05-02 * \"Coffee\"\n  Assets:Wallet  -2.00 EUR\n  Expenses:Bar\n")
        .await
        .unwrap();

    let open = engine.list_transactions(CHAT, false).await.unwrap();
    assert_eq!(open.len(), 2);
    assert_eq!(open[0].body, TX);
    // Trailing newlines are not stored.
    assert!(open[1].body.ends_with("Expenses:Bar"));
    assert!(open.iter().all(|tx| !tx.archived && tx.tg_chat_id == CHAT));
    assert_eq!(engine.open_transaction_count(CHAT).await.unwrap(), 2);

    assert_eq!(engine.archive_all(CHAT).await.unwrap(), 2);
    assert!(engine.list_transactions(CHAT, false).await.unwrap().is_empty());
    assert_eq!(engine.list_transactions(CHAT, true).await.unwrap().len(), 2);
    // Nothing left to archive.
    assert_eq!(engine.archive_all(CHAT).await.unwrap(), 0);

    engine.record_transaction(CHAT, TX).await.unwrap();
    assert_eq!(engine.delete_all(CHAT).await.unwrap(), 3);
    assert!(engine.list_transactions(CHAT, true).await.unwrap().is_empty());
}

#[tokio::test]
async fn empty_transaction_is_rejected() {
    let (engine, _db) = engine_with_db().await;
    assert!(engine.record_transaction(CHAT, "  \n").await.is_err());
}

#[tokio::test]
async fn corrupt_transaction_id_is_reported() {
    let (engine, db) = engine_with_db().await;

    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO transactions (id, tg_chat_id, body, archived, created_at) VALUES (?, ?, ?, ?, ?)",
        vec![
            "not-a-uuid".into(),
            CHAT.into(),
            TX.into(),
            false.into(),
            "2024-01-01T00:00:00+00:00".into(),
        ],
    ))
    .await
    .unwrap();

    let err = engine.list_transactions(CHAT, false).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidValue(msg) if msg.contains("not-a-uuid")));
}

#[tokio::test]
async fn transactions_are_scoped_per_chat() {
    let (engine, _db) = engine_with_db().await;
    let other = 55;
    engine
        .enrich_user_data(other, 2, Some("bob"))
        .await
        .unwrap();

    engine.record_transaction(CHAT, TX).await.unwrap();
    engine.record_transaction(other, TX).await.unwrap();

    assert_eq!(engine.delete_all(other).await.unwrap(), 1);
    assert_eq!(engine.open_transaction_count(CHAT).await.unwrap(), 1);
}

#[tokio::test]
async fn suggestions_are_most_recent_first_and_deduplicated() {
    let (engine, _db) = engine_with_db().await;
    let kind = SuggestionKind::AccountFrom;

    engine
        .put_suggestion(CHAT, kind, "Assets:Wallet", 10)
        .await
        .unwrap();
    engine
        .put_suggestion(CHAT, kind, "Assets:Bank", 10)
        .await
        .unwrap();
    engine
        .put_suggestion(CHAT, kind, " Assets:Wallet ", 10)
        .await
        .unwrap();

    assert_eq!(
        engine.get_suggestions(CHAT, kind).await.unwrap(),
        vec!["Assets:Wallet".to_string(), "Assets:Bank".to_string()]
    );
    assert!(
        engine
            .get_suggestions(CHAT, SuggestionKind::AccountTo)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn suggestions_are_pruned_to_limit() {
    let (engine, _db) = engine_with_db().await;
    let kind = SuggestionKind::Description;

    for value in ["one", "two", "three", "four"] {
        engine.put_suggestion(CHAT, kind, value, 2).await.unwrap();
    }

    assert_eq!(
        engine.get_suggestions(CHAT, kind).await.unwrap(),
        vec!["four".to_string(), "three".to_string()]
    );
}

#[tokio::test]
async fn suggestions_can_be_removed() {
    let (engine, _db) = engine_with_db().await;
    let kind = SuggestionKind::AccountTo;
    for value in ["Expenses:Food", "Expenses:Bar", "Expenses:Rent"] {
        engine.put_suggestion(CHAT, kind, value, 10).await.unwrap();
    }

    assert_eq!(
        engine
            .remove_suggestion(CHAT, kind, Some("Expenses:Bar"))
            .await
            .unwrap(),
        1
    );
    assert_eq!(
        engine
            .remove_suggestion(CHAT, kind, Some("Expenses:Missing"))
            .await
            .unwrap(),
        0
    );
    assert_eq!(engine.get_suggestions(CHAT, kind).await.unwrap().len(), 2);

    assert_eq!(engine.remove_suggestion(CHAT, kind, None).await.unwrap(), 2);
    assert!(engine.get_suggestions(CHAT, kind).await.unwrap().is_empty());
}

#[tokio::test]
async fn empty_suggestion_is_rejected() {
    let (engine, _db) = engine_with_db().await;
    assert!(
        engine
            .put_suggestion(CHAT, SuggestionKind::AccountTo, "   ", 10)
            .await
            .is_err()
    );
}

#[tokio::test]
async fn health_counters() {
    let (engine, db) = engine_with_db().await;
    engine
        .enrich_user_data(2, 2, Some("bob"))
        .await
        .unwrap();

    engine.record_transaction(CHAT, TX).await.unwrap();
    engine.record_transaction(CHAT, TX).await.unwrap();
    engine.archive_all(CHAT).await.unwrap();
    engine.record_transaction(CHAT, TX).await.unwrap();

    assert_eq!(engine.health_transaction_counts().await.unwrap(), (1, 2));
    assert_eq!(engine.health_user_count().await.unwrap(), 2);
    assert_eq!(engine.health_active_user_count(24).await.unwrap(), 1);

    engine
        .put_suggestion(CHAT, SuggestionKind::AccountTo, "Expenses:Food", 10)
        .await
        .unwrap();
    engine
        .put_suggestion(CHAT, SuggestionKind::AccountFrom, "Assets:Wallet", 10)
        .await
        .unwrap();
    engine
        .put_suggestion(2, SuggestionKind::AccountFrom, "Assets:Bank", 10)
        .await
        .unwrap();
    engine
        .put_suggestion(CHAT, SuggestionKind::Description, "Groceries", 10)
        .await
        .unwrap();

    // A row written by an older version with a kind the engine no longer knows.
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO suggestions (id, tg_chat_id, kind, value, last_used) VALUES (?, ?, ?, ?, ?)",
        vec![
            "legacy".into(),
            CHAT.into(),
            "payee:".into(),
            "Shop".into(),
            "2024-01-01T00:00:00+00:00".into(),
        ],
    ))
    .await
    .unwrap();

    assert_eq!(
        engine.health_cache_stats().await.unwrap(),
        CacheStats {
            account_to: 1,
            account_from: 2,
            description: 1,
            other: 1,
        }
    );
}
