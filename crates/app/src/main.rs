use std::sync::Arc;

use migration::{Migrator, MigratorTrait};
use settings::Database;
use telegram_bot::DEFAULT_SUGGESTION_LIMIT;

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "beancount_bot={level},telegram_bot={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    tracing::info!(
        "Starting beancount_bot {}",
        settings.app.version.as_deref().unwrap_or("(version not specified)")
    );

    let db = parse_database(&settings.database).await?;
    let engine = engine::Engine::builder().database(db).build().await?;

    let telegram = settings.telegram;
    let bot = telegram_bot::Bot::builder()
        .token(&telegram.token)
        .allowed_users(telegram.allowed_users)
        .admins(telegram.admins)
        .engine(Arc::new(engine))
        .timezone(telegram.timezone.as_deref().unwrap_or("UTC"))
        .suggestion_limit(telegram.suggestion_limit.unwrap_or(DEFAULT_SUGGESTION_LIMIT))
        .version(settings.app.version)
        .repository(telegram.repository)
        .build()?;

    bot.run().await;
    Ok(())
}

async fn parse_database(
    config: &settings::Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };

    tracing::info!("Connecting to database...");
    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}
