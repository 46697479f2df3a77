//! Settings of the application, read from `settings.toml` and overridable
//! through `BEANCOUNT_BOT__<SECTION>__<KEY>` environment variables.

use clap::Parser;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

const DEFAULT_SETTINGS_PATH: &str = "settings";

#[derive(Debug, Parser)]
#[command(name = "beancount_bot", disable_version_flag = true)]
struct Args {
    /// Settings file, with or without the `.toml` extension.
    #[arg(long)]
    settings: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct App {
    #[serde(default = "default_level")]
    pub level: String,
    /// Shown by `/config about`.
    pub version: Option<String>,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: default_level(),
            version: None,
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    #[default]
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct Telegram {
    pub token: String,
    #[serde(default)]
    pub allowed_users: Vec<u64>,
    #[serde(default)]
    pub admins: Vec<i64>,
    pub timezone: Option<String>,
    pub suggestion_limit: Option<usize>,
    pub repository: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    #[serde(default)]
    pub database: Database,
    pub telegram: Telegram,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let args = Args::parse();
        let path = args.settings.as_deref().unwrap_or(DEFAULT_SETTINGS_PATH);

        let mut settings: Settings = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("BEANCOUNT_BOT")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("telegram.allowed_users")
                    .with_list_parse_key("telegram.admins"),
            )
            .build()?
            .try_deserialize()?;

        if settings.app.version.is_none() {
            settings.app.version = std::env::var("VERSION").ok();
        }
        Ok(settings)
    }
}
