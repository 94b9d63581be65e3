//! Handles settings for the application. Configuration is written in
//! `settings.toml`.
//!
//! ```toml
//! [app]
//! level = "info"
//!
//! [server]
//! port = 3000
//! storage = { sqlite = "./tontine.db" }
//!
//! [server.processor]
//! base_url = "https://api.stripe.com"
//! secret_key = "sk_test_xxx"
//! webhook_secret = "whsec_xxx"
//! ```

use config::{Config, ConfigError, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    pub level: String,
}

/// Storage backend for the engine: `"memory"` or `{ sqlite = "<path>" }`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Storage {
    Memory,
    Sqlite(String),
}

/// External payment processor credentials. Without this section the
/// payment routes stay unmounted.
#[derive(Debug, Deserialize)]
pub struct Processor {
    pub base_url: String,
    pub secret_key: String,
    pub webhook_secret: String,
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub storage: Storage,
    pub bind: Option<String>,
    pub port: u16,
    pub processor: Option<Processor>,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub server: Option<Server>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("settings"))
            .build()?;

        settings.try_deserialize()
    }
}
