use anyhow::Result;
use config::{Config, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server_address: String,
    pub firebase_project_id: Option<String>,
    // Keyword suggestion service (hosted function returning an AiResponse)
    pub suggester_url: Option<String>,
    pub suggester_api_key: Option<String>,
    pub suggester_timeout_secs: u64,
}

impl Settings {
    pub fn new() -> Result<Self> {
        dotenv::dotenv().ok(); // Load .env file if present

        let builder = Config::builder()
            .set_default("server_address", "127.0.0.1:3000")?
            // A single failed suggestion attempt must not stall the search
            .set_default("suggester_timeout_secs", 5)?
            // Load from a configuration file (e.g., config.toml)
            .add_source(File::with_name("config").required(false))
            // Load from environment variables (e.g., APP_SUGGESTER_URL)
            .add_source(Environment::with_prefix("APP").separator("_"));

        let settings = builder.build()?.try_deserialize()?;
        Ok(settings)
    }
}
