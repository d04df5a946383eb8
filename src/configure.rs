use config::{Config, ConfigError, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub data_dir: String,
    pub log_level: String,
    pub log_to_file: bool,
    pub log_file: String,
    /// Base URL of the client-directory CRUD backend. Empty disables
    /// name backfill.
    pub directory_base_url: String,
}

pub fn load_config() -> Result<AppConfig, ConfigError> {
    let s = Config::builder()
        // Set defaults
        .set_default("data_dir", "data/ledger")?
        .set_default("log_level", "info")?
        .set_default("log_to_file", false)?
        .set_default("log_file", "log/agency_ledger.log")?
        .set_default("directory_base_url", "")?
        // Add configuration from a file
        .add_source(File::with_name("config/config.yaml").required(false))
        // Add configuration from environment variables
        .add_source(config::Environment::with_prefix("LEDGER"))
        .build()?;

    s.try_deserialize()
}
