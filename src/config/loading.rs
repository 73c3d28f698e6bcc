use config::{Config, ConfigError, Environment};
use log::debug;

use super::models::Settings;

pub fn load_config() -> Result<Settings, ConfigError> {
    // As Rust has no native support for .env files,
    // we use the dotenv_flow crate to import to actual ENV vars.
    if let Ok(dotenv_path) = dotenv_flow::dotenv_flow() {
        debug!("Loaded dotenv file: {:?}", dotenv_path);
    }

    build_config(Environment::default())?.try_deserialize()
}

fn build_config(environment: Environment) -> Result<Config, ConfigError> {
    Config::builder()
        .add_source(environment
            .prefix("CKA")
            .separator("_")
            .prefix_separator("_")
            .try_parsing(true))
            .set_default("cups.logfile", "/var/log/cups/page_log")?
            .set_default("cups.fallbackprinter", "DeskJet_3630")?
            .set_default("cups.media", "A4")?
            .set_default("maintenance.thresholddays", 7)?
            .set_default("maintenance.historyorder", "positional")?
            .set_default("tools.lpstat", "lpstat")?
            .set_default("tools.lp", "lp")?
            .set_default("tools.convert", "convert")?
            .set_default("tools.timeout", "30s")?
        .build()
}
