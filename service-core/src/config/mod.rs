use crate::error::CoreError;
use config::{Config as Cfg, Environment, File};
use serde::de::DeserializeOwned;

/// Name of the optional settings file looked up in the working directory
/// (any extension the `config` crate understands: `.toml`, `.json`, `.yaml`).
pub const SETTINGS_FILE: &str = "configuration";

/// Load typed settings from `.env`, an optional `configuration` file and the
/// process environment, in increasing order of precedence.
///
/// Environment keys are matched case-insensitively against the field names of
/// `T`, so `STRIPE_SECRET_KEY` fills `stripe_secret_key`.
pub fn load<T: DeserializeOwned>() -> Result<T, CoreError> {
    dotenvy::dotenv().ok();
    load_from(SETTINGS_FILE)
}

/// Same as [`load`] but reads the settings file from `file_stem` and skips `.env`.
pub fn load_from<T: DeserializeOwned>(file_stem: &str) -> Result<T, CoreError> {
    let config = Cfg::builder()
        .add_source(File::with_name(file_stem).required(false))
        .add_source(Environment::default())
        .build()?;

    Ok(config.try_deserialize()?)
}
