use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// The hosted backend holding rows and auth identities.
#[derive(Debug, Deserialize)]
pub struct Backend {
    pub url: String,
    pub api_key: String,
}

/// The separate coupon service.
#[derive(Debug, Deserialize)]
pub struct Coupons {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct Http {
    pub bind: String,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub backend: Backend,
    pub coupons: Coupons,
    pub http: Http,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name("config.toml"))
            .add_source(Environment::with_prefix("LOUNGE").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
