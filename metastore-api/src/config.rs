use std::{str::FromStr, time::Duration};

use config::ConfigError;
use serde::Deserialize;
use serde_with::serde_as;
use strum::{Display, EnumString};

#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub elasticsearch: ElasticsearchSettings,
    #[serde(default)]
    pub auth: AuthSettings,
}

#[serde_as]
#[derive(Deserialize, Clone, Debug)]
pub struct ApplicationSettings {
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub port: u16,
    pub host: String,
    /// Path the search routes are mounted under, e.g. `/metastore`.
    #[serde(default)]
    pub route_prefix: String,
    /// Origins allowed by CORS. Empty allows any origin.
    #[serde(default)]
    pub cors_allowed_origins: Vec<String>,
}

#[serde_as]
#[derive(Deserialize, Clone, Debug)]
pub struct ElasticsearchSettings {
    pub address: String,
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub request_timeout_secs: u64,
}

impl ElasticsearchSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Deserialize, Clone, Default)]
pub struct AuthSettings {
    /// Key caller tokens are verified with. Without it every caller is
    /// anonymous.
    pub private_key: Option<String>,
}

impl std::fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSettings")
            .field("private_key", &self.private_key.as_ref().map(|_| "[redacted]"))
            .finish()
    }
}

/// Environment variables read by earlier deployments, mapped to their
/// settings keys.
const LEGACY_OVERRIDES: [(&str, &str); 3] = [
    ("DATAHUB_ELASTICSEARCH_ADDRESS", "elasticsearch.address"),
    ("PRIVATE_KEY", "auth.private_key"),
    ("PORT", "application.port"),
];

pub fn read_config() -> Result<Settings, ConfigError> {
    let base_path = std::env::current_dir().map_err(|e| {
        ConfigError::Message(format!("Failed to determine the current directory: {e}"))
    })?;
    let config_directory = base_path.join("config");

    let environment = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "local".into());
    let environment = Environment::from_str(&environment).map_err(|_| {
        ConfigError::Message(format!("Failed to parse APP_ENVIRONMENT: {environment}"))
    })?;
    let environment_filename = format!("{}.yaml", environment);

    let mut builder = config::Config::builder()
        .add_source(config::File::from(config_directory.join("base.yaml")))
        .add_source(
            config::File::from(config_directory.join(environment_filename)).required(false),
        )
        .add_source(
            config::Environment::with_prefix("METASTORE")
                .prefix_separator("_")
                .separator("__"),
        );

    for (var, key) in LEGACY_OVERRIDES {
        builder = builder.set_override_option(key, std::env::var(var).ok())?;
    }

    builder.build()?.try_deserialize::<Settings>()
}

#[derive(Display, Debug, EnumString)]
pub enum Environment {
    #[strum(ascii_case_insensitive, serialize = "local")]
    Local,
    #[strum(ascii_case_insensitive, serialize = "production")]
    Production,
}
