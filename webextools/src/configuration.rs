use secrecy::SecretString;
use serde_aux::field_attributes::deserialize_number_from_string;
use std::path::PathBuf;
use std::time::Duration;
use webex_api::{ClientOptions, DEFAULT_BASE_URL};

/// Configuration file looked up when `--config` is not given; any extension
/// supported by the `config` crate works (`webextools.yaml`, `webextools.toml`, ...).
pub const DEFAULT_CONFIG_FILE: &str = "webextools";

#[derive(serde::Deserialize, Debug)]
pub struct Settings {
    pub api: ApiSettings,
    pub logging: LoggingSettings,
    pub report: ReportSettings,
}

#[derive(serde::Deserialize, Debug)]
pub struct ApiSettings {
    pub base_url: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_seconds: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_retries: u32,
    /// Takes precedence over the `WEBEX_TEAMS_ACCESS_TOKEN` environment variable.
    #[serde(default)]
    pub access_token: Option<SecretString>,
}

impl ApiSettings {
    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            base_url: self.base_url.clone(),
            timeout: Duration::from_secs(self.timeout_seconds),
            max_retries: self.max_retries,
        }
    }
}

#[derive(serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines on stderr.
    Pretty,
    /// Bunyan-style JSON records.
    Bunyan,
}

#[derive(serde::Deserialize, Debug)]
pub struct LoggingSettings {
    pub format: LogFormat,
}

#[derive(serde::Deserialize, Debug)]
pub struct ReportSettings {
    /// Where disable-users reports are written.
    pub directory: PathBuf,
}

/// Layers built-in defaults, the configuration file, and
/// `WEBEXTOOLS__<SECTION>__<KEY>` environment variables, in increasing priority.
///
/// A file named in `path` must exist; without one, `DEFAULT_CONFIG_FILE` is read if present.
pub fn get_configuration(path: Option<&str>) -> Result<Settings, config::ConfigError> {
    build_settings(path, environment())
}

fn environment() -> config::Environment {
    config::Environment::with_prefix("WEBEXTOOLS")
        .prefix_separator("__")
        .separator("__")
}

fn build_settings(
    path: Option<&str>,
    environment: config::Environment,
) -> Result<Settings, config::ConfigError> {
    let file = match path {
        Some(path) => config::File::with_name(path).required(true),
        None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
    };
    let settings = config::Config::builder()
        .set_default("api.base_url", DEFAULT_BASE_URL)?
        .set_default("api.timeout_seconds", 10_u64)?
        .set_default("api.max_retries", 6_u64)?
        .set_default("logging.format", "pretty")?
        .set_default("report.directory", ".")?
        .add_source(file)
        .add_source(environment)
        .build()?;

    settings.try_deserialize::<Settings>()
}
