use std::path::PathBuf;

use anyhow::{anyhow, Context};
use serde::Deserialize;

const DEFAULT_ENV: &str = "local";
const ENV_VAR_NAME: &str = "BOOKSTORE_ENV";
const CONFIG_DIR_ENV: &str = "BOOKSTORE_CONFIG_DIR";
const ENV_PREFIX: &str = "BOOKSTORE";

/// Deployment environment the application is running in.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Local,
    Staging,
    Production,
}

impl std::str::FromStr for Environment {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "local" => Ok(Environment::Local),
            "staging" => Ok(Environment::Staging),
            "production" => Ok(Environment::Production),
            other => Err(anyhow!(
                "unsupported environment '{}'; expected local/staging/production",
                other
            )),
        }
    }
}

/// Top-level configuration structure loaded from layered sources.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub telemetry: TelemetrySettings,
}

impl Settings {
    /// Load configuration by layering `.env`, base file, and environment overlay.
    pub fn load() -> anyhow::Result<Self> {
        // Allow missing `.env` files without failing.
        let _ = dotenvy::dotenv();

        let environment = std::env::var(ENV_VAR_NAME).unwrap_or_else(|_| DEFAULT_ENV.to_string());
        let config_dir = match std::env::var(CONFIG_DIR_ENV) {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => std::env::current_dir()
                .context("unable to resolve current directory")?
                .join("config"),
        };

        Self::load_from(&config_dir, &environment)
    }

    /// Load configuration from an explicit config directory and environment name.
    pub fn load_from(config_dir: &std::path::Path, environment: &str) -> anyhow::Result<Self> {
        let environment_kind: Environment = environment.parse()?;

        let base_path = config_dir.join("base.toml");
        let environment_path = config_dir.join(format!("{}.toml", environment));

        let builder = config::Config::builder()
            .add_source(config::File::from(base_path).required(false))
            .add_source(config::File::from(environment_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let cfg = builder
            .build()
            .with_context(|| "failed to build configuration")?;

        let mut settings: Settings = cfg
            .try_deserialize()
            .with_context(|| "failed to deserialize configuration")?;

        // The selector variable wins over any `environment` key in the files.
        settings.environment = environment_kind;
        settings.validate()?;

        Ok(settings)
    }

    /// Reject combinations where the HTTP timeout would cut off a database
    /// error before the driver reports it.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.database.timeout_ms >= self.server.request_timeout_ms {
            return Err(anyhow!(
                "database.timeout_ms ({}) must be lower than server.request_timeout_ms ({})",
                self.database.timeout_ms,
                self.server.request_timeout_ms
            ));
        }
        Ok(())
    }

    /// Socket address string the HTTP server binds to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "ServerSettings::default_host")]
    pub host: String,
    #[serde(default = "ServerSettings::default_port")]
    pub port: u16,
    #[serde(default = "ServerSettings::default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl ServerSettings {
    fn default_host() -> String {
        "0.0.0.0".to_string()
    }

    fn default_port() -> u16 {
        4000
    }

    fn default_request_timeout_ms() -> u64 {
        15000
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
            request_timeout_ms: Self::default_request_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default)]
    pub mysql: MySqlSettings,
    #[serde(default)]
    pub mongodb: MongoSettings,
    /// Connection acquire / server selection timeout for both stores
    #[serde(default = "DatabaseSettings::default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            mysql: MySqlSettings::default(),
            mongodb: MongoSettings::default(),
            timeout_ms: Self::default_timeout_ms(),
        }
    }
}

impl DatabaseSettings {
    fn default_timeout_ms() -> u64 {
        5000
    }

    /// Borrow these settings as driver connect options.
    pub fn connect_options(&self) -> bookstore_db::ConnectOptions<'_> {
        bookstore_db::ConnectOptions {
            mysql_url: &self.mysql.url,
            mysql_max_connections: self.mysql.max_connections,
            mongo_uri: &self.mongodb.uri,
            mongo_database: &self.mongodb.database,
            timeout: std::time::Duration::from_millis(self.timeout_ms),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MySqlSettings {
    #[serde(default = "MySqlSettings::default_url")]
    pub url: String,
    #[serde(default = "MySqlSettings::default_max_connections")]
    pub max_connections: u32,
}

impl MySqlSettings {
    fn default_url() -> String {
        "mysql://root@localhost:3306/product".to_string()
    }

    fn default_max_connections() -> u32 {
        5
    }
}

impl Default for MySqlSettings {
    fn default() -> Self {
        Self {
            url: Self::default_url(),
            max_connections: Self::default_max_connections(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MongoSettings {
    #[serde(default = "MongoSettings::default_uri")]
    pub uri: String,
    #[serde(default = "MongoSettings::default_database")]
    pub database: String,
}

impl MongoSettings {
    fn default_uri() -> String {
        "mongodb://localhost:27017".to_string()
    }

    fn default_database() -> String {
        "bookstore".to_string()
    }
}

impl Default for MongoSettings {
    fn default() -> Self {
        Self {
            uri: Self::default_uri(),
            database: Self::default_database(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelemetrySettings {
    #[serde(default)]
    pub log_format: LogFormat,
    #[serde(default = "TelemetrySettings::default_log_level")]
    pub log_level: String,
}

impl TelemetrySettings {
    fn default_log_level() -> String {
        "info".to_string()
    }
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Pretty,
            log_level: Self::default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_environment_is_local() {
        let settings = Settings::default();
        assert_eq!(settings.environment, Environment::Local);
    }

    #[test]
    fn default_port_matches_legacy_server() {
        let settings = Settings::default();
        assert_eq!(settings.server.port, 4000);
        assert_eq!(settings.bind_address(), "0.0.0.0:4000");
    }

    #[test]
    fn default_database_targets_localhost() {
        let settings = Settings::default();
        assert_eq!(
            settings.database.mysql.url,
            "mysql://root@localhost:3306/product"
        );
        assert_eq!(settings.database.mongodb.uri, "mongodb://localhost:27017");
        assert_eq!(settings.database.mongodb.database, "bookstore");
    }

    #[test]
    fn default_database_timeout_is_below_request_timeout() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(
            settings.database.connect_options().timeout,
            std::time::Duration::from_millis(5000)
        );
    }

    #[test]
    fn database_timeout_at_request_timeout_is_rejected() {
        let mut settings = Settings::default();
        settings.database.timeout_ms = settings.server.request_timeout_ms;
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("database.timeout_ms"));
    }

    #[test]
    fn unknown_environment_is_rejected() {
        let err = "qa".parse::<Environment>().unwrap_err();
        assert!(err.to_string().contains("unsupported environment 'qa'"));
    }

    #[test]
    fn missing_config_files_fall_back_to_defaults() {
        let dir = std::env::temp_dir().join("bookstore-settings-missing");
        let settings = Settings::load_from(&dir, "staging").unwrap();
        assert_eq!(settings.environment, Environment::Staging);
        assert_eq!(settings.telemetry.log_format, LogFormat::Pretty);
    }
}
