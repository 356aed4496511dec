use std::path::Path;

use serde::Deserialize;
use sqlx::postgres::PgConnectOptions;
use vacancy_core::AppError;

/// Connection settings from the `[postgresql]` section of the config file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DatabaseConfig {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub database: String,
    pub user: String,
    #[serde(default)]
    pub password: Option<String>,
    /// Defaults to 1: the process holds a single connection for its lifetime.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_port() -> u16 {
    5432
}

fn default_max_connections() -> u32 {
    1
}

impl DatabaseConfig {
    pub const SECTION: &'static str = "postgresql";

    /// Read the `[postgresql]` section from a TOML file.
    ///
    /// A missing file or a missing section is a `ConfigError`.
    pub fn from_file(path: &Path) -> Result<Self, AppError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            AppError::ConfigError(format!("Failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&text, &path.display().to_string())
    }

    /// Parse the `[postgresql]` section out of TOML text. `origin` names the
    /// source in error messages.
    pub fn from_toml_str(text: &str, origin: &str) -> Result<Self, AppError> {
        let table: toml::Table = toml::from_str(text)
            .map_err(|e| AppError::ConfigError(format!("Invalid TOML in {origin}: {e}")))?;

        let section = table.get(Self::SECTION).cloned().ok_or_else(|| {
            AppError::ConfigError(format!(
                "Section [{}] not found in {origin}",
                Self::SECTION
            ))
        })?;

        let config: Self = section.try_into().map_err(|e| {
            AppError::ConfigError(format!("Invalid [{}] section in {origin}: {e}", Self::SECTION))
        })?;

        if config.max_connections == 0 {
            return Err(AppError::ConfigError(
                "postgresql.max_connections must be at least 1".into(),
            ));
        }

        Ok(config)
    }

    pub fn connect_options(&self) -> PgConnectOptions {
        let options = PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.database)
            .username(&self.user);
        match &self.password {
            Some(password) => options.password(password),
            None => options,
        }
    }
}
