use serde::Deserialize;
use vacancy_core::AppError;

pub const DEFAULT_BASE_URL: &str = "https://api.hh.ru";
pub const DEFAULT_USER_AGENT: &str = "vacancies/0.1 (hh.ru ingestion)";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Settings from the optional `[api]` section of the config file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ApiConfig {
    pub const SECTION: &'static str = "api";

    /// Parse the `[api]` section out of TOML text, falling back to defaults
    /// when it is absent.
    pub fn from_toml_str(text: &str, origin: &str) -> Result<Self, AppError> {
        let table: toml::Table = toml::from_str(text)
            .map_err(|e| AppError::ConfigError(format!("Invalid TOML in {origin}: {e}")))?;

        let Some(section) = table.get(Self::SECTION).cloned() else {
            return Ok(Self::default());
        };

        let config: Self = section.try_into().map_err(|e| {
            AppError::ConfigError(format!("Invalid [{}] section in {origin}: {e}", Self::SECTION))
        })?;

        if config.timeout_secs == 0 {
            return Err(AppError::ConfigError(
                "api.timeout_secs must be at least 1".into(),
            ));
        }

        Ok(config)
    }
}
