use std::time::Duration;

use reqwest::{Client, StatusCode};
use tracing::debug;
use url::Url;
use vacancy_core::error::AppError;
use vacancy_core::traits::VacancySource;

use crate::config::ApiConfig;

/// Client for the hh.ru vacancy search endpoint.
///
/// One `GET {base_url}/vacancies?employer_id=<id>` per employer. No paging
/// and no retries: a failed request is reported to the caller as is.
#[derive(Clone)]
pub struct HhClient {
    client: Client,
    base_url: Url,
    timeout_secs: u64,
}

impl HhClient {
    pub fn new(config: &ApiConfig) -> Result<Self, AppError> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            AppError::ConfigError(format!("Invalid api.base_url '{}': {e}", config.base_url))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(AppError::ConfigError(format!(
                "api.base_url '{}' cannot be used as a base URL",
                config.base_url
            )));
        }

        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::HttpError(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            timeout_secs: config.timeout_secs,
        })
    }

    /// The listing URL for one employer.
    pub fn vacancies_url(&self, employer_id: i64) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("vacancies");
        }
        url.query_pairs_mut()
            .append_pair("employer_id", &employer_id.to_string());
        url
    }
}

impl VacancySource for HhClient {
    async fn fetch_vacancies(&self, employer_id: i64) -> Result<serde_json::Value, AppError> {
        let url = self.vacancies_url(employer_id);
        debug!(employer_id, %url, "Requesting vacancies");

        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            if e.is_timeout() {
                AppError::Timeout(self.timeout_secs)
            } else if e.is_connect() {
                AppError::NetworkError(format!("Connection failed: {e}"))
            } else {
                AppError::HttpError(e.to_string())
            }
        })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(AppError::HttpError(format!(
                "HTTP {} for {}",
                status.as_u16(),
                url
            )));
        }

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                AppError::Timeout(self.timeout_secs)
            } else {
                AppError::HttpError(format!("Failed to read response body: {e}"))
            }
        })?;

        Ok(serde_json::from_str(&body)?)
    }
}
