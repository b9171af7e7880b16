use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use shelterlist::{AnimalRecord, FetchError};

use crate::{ConfigError, PageRequest, RemoteListSource, decode_page};

pub const ENV_BASE_URL: &str = "SHELTERLIST_BASE_URL";
pub const ENV_SERVICE_KEY: &str = "SHELTERLIST_SERVICE_KEY";
pub const ENV_TIMEOUT_MS: &str = "SHELTERLIST_TIMEOUT_MS";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpSourceConfig {
    /// Full endpoint URL, e.g. `https://apis.data.go.kr/1543061/abandonmentPublicService_v2/abandonmentPublic_v2`.
    pub base_url: String,
    pub service_key: String,
    pub timeout: Option<Duration>,
}

impl HttpSourceConfig {
    pub fn new(base_url: impl Into<String>, service_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            service_key: service_key.into(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Reads `SHELTERLIST_BASE_URL`, `SHELTERLIST_SERVICE_KEY` and the optional
    /// `SHELTERLIST_TIMEOUT_MS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url =
            std::env::var(ENV_BASE_URL).map_err(|_| ConfigError::MissingEnv(ENV_BASE_URL))?;
        let service_key =
            std::env::var(ENV_SERVICE_KEY).map_err(|_| ConfigError::MissingEnv(ENV_SERVICE_KEY))?;
        let timeout = match std::env::var(ENV_TIMEOUT_MS) {
            Ok(raw) => {
                let ms = raw.parse::<u64>().map_err(|_| ConfigError::Invalid {
                    name: ENV_TIMEOUT_MS,
                    value: raw.clone(),
                })?;
                Some(Duration::from_millis(ms))
            }
            Err(_) => None,
        };
        Ok(Self::new(base_url, service_key).with_timeout(timeout))
    }
}

/// [`RemoteListSource`] over the registry's HTTP/JSON endpoint.
#[derive(Clone, Debug)]
pub struct HttpListSource {
    http: Client,
    config: HttpSourceConfig,
}

impl HttpListSource {
    pub fn new(config: HttpSourceConfig) -> Result<Self, ConfigError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            config,
        })
    }

    pub fn config(&self) -> &HttpSourceConfig {
        &self.config
    }
}

#[async_trait]
impl RemoteListSource for HttpListSource {
    async fn fetch_page(&self, request: &PageRequest) -> Result<Vec<AnimalRecord>, FetchError> {
        let mut query = request.query_pairs();
        query.push(("serviceKey", self.config.service_key.clone()));

        tracing::debug!(
            target: "shelterlist::http",
            page_no = request.page_no,
            page_size = request.page_size,
            "GET page"
        );
        let res = self
            .http
            .get(&self.config.base_url)
            .query(&query)
            .send()
            .await
            .map_err(|e| FetchError::transport(e.to_string()))?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(FetchError::transport(format!(
                "unexpected status: {status} body={body}"
            )));
        }

        let bytes = res
            .bytes()
            .await
            .map_err(|e| FetchError::transport(e.to_string()))?;
        decode_page(&bytes)
    }
}
