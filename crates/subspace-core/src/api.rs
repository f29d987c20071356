use std::time::Duration;

use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::ApiError;
use crate::models::{ActivityRecord, AutomationStatus, StartRequest};

pub const STATUS_PATH: &str = "/api/status";
pub const DATA_PATH: &str = "/api/data";
pub const START_PATH: &str = "/api/start";
pub const STOP_PATH: &str = "/api/stop";

/// Acknowledgement body the backend sends for start/stop.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CommandAck {
    #[serde(default)]
    pub message: Option<String>,
}

/// HTTP client for the automation backend.
///
/// Every call is a single attempt. Callers decide what a failure means.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let trimmed = base_url.trim().trim_end_matches('/');
        match Url::parse(trimmed) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            _ => return Err(ApiError::InvalidBaseUrl(base_url.to_string())),
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ApiError::Client)?;

        Ok(Self {
            client,
            base_url: trimmed.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn status(&self) -> Result<AutomationStatus, ApiError> {
        let response = self.send(STATUS_PATH, self.client.get(self.url(STATUS_PATH))).await?;
        decode(STATUS_PATH, response).await
    }

    /// A `null` body means no records yet.
    pub async fn activities(&self) -> Result<Vec<ActivityRecord>, ApiError> {
        let response = self.send(DATA_PATH, self.client.get(self.url(DATA_PATH))).await?;
        let records: Option<Vec<ActivityRecord>> = decode(DATA_PATH, response).await?;
        Ok(records.unwrap_or_default())
    }

    pub async fn start(&self, request: &StartRequest) -> Result<CommandAck, ApiError> {
        let builder = self.client.post(self.url(START_PATH)).json(request);
        let response = self.send(START_PATH, builder).await?;
        Ok(acknowledgement(response).await)
    }

    pub async fn stop(&self) -> Result<CommandAck, ApiError> {
        let builder = self
            .client
            .post(self.url(STOP_PATH))
            .json(&serde_json::json!({}));
        let response = self.send(STOP_PATH, builder).await?;
        Ok(acknowledgement(response).await)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(
        &self,
        endpoint: &'static str,
        builder: reqwest::RequestBuilder,
    ) -> Result<Response, ApiError> {
        let response = builder
            .send()
            .await
            .map_err(|source| ApiError::Transport { endpoint, source })?;

        if !response.status().is_success() {
            return Err(ApiError::Status {
                endpoint,
                status: response.status().as_u16(),
            });
        }

        Ok(response)
    }
}

async fn decode<T: DeserializeOwned>(
    endpoint: &'static str,
    response: Response,
) -> Result<T, ApiError> {
    let body = response
        .text()
        .await
        .map_err(|source| ApiError::Transport { endpoint, source })?;
    serde_json::from_str(&body).map_err(|source| ApiError::Decode { endpoint, source })
}

// Any 2xx is an accept; the body is informational only.
async fn acknowledgement(response: Response) -> CommandAck {
    match response.text().await {
        Ok(body) => serde_json::from_str(&body).unwrap_or_default(),
        Err(_) => CommandAck::default(),
    }
}
