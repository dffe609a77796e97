// CrUX API repository implementation
use crate::application::crux_repository::{CruxError, CruxRepository};
use crate::domain::crux::{ApiErrorBody, QueryRequest, QueryResponse};
use crate::domain::submission::FormFactor;
use crate::infrastructure::config::CruxSettings;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};

const UNKNOWN_ERROR_MESSAGE: &str = "An unknown error occurred.";

#[derive(Clone)]
pub struct HttpCruxRepository {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl HttpCruxRepository {
    pub fn new(settings: &CruxSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .context("Failed to build CrUX HTTP client")?;

        Ok(Self {
            client,
            endpoint: settings.api_endpoint.clone(),
            api_key: settings.api_key.clone(),
        })
    }

    fn build_query_url(&self) -> String {
        let separator = if self.endpoint.contains('?') { '&' } else { '?' };
        format!(
            "{}{}key={}",
            self.endpoint,
            separator,
            urlencoding::encode(&self.api_key)
        )
    }

    /// Message for a non-2xx body: its `message`, else the status, else a
    /// generic text when the body is not JSON.
    fn error_message(status: reqwest::StatusCode, body: &str) -> String {
        match serde_json::from_str::<ApiErrorBody>(body) {
            Ok(parsed) => parsed
                .message()
                .unwrap_or_else(|| format!("HTTP error! status: {}", status.as_u16())),
            Err(_) => UNKNOWN_ERROR_MESSAGE.to_string(),
        }
    }
}

#[async_trait]
impl CruxRepository for HttpCruxRepository {
    async fn query_record(
        &self,
        origin: &str,
        form_factor: FormFactor,
    ) -> Result<QueryResponse, CruxError> {
        let request = QueryRequest::new(origin.to_string(), form_factor);

        tracing::debug!("Querying CrUX for {} ({})", origin, form_factor);
        // without_url: the request URL carries the API key
        let response = self
            .client
            .post(self.build_query_url())
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| CruxError::Transport(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CruxError::Api {
                status: status.as_u16(),
                message: Self::error_message(status, &body),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| CruxError::Transport(e.without_url().to_string()))?;

        serde_json::from_slice::<QueryResponse>(&body)
            .map_err(|e| CruxError::MalformedBody(e.to_string()))
    }
}
