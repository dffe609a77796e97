// Insights service - Fan out one CrUX query per URL and collect every outcome
use crate::application::crux_repository::{CruxError, CruxRepository, NO_METRICS_MESSAGE};
use crate::domain::insights::{transform, PageInsights};
use crate::domain::submission::FormFactor;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

/// Result for one submitted URL: metrics or an error message, never both.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum UrlOutcome {
    Insights(PageInsights),
    Failed { error: String },
}

impl UrlOutcome {
    fn failed(message: impl Into<String>) -> Self {
        UrlOutcome::Failed {
            error: message.into(),
        }
    }

    pub fn insights(&self) -> Option<&PageInsights> {
        match self {
            UrlOutcome::Insights(insights) => Some(insights),
            UrlOutcome::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            UrlOutcome::Insights(_) => None,
            UrlOutcome::Failed { error } => Some(error),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UrlInsights {
    pub url: String,
    #[serde(flatten)]
    pub outcome: UrlOutcome,
}

/// Outcomes of one submission, one entry per submitted URL in submission
/// order. Duplicate URLs keep separate entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InsightsResults {
    entries: Vec<UrlInsights>,
}

impl InsightsResults {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// First outcome recorded for `url`
    #[cfg(test)]
    pub fn get(&self, url: &str) -> Option<&UrlOutcome> {
        self.entries
            .iter()
            .find(|entry| entry.url == url)
            .map(|entry| &entry.outcome)
    }

    pub fn iter(&self) -> impl Iterator<Item = &UrlInsights> {
        self.entries.iter()
    }
}

impl From<Vec<UrlInsights>> for InsightsResults {
    fn from(entries: Vec<UrlInsights>) -> Self {
        Self { entries }
    }
}

impl IntoIterator for InsightsResults {
    type Item = UrlInsights;
    type IntoIter = std::vec::IntoIter<UrlInsights>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[derive(Clone)]
pub struct InsightsService {
    repository: Arc<dyn CruxRepository>,
}

impl InsightsService {
    pub fn new(repository: Arc<dyn CruxRepository>) -> Self {
        Self { repository }
    }

    /// Query every URL concurrently and wait for all of them to settle.
    ///
    /// A failing URL never short-circuits the batch; its error is reported
    /// in its own entry. Nothing is retried.
    pub async fn fetch_all(&self, urls: &[String], form_factor: FormFactor) -> InsightsResults {
        let start_time = Instant::now();

        let queries = urls.iter().map(|url| self.fetch_one(url, form_factor));
        let entries = futures::future::join_all(queries).await;

        let failed = entries
            .iter()
            .filter(|entry| entry.outcome.error().is_some())
            .count();
        tracing::info!(
            "Fetched {} CrUX records for {} ({} failed) in {}ms",
            entries.len(),
            form_factor,
            failed,
            start_time.elapsed().as_millis()
        );

        InsightsResults::from(entries)
    }

    async fn fetch_one(&self, url: &str, form_factor: FormFactor) -> UrlInsights {
        let outcome = match self.repository.query_record(url, form_factor).await {
            Ok(response) => {
                if let Some(record) = &response.record {
                    tracing::debug!(
                        "CrUX record for {}: origin={:?} url={:?} form_factor={:?}",
                        url,
                        record.key.origin,
                        record.key.url,
                        record.key.form_factor
                    );
                }
                if let Some(details) = &response.url_normalization_details {
                    tracing::debug!(
                        "CrUX normalized {} to {}",
                        details.original_url,
                        details.normalized_url
                    );
                }

                match transform(response.record.as_ref()) {
                    Ok(Some(insights)) => {
                        tracing::debug!("{} metrics for {}", insights.metrics.len(), url);
                        UrlOutcome::Insights(insights)
                    }
                    Ok(None) => {
                        tracing::warn!("CrUX response for {} has no record metrics", url);
                        UrlOutcome::failed(NO_METRICS_MESSAGE)
                    }
                    Err(e) => {
                        tracing::error!("Failed to transform CrUX record for {}: {}", url, e);
                        UrlOutcome::failed(e.to_string())
                    }
                }
            }
            Err(e) => {
                match &e {
                    CruxError::Transport(cause) => {
                        tracing::warn!("CrUX request for {} failed: {}", url, cause)
                    }
                    CruxError::Api { status, message } => {
                        tracing::warn!("CrUX returned {} for {}: {}", status, url, message)
                    }
                    CruxError::MalformedBody(cause) => {
                        tracing::warn!("Unreadable CrUX response for {}: {}", url, cause)
                    }
                }
                UrlOutcome::failed(e.to_string())
            }
        };

        UrlInsights {
            url: url.to_string(),
            outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::crux::QueryResponse;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    enum Reply {
        Record(serde_json::Value),
        Transport,
        Malformed,
        Api(u16, &'static str),
    }

    struct FakeRepository {
        delay: Duration,
        replies: HashMap<String, Reply>,
        calls: Mutex<Vec<(String, FormFactor)>>,
    }

    impl FakeRepository {
        fn new(delay: Duration, replies: Vec<(&str, Reply)>) -> Self {
            Self {
                delay,
                replies: replies
                    .into_iter()
                    .map(|(url, reply)| (url.to_string(), reply))
                    .collect(),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl CruxRepository for FakeRepository {
        async fn query_record(
            &self,
            origin: &str,
            form_factor: FormFactor,
        ) -> Result<QueryResponse, CruxError> {
            self.calls
                .lock()
                .unwrap()
                .push((origin.to_string(), form_factor));
            tokio::time::sleep(self.delay).await;

            match self.replies.get(origin) {
                Some(Reply::Record(body)) => Ok(serde_json::from_value(body.clone()).unwrap()),
                Some(Reply::Transport) | None => {
                    Err(CruxError::Transport("operation timed out".to_string()))
                }
                Some(Reply::Malformed) => Err(CruxError::MalformedBody(
                    "expected value at line 1 column 1".to_string(),
                )),
                Some(Reply::Api(status, message)) => Err(CruxError::Api {
                    status: *status,
                    message: message.to_string(),
                }),
            }
        }
    }

    fn lcp_response() -> serde_json::Value {
        serde_json::json!({
            "record": {
                "key": { "origin": "https://ok.example" },
                "metrics": {
                    "largest_contentful_paint": {
                        "histogram": [
                            { "start": 0, "end": 2500, "density": 0.8 },
                            { "start": 2500, "end": 4000, "density": 0.15 },
                            { "start": 4000, "density": 0.05 }
                        ],
                        "percentiles": { "p75": 1900 }
                    }
                },
                "collectionPeriod": {
                    "firstDate": { "year": 2024, "month": 5, "day": 1 },
                    "lastDate": { "year": 2024, "month": 5, "day": 28 }
                }
            }
        })
    }

    fn urls(list: &[&str]) -> Vec<String> {
        list.iter().map(|u| u.to_string()).collect()
    }

    #[tokio::test]
    async fn test_partial_failures_are_isolated() {
        let repository = Arc::new(FakeRepository::new(
            Duration::from_millis(300),
            vec![
                ("https://slow.example", Reply::Transport),
                ("https://broken.example", Reply::Malformed),
                ("https://ok.example", Reply::Record(lcp_response())),
            ],
        ));
        let service = InsightsService::new(repository.clone());

        let started = Instant::now();
        let results = service
            .fetch_all(
                &urls(&["https://slow.example", "https://broken.example", "https://ok.example"]),
                FormFactor::Phone,
            )
            .await;
        let elapsed = started.elapsed();

        assert_eq!(results.len(), 3);
        assert!(
            elapsed < Duration::from_millis(800),
            "requests ran sequentially: {:?}",
            elapsed
        );

        let succeeded: Vec<&UrlInsights> = results
            .iter()
            .filter(|entry| entry.outcome.insights().is_some())
            .collect();
        assert_eq!(succeeded.len(), 1);
        assert_eq!(succeeded[0].url, "https://ok.example");

        let slow = results.get("https://slow.example").unwrap().error().unwrap();
        let broken = results.get("https://broken.example").unwrap().error().unwrap();
        assert_eq!(slow, "No result received from Google CrUX API");
        assert_eq!(broken, NO_METRICS_MESSAGE);
        assert_ne!(slow, broken);

        let calls = repository.calls.lock().unwrap();
        assert!(calls.iter().all(|(_, ff)| *ff == FormFactor::Phone));
    }

    #[tokio::test]
    async fn test_api_error_message_is_reported() {
        let repository = Arc::new(FakeRepository::new(
            Duration::ZERO,
            vec![("https://missing.example", Reply::Api(404, "chrome ux report data not found"))],
        ));
        let service = InsightsService::new(repository);

        let results = service
            .fetch_all(&urls(&["https://missing.example"]), FormFactor::Desktop)
            .await;

        assert_eq!(
            results.get("https://missing.example").and_then(|o| o.error()),
            Some("chrome ux report data not found")
        );
    }

    #[tokio::test]
    async fn test_response_without_record_has_no_metrics() {
        let repository = Arc::new(FakeRepository::new(
            Duration::ZERO,
            vec![
                ("https://empty.example", Reply::Record(serde_json::json!({}))),
                (
                    "https://odd.example",
                    Reply::Record(serde_json::json!({
                        "record": {
                            "key": {},
                            "metrics": {
                                "round_trip_time": {
                                    "histogram": [],
                                    "percentiles": { "p75": 100 }
                                }
                            }
                        }
                    })),
                ),
            ],
        ));
        let service = InsightsService::new(repository);

        let results = service
            .fetch_all(
                &urls(&["https://empty.example", "https://odd.example"]),
                FormFactor::Desktop,
            )
            .await;

        assert_eq!(
            results.get("https://empty.example").and_then(|o| o.error()),
            Some(NO_METRICS_MESSAGE)
        );
        assert_eq!(
            results.get("https://odd.example").and_then(|o| o.error()),
            Some("Unrecognized metric kind: round_trip_time")
        );
    }

    #[tokio::test]
    async fn test_duplicate_urls_keep_separate_entries() {
        let repository = Arc::new(FakeRepository::new(
            Duration::ZERO,
            vec![("https://ok.example", Reply::Record(lcp_response()))],
        ));
        let service = InsightsService::new(repository.clone());

        let results = service
            .fetch_all(
                &urls(&["https://ok.example", "https://ok.example"]),
                FormFactor::Tablet,
            )
            .await;

        assert_eq!(results.len(), 2);
        assert_eq!(repository.calls.lock().unwrap().len(), 2);
        let entries: Vec<UrlInsights> = results.into_iter().collect();
        assert_eq!(entries[0], entries[1]);
    }

    #[tokio::test]
    async fn test_outcome_serializes_as_data_or_error() {
        let repository = Arc::new(FakeRepository::new(
            Duration::ZERO,
            vec![("https://ok.example", Reply::Record(lcp_response()))],
        ));
        let service = InsightsService::new(repository);

        let results = service
            .fetch_all(
                &urls(&["https://ok.example", "https://down.example"]),
                FormFactor::Desktop,
            )
            .await;
        let json: Vec<serde_json::Value> = results
            .iter()
            .map(|entry| serde_json::to_value(entry).unwrap())
            .collect();

        assert_eq!(json[0]["url"], "https://ok.example");
        assert_eq!(json[0]["metrics"][0]["status"], "Good");
        assert_eq!(json[0]["collectionPeriod"]["lastDate"]["day"], 28);
        assert!(json[0].get("error").is_none());

        assert_eq!(json[1]["url"], "https://down.example");
        assert_eq!(json[1]["error"], "No result received from Google CrUX API");
        assert!(json[1].get("metrics").is_none());
    }
}
