// Report shaping - Filter, sort and summarize fetched insights for display
use crate::application::insights_service::{InsightsResults, UrlInsights};
use crate::domain::insights::Metric;
use crate::domain::metric::{MetricKind, QualityStatus, ThresholdPair};
use crate::domain::submission::{FormFactor, Submission};
use serde::{Deserialize, Serialize};

/// Display filters. Empty lists select everything.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ReportFilter {
    #[serde(default)]
    pub metrics: Vec<String>,
    #[serde(default)]
    pub statuses: Vec<QualityStatus>,
    /// Status to pull to the top; the rest follow by rank.
    #[serde(default)]
    pub sort: Option<QualityStatus>,
}

impl ReportFilter {
    pub fn matches(&self, metric: &Metric) -> bool {
        (self.metrics.is_empty() || self.metrics.contains(&metric.id))
            && (self.statuses.is_empty() || self.statuses.contains(&metric.status))
    }

    pub fn apply(&self, metrics: &[Metric]) -> Vec<Metric> {
        let mut selected: Vec<Metric> = metrics
            .iter()
            .filter(|metric| self.matches(metric))
            .cloned()
            .collect();

        if let Some(first) = self.sort {
            // stable: equal keys keep record order
            selected.sort_by_key(|metric| (metric.status != first, metric.status.rank()));
        }

        selected
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UrlMetrics {
    pub url: String,
    pub metrics: Vec<Metric>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UrlError {
    pub url: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UrlCollectionPeriod {
    pub url: String,
    pub period: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightsReport {
    pub submission: Submission,
    pub results: Vec<UrlInsights>,
    pub insights: Vec<UrlMetrics>,
    pub errors: Vec<UrlError>,
    pub collection_periods: Vec<UrlCollectionPeriod>,
}

impl InsightsReport {
    pub fn build(submission: Submission, results: InsightsResults, filter: &ReportFilter) -> Self {
        let mut insights = Vec::new();
        let mut errors = Vec::new();
        let mut collection_periods = Vec::new();

        for entry in results.iter() {
            if let Some(page) = entry.outcome.insights() {
                insights.push(UrlMetrics {
                    url: entry.url.clone(),
                    metrics: filter.apply(&page.metrics),
                });
                if let Some(period) = &page.collection_period {
                    collection_periods.push(UrlCollectionPeriod {
                        url: entry.url.clone(),
                        period: period.human_readable(),
                    });
                }
            }
            if let Some(message) = entry.outcome.error() {
                errors.push(UrlError {
                    url: entry.url.clone(),
                    message: message.to_string(),
                });
            }
        }

        Self {
            submission,
            results: results.into_iter().collect(),
            insights,
            errors,
            collection_periods,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricOption {
    pub value: &'static str,
    pub label: &'static str,
    pub description: &'static str,
    pub link: &'static str,
    pub thresholds: ThresholdPair,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusOption {
    pub value: QualityStatus,
    pub label: &'static str,
}

/// Choices a front end offers for filtering and device selection.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportOptions {
    pub metrics: Vec<MetricOption>,
    pub statuses: Vec<StatusOption>,
    pub form_factors: Vec<FormFactor>,
}

impl ReportOptions {
    pub fn catalog() -> Self {
        Self {
            metrics: MetricKind::ALL
                .into_iter()
                .map(|kind| MetricOption {
                    value: kind.key(),
                    label: kind.name(),
                    description: kind.description(),
                    link: kind.link(),
                    thresholds: kind.thresholds(),
                })
                .collect(),
            statuses: QualityStatus::ALL
                .into_iter()
                .map(|status| StatusOption {
                    value: status,
                    label: status.label(),
                })
                .collect(),
            form_factors: FormFactor::ALL.to_vec(),
        }
    }
}
