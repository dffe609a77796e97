// CrUX API wire models
use crate::domain::metric::MetricKind;
use crate::domain::submission::FormFactor;
use chrono::NaiveDate;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Body of a `records:queryRecord` call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    pub origin: String,
    pub form_factor: FormFactor,
    pub metrics: Vec<&'static str>,
}

impl QueryRequest {
    pub fn new(origin: String, form_factor: FormFactor) -> Self {
        Self {
            origin,
            form_factor,
            metrics: MetricKind::ALL.iter().map(|kind| kind.key()).collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    #[serde(default)]
    pub record: Option<CruxRecord>,
    #[serde(default)]
    pub url_normalization_details: Option<UrlNormalization>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlNormalization {
    pub original_url: String,
    pub normalized_url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordKey {
    #[serde(default)]
    pub form_factor: Option<String>,
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CruxRecord {
    #[serde(default)]
    pub key: RecordKey,
    /// Metric entries in the order the API listed them.
    #[serde(default, deserialize_with = "ordered_metrics")]
    pub metrics: Option<Vec<(String, CruxMetric)>>,
    #[serde(default)]
    pub collection_period: Option<CollectionPeriod>,
}

/// A metric is either a histogram with percentiles or a bag of fractions
/// (e.g. navigation types), which carries no p75.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum CruxMetric {
    Histogram {
        #[serde(default)]
        histogram: Vec<RawHistogramBin>,
        percentiles: Percentiles,
    },
    Fractions {
        #[allow(dead_code)]
        fractions: HashMap<String, f64>,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Percentiles {
    #[serde(default)]
    pub p75: Option<NumberOrString>,
}

impl Percentiles {
    /// p75 as a number; absent, null or unparseable yields NaN.
    pub fn p75_value(&self) -> f64 {
        self.p75.as_ref().map_or(f64::NAN, NumberOrString::as_f64)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawHistogramBin {
    #[allow(dead_code)]
    #[serde(default)]
    pub start: Option<NumberOrString>,
    #[allow(dead_code)]
    #[serde(default)]
    pub end: Option<NumberOrString>,
    #[serde(default)]
    pub density: Option<f64>,
}

#[cfg(test)]
impl RawHistogramBin {
    pub fn with_density(density: f64) -> Self {
        Self {
            start: None,
            end: None,
            density: Some(density),
        }
    }
}

/// CrUX encodes some numbers as strings (CLS p75 is "0.05").
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum NumberOrString {
    Number(f64),
    Text(String),
}

impl NumberOrString {
    /// Numeric value; unparseable text yields NaN.
    pub fn as_f64(&self) -> f64 {
        match self {
            NumberOrString::Number(n) => *n,
            NumberOrString::Text(s) => s.trim().parse().unwrap_or(f64::NAN),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionPeriod {
    pub first_date: CruxDate,
    pub last_date: CruxDate,
}

impl CollectionPeriod {
    pub fn human_readable(&self) -> String {
        format!(
            "{} to {}",
            self.first_date.human_readable(),
            self.last_date.human_readable()
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CruxDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl CruxDate {
    #[cfg(test)]
    pub fn new(year: i32, month: u32, day: u32) -> Self {
        Self { year, month, day }
    }

    /// Long US form, e.g. "January 5, 2024".
    pub fn human_readable(&self) -> String {
        match NaiveDate::from_ymd_opt(self.year, self.month, self.day) {
            Some(date) => date.format("%B %-d, %Y").to_string(),
            None => format!("{:04}-{:02}-{:02}", self.year, self.month, self.day),
        }
    }
}

/// Error payload of a non-2xx response. CrUX nests it under `error`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<ApiErrorDetail>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorDetail {
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiErrorBody {
    pub fn message(self) -> Option<String> {
        self.message
            .or_else(|| self.error.and_then(|e| e.message))
            .filter(|m| !m.trim().is_empty())
    }
}

fn ordered_metrics<'de, D>(deserializer: D) -> Result<Option<Vec<(String, CruxMetric)>>, D::Error>
where
    D: Deserializer<'de>,
{
    // serde_json's preserve_order keeps the map in document order
    let raw: Option<serde_json::Map<String, serde_json::Value>> = Option::deserialize(deserializer)?;
    let Some(raw) = raw else {
        return Ok(None);
    };

    raw.into_iter()
        .map(|(key, value)| {
            serde_json::from_value::<CruxMetric>(value)
                .map(|metric| (key.clone(), metric))
                .map_err(|e| de::Error::custom(format!("metric {}: {}", key, e)))
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_keeps_metric_order_and_shapes() {
        let json = r#"{
            "key": { "origin": "https://example.com", "formFactor": "PHONE" },
            "metrics": {
                "navigation_types": { "fractions": { "navigate": 0.8, "reload": 0.2 } },
                "cumulative_layout_shift": {
                    "histogram": [
                        { "start": "0.00", "end": "0.10", "density": 0.9 },
                        { "start": "0.10", "end": "0.25", "density": 0.06 },
                        { "start": "0.25", "density": 0.04 }
                    ],
                    "percentiles": { "p75": "0.03" }
                },
                "largest_contentful_paint": {
                    "histogram": [],
                    "percentiles": { "p75": 1830 }
                }
            },
            "collectionPeriod": {
                "firstDate": { "year": 2024, "month": 1, "day": 5 },
                "lastDate": { "year": 2024, "month": 2, "day": 1 }
            }
        }"#;

        let record: CruxRecord = serde_json::from_str(json).unwrap();
        let metrics = record.metrics.unwrap();
        let keys: Vec<&str> = metrics.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            keys,
            vec!["navigation_types", "cumulative_layout_shift", "largest_contentful_paint"]
        );
        assert!(matches!(metrics[0].1, CruxMetric::Fractions { .. }));
        match &metrics[1].1 {
            CruxMetric::Histogram { histogram, percentiles } => {
                assert_eq!(histogram.len(), 3);
                assert_eq!(percentiles.p75_value(), 0.03);
            }
            other => panic!("unexpected shape: {:?}", other),
        }
        assert_eq!(record.key.form_factor.as_deref(), Some("PHONE"));
    }

    #[test]
    fn test_null_or_missing_p75_still_decodes() {
        let json = r#"{
            "key": {},
            "metrics": {
                "first_contentful_paint": { "histogram": [], "percentiles": { "p75": null } },
                "largest_contentful_paint": { "histogram": [], "percentiles": {} }
            }
        }"#;

        let record: CruxRecord = serde_json::from_str(json).unwrap();
        let metrics = record.metrics.unwrap();
        assert_eq!(metrics.len(), 2);
        for (_, metric) in &metrics {
            match metric {
                CruxMetric::Histogram { percentiles, .. } => {
                    assert_eq!(percentiles.p75, None);
                    assert!(percentiles.p75_value().is_nan());
                }
                other => panic!("unexpected shape: {:?}", other),
            }
        }
    }

    #[test]
    fn test_record_without_metrics() {
        let record: CruxRecord = serde_json::from_str(r#"{ "key": {} }"#).unwrap();
        assert!(record.metrics.is_none());
        assert!(record.collection_period.is_none());
    }

    #[test]
    fn test_number_or_string_parsing() {
        assert_eq!(NumberOrString::Number(12.5).as_f64(), 12.5);
        assert_eq!(NumberOrString::Text(" 2400 ".to_string()).as_f64(), 2400.0);
        assert!(NumberOrString::Text("n/a".to_string()).as_f64().is_nan());
    }

    #[test]
    fn test_human_readable_dates() {
        let period = CollectionPeriod {
            first_date: CruxDate::new(2024, 1, 5),
            last_date: CruxDate::new(2024, 2, 1),
        };
        assert_eq!(period.human_readable(), "January 5, 2024 to February 1, 2024");
        assert_eq!(CruxDate::new(2024, 13, 40).human_readable(), "2024-13-40");
    }

    #[test]
    fn test_query_request_body() {
        let request = QueryRequest::new("https://example.com".to_string(), FormFactor::Tablet);
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["origin"], "https://example.com");
        assert_eq!(value["formFactor"], "TABLET");
        assert_eq!(value["metrics"].as_array().unwrap().len(), 5);
        assert_eq!(value["metrics"][0], "largest_contentful_paint");
    }

    #[test]
    fn test_api_error_message_variants() {
        let flat: ApiErrorBody = serde_json::from_str(r#"{ "message": "quota" }"#).unwrap();
        assert_eq!(flat.message().as_deref(), Some("quota"));

        let nested: ApiErrorBody =
            serde_json::from_str(r#"{ "error": { "code": 404, "message": "chrome ux report data not found" } }"#)
                .unwrap();
        assert_eq!(nested.message().as_deref(), Some("chrome ux report data not found"));

        let empty: ApiErrorBody = serde_json::from_str("{}").unwrap();
        assert_eq!(empty.message(), None);
    }
}
