// Page insights - CrUX record to UI-ready metrics
use crate::domain::crux::{CollectionPeriod, CruxMetric, CruxRecord};
use crate::domain::distribution::{normalize, DistributionBucket, NormalizeError};
use crate::domain::metric::{classify, MetricKind, QualityStatus};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metric {
    pub id: String,
    pub name: String,
    pub description: String,
    pub link: String,
    pub value: f64,
    pub status: QualityStatus,
    pub distributions: [DistributionBucket; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInsights {
    pub metrics: Vec<Metric>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection_period: Option<CollectionPeriod>,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum TransformError {
    #[error("Unrecognized metric kind: {0}")]
    UnknownMetricKind(String),

    #[error("Invalid histogram for {metric}: {source}")]
    Distribution {
        metric: String,
        #[source]
        source: NormalizeError,
    },
}

/// Turn a CrUX record into classified metrics.
///
/// Returns `Ok(None)` when there is no record or it carries no metrics.
/// Fraction-only entries are skipped; an unknown metric key is an error.
pub fn transform(record: Option<&CruxRecord>) -> Result<Option<PageInsights>, TransformError> {
    let Some(record) = record else {
        return Ok(None);
    };
    let Some(entries) = &record.metrics else {
        return Ok(None);
    };

    let mut metrics = Vec::with_capacity(entries.len());
    for (key, entry) in entries {
        let (histogram, percentiles) = match entry {
            CruxMetric::Histogram {
                histogram,
                percentiles,
            } => (histogram, percentiles),
            CruxMetric::Fractions { .. } => continue,
        };

        let value = percentiles.p75_value();
        if value.is_nan() {
            tracing::warn!("Unparseable p75 for {}: {:?}", key, percentiles.p75);
        }

        let kind = MetricKind::from_key(key)
            .ok_or_else(|| TransformError::UnknownMetricKind(key.clone()))?;

        let distributions = normalize(histogram).map_err(|source| TransformError::Distribution {
            metric: key.clone(),
            source,
        })?;

        metrics.push(Metric {
            id: key.clone(),
            name: kind.name().to_string(),
            description: kind.description().to_string(),
            link: kind.link().to_string(),
            value,
            status: classify(value, kind.thresholds()),
            distributions,
        });
    }

    Ok(Some(PageInsights {
        metrics,
        collection_period: record.collection_period,
    }))
}
