// Histogram to percentage distribution
use crate::domain::crux::RawHistogramBin;
use crate::domain::metric::QualityStatus;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DistributionBucket {
    #[serde(rename = "name")]
    pub label: QualityStatus,
    pub percentage: f64,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum NormalizeError {
    #[error("histogram has {found} bins, expected 3")]
    MissingBins { found: usize },
}

/// Scale the good/mid/poor bin densities to percentages.
///
/// Densities are already fractions of one, so each bucket is `density * 100`
/// in bin order; the result is not rescaled to the sum. An all-zero (or
/// empty) histogram gives three zero buckets.
pub fn normalize(bins: &[RawHistogramBin]) -> Result<[DistributionBucket; 3], NormalizeError> {
    let density = |bin: &RawHistogramBin| bin.density.unwrap_or(0.0);
    let total: f64 = bins.iter().map(density).sum();

    if total == 0.0 {
        return Ok(QualityStatus::ALL.map(|label| DistributionBucket {
            label,
            percentage: 0.0,
        }));
    }

    let [good, mid, poor, ..] = bins else {
        return Err(NormalizeError::MissingBins { found: bins.len() });
    };

    Ok([
        DistributionBucket {
            label: QualityStatus::Good,
            percentage: density(good) * 100.0,
        },
        DistributionBucket {
            label: QualityStatus::NeedsImprovement,
            percentage: density(mid) * 100.0,
        },
        DistributionBucket {
            label: QualityStatus::Poor,
            percentage: density(poor) * 100.0,
        },
    ])
}
