// Metric kinds, thresholds and quality classification
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Boundary values for a metric, in the metric's native unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ThresholdPair {
    pub good: f64,
    pub poor: f64,
}

impl ThresholdPair {
    pub const fn new(good: f64, poor: f64) -> Self {
        Self { good, poor }
    }
}

pub const LCP_THRESHOLDS: ThresholdPair = ThresholdPair::new(2500.0, 4000.0);
pub const INP_THRESHOLDS: ThresholdPair = ThresholdPair::new(200.0, 500.0);
pub const CLS_THRESHOLDS: ThresholdPair = ThresholdPair::new(0.1, 0.25);
pub const FCP_THRESHOLDS: ThresholdPair = ThresholdPair::new(1800.0, 2000.0);
pub const TTFB_THRESHOLDS: ThresholdPair = ThresholdPair::new(800.0, 1200.0);

/// The Core Web Vitals requested from CrUX.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    LargestContentfulPaint,
    InteractionToNextPaint,
    CumulativeLayoutShift,
    FirstContentfulPaint,
    ExperimentalTimeToFirstByte,
}

impl MetricKind {
    pub const ALL: [MetricKind; 5] = [
        MetricKind::LargestContentfulPaint,
        MetricKind::InteractionToNextPaint,
        MetricKind::CumulativeLayoutShift,
        MetricKind::FirstContentfulPaint,
        MetricKind::ExperimentalTimeToFirstByte,
    ];

    /// Identifier used by the CrUX API for this metric.
    pub fn key(self) -> &'static str {
        match self {
            MetricKind::LargestContentfulPaint => "largest_contentful_paint",
            MetricKind::InteractionToNextPaint => "interaction_to_next_paint",
            MetricKind::CumulativeLayoutShift => "cumulative_layout_shift",
            MetricKind::FirstContentfulPaint => "first_contentful_paint",
            MetricKind::ExperimentalTimeToFirstByte => "experimental_time_to_first_byte",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            MetricKind::LargestContentfulPaint => "Largest Contentful Paint",
            MetricKind::InteractionToNextPaint => "Interaction to Next Paint",
            MetricKind::CumulativeLayoutShift => "Cumulative Layout Shift",
            MetricKind::FirstContentfulPaint => "First Contentful Paint",
            MetricKind::ExperimentalTimeToFirstByte => "Experimental Time to First Byte",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            MetricKind::LargestContentfulPaint => {
                "The time it takes for the largest contentful paint to occur. Good threshold is 2500ms, Poor threshold is 4000ms"
            }
            MetricKind::InteractionToNextPaint => {
                "The time it takes for the next paint to occur after an interaction. Good threshold is 200ms, Poor threshold is 500ms"
            }
            MetricKind::CumulativeLayoutShift => {
                "Measures visual stability by quantifying how much unexpected layout shifts occur during the lifespan of a page. Good threshold is 0.1, Poor threshold is 0.25"
            }
            MetricKind::FirstContentfulPaint => {
                "The time it takes for the first contentful paint to occur. Good threshold is 1800ms, Poor threshold is 2000ms"
            }
            MetricKind::ExperimentalTimeToFirstByte => {
                "The time it takes for the first byte to be received. Good threshold is 800ms, Poor threshold is 1200ms"
            }
        }
    }

    pub fn link(self) -> &'static str {
        match self {
            MetricKind::LargestContentfulPaint => "https://web.dev/articles/lcp/",
            MetricKind::InteractionToNextPaint => {
                "https://web.dev/articles/interaction-to-next-paint/"
            }
            MetricKind::CumulativeLayoutShift => "https://web.dev/articles/cls/",
            MetricKind::FirstContentfulPaint => "https://web.dev/articles/fcp/",
            MetricKind::ExperimentalTimeToFirstByte => "https://web.dev/articles/ttfb/",
        }
    }

    pub fn thresholds(self) -> ThresholdPair {
        match self {
            MetricKind::LargestContentfulPaint => LCP_THRESHOLDS,
            MetricKind::InteractionToNextPaint => INP_THRESHOLDS,
            MetricKind::CumulativeLayoutShift => CLS_THRESHOLDS,
            MetricKind::FirstContentfulPaint => FCP_THRESHOLDS,
            MetricKind::ExperimentalTimeToFirstByte => TTFB_THRESHOLDS,
        }
    }

    /// Resolve a record key, ignoring ASCII case.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.key().eq_ignore_ascii_case(key))
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QualityStatus {
    #[serde(rename = "Good")]
    Good,
    #[serde(rename = "Needs Improvement")]
    NeedsImprovement,
    #[serde(rename = "Poor")]
    Poor,
}

impl QualityStatus {
    pub const ALL: [QualityStatus; 3] = [
        QualityStatus::Good,
        QualityStatus::NeedsImprovement,
        QualityStatus::Poor,
    ];

    /// Sort weight; lower is better.
    pub fn rank(self) -> u8 {
        match self {
            QualityStatus::Good => 1,
            QualityStatus::NeedsImprovement => 2,
            QualityStatus::Poor => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            QualityStatus::Good => "Good",
            QualityStatus::NeedsImprovement => "Needs Improvement",
            QualityStatus::Poor => "Poor",
        }
    }
}

impl Ord for QualityStatus {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl PartialOrd for QualityStatus {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for QualityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classify a p75 value against a threshold pair.
///
/// Bands are inclusive on their upper bound: `good` itself is Good and
/// `poor` itself is Needs Improvement. NaN never satisfies either bound and
/// is reported as Poor.
pub fn classify(value: f64, thresholds: ThresholdPair) -> QualityStatus {
    if value.is_nan() {
        return QualityStatus::Poor;
    }
    if value <= thresholds.good {
        QualityStatus::Good
    } else if value <= thresholds.poor {
        QualityStatus::NeedsImprovement
    } else {
        QualityStatus::Poor
    }
}
