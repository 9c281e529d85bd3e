//! Metric discovery and classification.
use tracing::info;

use crate::error::AppResult;
use crate::source::{MetricSource, QUANTILES};

/// Only names carrying this prefix are bridged.
pub const METRIC_NAME_PREFIX: &str = "temporal_cloud";
pub const COUNT_SUFFIX: &str = "_count";
pub const BUCKET_SUFFIX: &str = "_bucket";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Count,
    HistogramBucket,
}

/// Classifies a metric name, or returns `None` when it is not bridged.
#[must_use]
pub fn classify(name: &str) -> Option<MetricKind> {
    if !name.starts_with(METRIC_NAME_PREFIX) {
        return None;
    }
    if name.ends_with(COUNT_SUFFIX) {
        Some(MetricKind::Count)
    } else if name.ends_with(BUCKET_SUFFIX) {
        Some(MetricKind::HistogramBucket)
    } else {
        None
    }
}

/// Metric names to poll, computed once at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricCatalog {
    count_names: Vec<String>,
    histogram_names: Vec<String>,
}

impl MetricCatalog {
    /// Partitions `names` by suffix, keeping their relative order.
    #[must_use]
    pub fn from_names<I>(names: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut catalog = Self::default();
        for name in names {
            match classify(&name) {
                Some(MetricKind::Count) => catalog.count_names.push(name),
                Some(MetricKind::HistogramBucket) => catalog.histogram_names.push(name),
                None => {}
            }
        }
        catalog
    }

    /// Fetches every metric name from `source` and classifies it.
    ///
    /// # Errors
    ///
    /// Propagates transport and validation errors from the label-values
    /// request. A catalog is never built from a partial response.
    pub async fn discover<S>(source: &S) -> AppResult<Self>
    where
        S: MetricSource + ?Sized,
    {
        let names = source.label_values().await?;
        let total = names.len();
        let catalog = Self::from_names(names);
        info!(
            known = total,
            counts = catalog.count_names.len(),
            histograms = catalog.histogram_names.len(),
            "Discovered metrics"
        );
        Ok(catalog)
    }

    #[must_use]
    pub fn count_names(&self) -> &[String] {
        &self.count_names
    }

    #[must_use]
    pub fn histogram_names(&self) -> &[String] {
        &self.histogram_names
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.count_names.is_empty() && self.histogram_names.is_empty()
    }

    /// Number of range queries issued per tick.
    #[must_use]
    pub const fn fan_out_width(&self) -> usize {
        self.histogram_names
            .len()
            .saturating_mul(QUANTILES.len())
            .saturating_add(self.count_names.len())
    }
}
