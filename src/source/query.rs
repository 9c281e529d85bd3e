use std::fmt;

/// Labels kept when aggregating histogram buckets before the quantile.
pub const QUANTILE_GROUPING: &str = "account,namespace,operation,le";

/// Histogram quantiles published for every bucket metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quantile {
    P50,
    P90,
    P95,
    P99,
}

/// Every quantile queried per histogram, in submission order.
pub const QUANTILES: [Quantile; 4] = [Quantile::P50, Quantile::P90, Quantile::P95, Quantile::P99];

impl Quantile {
    /// Quantile as it appears in a PromQL expression.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::P50 => "0.5",
            Self::P90 => "0.9",
            Self::P95 => "0.95",
            Self::P99 => "0.99",
        }
    }

    /// Quantile scaled by 100, used in target metric names (`_P99`).
    #[must_use]
    pub const fn percentile(self) -> u8 {
        match self {
            Self::P50 => 50,
            Self::P90 => 90,
            Self::P95 => 95,
            Self::P99 => 99,
        }
    }
}

impl fmt::Display for Quantile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The two range-query shapes the bridge issues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromQuery {
    /// Per-second rate of a counter over one minute.
    Rate { metric: String },
    /// Quantile of a bucketed histogram over one minute.
    Quantile { metric: String, quantile: Quantile },
}

impl PromQuery {
    #[must_use]
    pub fn rate(metric: &str) -> Self {
        Self::Rate {
            metric: metric.to_owned(),
        }
    }

    #[must_use]
    pub fn quantile(metric: &str, quantile: Quantile) -> Self {
        Self::Quantile {
            metric: metric.to_owned(),
            quantile,
        }
    }

    #[must_use]
    pub fn metric(&self) -> &str {
        match self {
            Self::Rate { metric } | Self::Quantile { metric, .. } => metric,
        }
    }

    #[must_use]
    pub fn expression(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for PromQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rate { metric } => write!(f, "rate({}[1m])", metric),
            Self::Quantile { metric, quantile } => write!(
                f,
                "histogram_quantile({}, sum(rate({}[1m])) by ({}))",
                quantile, metric, QUANTILE_GROUPING
            ),
        }
    }
}
