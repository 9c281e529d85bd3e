//! Pure conversion of range-query matrices into target point series.

use crate::catalog::{BUCKET_SUFFIX, COUNT_SUFFIX};
use crate::source::{Labels, Quantile, RawMatrix, RawSeries};

/// Aggregation marker added by the source; never forwarded to a sink.
pub const ROLLUP_LABEL: &str = "__rollup__";
pub const RATE_SUFFIX: &str = "_rate1m";
/// Sample value the source emits for quantiles over empty windows.
pub const NAN_LITERAL: &str = "NaN";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointKind {
    /// Per-second rate over the query step.
    Rate,
    /// Histogram quantile, reported as a gauge.
    Quantile,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetPoint {
    /// Epoch seconds.
    pub timestamp: i64,
    pub value: f64,
}

/// Points sharing one metric id and label set, ready for a sink encoder.
#[derive(Debug, Clone, PartialEq)]
pub struct PointSeries {
    pub metric_id: String,
    pub kind: PointKind,
    /// Set for [`PointKind::Rate`] only.
    pub interval_secs: Option<i64>,
    pub labels: Labels,
    pub points: Vec<TargetPoint>,
}

/// Maps a rate query result for `count_name` into one series per input
/// series, named `<prefix><base>_rate1m`.
#[must_use]
pub fn to_rate_series(
    prefix: &str,
    count_name: &str,
    step_secs: i64,
    matrix: &RawMatrix,
) -> Vec<PointSeries> {
    let metric_id = format!("{}{}{}", prefix, base_name(count_name, COUNT_SUFFIX), RATE_SUFFIX);
    matrix
        .series
        .iter()
        .map(|series| PointSeries {
            metric_id: metric_id.clone(),
            kind: PointKind::Rate,
            interval_secs: Some(step_secs),
            labels: emitted_labels(series),
            points: series
                .samples
                .iter()
                .map(|sample| TargetPoint {
                    timestamp: epoch_seconds(sample.timestamp),
                    value: parse_value(&sample.value),
                })
                .collect(),
        })
        .collect()
}

/// Maps a quantile query result for `bucket_name` into one series per input
/// series, named `<prefix><base>_P<percentile>`. Samples holding the literal
/// `NaN` are dropped.
#[must_use]
pub fn to_quantile_series(
    prefix: &str,
    bucket_name: &str,
    quantile: Quantile,
    matrix: &RawMatrix,
) -> Vec<PointSeries> {
    let metric_id = format!(
        "{}{}_P{}",
        prefix,
        base_name(bucket_name, BUCKET_SUFFIX),
        quantile.percentile()
    );
    matrix
        .series
        .iter()
        .map(|series| PointSeries {
            metric_id: metric_id.clone(),
            kind: PointKind::Quantile,
            interval_secs: None,
            labels: emitted_labels(series),
            points: series
                .samples
                .iter()
                .filter(|sample| sample.value != NAN_LITERAL)
                .map(|sample| TargetPoint {
                    timestamp: epoch_seconds(sample.timestamp),
                    value: parse_value(&sample.value),
                })
                .collect(),
        })
        .collect()
}

/// Name up to the first occurrence of `suffix`, or the whole name.
#[must_use]
pub fn base_name<'name>(name: &'name str, suffix: &str) -> &'name str {
    name.split_once(suffix).map_or(name, |(base, _)| base)
}

/// Removes labels that must never reach a sink.
pub fn sanitize_labels(labels: &mut Labels) {
    labels.remove(ROLLUP_LABEL);
}

fn emitted_labels(series: &RawSeries) -> Labels {
    let mut labels = series.labels.clone();
    sanitize_labels(&mut labels);
    labels
}

// Values were checked by the decoder; the fallback keeps this total.
fn parse_value(raw: &str) -> f64 {
    raw.parse().unwrap_or(f64::NAN)
}

const fn epoch_seconds(timestamp: f64) -> i64 {
    timestamp.floor() as i64
}
