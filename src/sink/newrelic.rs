use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::config::NewRelicConfig;
use crate::error::AppResult;
use crate::source::Labels;
use crate::transform::{PointKind, PointSeries, ROLLUP_LABEL};
use crate::transport::{api_key_headers, join, send};

use super::{Sink, build_client};

pub const NEWRELIC_API_KEY_HEADER: &str = "Api-Key";

const METRIC_PATH: &str = "metric/v1";
const SINK_NAME: &str = "newrelic";
const MILLIS_PER_SECOND: i64 = 1000;

#[derive(Debug, Serialize)]
struct MetricBatch<'batch> {
    metrics: Vec<MetricRecord<'batch>>,
}

#[derive(Debug, Serialize)]
struct MetricRecord<'batch> {
    name: &'batch str,
    #[serde(rename = "type")]
    metric_type: &'static str,
    value: f64,
    timestamp: i64,
    attributes: Labels,
    #[serde(rename = "interval.ms", skip_serializing_if = "Option::is_none")]
    interval_ms: Option<i64>,
}

/// Submits series to the New Relic metric API, one record per point.
#[derive(Debug, Clone)]
pub struct NewRelicSink {
    client: Client,
    metric_url: Url,
}

impl NewRelicSink {
    /// # Errors
    ///
    /// Returns an error when the API key is not a valid header value or the
    /// HTTP client cannot be built.
    pub fn new(config: &NewRelicConfig) -> AppResult<Self> {
        let headers = api_key_headers(NEWRELIC_API_KEY_HEADER, &config.api_key)?;
        Ok(Self {
            client: build_client(headers, Some(config.request_timeout))?,
            metric_url: join(&config.base_url, METRIC_PATH)?,
        })
    }
}

#[async_trait]
impl Sink for NewRelicSink {
    fn name(&self) -> &'static str {
        SINK_NAME
    }

    async fn submit(&self, batch: &[PointSeries]) -> AppResult<()> {
        let payload = [encode_metrics(batch)];
        debug!(
            metrics = payload.iter().map(|entry| entry.metrics.len()).sum::<usize>(),
            "Submitting to New Relic"
        );
        let request = self.client.post(self.metric_url.clone()).json(&payload);
        send(request, &self.metric_url).await?;
        Ok(())
    }
}

fn encode_metrics(batch: &[PointSeries]) -> MetricBatch<'_> {
    let mut metrics = Vec::new();
    for entry in batch {
        let (metric_type, interval_ms) = match entry.kind {
            PointKind::Rate => (
                "count",
                entry
                    .interval_secs
                    .and_then(|secs| secs.checked_mul(MILLIS_PER_SECOND)),
            ),
            PointKind::Quantile => ("gauge", None),
        };
        let mut attributes = entry.labels.clone();
        attributes.remove(ROLLUP_LABEL);
        for point in &entry.points {
            metrics.push(MetricRecord {
                name: &entry.metric_id,
                metric_type,
                value: point.value,
                timestamp: point.timestamp,
                attributes: attributes.clone(),
                interval_ms,
            });
        }
    }
    MetricBatch { metrics }
}
