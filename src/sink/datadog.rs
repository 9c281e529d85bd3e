use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize, Serializer};
use tracing::debug;
use url::Url;

use crate::config::DatadogConfig;
use crate::error::{AppError, AppResult, TransportError, ValidationError};
use crate::transform::{PointKind, PointSeries, ROLLUP_LABEL};
use crate::transport::{api_key_headers, join, send};

use super::{Sink, build_client};

pub const DATADOG_API_KEY_HEADER: &str = "DD-API-KEY";
/// Datadog truncates longer tag values server side; cut them before sending.
pub const TAG_VALUE_MAX_CHARS: usize = 200;

const SERIES_PATH: &str = "api/v2/series";
const SINK_NAME: &str = "datadog";
const INTAKE_RESPONSE_CONTEXT: &str = "datadog intake response";

/// Metric intake type codes of the v2 series API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IntakeType {
    Rate,
    Gauge,
}

impl IntakeType {
    const fn code(self) -> u8 {
        match self {
            Self::Rate => 2,
            Self::Gauge => 3,
        }
    }
}

impl Serialize for IntakeType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(self.code())
    }
}

#[derive(Debug, Serialize)]
struct SeriesPayload<'batch> {
    series: Vec<SeriesEnvelope<'batch>>,
}

#[derive(Debug, Serialize)]
struct SeriesEnvelope<'batch> {
    metric: &'batch str,
    #[serde(rename = "type")]
    intake_type: IntakeType,
    #[serde(skip_serializing_if = "Option::is_none")]
    interval: Option<i64>,
    points: Vec<IntakePoint>,
    tags: Vec<String>,
}

#[derive(Debug, Serialize)]
struct IntakePoint {
    timestamp: i64,
    value: f64,
}

#[derive(Debug, Deserialize)]
struct IntakeResponse {
    #[serde(default)]
    errors: Vec<String>,
}

/// Submits series to the Datadog v2 series intake.
#[derive(Debug, Clone)]
pub struct DatadogSink {
    client: Client,
    series_url: Url,
}

impl DatadogSink {
    /// # Errors
    ///
    /// Returns an error when the API key is not a valid header value or the
    /// HTTP client cannot be built.
    pub fn new(config: &DatadogConfig) -> AppResult<Self> {
        let headers = api_key_headers(DATADOG_API_KEY_HEADER, &config.api_key)?;
        Ok(Self {
            client: build_client(headers, config.request_timeout)?,
            series_url: join(&config.api_url, SERIES_PATH)?,
        })
    }
}

#[async_trait]
impl Sink for DatadogSink {
    fn name(&self) -> &'static str {
        SINK_NAME
    }

    async fn submit(&self, batch: &[PointSeries]) -> AppResult<()> {
        debug!(series = batch.len(), "Submitting to Datadog");
        let payload = encode_series(batch);
        let request = self.client.post(self.series_url.clone()).json(&payload);
        let body = send(request, &self.series_url).await?;
        check_intake_response(&body)
    }
}

fn encode_series(batch: &[PointSeries]) -> SeriesPayload<'_> {
    let series = batch
        .iter()
        .map(|entry| {
            let (intake_type, interval) = match entry.kind {
                PointKind::Rate => (IntakeType::Rate, entry.interval_secs),
                PointKind::Quantile => (IntakeType::Gauge, None),
            };
            SeriesEnvelope {
                metric: &entry.metric_id,
                intake_type,
                interval,
                points: entry
                    .points
                    .iter()
                    .map(|point| IntakePoint {
                        timestamp: point.timestamp,
                        value: point.value,
                    })
                    .collect(),
                tags: entry
                    .labels
                    .iter()
                    .filter(|(key, _)| key.as_str() != ROLLUP_LABEL)
                    .map(|(key, value)| format_tag(key, value))
                    .collect(),
            }
        })
        .collect();
    SeriesPayload { series }
}

fn format_tag(key: &str, value: &str) -> String {
    let truncated: String = value.chars().take(TAG_VALUE_MAX_CHARS).collect();
    format!("{}:{}", key, truncated)
}

fn check_intake_response(body: &[u8]) -> AppResult<()> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(());
    }
    let response: IntakeResponse = serde_json::from_slice(body).map_err(|err| {
        AppError::validation(ValidationError::MalformedBody {
            context: INTAKE_RESPONSE_CONTEXT,
            source: err,
        })
    })?;
    if response.errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::transport(TransportError::SubmissionRejected {
            sink: SINK_NAME,
            details: response.errors.join("; "),
        }))
    }
}
