//! Fail-closed decoding of Prometheus HTTP API responses.
use std::collections::BTreeMap;

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::ValidationError;

/// Label set of one series. Sorted so every encoding of it is stable.
pub type Labels = BTreeMap<String, String>;

const SUCCESS_STATUS: &str = "success";
const MATRIX_RESULT_TYPE: &str = "matrix";
const LABEL_VALUES_CONTEXT: &str = "label values";
const RANGE_QUERY_CONTEXT: &str = "range query";

/// One `(timestamp, value)` pair as returned by the API. The value keeps its
/// textual form so `"NaN"` can be recognised verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSample {
    pub timestamp: f64,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawSeries {
    pub labels: Labels,
    pub samples: Vec<RawSample>,
}

/// A validated `matrix` result. Holding one means the response had status
/// `success` and result type `matrix`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawMatrix {
    pub series: Vec<RawSeries>,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    status: String,
    data: Option<T>,
    #[serde(rename = "errorType", default)]
    error_type: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MatrixData {
    #[serde(rename = "resultType")]
    result_type: String,
    result: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct WireSeries {
    metric: Labels,
    values: Vec<(f64, String)>,
}

/// Decodes a `/label/__name__/values` response into metric names.
///
/// # Errors
///
/// Returns a `ValidationError` when the body is not
/// `{status: "success", data: [string, ...]}`.
pub fn decode_label_values(body: &[u8]) -> Result<Vec<String>, ValidationError> {
    decode_envelope::<Vec<String>>(body, LABEL_VALUES_CONTEXT)
}

/// Decodes a `/query_range` response into a [`RawMatrix`].
///
/// # Errors
///
/// Returns a `ValidationError` on a non-success status, a result type other
/// than `matrix`, malformed `[timestamp, "value"]` tuples, or sample values
/// that do not parse as floats.
pub fn decode_matrix(body: &[u8]) -> Result<RawMatrix, ValidationError> {
    let data = decode_envelope::<MatrixData>(body, RANGE_QUERY_CONTEXT)?;
    if data.result_type != MATRIX_RESULT_TYPE {
        return Err(ValidationError::UnexpectedResultType {
            result_type: data.result_type,
        });
    }
    let wire: Vec<WireSeries> =
        serde_json::from_value(data.result).map_err(|err| ValidationError::MalformedBody {
            context: RANGE_QUERY_CONTEXT,
            source: err,
        })?;

    let mut series = Vec::with_capacity(wire.len());
    for (series_index, entry) in wire.into_iter().enumerate() {
        let mut samples = Vec::with_capacity(entry.values.len());
        for (sample_index, (timestamp, value)) in entry.values.into_iter().enumerate() {
            if value.parse::<f64>().is_err() {
                return Err(ValidationError::NonNumericSample {
                    series: series_index,
                    index: sample_index,
                    value,
                });
            }
            samples.push(RawSample { timestamp, value });
        }
        series.push(RawSeries {
            labels: entry.metric,
            samples,
        });
    }

    Ok(RawMatrix { series })
}

fn decode_envelope<T>(body: &[u8], context: &'static str) -> Result<T, ValidationError>
where
    T: DeserializeOwned,
{
    let envelope: Envelope<T> =
        serde_json::from_slice(body).map_err(|err| ValidationError::MalformedBody {
            context,
            source: err,
        })?;
    if envelope.status != SUCCESS_STATUS {
        return Err(ValidationError::UnexpectedStatus {
            context,
            status: envelope.status,
            error_type: envelope.error_type,
            error: envelope.error,
        });
    }
    envelope
        .data
        .ok_or(ValidationError::MissingData { context })
}
