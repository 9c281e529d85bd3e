use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Response body is not valid JSON for {context}: {source}")]
    MalformedBody {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("Unexpected status '{status}' for {context}{}", describe_remote(.error_type.as_deref(), .error.as_deref()))]
    UnexpectedStatus {
        context: &'static str,
        status: String,
        error_type: Option<String>,
        error: Option<String>,
    },
    #[error("Response for {context} is missing its data field.")]
    MissingData { context: &'static str },
    #[error("Unexpected result type '{result_type}'. Expected 'matrix'.")]
    UnexpectedResultType { result_type: String },
    #[error("Sample {index} of series {series} has non-numeric value '{value}'.")]
    NonNumericSample {
        series: usize,
        index: usize,
        value: String,
    },
    #[error("Query window overflowed for now={now}s.")]
    WindowOverflow { now: i64 },
    #[error("Query window is empty: start {start} >= end {end}.")]
    EmptyWindow { start: i64, end: i64 },
    #[cfg(test)]
    #[error("Test expectation failed: {message}")]
    TestExpectation { message: &'static str },
    #[cfg(test)]
    #[error("Test expectation failed: {message}: {value}")]
    TestExpectationValue {
        message: &'static str,
        value: String,
    },
}

fn describe_remote(error_type: Option<&str>, error: Option<&str>) -> String {
    match (error_type, error) {
        (Some(kind), Some(message)) => format!(" ({}: {})", kind, message),
        (None, Some(message)) => format!(" ({})", message),
        (Some(kind), None) => format!(" ({})", kind),
        (None, None) => String::new(),
    }
}
