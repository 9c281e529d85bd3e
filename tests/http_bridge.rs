
use std::future::Future;
use std::time::Duration;

use url::Url;

use promql_bridge::catalog::MetricCatalog;
use promql_bridge::config::{
    DatadogConfig, NewRelicConfig, PollingConfig, SourceConfig, WindowMode,
};
use promql_bridge::error::{AppError, TransportError, ValidationError};
use promql_bridge::scheduler::PollScheduler;
use promql_bridge::sink::{DatadogSink, NewRelicSink, Sink};
use promql_bridge::source::{Labels, MetricSource, PromQuery, PrometheusClient, Quantile};
use promql_bridge::transform::{PointKind, PointSeries, TargetPoint};
use promql_bridge::window::WindowGenerator;

use support_http::{Route, recorded, spawn_http_server_or_skip};

const LABEL_VALUES_BODY: &str = r#"{"status":"success","data":["temporal_cloud_v0_poll_success_count","temporal_cloud_v0_service_latency_bucket","up"]}"#;
const MATRIX_BODY: &str = r#"{"status":"success","data":{"resultType":"matrix","result":[{"metric":{"__rollup__":"true","namespace":"ns1","operation":"StartWorkflowExecution"},"values":[[1000,"0.5"],[1060,"NaN"]]}]}}"#;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

fn block_on<F, T>(future: F) -> Result<T, String>
where
    F: Future<Output = Result<T, AppError>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| format!("runtime build failed: {}", err))?;
    runtime.block_on(future).map_err(|err| err.to_string())
}

fn base_url(server: &str, path: &str) -> Result<Url, String> {
    Url::parse(&format!("{}{}", server, path)).map_err(|err| format!("bad url: {}", err))
}

fn source_config(server: &str) -> Result<SourceConfig, String> {
    Ok(SourceConfig {
        base_url: base_url(server, "/")?,
        identity: None,
        server_ca_pem: None,
        insecure_skip_verify: false,
        request_timeout: Some(REQUEST_TIMEOUT),
        step_secs: 60,
    })
}

fn newrelic_config(server: &str) -> Result<NewRelicConfig, String> {
    Ok(NewRelicConfig {
        base_url: base_url(server, "/")?,
        api_key: "nr-test-key".to_owned(),
        request_timeout: REQUEST_TIMEOUT,
    })
}

#[test]
fn source_client_discovers_and_queries() -> Result<(), String> {
    let Some((server, _handle, requests)) = spawn_http_server_or_skip(vec![
        Route::ok("/prometheus/api/v1/label/__name__/values", LABEL_VALUES_BODY),
        Route::ok("/prometheus/api/v1/query_range", MATRIX_BODY),
    ])?
    else {
        return Ok(());
    };
    let client = PrometheusClient::new(&source_config(&server)?).map_err(|err| err.to_string())?;
    let window = WindowGenerator::default()
        .generate(1_700_000_030)
        .map_err(|err| err.to_string())?;

    let names = block_on(client.label_values())?;
    let matrix = block_on(client.query_range(
        &PromQuery::quantile("temporal_cloud_v0_service_latency_bucket", Quantile::P99),
        window,
    ))?;

    if names.len() != 3 {
        return Err(format!("Unexpected names: {:?}", names));
    }
    if matrix.series.len() != 1 {
        return Err(format!("Unexpected matrix: {:?}", matrix));
    }

    let seen = recorded(&requests);
    let query = seen
        .iter()
        .find(|request| request.target.starts_with("/prometheus/api/v1/query_range"))
        .ok_or_else(|| format!("No range query recorded: {:?}", seen))?;
    if query.method != "GET" {
        return Err(format!("Unexpected method: {}", query.method));
    }
    for expected in [
        "start=1699999320",
        "end=1700000040",
        "step=60",
        "format=json",
        "query=histogram_quantile%280.99",
    ] {
        if !query.target.contains(expected) {
            return Err(format!("Missing '{}' in {}", expected, query.target));
        }
    }
    Ok(())
}

#[test]
fn source_client_reports_http_errors() -> Result<(), String> {
    let Some((server, _handle, _requests)) = spawn_http_server_or_skip(vec![Route::status(
        "/prometheus/api/v1/label",
        503,
        "unavailable",
    )])?
    else {
        return Ok(());
    };
    let client = PrometheusClient::new(&source_config(&server)?).map_err(|err| err.to_string())?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| format!("runtime build failed: {}", err))?;
    match runtime.block_on(client.label_values()) {
        Err(AppError::Transport(TransportError::UnexpectedStatus { status, .. }))
            if status.as_u16() == 503 =>
        {
            Ok(())
        }
        other => Err(format!("Expected UnexpectedStatus, got {:?}", other)),
    }
}

#[test]
fn source_client_rejects_error_envelope() -> Result<(), String> {
    let Some((server, _handle, _requests)) = spawn_http_server_or_skip(vec![Route::ok(
        "/prometheus/api/v1/query_range",
        r#"{"status":"error","errorType":"bad_data","error":"invalid query"}"#,
    )])?
    else {
        return Ok(());
    };
    let client = PrometheusClient::new(&source_config(&server)?).map_err(|err| err.to_string())?;
    let window = WindowGenerator::default()
        .generate(1_700_000_030)
        .map_err(|err| err.to_string())?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| format!("runtime build failed: {}", err))?;
    match runtime.block_on(client.query_range(&PromQuery::rate("temporal_cloud_x_count"), window)) {
        Err(AppError::Validation(ValidationError::UnexpectedStatus { .. })) => Ok(()),
        other => Err(format!("Expected validation failure, got {:?}", other)),
    }
}

#[test]
fn newrelic_sink_posts_metric_batch() -> Result<(), String> {
    let Some((server, _handle, requests)) =
        spawn_http_server_or_skip(vec![Route::status("/metric/v1", 202, r#"{"requestId":"1"}"#)])?
    else {
        return Ok(());
    };
    let sink = NewRelicSink::new(&newrelic_config(&server)?).map_err(|err| err.to_string())?;
    let batch = promql_bridge::transform::to_rate_series(
        "",
        "temporal_cloud_v0_poll_success_count",
        60,
        &promql_bridge::source::decode_matrix(MATRIX_BODY.as_bytes())
            .map_err(|err| err.to_string())?,
    );

    block_on(sink.submit(&batch))?;

    let seen = recorded(&requests);
    let [request] = seen.as_slice() else {
        return Err(format!("Expected one request, got {}", seen.len()));
    };
    if request.method != "POST" || request.target != "/metric/v1" {
        return Err(format!("Unexpected request: {} {}", request.method, request.target));
    }
    if request.headers.get("api-key").map(String::as_str) != Some("nr-test-key") {
        return Err(format!("Missing Api-Key header: {:?}", request.headers));
    }
    let body = request.json()?;
    let metrics = body
        .get(0)
        .and_then(|entry| entry.get("metrics"))
        .and_then(serde_json::Value::as_array)
        .ok_or_else(|| format!("Unexpected body: {}", body))?;
    if metrics.len() != 2 {
        return Err(format!("Expected two records, got {}", metrics.len()));
    }
    if body.to_string().contains("__rollup__") {
        return Err("Rollup label reached New Relic".to_owned());
    }
    Ok(())
}

fn datadog_sink(server: &str) -> Result<DatadogSink, String> {
    DatadogSink::new(&DatadogConfig {
        api_url: base_url(server, "/")?,
        api_key: "dd-test-key".to_owned(),
        request_timeout: Some(REQUEST_TIMEOUT),
    })
    .map_err(|err| err.to_string())
}

fn rate_batch(len: usize) -> Vec<PointSeries> {
    (0..len)
        .map(|index| PointSeries {
            metric_id: format!("temporal_cloud_v0_m{}_rate1m", index),
            kind: PointKind::Rate,
            interval_secs: Some(60),
            labels: Labels::new(),
            points: vec![TargetPoint {
                timestamp: 1000,
                value: 1.0,
            }],
        })
        .collect()
}

#[test]
fn datadog_sink_posts_whole_batch_in_one_request() -> Result<(), String> {
    let Some((server, _handle, requests)) =
        spawn_http_server_or_skip(vec![Route::status("/api/v2/series", 202, r#"{"errors":[]}"#)])?
    else {
        return Ok(());
    };
    let sink = datadog_sink(&server)?;
    let batch = rate_batch(101);

    block_on(sink.submit(&batch))?;

    let seen = recorded(&requests);
    let [request] = seen.as_slice() else {
        return Err(format!("Expected one request, got {}", seen.len()));
    };
    if request.headers.get("dd-api-key").map(String::as_str) != Some("dd-test-key") {
        return Err(format!("Missing DD-API-KEY header: {:?}", request.headers));
    }
    let body = request.json()?;
    let series = body
        .get("series")
        .and_then(serde_json::Value::as_array)
        .ok_or_else(|| format!("Unexpected body: {}", body))?;
    if series.len() != batch.len() {
        return Err(format!("Expected {} series, got {}", batch.len(), series.len()));
    }
    Ok(())
}

#[test]
fn datadog_rejection_delivers_nothing_else() -> Result<(), String> {
    let Some((server, _handle, requests)) = spawn_http_server_or_skip(vec![Route::status(
        "/api/v2/series",
        500,
        "intake unavailable",
    )])?
    else {
        return Ok(());
    };
    let sink = datadog_sink(&server)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| format!("runtime build failed: {}", err))?;
    let result = runtime.block_on(sink.submit(&rate_batch(101)));

    if !matches!(
        result,
        Err(AppError::Transport(TransportError::UnexpectedStatus { .. }))
    ) {
        return Err(format!("Expected UnexpectedStatus, got {:?}", result));
    }
    let attempts = recorded(&requests).len();
    if attempts != 1 {
        return Err(format!("Expected a single attempt, got {}", attempts));
    }
    Ok(())
}

#[test]
fn datadog_sink_surfaces_intake_errors() -> Result<(), String> {
    let Some((server, _handle, _requests)) = spawn_http_server_or_skip(vec![Route::status(
        "/api/v2/series",
        202,
        r#"{"errors":["Invalid metric name"]}"#,
    )])?
    else {
        return Ok(());
    };
    let sink = datadog_sink(&server)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| format!("runtime build failed: {}", err))?;
    match runtime.block_on(sink.submit(&rate_batch(1))) {
        Err(AppError::Transport(TransportError::SubmissionRejected { details, .. }))
            if details.contains("Invalid metric name") =>
        {
            Ok(())
        }
        other => Err(format!("Expected SubmissionRejected, got {:?}", other)),
    }
}

#[test]
fn tick_moves_series_from_source_to_sink() -> Result<(), String> {
    let Some((server, _handle, requests)) = spawn_http_server_or_skip(vec![
        Route::ok("/prometheus/api/v1/label/__name__/values", LABEL_VALUES_BODY),
        Route::ok("/prometheus/api/v1/query_range", MATRIX_BODY),
        Route::status("/metric/v1", 202, "{}"),
    ])?
    else {
        return Ok(());
    };
    let source = PrometheusClient::new(&source_config(&server)?).map_err(|err| err.to_string())?;
    let sink = NewRelicSink::new(&newrelic_config(&server)?).map_err(|err| err.to_string())?;
    let scheduler = PollScheduler::new(
        source,
        sink,
        PollingConfig {
            window_mode: WindowMode::PerTick,
            ..PollingConfig::default()
        },
    );

    let submitted = block_on(async {
        let catalog = MetricCatalog::discover(scheduler.source()).await?;
        scheduler.tick(&catalog).await
    })?;

    // One rate series plus one series per quantile.
    if submitted != 5 {
        return Err(format!("Expected 5 series, got {}", submitted));
    }
    let seen = recorded(&requests);
    let queries = seen
        .iter()
        .filter(|request| request.target.starts_with("/prometheus/api/v1/query_range"))
        .count();
    if queries != 5 {
        return Err(format!("Expected 5 range queries, got {}", queries));
    }
    let submissions: Vec<_> = seen
        .iter()
        .filter(|request| request.target == "/metric/v1")
        .collect();
    if submissions.len() != 1 {
        return Err(format!("Expected one submission, got {}", submissions.len()));
    }
    Ok(())
}
