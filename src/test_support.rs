//! Fakes for the source and sink seams.
use std::future::Future;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{AppError, AppResult, ValidationError};
use crate::sink::Sink;
use crate::source::{MetricSource, PromQuery, RawMatrix, RawSample, RawSeries};
use crate::transform::PointSeries;
use crate::window::QueryWindow;

pub(crate) fn run_async_test<T, F>(future: F) -> AppResult<T>
where
    F: Future<Output = AppResult<T>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(future)
}

/// In-memory source answering every range query with one single-sample
/// series, or failing the queries for one metric.
#[derive(Debug, Default)]
pub(crate) struct FakeSource {
    names: Vec<String>,
    fail_discovery: bool,
    fail_metric: Option<String>,
    queries: Mutex<Vec<(PromQuery, QueryWindow)>>,
}

impl FakeSource {
    pub(crate) fn with_names(names: &[&str]) -> Self {
        Self {
            names: names.iter().map(|name| (*name).to_owned()).collect(),
            ..Self::default()
        }
    }

    pub(crate) fn failing_discovery() -> Self {
        Self {
            fail_discovery: true,
            ..Self::default()
        }
    }

    pub(crate) fn failing_on(mut self, metric: &str) -> Self {
        self.fail_metric = Some(metric.to_owned());
        self
    }

    pub(crate) fn queries(&self) -> Vec<(PromQuery, QueryWindow)> {
        self.queries
            .lock()
            .map(|queries| queries.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl MetricSource for FakeSource {
    async fn label_values(&self) -> AppResult<Vec<String>> {
        if self.fail_discovery {
            return Err(AppError::validation(ValidationError::MissingData {
                context: "label values",
            }));
        }
        Ok(self.names.clone())
    }

    async fn query_range(&self, query: &PromQuery, window: QueryWindow) -> AppResult<RawMatrix> {
        if let Ok(mut queries) = self.queries.lock() {
            queries.push((query.clone(), window));
        }
        if self.fail_metric.as_deref() == Some(query.metric()) {
            return Err(AppError::validation(ValidationError::UnexpectedResultType {
                result_type: "vector".to_owned(),
            }));
        }
        let labels = [("__rollup__", "true"), ("metric", query.metric())]
            .iter()
            .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
            .collect();
        Ok(RawMatrix {
            series: vec![RawSeries {
                labels,
                samples: vec![RawSample {
                    timestamp: 1000.0,
                    value: "1".to_owned(),
                }],
            }],
        })
    }
}

/// Sink that records every submitted batch.
#[derive(Debug, Default)]
pub(crate) struct RecordingSink {
    batches: Mutex<Vec<Vec<PointSeries>>>,
}

impl RecordingSink {
    pub(crate) fn batches(&self) -> Vec<Vec<PointSeries>> {
        self.batches
            .lock()
            .map(|batches| batches.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Sink for RecordingSink {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn submit(&self, batch: &[PointSeries]) -> AppResult<()> {
        if let Ok(mut batches) = self.batches.lock() {
            batches.push(batch.to_vec());
        }
        Ok(())
    }
}
