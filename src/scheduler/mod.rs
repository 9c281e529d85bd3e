//! Discovery followed by the periodic query, transform, and submit loop.

use futures_util::future::{try_join, try_join_all};
use tracing::{debug, info, warn};

use crate::catalog::MetricCatalog;
use crate::config::{PollingConfig, WindowMode};
use crate::error::{AppResult, ValidationError};
use crate::shutdown::ShutdownReceiver;
use crate::sink::Sink;
use crate::source::{MetricSource, PromQuery, QUANTILES, Quantile};
use crate::transform::{PointSeries, to_quantile_series, to_rate_series};
use crate::window::QueryWindow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Discovering,
    Polling,
    /// Terminal: discovery or a tick failed.
    Failed,
    /// Terminal: a shutdown signal was received.
    Stopped,
}

/// Drives one source into one sink. Ticks never overlap: the next window is
/// computed only after the previous submission and pause have completed.
pub struct PollScheduler<S, K> {
    source: S,
    sink: K,
    config: PollingConfig,
    state: SchedulerState,
}

impl<S, K> PollScheduler<S, K>
where
    S: MetricSource,
    K: Sink,
{
    pub const fn new(source: S, sink: K, config: PollingConfig) -> Self {
        Self {
            source,
            sink,
            config,
            state: SchedulerState::Discovering,
        }
    }

    #[must_use]
    pub const fn state(&self) -> SchedulerState {
        self.state
    }

    #[must_use]
    pub const fn source(&self) -> &S {
        &self.source
    }

    #[must_use]
    pub const fn sink(&self) -> &K {
        &self.sink
    }

    /// Discovers the catalog, then polls until shutdown or the first error.
    /// A pending shutdown takes priority over starting more work.
    ///
    /// Returns `Ok(())` only after a shutdown signal.
    ///
    /// # Errors
    ///
    /// Returns the first discovery, query, validation, or submission error.
    /// The scheduler is left in [`SchedulerState::Failed`].
    pub async fn run(&mut self, shutdown: &mut ShutdownReceiver) -> AppResult<()> {
        self.state = SchedulerState::Discovering;
        let discovered = tokio::select! {
            biased;
            _ = shutdown.recv() => None,
            result = MetricCatalog::discover(&self.source) => Some(result),
        };
        let catalog = match discovered {
            Some(Ok(catalog)) => catalog,
            Some(Err(err)) => return Err(self.fail(err)),
            None => {
                self.stop();
                return Ok(());
            }
        };
        if catalog.is_empty() {
            warn!("No bridged metrics were discovered; ticks will submit empty batches.");
        }

        self.state = SchedulerState::Polling;
        loop {
            let ticked = tokio::select! {
                biased;
                _ = shutdown.recv() => None,
                result = self.tick(&catalog) => Some(result),
            };
            match ticked {
                Some(Ok(_)) => {}
                Some(Err(err)) => return Err(self.fail(err)),
                None => {
                    self.stop();
                    return Ok(());
                }
            }

            debug!(pause_ms = self.config.pause.as_millis(), "Pausing before next tick");
            let paused = tokio::select! {
                biased;
                _ = shutdown.recv() => false,
                () = tokio::time::sleep(self.config.pause) => true,
            };
            if !paused {
                self.stop();
                return Ok(());
            }
        }
    }

    /// Runs one tick: fans out every subquery, concatenates the transformed
    /// series (counts first, then histograms by quantile), and submits them
    /// once. Returns the number of submitted series.
    ///
    /// # Errors
    ///
    /// Returns the first failing subquery's error, in which case nothing is
    /// submitted, or the sink's error.
    pub async fn tick(&self, catalog: &MetricCatalog) -> AppResult<usize> {
        let window = self.config.window.generate_now()?;
        let (start, end) = window.describe();
        info!(
            start = %start,
            end = %end,
            mode = ?self.config.window_mode,
            queries = catalog.fan_out_width(),
            "Polling"
        );
        let shared = match self.config.window_mode {
            WindowMode::PerTick => Some(window),
            WindowMode::PerQuery => None,
        };

        let rates = try_join_all(
            catalog
                .count_names()
                .iter()
                .map(|name| self.poll_rate(name, shared)),
        );
        let quantiles = try_join_all(catalog.histogram_names().iter().flat_map(|name| {
            QUANTILES
                .into_iter()
                .map(move |quantile| self.poll_quantile(name, quantile, shared))
        }));
        let (rates, quantiles) = try_join(rates, quantiles).await?;

        let batch: Vec<PointSeries> = rates.into_iter().chain(quantiles).flatten().collect();
        info!(series = batch.len(), sink = self.sink.name(), "Submitting batch");
        self.sink.submit(&batch).await?;
        Ok(batch.len())
    }

    async fn poll_rate(
        &self,
        name: &str,
        shared: Option<QueryWindow>,
    ) -> AppResult<Vec<PointSeries>> {
        let window = self.window_for(shared)?;
        let matrix = self
            .source
            .query_range(&PromQuery::rate(name), window)
            .await?;
        Ok(to_rate_series(
            &self.config.metric_prefix,
            name,
            self.config.window.step_secs(),
            &matrix,
        ))
    }

    async fn poll_quantile(
        &self,
        name: &str,
        quantile: Quantile,
        shared: Option<QueryWindow>,
    ) -> AppResult<Vec<PointSeries>> {
        let window = self.window_for(shared)?;
        let matrix = self
            .source
            .query_range(&PromQuery::quantile(name, quantile), window)
            .await?;
        Ok(to_quantile_series(
            &self.config.metric_prefix,
            name,
            quantile,
            &matrix,
        ))
    }

    fn window_for(&self, shared: Option<QueryWindow>) -> Result<QueryWindow, ValidationError> {
        shared.map_or_else(|| self.config.window.generate_now(), Ok)
    }

    const fn fail<E>(&mut self, err: E) -> E {
        self.state = SchedulerState::Failed;
        err
    }

    fn stop(&mut self) {
        info!("Shutdown requested; polling stopped.");
        self.state = SchedulerState::Stopped;
    }
}
