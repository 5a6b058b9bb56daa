//! Screening orchestrator.
//!
//! Drives the full pipeline: market snapshot, basic filter, then a bounded
//! fan-out of pattern evaluations. Worker width stays small to respect the
//! upstream quote APIs. Every spawned evaluation is joined before the run
//! returns; a single security's failure never takes down the run.

use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::data::FetcherManager;

use super::config::ScreenerConfig;
use super::filter::BasicFilter;
use super::pattern::{Evaluation, PatternEvaluator, ScreenHit};

// ============================================================================
// Candidate
// ============================================================================

/// A security surviving the basic filter, queued for pattern evaluation.
#[derive(Debug, Clone)]
pub struct Candidate {
    /// Security code
    pub code: String,
    /// Security name
    pub name: String,
}

// ============================================================================
// Progress Reporting
// ============================================================================

/// Progress sink for a screening run.
///
/// The engine never configures process-wide logging; callers that want
/// progress somewhere other than the log inject their own reporter.
pub trait ProgressReporter: Send + Sync {
    /// Called every `progress_every` completed evaluations.
    fn evaluated(&self, done: usize, total: usize);

    /// Called once after every evaluation has been joined.
    fn finished(&self, hits: usize, total: usize);
}

/// Default reporter backed by `tracing`.
pub struct TracingReporter;

impl ProgressReporter for TracingReporter {
    fn evaluated(&self, done: usize, total: usize) {
        info!(done, total, "Screening progress");
    }

    fn finished(&self, hits: usize, total: usize) {
        info!(hits, total, "Screening finished");
    }
}

// ============================================================================
// Screener Engine
// ============================================================================

/// The screening orchestrator.
pub struct ScreenerEngine {
    config: ScreenerConfig,
    fetcher: Arc<FetcherManager>,
    evaluator: PatternEvaluator,
    reporter: Arc<dyn ProgressReporter>,
}

impl ScreenerEngine {
    /// Create an engine with the default tracing-backed reporter.
    pub fn new(config: ScreenerConfig, fetcher: Arc<FetcherManager>) -> Self {
        Self::with_reporter(config, fetcher, Arc::new(TracingReporter))
    }

    /// Create an engine with a caller-supplied progress reporter.
    pub fn with_reporter(
        config: ScreenerConfig,
        fetcher: Arc<FetcherManager>,
        reporter: Arc<dyn ProgressReporter>,
    ) -> Self {
        let evaluator = PatternEvaluator::new(config.clone());
        Self {
            config,
            fetcher,
            evaluator,
            reporter,
        }
    }

    /// Run the full screen.
    ///
    /// Returns hits in completion order, which is not candidate order. The
    /// run always waits for every spawned evaluation; there is no early
    /// cancellation and no per-evaluation timeout. The only short exit is a
    /// completely unavailable snapshot, which yields an empty result.
    pub async fn run_screen(&self) -> Vec<ScreenHit> {
        info!("Starting accumulation screen");

        let snapshot = self.fetcher.get_market_snapshot().await;
        if snapshot.is_empty() {
            error!("Market snapshot unavailable, screen aborted");
            return Vec::new();
        }

        let passed = BasicFilter::new(&self.config).filter(&snapshot);
        let candidates: Vec<Candidate> = passed
            .into_iter()
            .map(|row| Candidate {
                code: row.code,
                name: row.name,
            })
            .collect();

        let total = candidates.len();
        info!(candidates = total, "Entering pattern analysis");

        let semaphore = Arc::new(Semaphore::new(self.config.workers.max(1)));
        let mut tasks: JoinSet<Evaluation> = JoinSet::new();

        for candidate in candidates {
            let semaphore = Arc::clone(&semaphore);
            let fetcher = Arc::clone(&self.fetcher);
            let evaluator = self.evaluator.clone();
            let history_window = self.config.history_window;

            tasks.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return Evaluation::Failed("worker pool closed".into()),
                };
                evaluate_candidate(&fetcher, &evaluator, history_window, &candidate).await
            });
        }

        let mut hits = Vec::new();
        let mut done = 0usize;

        while let Some(joined) = tasks.join_next().await {
            done += 1;
            if self.config.progress_every > 0 && done % self.config.progress_every == 0 {
                self.reporter.evaluated(done, total);
            }

            match joined {
                Ok(Evaluation::Hit(hit)) => hits.push(hit),
                Ok(Evaluation::NoMatch(_)) => {}
                Ok(Evaluation::Failed(err)) => {
                    // Failures stay distinguishable from clean rejections in
                    // the log, but both count as absent
                    debug!(error = %err, "Evaluation failed");
                }
                Err(e) => {
                    warn!(error = %e, "Evaluation task did not complete");
                }
            }
        }

        self.reporter.finished(hits.len(), total);
        info!(hits = hits.len(), scanned = total, "Screen complete");

        hits
    }
}

/// Fetch one candidate's history and evaluate it.
///
/// Every failure is contained here as `Evaluation::Failed`.
async fn evaluate_candidate(
    fetcher: &FetcherManager,
    evaluator: &PatternEvaluator,
    history_window: usize,
    candidate: &Candidate,
) -> Evaluation {
    match fetcher.get_daily_data(&candidate.code, history_window).await {
        Ok((bars, source)) => {
            debug!(
                code = %candidate.code,
                source,
                bars = bars.len(),
                "History fetched"
            );
            evaluator.evaluate(&candidate.code, &candidate.name, &bars)
        }
        Err(e) => Evaluation::Failed(format!("history fetch for {}: {}", candidate.code, e)),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{DailyBar, MarketDataProvider, ProviderError, QuoteRow};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Series that passes all four gates (see pattern tests for the shape).
    fn hit_series() -> Vec<DailyBar> {
        let mut bars: Vec<DailyBar> = (0..60)
            .map(|i| DailyBar {
                date: NaiveDate::from_ymd_opt(2024, 1, 1)
                    .unwrap()
                    .checked_add_days(chrono::Days::new(i as u64))
                    .unwrap(),
                open: 10.0,
                high: 10.05,
                low: 9.95,
                close: 10.0,
                pct_chg: Some(0.0),
                volume: 10_000.0,
            })
            .collect();

        for (step, bar) in bars[40..].iter_mut().enumerate() {
            let close = 10.0 + (step + 1) as f64 * 0.1;
            bar.close = close;
            bar.high = close + 0.05;
            bar.low = close - 0.05;
        }
        bars[30].pct_chg = Some(10.2);
        bars[5].low = 9.0;
        bars[10].high = 19.0;
        bars
    }

    /// How the mock should answer a history request for one code.
    #[derive(Clone)]
    enum HistoryBehavior {
        Hit,
        TooShort,
        Error,
    }

    struct MockProvider {
        snapshot: Vec<QuoteRow>,
        behaviors: Vec<(String, HistoryBehavior)>,
        history_calls: Mutex<Vec<String>>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl MockProvider {
        fn new(behaviors: Vec<(String, HistoryBehavior)>) -> Self {
            let snapshot = behaviors
                .iter()
                .map(|(code, _)| QuoteRow {
                    code: code.clone(),
                    name: format!("Stock {}", code),
                    price: Some(10.0),
                    pe: Some(12.0),
                    total_mv: Some(5e9),
                    pct_chg: Some(1.0),
                })
                .collect();

            Self {
                snapshot,
                behaviors,
                history_calls: Mutex::new(Vec::new()),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl MarketDataProvider for MockProvider {
        fn name(&self) -> &'static str {
            "mock"
        }

        fn priority(&self) -> u8 {
            1
        }

        async fn get_market_snapshot(&self) -> Result<Vec<QuoteRow>, ProviderError> {
            Ok(self.snapshot.clone())
        }

        async fn get_daily_bars(
            &self,
            code: &str,
            _days: usize,
        ) -> Result<Vec<DailyBar>, ProviderError> {
            let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(current, Ordering::SeqCst);

            self.history_calls.lock().unwrap().push(code.to_string());

            // Variable simulated latency per code
            let jitter = code.bytes().map(u64::from).sum::<u64>() % 7;
            tokio::time::sleep(Duration::from_millis(1 + jitter)).await;

            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            let behavior = self
                .behaviors
                .iter()
                .find(|(c, _)| c == code)
                .map(|(_, b)| b.clone())
                .unwrap_or(HistoryBehavior::Error);

            match behavior {
                HistoryBehavior::Hit => Ok(hit_series()),
                HistoryBehavior::TooShort => Ok(hit_series().into_iter().take(10).collect()),
                HistoryBehavior::Error => Err(ProviderError::Network("simulated".into())),
            }
        }
    }

    /// Reporter that records every callback.
    #[derive(Default)]
    struct RecordingReporter {
        progress: Mutex<Vec<(usize, usize)>>,
        finished: Mutex<Option<(usize, usize)>>,
    }

    impl ProgressReporter for RecordingReporter {
        fn evaluated(&self, done: usize, total: usize) {
            self.progress.lock().unwrap().push((done, total));
        }

        fn finished(&self, hits: usize, total: usize) {
            *self.finished.lock().unwrap() = Some((hits, total));
        }
    }

    fn engine_with(
        provider: Arc<MockProvider>,
        config: ScreenerConfig,
        reporter: Arc<RecordingReporter>,
    ) -> ScreenerEngine {
        let fetcher = Arc::new(FetcherManager::new(vec![provider]));
        ScreenerEngine::with_reporter(config, fetcher, reporter)
    }

    fn code(i: usize) -> String {
        format!("{:06}", i)
    }

    #[tokio::test]
    async fn test_twenty_candidates_bounded_pool() {
        // 12 hits, 4 short series, 4 errors
        let behaviors: Vec<(String, HistoryBehavior)> = (0..20)
            .map(|i| {
                let b = match i % 5 {
                    0 => HistoryBehavior::TooShort,
                    1 => HistoryBehavior::Error,
                    _ => HistoryBehavior::Hit,
                };
                (code(i), b)
            })
            .collect();
        let expected_hits = behaviors
            .iter()
            .filter(|(_, b)| matches!(b, HistoryBehavior::Hit))
            .count();

        let provider = Arc::new(MockProvider::new(behaviors));
        let reporter = Arc::new(RecordingReporter::default());
        let mut config = ScreenerConfig::default();
        config.workers = 5;
        config.progress_every = 7;

        let engine = engine_with(provider.clone(), config, reporter.clone());
        let hits = engine.run_screen().await;

        // Every candidate evaluated exactly once
        let calls = provider.history_calls.lock().unwrap();
        assert_eq!(calls.len(), 20);
        let unique: HashSet<&String> = calls.iter().collect();
        assert_eq!(unique.len(), 20);

        // Hit count is independent of completion order
        assert_eq!(hits.len(), expected_hits);

        // Pool width was respected
        assert!(provider.max_in_flight.load(Ordering::SeqCst) <= 5);

        // Progress fired at 7 and 14, finish exactly once
        let progress = reporter.progress.lock().unwrap();
        assert_eq!(progress.as_slice(), &[(7, 20), (14, 20)]);
        assert_eq!(
            *reporter.finished.lock().unwrap(),
            Some((expected_hits, 20))
        );
    }

    #[tokio::test]
    async fn test_all_evaluations_failing_still_returns() {
        let behaviors = (0..8).map(|i| (code(i), HistoryBehavior::Error)).collect();
        let provider = Arc::new(MockProvider::new(behaviors));
        let reporter = Arc::new(RecordingReporter::default());

        let engine = engine_with(provider, ScreenerConfig::default(), reporter.clone());
        let hits = engine.run_screen().await;

        assert!(hits.is_empty());
        assert_eq!(*reporter.finished.lock().unwrap(), Some((0, 8)));
    }

    #[tokio::test]
    async fn test_empty_snapshot_aborts_early() {
        let provider = Arc::new(MockProvider::new(Vec::new()));
        let reporter = Arc::new(RecordingReporter::default());

        let engine = engine_with(provider.clone(), ScreenerConfig::default(), reporter);
        let hits = engine.run_screen().await;

        assert!(hits.is_empty());
        assert!(provider.history_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_basic_filter_gates_candidates() {
        let behaviors = vec![
            (code(1), HistoryBehavior::Hit),
            (code(2), HistoryBehavior::Hit),
        ];
        let mut provider = MockProvider::new(behaviors);
        // Overprice the second row so only the first reaches evaluation
        provider.snapshot[1].price = Some(25.0);
        let provider = Arc::new(provider);

        let reporter = Arc::new(RecordingReporter::default());
        let engine = engine_with(provider.clone(), ScreenerConfig::default(), reporter);
        let hits = engine.run_screen().await;

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].code, code(1));
        assert_eq!(provider.history_calls.lock().unwrap().len(), 1);
    }
}
