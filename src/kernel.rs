// Artbit - Pulse period detection
// Copyright (c) 2025 EelisK
//
// Licensed under the MIT License.
// See LICENSE file for details.

//! Pipeline orchestrator
//!
//! The [`Kernel`] owns one [`Source`], any number of [`Sink`]s and, while
//! running, a [`PeriodDetector`]. Two tasks are spawned on `start`:
//!
//! - the **sampler** ticks at the configured interval, reads the source and
//!   feeds the detector. Read errors skip the tick.
//! - the **dispatcher** receives smoothed periods over a bounded queue,
//!   converts them to a rate and writes it to every sink concurrently.
//!
//! The detector's listener only enqueues, so slow sinks never stall
//! sampling. When the queue is full the period is dropped and counted.
//!
//! ```text
//!  Source ──tick──▶ sampler ──update──▶ PeriodDetector
//!                                           │ on_period
//!                                           ▼
//!                                     bounded queue
//!                                           │
//!                                      dispatcher ──join_all──▶ Sink, Sink, ...
//! ```

use crate::config::KernelConfig;
use crate::connector::{Sink, Source};
use crate::error::{ComponentFailure, PipelineError, Result, Stage};
use crate::metrics::{KernelStats, StatsSnapshot};
use crate::period::PeriodDetector;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn, Instrument, Span};

/// Handles of the tasks spawned by [`Kernel::start`]
struct Running {
    shutdown: oneshot::Sender<()>,
    sampler: JoinHandle<Box<dyn Source>>,
    dispatcher: JoinHandle<Vec<Box<dyn Sink>>>,
    sink_count: usize,
}

/// Drives a source through the period detector into the sinks
pub struct Kernel {
    /// `None` only while the sampler owns it
    source: Option<Box<dyn Source>>,
    /// Empty while the dispatcher owns them
    sinks: Vec<Box<dyn Sink>>,
    config: KernelConfig,
    stats: Arc<KernelStats>,
    running: Option<Running>,
    span: Span,
}

impl Kernel {
    /// Create a kernel with the default configuration
    pub fn new<S: Source + 'static>(source: S) -> Self {
        Self::with_config(source, KernelConfig::default())
    }

    /// Create a kernel with a custom configuration
    pub fn with_config<S: Source + 'static>(source: S, config: KernelConfig) -> Self {
        Self {
            source: Some(Box::new(source)),
            sinks: Vec::new(),
            config,
            stats: Arc::new(KernelStats::new()),
            running: None,
            span: tracing::info_span!("kernel"),
        }
    }

    /// Scope the kernel, its tasks and its detector to `span`
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Append a sink; sinks are started, written and stopped in this order
    pub fn add_sink<S: Sink + 'static>(&mut self, sink: S) {
        self.add_boxed_sink(Box::new(sink));
    }

    pub fn add_boxed_sink(&mut self, sink: Box<dyn Sink>) {
        if self.running.is_some() {
            warn!(parent: &self.span, sink = sink.name(), "sink added while running, it takes effect after restart");
        }
        self.sinks.push(sink);
    }

    /// Set the sampling cadence (applies on the next `start`)
    pub fn set_interval(&mut self, interval: Duration) {
        self.config.interval = interval;
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    /// Mutable configuration (applies on the next `start`)
    pub fn config_mut(&mut self) -> &mut KernelConfig {
        &mut self.config
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    pub fn sink_count(&self) -> usize {
        match &self.running {
            Some(running) => running.sink_count + self.sinks.len(),
            None => self.sinks.len(),
        }
    }

    /// Start the source, then every sink, then the sampling loop
    ///
    /// If a component fails to start, everything already started is stopped
    /// again and the original error is returned; the loop is not started.
    pub async fn start(&mut self) -> Result<()> {
        if self.running.is_some() {
            return Err(PipelineError::AlreadyRunning);
        }
        self.config.validate()?;

        let mut source = self
            .source
            .take()
            .ok_or_else(|| PipelineError::Source("source was lost by a failed task".to_string()))?;

        if let Err(err) = source.start().await {
            error!(parent: &self.span, error = %err, "failed to start source");
            self.source = Some(source);
            return Err(err);
        }

        for index in 0..self.sinks.len() {
            if let Err(err) = self.sinks[index].start().await {
                error!(
                    parent: &self.span,
                    sink = %sink_label(index, self.sinks[index].name()),
                    error = %err,
                    "failed to start sink, rolling back"
                );
                self.roll_back(index, source.as_mut()).await;
                self.source = Some(source);
                return Err(err);
            }
        }

        let (tx, rx) = mpsc::channel(self.config.notify_capacity);
        let mut detector =
            PeriodDetector::from_config(&self.config.detector).with_span(self.span.clone());

        let stats = self.stats.clone();
        let span = self.span.clone();
        detector.on_period(move |period| match tx.try_send(period) {
            Ok(()) => stats.record_period(),
            Err(TrySendError::Full(_)) => {
                stats.record_dropped_notification();
                warn!(parent: &span, period_ms = period.as_millis() as u64, "dispatch queue full, dropping period");
            }
            Err(TrySendError::Closed(_)) => {}
        });

        let sinks = std::mem::take(&mut self.sinks);
        let sink_count = sinks.len();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let sampler = tokio::spawn(
            sample_loop(
                source,
                detector,
                self.config.interval,
                shutdown_rx,
                self.stats.clone(),
            )
            .instrument(self.span.clone()),
        );
        let dispatcher = tokio::spawn(
            dispatch_loop(sinks, rx, self.config.clone(), self.stats.clone())
                .instrument(self.span.clone()),
        );

        self.running = Some(Running {
            shutdown: shutdown_tx,
            sampler,
            dispatcher,
            sink_count,
        });

        info!(
            parent: &self.span,
            interval_ms = self.config.interval.as_millis() as u64,
            sinks = sink_count,
            "kernel started"
        );
        Ok(())
    }

    /// Stop sampling, drain queued notifications, then stop every component
    ///
    /// The source and all sinks are stopped even when some of them fail;
    /// every failure is reported in one [`PipelineError::Aggregate`].
    /// Without a running loop there is nothing to tear down: a failed
    /// `start` has already rolled back.
    pub async fn stop(&mut self) -> Result<()> {
        let Some(running) = self.running.take() else {
            debug!(parent: &self.span, "stop requested while not running");
            return Ok(());
        };

        let mut failures = Vec::new();
        // only sinks handed back by the dispatcher were started
        let mut started = 0;
        let _ = running.shutdown.send(());

        match running.sampler.await {
            Ok(source) => self.source = Some(source),
            Err(err) => failures.push(ComponentFailure::new(
                "source",
                PipelineError::Source(format!("sampling task failed: {}", err)),
            )),
        }

        match running.dispatcher.await {
            Ok(mut sinks) => {
                started = sinks.len();
                // keep sinks added while running after the original ones
                sinks.append(&mut self.sinks);
                self.sinks = sinks;
            }
            Err(err) => failures.push(ComponentFailure::new(
                "sinks",
                PipelineError::Sink(format!("dispatch task failed: {}", err)),
            )),
        }

        if let Some(source) = self.source.as_mut() {
            if let Err(err) = source.stop().await {
                failures.push(ComponentFailure::new("source", err));
            }
        }

        for (index, sink) in self.sinks.iter_mut().enumerate().take(started) {
            if let Err(err) = sink.stop().await {
                failures.push(ComponentFailure::new(sink_label(index, sink.name()), err));
            }
        }

        match PipelineError::aggregate(Stage::Stop, failures) {
            Some(err) => {
                error!(parent: &self.span, error = %err, "kernel stopped with errors");
                Err(err)
            }
            None => {
                info!(parent: &self.span, "kernel stopped");
                Ok(())
            }
        }
    }

    /// Stop the first `started` sinks and the source after a failed start
    async fn roll_back(&mut self, started: usize, source: &mut dyn Source) {
        for index in 0..started {
            if let Err(err) = self.sinks[index].stop().await {
                warn!(
                    parent: &self.span,
                    sink = %sink_label(index, self.sinks[index].name()),
                    error = %err,
                    "failed to stop sink during rollback"
                );
            }
        }
        if let Err(err) = source.stop().await {
            warn!(parent: &self.span, error = %err, "failed to stop source during rollback");
        }
    }
}

/// Write `value` to every sink concurrently and wait for all of them
///
/// A failing sink neither cancels nor delays the others beyond its own
/// write. All failures are collected into one [`PipelineError::Aggregate`].
pub async fn fan_out(sinks: &[Box<dyn Sink>], value: f64) -> Result<()> {
    let results = join_all(sinks.iter().map(|sink| sink.write(value))).await;

    let failures = results
        .into_iter()
        .zip(sinks)
        .enumerate()
        .filter_map(|(index, (result, sink))| {
            result
                .err()
                .map(|err| ComponentFailure::new(sink_label(index, sink.name()), err))
        })
        .collect();

    match PipelineError::aggregate(Stage::Write, failures) {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn sink_label(index: usize, name: &str) -> String {
    format!("sink[{}] ({})", index, name)
}

async fn sample_loop(
    mut source: Box<dyn Source>,
    mut detector: PeriodDetector,
    interval: Duration,
    mut shutdown: oneshot::Receiver<()>,
    stats: Arc<KernelStats>,
) -> Box<dyn Source> {
    let mut ticker = time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => break,
            _ = ticker.tick() => {
                match source.read().await {
                    Ok(value) => {
                        stats.record_sample();
                        detector.update_at(value, Instant::now().into_std());
                    }
                    Err(err) => {
                        stats.record_read_error();
                        debug!(error = %err, "source read failed, skipping tick");
                    }
                }
            }
        }
    }

    debug!(periods = detector.period_count(), "sampling stopped");
    // dropping the detector closes the dispatch queue
    drop(detector);
    source
}

async fn dispatch_loop(
    sinks: Vec<Box<dyn Sink>>,
    mut periods: mpsc::Receiver<Duration>,
    config: KernelConfig,
    stats: Arc<KernelStats>,
) -> Vec<Box<dyn Sink>> {
    while let Some(period) = periods.recv().await {
        if period.is_zero() {
            warn!("ignoring zero period");
            continue;
        }
        let rate = config.rate(period);
        debug!(period_ms = period.as_millis() as u64, rate, "dispatching rate");

        if let Err(err) = fan_out(&sinks, rate).await {
            stats.record_write_failures(err.failures().len());
            warn!(error = %err, "failed to write to sinks");
        }
    }
    sinks
}
