// Artbit - Pulse period detection
// Copyright (c) 2025 EelisK
//
// Licensed under the MIT License.
// See LICENSE file for details.

//! Source and sink abstractions
//!
//! The kernel reads samples from one [`Source`] and writes derived rates to
//! any number of [`Sink`]s. Concrete hardware, socket and display
//! implementations live in `artbit-plugins`; the in-memory versions here are
//! for tests and local wiring.

use crate::error::{PipelineError, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Produces one sample per read
#[async_trait]
pub trait Source: Send {
    /// Initialize the source
    async fn start(&mut self) -> Result<()>;

    /// Read one sample; errors skip the current tick only
    async fn read(&mut self) -> Result<f64>;

    /// Tear the source down
    async fn stop(&mut self) -> Result<()>;
}

/// Consumes one value per write
///
/// `write` takes `&self` because the kernel writes to every sink
/// concurrently. Any bound on write duration is the sink's own business.
#[async_trait]
pub trait Sink: Send + Sync {
    /// Initialize the sink
    async fn start(&mut self) -> Result<()>;

    /// Deliver one value
    async fn write(&self, value: f64) -> Result<()>;

    /// Tear the sink down
    async fn stop(&mut self) -> Result<()>;

    /// Short label used in logs and aggregate errors
    fn name(&self) -> &str {
        "sink"
    }
}

/// Start/stop counters shared between a component and its test handle
#[derive(Debug, Default)]
pub struct Lifecycle {
    starts: AtomicUsize,
    stops: AtomicUsize,
}

impl Lifecycle {
    pub fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }

    /// Started more often than stopped
    pub fn is_running(&self) -> bool {
        self.starts() > self.stops()
    }

    fn started(&self) {
        self.starts.fetch_add(1, Ordering::SeqCst);
    }

    fn stopped(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }
}

type Generator = Box<dyn FnMut(u64) -> Option<f64> + Send>;

/// Source backed by a closure over the read index
///
/// A `None` from the closure is reported as a read error.
pub struct MemorySource {
    generator: Generator,
    index: u64,
    lifecycle: Arc<Lifecycle>,
    fail_start: bool,
    fail_stop: bool,
}

impl MemorySource {
    /// Create a source from a closure over the read index
    pub fn from_fn<F>(generator: F) -> Self
    where
        F: FnMut(u64) -> Option<f64> + Send + 'static,
    {
        Self {
            generator: Box::new(generator),
            index: 0,
            lifecycle: Arc::new(Lifecycle::default()),
            fail_start: false,
            fail_stop: false,
        }
    }

    /// Cycle through `values` forever
    pub fn cycle(values: Vec<f64>) -> Self {
        Self::from_fn(move |i| {
            if values.is_empty() {
                None
            } else {
                Some(values[(i % values.len() as u64) as usize])
            }
        })
    }

    /// Make `start` fail
    pub fn failing_start(mut self) -> Self {
        self.fail_start = true;
        self
    }

    /// Make `stop` fail
    pub fn failing_stop(mut self) -> Self {
        self.fail_stop = true;
        self
    }

    /// Shared lifecycle counters, usable after the source is moved
    pub fn lifecycle(&self) -> Arc<Lifecycle> {
        self.lifecycle.clone()
    }
}

#[async_trait]
impl Source for MemorySource {
    async fn start(&mut self) -> Result<()> {
        if self.fail_start {
            return Err(PipelineError::Source("start refused".to_string()));
        }
        self.lifecycle.started();
        Ok(())
    }

    async fn read(&mut self) -> Result<f64> {
        let index = self.index;
        self.index += 1;
        (self.generator)(index)
            .ok_or_else(|| PipelineError::Source(format!("no sample at read {}", index)))
    }

    async fn stop(&mut self) -> Result<()> {
        self.lifecycle.stopped();
        if self.fail_stop {
            return Err(PipelineError::Source("stop refused".to_string()));
        }
        Ok(())
    }
}

/// State shared between a [`MemorySink`] and its handle
#[derive(Debug, Default)]
pub struct MemorySinkState {
    writes: Mutex<Vec<f64>>,
    attempts: AtomicUsize,
    lifecycle: Lifecycle,
}

impl MemorySinkState {
    /// Values accepted so far
    pub fn writes(&self) -> Vec<f64> {
        self.writes.lock().clone()
    }

    /// Write calls so far, failed ones included
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }
}

/// Sink that records every value it accepts
#[derive(Debug)]
pub struct MemorySink {
    name: String,
    state: Arc<MemorySinkState>,
    write_delay: Duration,
    fail_writes: bool,
    fail_start: bool,
    fail_stop: bool,
}

impl MemorySink {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Arc::new(MemorySinkState::default()),
            write_delay: Duration::ZERO,
            fail_writes: false,
            fail_start: false,
            fail_stop: false,
        }
    }

    /// Every write fails
    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    /// `start` fails
    pub fn failing_start(mut self) -> Self {
        self.fail_start = true;
        self
    }

    /// `stop` fails
    pub fn failing_stop(mut self) -> Self {
        self.fail_stop = true;
        self
    }

    /// Each write sleeps for `delay` before completing
    pub fn with_write_delay(mut self, delay: Duration) -> Self {
        self.write_delay = delay;
        self
    }

    /// Handle for inspecting the sink after it is handed to a kernel
    pub fn state(&self) -> Arc<MemorySinkState> {
        self.state.clone()
    }
}

#[async_trait]
impl Sink for MemorySink {
    async fn start(&mut self) -> Result<()> {
        if self.fail_start {
            return Err(PipelineError::Sink(format!("{} refused to start", self.name)));
        }
        self.state.lifecycle.started();
        Ok(())
    }

    async fn write(&self, value: f64) -> Result<()> {
        self.state.attempts.fetch_add(1, Ordering::SeqCst);
        if !self.write_delay.is_zero() {
            tokio::time::sleep(self.write_delay).await;
        }
        if self.fail_writes {
            return Err(PipelineError::Sink(format!("{} rejected {:.3}", self.name, value)));
        }
        self.state.writes.lock().push(value);
        Ok(())
    }

    async fn stop(&mut self) -> Result<()> {
        self.state.lifecycle.stopped();
        if self.fail_stop {
            return Err(PipelineError::Sink(format!("{} refused to stop", self.name)));
        }
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
