// Artbit Plugins - Sources and sinks
// Copyright (c) 2025 EelisK
//
// Licensed under the MIT License.
// See LICENSE file for details.

//! Text plot sink
//!
//! Writes one line per value: the value with three decimals and a bar of
//! `*` proportional to `value / full_scale`.
//!
//! ```text
//! 75.000 | ******************                      |
//! ```

use artbit::{Result, Sink};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::io::{self, Stderr, Stdout, Write};
use tracing::debug;

/// Default bar width in columns
pub const DEFAULT_WIDTH: usize = 40;

/// Value drawn as a full bar (200 BPM)
pub const DEFAULT_FULL_SCALE: f64 = 200.0;

/// Draws values as horizontal bars
pub struct PlotSink<W> {
    writer: Mutex<W>,
    width: usize,
    full_scale: f64,
}

impl PlotSink<Stdout> {
    pub fn stdout(width: usize) -> Self {
        Self::new(io::stdout(), width)
    }
}

impl PlotSink<Stderr> {
    pub fn stderr(width: usize) -> Self {
        Self::new(io::stderr(), width)
    }
}

impl<W: Write + Send> PlotSink<W> {
    pub fn new(writer: W, width: usize) -> Self {
        Self {
            writer: Mutex::new(writer),
            width,
            full_scale: DEFAULT_FULL_SCALE,
        }
    }

    /// Value that fills the whole bar; non-positive values fall back to 1.0
    pub fn with_full_scale(mut self, full_scale: f64) -> Self {
        self.full_scale = if full_scale > 0.0 { full_scale } else { 1.0 };
        self
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Render one line without writing it
    pub fn render(&self, value: f64) -> String {
        let fraction = (value / self.full_scale).clamp(0.0, 1.0);
        // NaN clamps to NaN, which casts to 0
        let filled = ((fraction * self.width as f64) as usize).min(self.width);
        format!(
            "{:.3} | {}{} |\n",
            value,
            "*".repeat(filled),
            " ".repeat(self.width - filled)
        )
    }

    /// Give the writer back
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

#[async_trait]
impl<W: Write + Send> Sink for PlotSink<W> {
    async fn start(&mut self) -> Result<()> {
        Ok(())
    }

    async fn write(&self, value: f64) -> Result<()> {
        let line = self.render(value);
        self.writer.lock().write_all(line.as_bytes())?;
        Ok(())
    }

    async fn stop(&mut self) -> Result<()> {
        debug!("flushing plot output");
        self.writer.get_mut().flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "plot"
    }
}
