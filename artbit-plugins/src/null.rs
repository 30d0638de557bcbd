// Artbit Plugins - Sources and sinks
// Copyright (c) 2025 EelisK
//
// Licensed under the MIT License.
// See LICENSE file for details.

//! Sink that discards everything

use artbit::{Result, Sink};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};

/// Accepts and drops every value
#[derive(Debug, Default)]
pub struct NullSink {
    discarded: AtomicU64,
}

impl NullSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Values dropped so far
    pub fn discarded(&self) -> u64 {
        self.discarded.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Sink for NullSink {
    async fn start(&mut self) -> Result<()> {
        Ok(())
    }

    async fn write(&self, _value: f64) -> Result<()> {
        self.discarded.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    async fn stop(&mut self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "null"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_discards() {
        let mut sink = NullSink::new();
        sink.start().await.unwrap();
        for v in [1.0, f64::NAN, -3.0] {
            sink.write(v).await.unwrap();
        }
        sink.stop().await.unwrap();
        assert_eq!(sink.discarded(), 3);
    }
}
