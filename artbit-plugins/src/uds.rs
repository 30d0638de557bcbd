// Artbit Plugins - Sources and sinks
// Copyright (c) 2025 EelisK
//
// Licensed under the MIT License.
// See LICENSE file for details.

//! Unix domain socket sink
//!
//! Connects to a listening stream socket on `start` and writes every value
//! as a decimal line (`"72.000000\n"`). Each write must complete within the
//! transmit timeout or fails with [`PipelineError::Timeout`].

use artbit::{PipelineError, Result, Sink};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::UnixStream;
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{debug, info, warn, Span};

/// Default socket path
pub const DEFAULT_SOCKET_PATH: &str = "/tmp/artbit.sock";

/// Default transmit timeout per value
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(100);

/// Streams values to a Unix socket
#[derive(Debug)]
pub struct UdsSink {
    path: PathBuf,
    timeout: Duration,
    stream: Mutex<Option<UnixStream>>,
    span: Span,
}

impl UdsSink {
    pub fn new(path: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            path: path.into(),
            timeout,
            stream: Mutex::new(None),
            span: tracing::info_span!("uds_sink"),
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Wire format of one value
    pub fn encode(value: f64) -> String {
        format!("{:.6}\n", value)
    }
}

#[async_trait]
impl Sink for UdsSink {
    async fn start(&mut self) -> Result<()> {
        info!(parent: &self.span, path = %self.path.display(), "connecting to socket");
        let stream = UnixStream::connect(&self.path).await?;
        *self.stream.get_mut() = Some(stream);
        Ok(())
    }

    async fn write(&self, value: f64) -> Result<()> {
        let data = Self::encode(value);
        let mut guard = self.stream.lock().await;
        let stream = guard
            .as_mut()
            .ok_or_else(|| PipelineError::Sink(format!("{} is not connected", self.path.display())))?;

        match timeout(self.timeout, stream.write_all(data.as_bytes())).await {
            Ok(result) => result.map_err(PipelineError::from),
            Err(_) => {
                warn!(parent: &self.span, timeout_ms = self.timeout.as_millis() as u64, "socket write timed out");
                Err(PipelineError::Timeout {
                    timeout_ms: self.timeout.as_millis() as u64,
                })
            }
        }
    }

    async fn stop(&mut self) -> Result<()> {
        debug!(parent: &self.span, "stopping socket sink");
        match self.stream.get_mut().take() {
            Some(mut stream) => {
                stream.shutdown().await?;
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn name(&self) -> &str {
        "uds"
    }
}
