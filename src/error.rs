// Artbit - Pulse period detection
// Copyright (c) 2025 EelisK
//
// Licensed under the MIT License.
// See LICENSE file for details.

//! Error types for Artbit
//!
//! Detector rejections (out-of-range values, amplitudes and periods) are not
//! errors: they reset the detector and are logged. The types here cover the
//! collaborator boundary: sources, sinks, and the kernel lifecycle.

use std::fmt;
use thiserror::Error;

/// Result type alias for Artbit operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Main error type for pipeline operations
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Source failed to start, read or stop
    #[error("Source error: {0}")]
    Source(String),

    /// Sink failed to start, write or stop
    #[error("Sink error: {0}")]
    Sink(String),

    /// Write did not complete in time
    #[error("Write timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// I/O error from a collaborator
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// `start` called on a kernel whose sampling loop is already running
    #[error("Kernel is already running")]
    AlreadyRunning,

    /// One or more components failed during a multi-component operation
    #[error(
        "{stage} failed for {} component(s), first: {}",
        .failures.len(),
        first_failure(.failures)
    )]
    Aggregate {
        stage: Stage,
        failures: Vec<ComponentFailure>,
    },
}

impl PipelineError {
    /// Build an aggregate error, or `None` when nothing failed
    pub fn aggregate(stage: Stage, failures: Vec<ComponentFailure>) -> Option<Self> {
        if failures.is_empty() {
            None
        } else {
            Some(Self::Aggregate { stage, failures })
        }
    }

    /// Failures carried by an aggregate error (empty for other variants)
    pub fn failures(&self) -> &[ComponentFailure] {
        match self {
            Self::Aggregate { failures, .. } => failures,
            _ => &[],
        }
    }
}

/// Lifecycle phase an aggregate error belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Concurrent sink writes for one period notification
    Write,
    /// Component teardown
    Stop,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Write => write!(f, "write"),
            Stage::Stop => write!(f, "stop"),
        }
    }
}

/// A single failed component inside an aggregate error
#[derive(Debug)]
pub struct ComponentFailure {
    /// Component label, e.g. `source` or `sink[2] (uds)`
    pub component: String,
    /// The error the component returned
    pub error: PipelineError,
}

impl ComponentFailure {
    pub fn new(component: impl Into<String>, error: PipelineError) -> Self {
        Self {
            component: component.into(),
            error,
        }
    }
}

impl fmt::Display for ComponentFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.component, self.error)
    }
}

fn first_failure(failures: &[ComponentFailure]) -> String {
    failures
        .first()
        .map(ToString::to_string)
        .unwrap_or_else(|| "none".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PipelineError::Timeout { timeout_ms: 100 };
        assert_eq!(format!("{}", err), "Write timed out after 100ms");
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err: PipelineError = io.into();
        assert!(matches!(err, PipelineError::Io(_)));
    }

    #[test]
    fn test_aggregate_display() {
        let err = PipelineError::aggregate(
            Stage::Write,
            vec![
                ComponentFailure::new("sink[1]", PipelineError::Sink("socket closed".into())),
                ComponentFailure::new("sink[2]", PipelineError::Timeout { timeout_ms: 5 }),
            ],
        )
        .unwrap();

        let msg = err.to_string();
        assert!(msg.starts_with("write failed for 2 component(s)"));
        assert!(msg.contains("sink[1]: Sink error: socket closed"));
        assert_eq!(err.failures().len(), 2);
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(Stage::Write.to_string(), "write");
        assert_eq!(Stage::Stop.to_string(), "stop");
    }

    #[test]
    fn test_aggregate_empty_is_none() {
        assert!(PipelineError::aggregate(Stage::Stop, Vec::new()).is_none());
    }
}
