// Artbit Plugins - Sources and sinks
// Copyright (c) 2025 EelisK
//
// Licensed under the MIT License.
// See LICENSE file for details.

//! # Artbit Plugins - Sources and sinks
//!
//! Concrete implementations of the [`artbit::Source`] and [`artbit::Sink`]
//! capabilities.
//!
//! ## Features
//!
//! - **Synthetic waveform**: a sine source with random noise bursts, for
//!   running the pipeline without sensor hardware
//! - **Text plot**: one bar per delivered rate, to any writer
//! - **Unix domain socket**: newline-delimited values with a per-write
//!   transmit timeout
//! - **Null**: discards everything
//!
//! ## Quick Start
//!
//! ```rust
//! use artbit::{Kernel, KernelConfig};
//! use artbit_plugins::{NullSink, WaveConfig, WaveSource};
//!
//! let source = WaveSource::new(WaveConfig::default()).with_seed(7);
//! let mut kernel = Kernel::with_config(source, KernelConfig::default());
//! kernel.add_sink(NullSink::new());
//! assert_eq!(kernel.sink_count(), 1);
//! ```

pub mod noise;
pub mod null;
pub mod plot;
#[cfg(unix)]
pub mod uds;
pub mod wave;

pub use noise::NoiseGenerator;
pub use null::NullSink;
pub use plot::PlotSink;
#[cfg(unix)]
pub use uds::UdsSink;
pub use wave::{WaveConfig, WaveSource};
