//! Plugins wired into a running kernel

use artbit::{Kernel, KernelConfig, Sink};
use artbit_plugins::{NullSink, PlotSink, WaveConfig, WaveSource};
use parking_lot::Mutex;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

/// Writer whose contents stay readable after the sink is handed over
#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    fn lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.0.lock())
            .lines()
            .map(str::to_string)
            .collect()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn leading_value(line: &str) -> f64 {
    line.split(" | ")
        .next()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(f64::NAN)
}

#[tokio::test(start_paused = true)]
async fn test_clean_wave_is_plotted_as_bpm() {
    let source = WaveSource::new(WaveConfig::clean(Duration::from_millis(800)));
    let buffer = SharedBuffer::default();

    let mut kernel = Kernel::with_config(source, KernelConfig::default());
    kernel.add_sink(PlotSink::new(buffer.clone(), 20));
    kernel.add_sink(NullSink::new());

    kernel.start().await.unwrap();
    tokio::time::sleep(Duration::from_secs(20)).await;
    kernel.stop().await.unwrap();

    let lines = buffer.lines();
    assert!(lines.len() > 5, "only {} lines", lines.len());
    let last = leading_value(lines.last().unwrap());
    assert!((last - 75.0).abs() < 1.0, "last rate {}", last);
    assert_eq!(kernel.snapshot().write_failures, 0);
}

#[tokio::test(start_paused = true)]
async fn test_noisy_wave_rates_stay_within_limits() {
    let source = WaveSource::new(WaveConfig::default()).with_seed(2024);
    let buffer = SharedBuffer::default();

    let mut kernel = Kernel::with_config(source, KernelConfig::default());
    kernel.add_sink(PlotSink::new(buffer.clone(), 20));

    kernel.start().await.unwrap();
    tokio::time::sleep(Duration::from_secs(30)).await;
    kernel.stop().await.unwrap();

    let snap = kernel.snapshot();
    assert!(snap.samples_read > 10_000);
    assert_eq!(snap.read_errors, 0);
    // the period limit keeps every smoothed period between 40 and 180 BPM
    for line in buffer.lines() {
        let rate = leading_value(&line);
        assert!((40.0..=181.0).contains(&rate), "rate {} out of range", rate);
    }
}

#[tokio::test]
async fn test_invalid_wave_fails_kernel_start() {
    let source = WaveSource::new(WaveConfig {
        low: 0.9,
        high: 0.1,
        ..Default::default()
    });
    let mut kernel = Kernel::new(source);
    assert!(kernel.start().await.is_err());
    assert!(!kernel.is_running());
}

#[tokio::test]
async fn test_null_sink_through_fan_out() {
    let sinks: Vec<Box<dyn Sink>> = vec![Box::new(NullSink::new()), Box::new(NullSink::new())];
    artbit::fan_out(&sinks, 75.0).await.unwrap();
}

#[cfg(unix)]
#[tokio::test]
async fn test_uds_sink_in_fan_out() {
    use artbit_plugins::UdsSink;
    use tokio::io::{AsyncBufReadExt, BufReader};
    use tokio::net::UnixListener;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fan.sock");
    let listener = UnixListener::bind(&path).unwrap();

    let mut uds = UdsSink::new(&path, Duration::from_millis(100));
    uds.start().await.unwrap();
    let (server, _) = listener.accept().await.unwrap();

    let sinks: Vec<Box<dyn Sink>> = vec![Box::new(uds), Box::new(NullSink::new())];
    artbit::fan_out(&sinks, 72.0).await.unwrap();

    let mut lines = BufReader::new(server).lines();
    assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("72.000000"));
}
