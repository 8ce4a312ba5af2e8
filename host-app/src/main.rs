//! Headless host driving a capture session.
//!
//! Loads an optional JSON capture configuration from the first argument,
//! runs a session against a channel-backed sink for a fixed duration, and
//! reports delivery statistics once per second.

use std::env;
use std::fs;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use framecast_capture::{
    CaptureConfig, CaptureSession, ChannelSink, HeadlessHost, PlatformProvider,
};

/// How long the host runs before stopping the session.
const RUN_DURATION: Duration = Duration::from_secs(5);

fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "framecast_host=info,framecast_capture=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn load_config() -> anyhow::Result<CaptureConfig> {
    match env::args().nth(1) {
        Some(path) => {
            let raw = fs::read_to_string(&path)
                .with_context(|| format!("reading capture config {path}"))?;
            serde_json::from_str(&raw).with_context(|| format!("parsing capture config {path}"))
        }
        None => Ok(CaptureConfig::default()),
    }
}

fn main() -> anyhow::Result<()> {
    init_logging();

    let config = load_config()?;
    info!(
        width = config.width,
        height = config.height,
        numerator = config.frame_rate_numerator,
        denominator = config.frame_rate_denominator,
        "starting capture host"
    );

    let (sink, frames) = ChannelSink::with_capacity(8);
    let sink = Arc::new(sink);
    let session = CaptureSession::new(
        Arc::new(HeadlessHost),
        config,
        sink.clone(),
        &PlatformProvider,
    );
    session.start()?;

    let started = Instant::now();
    let mut delivered: u64 = 0;
    let mut last_report = Instant::now();

    while started.elapsed() < RUN_DURATION {
        match frames.recv_timeout(Duration::from_millis(250)) {
            Ok(frame) => {
                delivered += 1;
                session.release_frame(frame.token);
            }
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => {}
            Err(crossbeam_channel::RecvTimeoutError::Disconnected) => break,
        }

        if last_report.elapsed() >= Duration::from_secs(1) {
            info!(delivered, dropped = sink.dropped(), "delivery stats");
            last_report = Instant::now();
        }
    }

    session.stop();
    info!(delivered, dropped = sink.dropped(), "capture host finished");
    Ok(())
}
