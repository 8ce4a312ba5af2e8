//! Synthetic frame producer.
//!
//! Used when the platform offers no compositor-level capturer: a dedicated
//! worker thread synthesizes frame descriptors on a fixed cadence from one
//! reusable staging buffer.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use bytes::Bytes;
use tracing::{debug, trace, warn};

use crate::config::CaptureConfig;
use crate::frame::{CaptureTimestamp, CapturedFrame, FrameStorage};
use crate::producer::FrameProducer;
use crate::sink::FrameSink;
use crate::timing::frame_interval;
use crate::CaptureResult;

/// Fallback producer generating synthetic frames at the configured cadence.
///
/// The running flag and the token counter are the only state shared with the
/// worker thread; frame tokens survive a stop/start cycle so they stay
/// unique for the session's lifetime.
pub struct SyntheticProducer {
    config: CaptureConfig,
    sink: Arc<dyn FrameSink>,
    running: Arc<AtomicBool>,
    next_token: Arc<AtomicU64>,
    epoch: Instant,
    worker: Option<JoinHandle<()>>,
}

impl SyntheticProducer {
    /// Create a stopped producer for the given configuration and sink.
    pub fn new(config: CaptureConfig, sink: Arc<dyn FrameSink>) -> Self {
        Self {
            config,
            sink,
            running: Arc::new(AtomicBool::new(false)),
            next_token: Arc::new(AtomicU64::new(0)),
            epoch: Instant::now(),
            worker: None,
        }
    }
}

impl FrameProducer for SyntheticProducer {
    fn start(&mut self) -> CaptureResult<()> {
        // Only the call that flips the flag may spawn the worker.
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("fallback producer already running");
            return Ok(());
        }

        // One zeroed allocation, reused for every synthetic frame.
        let staging = Bytes::from(vec![0u8; self.config.buffer_size()]);

        let config = self.config;
        let sink = Arc::clone(&self.sink);
        let running = Arc::clone(&self.running);
        let next_token = Arc::clone(&self.next_token);
        let epoch = self.epoch;

        let worker = thread::Builder::new()
            .name("framecast-fallback".into())
            .spawn(move || fallback_loop(config, sink, running, next_token, epoch, staging))
            .map_err(|e| {
                self.running.store(false, Ordering::SeqCst);
                e
            })?;

        self.worker = Some(worker);
        debug!(
            width = config.width,
            height = config.height,
            "fallback producer started"
        );
        Ok(())
    }

    fn stop(&mut self) {
        if !self.running.swap(false, Ordering::SeqCst) && self.worker.is_none() {
            return;
        }

        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("fallback worker panicked");
            }
        }
        debug!("fallback producer stopped");
    }

    fn release_frame(&mut self, token: u64) {
        // Synthetic frames alias one refcounted staging buffer; there is
        // nothing to reclaim. Stale tokens from before a restart land here
        // too and are equally benign.
        trace!(token, "synthetic frame released");
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl Drop for SyntheticProducer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Worker loop: one frame per interval until the running flag clears.
///
/// At most one frame may still be produced after a stop request, between
/// the flag flipping and the loop re-checking it; that bound is accepted
/// behavior.
fn fallback_loop(
    config: CaptureConfig,
    sink: Arc<dyn FrameSink>,
    running: Arc<AtomicBool>,
    next_token: Arc<AtomicU64>,
    epoch: Instant,
    staging: Bytes,
) {
    let interval = frame_interval(config.frame_rate_numerator, config.frame_rate_denominator);
    let stride = config.stride();
    debug!(?interval, "fallback loop starting");

    while running.load(Ordering::SeqCst) {
        let wake = Instant::now();

        let frame = CapturedFrame {
            token: next_token.fetch_add(1, Ordering::SeqCst) + 1,
            buffer: if staging.is_empty() {
                None
            } else {
                Some(staging.clone())
            },
            shared_handle: None,
            width: config.width,
            height: config.height,
            stride,
            timestamp: CaptureTimestamp::now(epoch),
            storage: FrameStorage::SystemMemory,
        };
        sink.on_frame(&frame);

        // Absolute deadline anchored to this iteration's own wake sample so
        // drift does not accumulate across frames.
        let next_fire = wake + interval;
        let now = Instant::now();
        if next_fire > now {
            thread::sleep(next_fire - now);
        }
    }

    debug!("fallback loop exited");
}
