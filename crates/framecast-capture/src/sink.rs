//! Frame delivery sinks.

use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam_channel::{Receiver, Sender, TrySendError};
use tracing::{trace, warn};

use crate::frame::CapturedFrame;
use crate::FRAME_CHANNEL_CAPACITY;

/// Push-based consumer of captured frames.
///
/// `on_frame` is invoked synchronously from the producing thread; a sink
/// that blocks directly delays the next frame's cadence.
pub trait FrameSink: Send + Sync {
    /// Handle one delivered frame.
    ///
    /// The frame and its buffer are only guaranteed valid for the duration
    /// of the call unless the consumer defers via the release-token contract.
    fn on_frame(&self, frame: &CapturedFrame);
}

impl<F> FrameSink for F
where
    F: Fn(&CapturedFrame) + Send + Sync,
{
    fn on_frame(&self, frame: &CapturedFrame) {
        self(frame)
    }
}

/// Sink that forwards frames into a bounded channel.
///
/// Frames are dropped (and counted) when the consumer lags behind the
/// producer's cadence, so the producing thread never blocks on delivery.
pub struct ChannelSink {
    frame_tx: Sender<CapturedFrame>,
    dropped: AtomicU64,
}

impl ChannelSink {
    /// Create a sink and its receiving end, bounded at
    /// [`FRAME_CHANNEL_CAPACITY`].
    pub fn bounded() -> (Self, Receiver<CapturedFrame>) {
        Self::with_capacity(FRAME_CHANNEL_CAPACITY)
    }

    /// Create a sink with an explicit channel capacity.
    pub fn with_capacity(capacity: usize) -> (Self, Receiver<CapturedFrame>) {
        let (frame_tx, frame_rx) = crossbeam_channel::bounded(capacity);
        (
            Self {
                frame_tx,
                dropped: AtomicU64::new(0),
            },
            frame_rx,
        )
    }

    /// Number of frames dropped because the channel was full.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl FrameSink for ChannelSink {
    fn on_frame(&self, frame: &CapturedFrame) {
        match self.frame_tx.try_send(frame.clone()) {
            Ok(()) => trace!(token = frame.token, "frame forwarded"),
            Err(TrySendError::Full(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                trace!(token = frame.token, "consumer lagging, frame dropped");
            }
            Err(TrySendError::Disconnected(_)) => {
                warn!(token = frame.token, "frame channel disconnected");
            }
        }
    }
}
