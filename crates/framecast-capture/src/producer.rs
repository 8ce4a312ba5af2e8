//! Frame producer capability seam.

use tracing::warn;

use crate::CaptureResult;

/// A platform-level compositor capturer, treated as an external collaborator.
///
/// Its threading and frame delivery are its own concern; the session only
/// drives its lifecycle.
pub trait NativeCapturer: Send {
    /// Begin producing frames.
    fn start(&mut self) -> CaptureResult<()>;

    /// Stop producing frames.
    fn stop(&mut self) -> CaptureResult<()>;

    /// Reclaim a delivered frame's native resources. Unknown or stale
    /// tokens must be ignored.
    fn release_frame(&mut self, _token: u64) {}
}

/// Polymorphism seam between the native and synthetic producers, selected
/// once when the session is constructed.
pub trait FrameProducer: Send {
    /// Begin producing frames.
    fn start(&mut self) -> CaptureResult<()>;

    /// Stop producing. Must not return while a worker thread is still
    /// executing its loop body.
    fn stop(&mut self);

    /// Return a delivered frame by token.
    fn release_frame(&mut self, token: u64);

    /// Whether the producer is currently running.
    fn is_running(&self) -> bool;
}

/// Producer backed by a platform capturer. Adds no threads of its own.
pub struct NativeProducer {
    capturer: Box<dyn NativeCapturer>,
    running: bool,
}

impl NativeProducer {
    /// Wrap a native capturer.
    pub fn new(capturer: Box<dyn NativeCapturer>) -> Self {
        Self {
            capturer,
            running: false,
        }
    }
}

impl FrameProducer for NativeProducer {
    fn start(&mut self) -> CaptureResult<()> {
        self.capturer.start()?;
        self.running = true;
        Ok(())
    }

    fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;

        // Stop must not fail; a backend error here is logged and dropped.
        if let Err(e) = self.capturer.stop() {
            warn!("native capturer stop failed: {e}");
        }
    }

    fn release_frame(&mut self, token: u64) {
        self.capturer.release_frame(token);
    }

    fn is_running(&self) -> bool {
        self.running
    }
}
