//! Captured frame types.

use std::ffi::c_void;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use bytes::Bytes;

/// How a captured frame surfaces its pixel payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum FrameStorage {
    /// Raw pixels in CPU-visible memory.
    SystemMemory = 0,

    /// GPU texture referenced through a shared handle.
    SharedTextureHandle = 1,

    /// Shared-memory region referenced through a handle.
    SharedMemoryHandle = 2,
}

/// Opaque native handle attached to shared-texture and shared-memory frames.
///
/// The handle is borrowed from the producer: it is valid only until the
/// frame is released by token or the session stops, whichever comes first.
#[derive(Debug, Clone, Copy)]
pub struct SharedFrameHandle(*mut c_void);

impl SharedFrameHandle {
    /// Wrap a raw native handle.
    pub fn new(raw: *mut c_void) -> Self {
        Self(raw)
    }

    /// The underlying raw handle.
    pub fn as_raw(&self) -> *mut c_void {
        self.0
    }
}

// The handle is an opaque token owned by the producer and carries no thread
// affinity of its own.
unsafe impl Send for SharedFrameHandle {}
unsafe impl Sync for SharedFrameHandle {}

/// Monotonic and wall-clock timestamps sampled together for one frame.
#[derive(Debug, Clone, Copy)]
pub struct CaptureTimestamp {
    /// Microseconds since the session's own monotonic epoch.
    pub monotonic_us: i64,

    /// Microseconds since the Unix epoch.
    pub wall_clock_us: i64,
}

impl CaptureTimestamp {
    /// Sample both clocks, relative to the given monotonic epoch.
    pub fn now(epoch: Instant) -> Self {
        let monotonic_us = epoch.elapsed().as_micros() as i64;
        let wall_clock_us = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_micros() as i64)
            .unwrap_or(0);

        Self {
            monotonic_us,
            wall_clock_us,
        }
    }
}

/// A captured compositor frame.
///
/// The `buffer` aliases the producer's staging memory and stays valid until
/// the consumer releases the frame's token or the session stops.
#[derive(Debug, Clone)]
pub struct CapturedFrame {
    /// Unique, strictly increasing token correlating delivery with release.
    /// Starts at 1 for each session.
    pub token: u64,

    /// Raw pixel payload; `None` when the configured size is zero.
    pub buffer: Option<Bytes>,

    /// Native shared handle for non-system-memory storage.
    pub shared_handle: Option<SharedFrameHandle>,

    /// Frame width in pixels.
    pub width: i32,

    /// Frame height in pixels.
    pub height: i32,

    /// Row stride in bytes.
    pub stride: i32,

    /// Capture timestamps.
    pub timestamp: CaptureTimestamp,

    /// How the payload is stored.
    pub storage: FrameStorage,
}
