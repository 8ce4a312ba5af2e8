//! Compositor frame capture sessions.
//!
//! This crate owns the lifecycle and timing engine for streaming rendered
//! compositor frames to an external consumer: it starts and stops a frame
//! producer safely across threads, synthesizes a governed cadence when no
//! native capturer is available, and hands frames to a caller-supplied sink
//! via tokened buffers.

mod config;
mod error;
mod frame;
mod host;
mod producer;
mod provider;
mod session;
mod sink;
mod synthetic;
mod timing;

pub use config::{CaptureConfig, BYTES_PER_PIXEL};
pub use error::CaptureError;
pub use frame::{CaptureTimestamp, CapturedFrame, FrameStorage, SharedFrameHandle};
pub use host::{CompositorHost, HeadlessHost};
pub use producer::{FrameProducer, NativeCapturer, NativeProducer};
pub use provider::{CaptureProvider, PlatformProvider};
pub use session::CaptureSession;
pub use sink::{ChannelSink, FrameSink};
pub use synthetic::SyntheticProducer;
pub use timing::{frame_interval, DEFAULT_FRAME_INTERVAL_US};

/// Default channel capacity for the channel-backed frame sink.
pub const FRAME_CHANNEL_CAPACITY: usize = 3;

/// Result type for capture operations.
pub type CaptureResult<T> = Result<T, CaptureError>;
