//! Native capture availability probing.

use std::sync::Arc;

use crate::config::CaptureConfig;
use crate::producer::NativeCapturer;
use crate::sink::FrameSink;

/// Probes for a platform compositor capturer when a session is constructed.
///
/// Injecting the provider keeps both producer variants constructible in
/// tests without any platform dependency.
pub trait CaptureProvider: Send + Sync {
    /// Create a native capturer delivering to the given sink, or `None`
    /// when the platform offers no compositor-level capture.
    fn create_capturer(
        &self,
        config: &CaptureConfig,
        sink: Arc<dyn FrameSink>,
    ) -> Option<Box<dyn NativeCapturer>>;
}

/// Production provider.
///
/// No compositor-level capturer is wired into this build, so sessions fall
/// back to the synthetic producer.
#[derive(Debug, Default)]
pub struct PlatformProvider;

impl CaptureProvider for PlatformProvider {
    fn create_capturer(
        &self,
        _config: &CaptureConfig,
        _sink: Arc<dyn FrameSink>,
    ) -> Option<Box<dyn NativeCapturer>> {
        None
    }
}
