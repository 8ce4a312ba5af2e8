//! Capture session management.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, instrument, trace};

use crate::config::CaptureConfig;
use crate::host::CompositorHost;
use crate::producer::{FrameProducer, NativeProducer};
use crate::provider::CaptureProvider;
use crate::sink::FrameSink;
use crate::synthetic::SyntheticProducer;
use crate::CaptureResult;

/// A session streaming compositor frames to an external sink.
///
/// The session exclusively controls frame timing while it exists: the
/// host's automatic frame production is disabled at construction and
/// restored when the session is dropped. All public operations may be
/// invoked from any thread.
pub struct CaptureSession {
    host: Arc<dyn CompositorHost>,
    config: CaptureConfig,
    producer: Mutex<Box<dyn FrameProducer>>,
    started: AtomicBool,
}

impl CaptureSession {
    /// Create a stopped session.
    ///
    /// The provider is probed once: frames come from a native capturer when
    /// the platform offers one, from the synthetic fallback producer
    /// otherwise.
    #[instrument(name = "capture_session_new", skip_all)]
    pub fn new(
        host: Arc<dyn CompositorHost>,
        config: CaptureConfig,
        sink: Arc<dyn FrameSink>,
        provider: &dyn CaptureProvider,
    ) -> Self {
        host.set_auto_frame_production(false);

        let producer: Box<dyn FrameProducer> =
            match provider.create_capturer(&config, Arc::clone(&sink)) {
                Some(capturer) => {
                    debug!("using native frame producer");
                    Box::new(NativeProducer::new(capturer))
                }
                None => {
                    debug!("no native capturer available, using synthetic producer");
                    Box::new(SyntheticProducer::new(config, sink))
                }
            };

        info!(
            width = config.width,
            height = config.height,
            numerator = config.frame_rate_numerator,
            denominator = config.frame_rate_denominator,
            "capture session created"
        );

        Self {
            host,
            config,
            producer: Mutex::new(producer),
            started: AtomicBool::new(false),
        }
    }

    /// Configuration snapshot, immutable after creation.
    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    /// Arm the producer.
    ///
    /// Idempotent: only the call that transitions the session to started
    /// does any work. A producer start failure reverts the transition.
    #[instrument(name = "capture_start", skip(self))]
    pub fn start(&self) -> CaptureResult<()> {
        if self
            .started
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("session already started");
            return Ok(());
        }

        if let Err(e) = self.producer.lock().start() {
            self.started.store(false, Ordering::SeqCst);
            return Err(e);
        }

        info!("capture started");
        Ok(())
    }

    /// Halt the producer, joining any worker thread before returning.
    ///
    /// Idempotent and safe from any thread; a second call performs no
    /// additional work.
    #[instrument(name = "capture_stop", skip(self))]
    pub fn stop(&self) {
        if !self.started.swap(false, Ordering::SeqCst) {
            return;
        }

        self.producer.lock().stop();
        info!("capture stopped");
    }

    /// Return a delivered frame for buffer reuse or native reclamation.
    ///
    /// Unknown or stale tokens are a benign no-op: frames may legitimately
    /// be released after the session restarts.
    pub fn release_frame(&self, token: u64) {
        trace!(token, "releasing frame");

        // Never block a release against a stop in progress; a release that
        // loses that race is a stale token, and stale tokens are ignored.
        if let Some(mut producer) = self.producer.try_lock() {
            producer.release_frame(token);
        }
    }

    /// Whether the session is started and its producer still running.
    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst) && self.producer.lock().is_running()
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        self.stop();
        self.host.set_auto_frame_production(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CaptureError;
    use crate::frame::FrameStorage;
    use crate::producer::NativeCapturer;
    use crate::provider::PlatformProvider;
    use crate::sink::ChannelSink;
    use std::time::Duration;

    fn fast_config() -> CaptureConfig {
        CaptureConfig {
            width: 64,
            height: 48,
            frame_rate_numerator: 1_000,
            frame_rate_denominator: 1,
        }
    }

    #[derive(Default)]
    struct RecordingHost {
        modes: Mutex<Vec<bool>>,
    }

    impl CompositorHost for RecordingHost {
        fn set_auto_frame_production(&self, enabled: bool) {
            self.modes.lock().push(enabled);
        }
    }

    fn synthetic_session(config: CaptureConfig, sink: ChannelSink) -> CaptureSession {
        CaptureSession::new(
            Arc::new(RecordingHost::default()),
            config,
            Arc::new(sink),
            &PlatformProvider,
        )
    }

    #[test]
    fn test_session_controls_host_frame_production() {
        let host = Arc::new(RecordingHost::default());
        let (sink, _frames) = ChannelSink::bounded();
        let session =
            CaptureSession::new(host.clone(), fast_config(), Arc::new(sink), &PlatformProvider);

        assert_eq!(*host.modes.lock(), vec![false]);
        drop(session);
        assert_eq!(*host.modes.lock(), vec![false, true]);
    }

    #[test]
    fn test_tokens_are_gap_free_from_one() {
        let (sink, frames) = ChannelSink::with_capacity(256);
        let session = synthetic_session(fast_config(), sink);

        session.start().unwrap();
        let mut tokens = Vec::new();
        for _ in 0..5 {
            tokens.push(frames.recv_timeout(Duration::from_secs(1)).unwrap().token);
        }
        session.stop();

        assert_eq!(tokens, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_frame_geometry_and_storage() {
        let config = CaptureConfig {
            width: 1920,
            height: 1080,
            frame_rate_numerator: 30,
            frame_rate_denominator: 1,
        };
        let (sink, frames) = ChannelSink::with_capacity(4);
        let session = synthetic_session(config, sink);

        session.start().unwrap();
        let frame = frames.recv_timeout(Duration::from_secs(1)).unwrap();
        session.stop();

        assert_eq!(frame.width, 1920);
        assert_eq!(frame.height, 1080);
        assert_eq!(frame.stride, 7680);
        assert_eq!(frame.storage, FrameStorage::SystemMemory);
        assert_eq!(frame.buffer.as_ref().unwrap().len(), 1920 * 1080 * 4);
        assert!(frame.shared_handle.is_none());
    }

    #[test]
    fn test_zero_size_config_delivers_empty_frames() {
        let config = CaptureConfig {
            width: 0,
            height: 0,
            frame_rate_numerator: 1_000,
            frame_rate_denominator: 1,
        };
        let (sink, frames) = ChannelSink::with_capacity(4);
        let session = synthetic_session(config, sink);

        session.start().unwrap();
        let frame = frames.recv_timeout(Duration::from_secs(1)).unwrap();
        session.stop();

        assert!(frame.buffer.is_none());
        assert_eq!(frame.stride, 0);
    }

    #[test]
    fn test_stop_joins_worker_and_is_idempotent() {
        let (sink, frames) = ChannelSink::with_capacity(256);
        let session = synthetic_session(fast_config(), sink);

        session.start().unwrap();
        frames.recv_timeout(Duration::from_secs(1)).unwrap();
        session.stop();
        session.stop();
        assert!(!session.is_started());

        // The worker has joined; frames already queued may remain, but no
        // new ones arrive.
        while frames.try_recv().is_ok() {}
        std::thread::sleep(Duration::from_millis(20));
        assert!(frames.try_recv().is_err());
    }

    #[test]
    fn test_double_start_produces_one_worker() {
        let (sink, frames) = ChannelSink::with_capacity(256);
        let session = synthetic_session(fast_config(), sink);

        session.start().unwrap();
        session.start().unwrap();

        let mut tokens = Vec::new();
        for _ in 0..5 {
            tokens.push(frames.recv_timeout(Duration::from_secs(1)).unwrap().token);
        }
        session.stop();

        // A duplicate loop would interleave deliveries out of order.
        assert_eq!(tokens, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_release_unknown_token_is_noop() {
        let (sink, _frames) = ChannelSink::bounded();
        let session = synthetic_session(fast_config(), sink);

        session.release_frame(9_999);
        session.start().unwrap();
        session.release_frame(12_345);
        session.stop();
        session.release_frame(1);
    }

    #[derive(Default)]
    struct MockCapturer {
        events: Arc<Mutex<Vec<String>>>,
        fail_start: bool,
    }

    impl NativeCapturer for MockCapturer {
        fn start(&mut self) -> crate::CaptureResult<()> {
            if self.fail_start {
                return Err(CaptureError::Native {
                    message: "backend unavailable".into(),
                });
            }
            self.events.lock().push("start".into());
            Ok(())
        }

        fn stop(&mut self) -> crate::CaptureResult<()> {
            self.events.lock().push("stop".into());
            Ok(())
        }

        fn release_frame(&mut self, token: u64) {
            self.events.lock().push(format!("release {token}"));
        }
    }

    struct MockProvider {
        events: Arc<Mutex<Vec<String>>>,
        fail_start: bool,
    }

    impl CaptureProvider for MockProvider {
        fn create_capturer(
            &self,
            _config: &CaptureConfig,
            _sink: Arc<dyn FrameSink>,
        ) -> Option<Box<dyn NativeCapturer>> {
            Some(Box::new(MockCapturer {
                events: Arc::clone(&self.events),
                fail_start: self.fail_start,
            }))
        }
    }

    #[test]
    fn test_native_producer_delegates_lifecycle() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let provider = MockProvider {
            events: Arc::clone(&events),
            fail_start: false,
        };
        let (sink, frames) = ChannelSink::bounded();
        let session = CaptureSession::new(
            Arc::new(RecordingHost::default()),
            fast_config(),
            Arc::new(sink),
            &provider,
        );

        session.start().unwrap();
        assert!(session.is_started());
        session.release_frame(7);
        session.stop();

        assert_eq!(*events.lock(), vec!["start", "release 7", "stop"]);
        // The native path spawns no synthetic worker.
        assert!(frames.try_recv().is_err());
    }

    #[test]
    fn test_native_start_failure_leaves_session_stopped() {
        let provider = MockProvider {
            events: Arc::new(Mutex::new(Vec::new())),
            fail_start: true,
        };
        let (sink, _frames) = ChannelSink::bounded();
        let session = CaptureSession::new(
            Arc::new(RecordingHost::default()),
            fast_config(),
            Arc::new(sink),
            &provider,
        );

        assert!(session.start().is_err());
        assert!(!session.is_started());
    }
}
