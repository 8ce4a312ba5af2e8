//! C-linkage lifecycle API over the capture session.
//!
//! Entry points tolerate null handles throughout: invalid arguments reject
//! at creation with a null return, everything else degrades to a no-op. The
//! API must never unwind or fault an embedding host process, so start
//! failures are logged rather than surfaced.

use std::ffi::c_void;
use std::ptr;
use std::sync::Arc;

use tracing::{error, trace};

use framecast_capture::{
    CaptureConfig, CaptureSession, CapturedFrame, CompositorHost, FrameSink, PlatformProvider,
};

/// C mirror of the capture configuration.
#[repr(C)]
pub struct FcCaptureConfig {
    pub width: i32,
    pub height: i32,
    pub frame_rate_numerator: i32,
    pub frame_rate_denominator: i32,
}

/// C view of one delivered frame.
///
/// The descriptor and its buffer pointer are valid only for the duration of
/// the callback unless the consumer defers release via the token contract.
#[repr(C)]
pub struct FcCapturedFrame {
    pub token: u64,
    pub pixel_buffer: *const u8,
    pub shared_handle: *mut c_void,
    pub width: i32,
    pub height: i32,
    pub stride: i32,
    pub monotonic_us: i64,
    pub wall_clock_us: i64,
    /// Storage discriminant: 0 system memory, 1 shared texture handle,
    /// 2 shared memory handle.
    pub storage: u32,
}

/// Per-frame callback, invoked synchronously from the producing thread.
///
/// The callback must not re-enter [`fc_session_stop`] or
/// [`fc_session_destroy`]; both join the producing thread.
pub type FcFrameCallback = Option<unsafe extern "C" fn(*const FcCapturedFrame, *mut c_void)>;

/// Borrowed host vtable.
///
/// The caller retains ownership of `user_data` and must keep it valid for
/// the whole session lifetime.
#[repr(C)]
pub struct FcCompositorHost {
    pub user_data: *mut c_void,
    pub set_auto_frame_production: Option<unsafe extern "C" fn(*mut c_void, bool)>,
}

/// Opaque session handle.
pub struct FcCaptureSession {
    session: CaptureSession,
}

/// Adapter invoking the C frame callback.
struct CallbackSink {
    callback: unsafe extern "C" fn(*const FcCapturedFrame, *mut c_void),
    user_data: *mut c_void,
}

// The caller contracts that user_data is usable from the producing thread
// for the session's lifetime.
unsafe impl Send for CallbackSink {}
unsafe impl Sync for CallbackSink {}

impl FrameSink for CallbackSink {
    fn on_frame(&self, frame: &CapturedFrame) {
        let view = FcCapturedFrame {
            token: frame.token,
            pixel_buffer: frame
                .buffer
                .as_ref()
                .map(|buffer| buffer.as_ptr())
                .unwrap_or(ptr::null()),
            shared_handle: frame
                .shared_handle
                .map(|handle| handle.as_raw())
                .unwrap_or(ptr::null_mut()),
            width: frame.width,
            height: frame.height,
            stride: frame.stride,
            monotonic_us: frame.timestamp.monotonic_us,
            wall_clock_us: frame.timestamp.wall_clock_us,
            storage: frame.storage as u32,
        };
        unsafe { (self.callback)(&view, self.user_data) };
    }
}

/// Adapter forwarding frame-production mode changes to the host vtable.
struct HostHandle {
    user_data: *mut c_void,
    set_auto_frame_production: Option<unsafe extern "C" fn(*mut c_void, bool)>,
}

unsafe impl Send for HostHandle {}
unsafe impl Sync for HostHandle {}

impl CompositorHost for HostHandle {
    fn set_auto_frame_production(&self, enabled: bool) {
        if let Some(set_mode) = self.set_auto_frame_production {
            unsafe { set_mode(self.user_data, enabled) };
        }
    }
}

/// Create a capture session.
///
/// Returns null, allocating nothing, when the host, configuration, or
/// callback is absent. The returned handle must be destroyed with
/// [`fc_session_destroy`].
///
/// # Safety
/// `host` and `config` must point to valid structs for the duration of the
/// call; the host's `user_data` and the callback's `user_data` must stay
/// valid for the session's lifetime.
#[no_mangle]
pub unsafe extern "C" fn fc_session_create(
    host: *const FcCompositorHost,
    config: *const FcCaptureConfig,
    callback: FcFrameCallback,
    user_data: *mut c_void,
) -> *mut FcCaptureSession {
    let (Some(host), Some(config), Some(callback)) = (host.as_ref(), config.as_ref(), callback)
    else {
        error!("session creation rejected: null host, config, or callback");
        return ptr::null_mut();
    };

    let config = CaptureConfig {
        width: config.width,
        height: config.height,
        frame_rate_numerator: config.frame_rate_numerator,
        frame_rate_denominator: config.frame_rate_denominator,
    };
    let host = Arc::new(HostHandle {
        user_data: host.user_data,
        set_auto_frame_production: host.set_auto_frame_production,
    });
    let sink = Arc::new(CallbackSink {
        callback,
        user_data,
    });

    let session = CaptureSession::new(host, config, sink, &PlatformProvider);
    Box::into_raw(Box::new(FcCaptureSession { session }))
}

/// Begin frame production. No-op on a null handle; a start failure is
/// logged, never surfaced.
///
/// # Safety
/// `session` must be null or a handle returned by [`fc_session_create`]
/// that has not been destroyed.
#[no_mangle]
pub unsafe extern "C" fn fc_session_start(session: *mut FcCaptureSession) {
    let Some(session) = session.as_ref() else {
        return;
    };

    if let Err(e) = session.session.start() {
        error!("capture start failed: {e}");
    }
}

/// Halt frame production, joining any worker thread before returning.
/// No-op on a null handle.
///
/// # Safety
/// Same handle contract as [`fc_session_start`].
#[no_mangle]
pub unsafe extern "C" fn fc_session_stop(session: *mut FcCaptureSession) {
    let Some(session) = session.as_ref() else {
        return;
    };

    session.session.stop();
}

/// Return a delivered frame by token. Unknown or stale tokens are ignored.
///
/// # Safety
/// Same handle contract as [`fc_session_start`].
#[no_mangle]
pub unsafe extern "C" fn fc_session_release_frame(session: *mut FcCaptureSession, token: u64) {
    let Some(session) = session.as_ref() else {
        return;
    };

    trace!(token, "release requested");
    session.session.release_frame(token);
}

/// Stop and destroy a session, restoring the host's automatic frame
/// production. No-op on a null handle.
///
/// # Safety
/// `session` must be null or a handle returned by [`fc_session_create`];
/// the handle must not be used again after this call.
#[no_mangle]
pub unsafe extern "C" fn fc_session_destroy(session: *mut FcCaptureSession) {
    if session.is_null() {
        return;
    }

    drop(Box::from_raw(session));
}
