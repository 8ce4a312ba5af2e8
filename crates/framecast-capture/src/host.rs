//! Compositor host integration contract.

use tracing::debug;

/// The contract a browser host exposes to a capture session.
///
/// A session disables the host's automatic frame production while it exists
/// so that it exclusively controls frame timing, and restores the prior mode
/// on teardown. Implementations are borrowed references supplied by the
/// caller and must outlive the session.
pub trait CompositorHost: Send + Sync {
    /// Enable or disable the host's own begin-frame cadence.
    fn set_auto_frame_production(&self, enabled: bool);
}

/// Host standing in when no compositor integration is present.
#[derive(Debug, Default)]
pub struct HeadlessHost;

impl CompositorHost for HeadlessHost {
    fn set_auto_frame_production(&self, enabled: bool) {
        debug!(enabled, "headless host ignoring frame production mode");
    }
}
