//! Capture configuration.

use serde::{Deserialize, Serialize};

/// Bytes per pixel of the raw BGRA framebuffer.
pub const BYTES_PER_PIXEL: i32 = 4;

/// Configuration supplied when creating a capture session.
///
/// The frame rate is a fraction: the inter-frame period is
/// `frame_rate_denominator / frame_rate_numerator` seconds. Non-positive
/// dimensions yield an empty staging buffer and a zero stride; a
/// non-positive rate component falls back to the default cadence.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Requested frame width in pixels.
    pub width: i32,

    /// Requested frame height in pixels.
    pub height: i32,

    /// Frame-rate fraction numerator.
    pub frame_rate_numerator: i32,

    /// Frame-rate fraction denominator.
    pub frame_rate_denominator: i32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            frame_rate_numerator: 30,
            frame_rate_denominator: 1,
        }
    }
}

impl CaptureConfig {
    /// Staging buffer size in bytes; zero when either dimension is non-positive.
    pub fn buffer_size(&self) -> usize {
        if self.width <= 0 || self.height <= 0 {
            return 0;
        }

        self.width as usize * self.height as usize * BYTES_PER_PIXEL as usize
    }

    /// Row stride in bytes; zero when the width is non-positive.
    pub fn stride(&self) -> i32 {
        if self.width <= 0 {
            return 0;
        }

        self.width * BYTES_PER_PIXEL
    }
}
