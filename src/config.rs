//! Run-time settings of the carousel.
//!
//! Device nodes are fixed constants ([`INPUT_DEVICE`](crate::INPUT_DEVICE),
//! [`FRAMEBUFFER_DEVICE`](crate::FRAMEBUFFER_DEVICE),
//! [`CONSOLE_DEVICE`](crate::CONSOLE_DEVICE)) and are not part of the config.

use crate::carousel::ImageErrorPolicy;
use crate::catalog::CatalogOrder;
use crate::filter::{DEFAULT_THRESHOLD, DirectionMap, EventFilter};
use crate::framebuffer::FrameGeometry;
use std::time::Duration;

/// Default pause after each blit.
pub const DEFAULT_SETTLE: Duration = Duration::from_secs(1);

/// Settings for one carousel run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Resolution and depth every image must match.
    pub geometry: FrameGeometry,
    /// Magnitude a sample must exceed to count.
    pub threshold: i32,
    /// Sign to direction mapping of the dial.
    pub direction: DirectionMap,
    /// Ordering of the image catalog.
    pub order: CatalogOrder,
    /// Pause after each blit so the device finishes the transfer.
    pub settle: Duration,
    /// Handling of missing or malformed images.
    pub on_image_error: ImageErrorPolicy,
    /// Put the console into graphics mode before the loop starts.
    pub switch_console: bool,
    /// Put the console back into text mode when interrupted.
    pub restore_console: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            geometry: FrameGeometry::default(),
            threshold: DEFAULT_THRESHOLD,
            direction: DirectionMap::default(),
            order: CatalogOrder::default(),
            settle: DEFAULT_SETTLE,
            on_image_error: ImageErrorPolicy::default(),
            switch_console: true,
            restore_console: false,
        }
    }
}

impl Config {
    /// Default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the frame geometry.
    pub fn with_geometry(mut self, geometry: FrameGeometry) -> Self {
        self.geometry = geometry;
        self
    }

    /// Set the debounce threshold.
    pub fn with_threshold(mut self, threshold: i32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set the direction mapping.
    pub fn with_direction(mut self, direction: DirectionMap) -> Self {
        self.direction = direction;
        self
    }

    /// Set the catalog order.
    pub fn with_order(mut self, order: CatalogOrder) -> Self {
        self.order = order;
        self
    }

    /// Set the post-blit pause.
    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    /// Set the bad-image policy.
    pub fn with_image_error_policy(mut self, policy: ImageErrorPolicy) -> Self {
        self.on_image_error = policy;
        self
    }

    /// Enable or disable the console switch, and its restore on interrupt.
    pub fn with_console(mut self, switch: bool, restore: bool) -> Self {
        self.switch_console = switch;
        self.restore_console = switch && restore;
        self
    }

    /// A fresh filter for these settings.
    pub fn event_filter(&self) -> EventFilter {
        EventFilter::new(self.threshold, self.direction)
    }
}
