//! # dialframe
//!
//! Turn a rotary dial into an image carousel on a Linux framebuffer.
//!
//! ## Features
//!
//! - Reads the dial straight from its `/dev/input` node (evdev or raw records)
//! - Debounces the two-samples-per-detent pattern of the dial
//! - Cycles a directory of raw, pre-sized frames with wrap-around
//! - Writes each frame verbatim into `/dev/fb0`, no decoding or scaling
//! - Optional recording and replay of dial sessions (`recorder` feature)
//!
//! ## Quick Start
//!
//! ```no_run
//! use dialframe::{
//!     CarouselController, Config, FramebufferWriter, ImageCatalog, InputDevice, INPUT_DEVICE,
//! };
//!
//! let config = Config::new();
//! let catalog = ImageCatalog::build("/srv/dial/images", config.order).expect("no images");
//! let source = InputDevice::open(INPUT_DEVICE).expect("no dial");
//! let writer = FramebufferWriter::new(config.geometry).expect("bad geometry");
//!
//! let err = match CarouselController::from_config(catalog, source, writer, &config).run() {
//!     Ok(never) => match never {},
//!     Err(err) => err,
//! };
//! eprintln!("carousel stopped: {}", err);
//! ```
//!
//! ## Architecture
//!
//! Everything runs on one thread. [`CarouselController`] blocks on its
//! [`SampleSource`] for the next batch of samples, feeds each one through the
//! [`EventFilter`] state machine, and for every accepted decision blits the
//! image under its [`Cursor`] before moving the cursor. Errors are terminal;
//! only image errors can be stepped over with [`ImageErrorPolicy::Skip`].

pub mod carousel;
pub mod catalog;
pub mod config;
pub mod error;
pub mod filter;
pub mod framebuffer;
#[cfg(feature = "recorder")]
pub mod recorder;
pub mod source;

mod platform;

// Re-exports
pub use carousel::{CarouselController, Cursor, ImageErrorPolicy, Shown};
pub use catalog::{CatalogOrder, ImageCatalog};
pub use config::{Config, DEFAULT_SETTLE};
pub use error::{Error, Result};
pub use filter::{DEFAULT_THRESHOLD, Decision, DirectionMap, EventFilter, FilterState, RawSample};
pub use framebuffer::{FRAMEBUFFER_DEVICE, FrameGeometry, FramebufferWriter};
#[cfg(feature = "recorder")]
pub use recorder::{RecordedSample, Recording, RecordingSource, ReplaySource};
pub use source::{INPUT_DEVICE, RawEventReader, SampleSource};

// Linux helpers
pub use platform::{
    CONSOLE_DEVICE, ConsoleMode, FB_SYSFS_DIR, InputDevice, is_root, probe_geometry,
    set_console_mode,
};
