//! Error types for the dial carousel.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for dialframe operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building the catalog or driving the display.
///
/// Every variant is terminal for the appliance loop, apart from image errors
/// when the controller runs with [`ImageErrorPolicy::Skip`](crate::ImageErrorPolicy::Skip).
#[derive(Debug, Error)]
pub enum Error {
    /// The image directory could not be opened or listed.
    #[error("cannot read image directory {}: {source}", .path.display())]
    Directory {
        /// Directory that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The image directory has no real entries.
    #[error("image directory {} is empty", .0.display())]
    EmptyDirectory(PathBuf),

    /// A catalog lookup fell outside the valid index range.
    #[error("index {index} out of range for catalog of {len} images")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of catalog entries.
        len: usize,
    },

    /// The input or display device could not be opened.
    #[error("cannot open device {}: {source}", .path.display())]
    DeviceOpen {
        /// Device node.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// An image file could not be opened.
    #[error("failed to open image {}: {source}", .path.display())]
    ImageOpen {
        /// Image file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// An image file did not hold exactly one frame.
    #[error("failed to read image {}: {source}", .path.display())]
    ImageRead {
        /// Image file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The display device accepted less than one full frame.
    #[error("failed to write image to {}: {source}", .path.display())]
    DeviceWrite {
        /// Display device.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Reading the next input sample failed.
    #[error("input read failed: {0}")]
    InputRead(String),

    /// The configured frame geometry is unusable.
    #[error("invalid frame geometry: {0}")]
    InvalidGeometry(String),

    /// Switching the console mode failed.
    #[error("console error: {0}")]
    Console(String),

    /// Saving or loading a sample recording failed.
    #[cfg(feature = "recorder")]
    #[error("recording error: {0}")]
    Recording(String),
}

impl Error {
    /// Whether this error concerns a single image rather than a device.
    ///
    /// These are the errors a skip policy may step over.
    pub fn is_image_error(&self) -> bool {
        matches!(self, Error::ImageOpen { .. } | Error::ImageRead { .. })
    }
}
