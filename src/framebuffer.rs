//! Raw frame transfer into the display device.

use crate::error::{Error, Result};
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

/// Display device the appliance writes to.
pub const FRAMEBUFFER_DEVICE: &str = "/dev/fb0";

/// Resolution and colour depth of one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameGeometry {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Colour depth in bits.
    pub bits_per_pixel: u32,
}

impl Default for FrameGeometry {
    /// The round 380x380 panel at 24 bits per pixel.
    fn default() -> Self {
        Self {
            width: 380,
            height: 380,
            bits_per_pixel: 24,
        }
    }
}

impl FrameGeometry {
    /// Create a geometry and check that a frame of it can be buffered.
    pub fn new(width: u32, height: u32, bits_per_pixel: u32) -> Result<Self> {
        let geometry = Self {
            width,
            height,
            bits_per_pixel,
        };
        geometry.frame_size()?;
        Ok(geometry)
    }

    /// Bytes per pixel.
    pub fn bytes_per_pixel(&self) -> u32 {
        self.bits_per_pixel / 8
    }

    /// Size of one frame in bytes.
    pub fn frame_size(&self) -> Result<usize> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::InvalidGeometry(format!(
                "{}x{} has no pixels",
                self.width, self.height
            )));
        }
        if self.bits_per_pixel == 0 || self.bits_per_pixel % 8 != 0 {
            return Err(Error::InvalidGeometry(format!(
                "{} bits per pixel is not a whole number of bytes",
                self.bits_per_pixel
            )));
        }

        (self.width as usize)
            .checked_mul(self.height as usize)
            .and_then(|pixels| pixels.checked_mul(self.bytes_per_pixel() as usize))
            .ok_or_else(|| Error::InvalidGeometry(format!("{self} overflows a frame buffer")))
    }
}

impl std::fmt::Display for FrameGeometry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}@{}bpp", self.width, self.height, self.bits_per_pixel)
    }
}

/// Copies raw image files verbatim into a display device.
///
/// The device is opened for every blit, so each frame lands at offset zero.
/// No handle is kept between blits.
#[derive(Debug)]
pub struct FramebufferWriter {
    device: PathBuf,
    geometry: FrameGeometry,
    buffer: Vec<u8>,
}

impl FramebufferWriter {
    /// Writer for the appliance display at [`FRAMEBUFFER_DEVICE`].
    pub fn new(geometry: FrameGeometry) -> Result<Self> {
        Self::with_device(FRAMEBUFFER_DEVICE, geometry)
    }

    /// Writer for an arbitrary device node or file.
    pub fn with_device(device: impl Into<PathBuf>, geometry: FrameGeometry) -> Result<Self> {
        let frame_size = geometry.frame_size()?;
        Ok(Self {
            device: device.into(),
            geometry,
            buffer: vec![0; frame_size],
        })
    }

    /// Device this writer targets.
    pub fn device(&self) -> &Path {
        &self.device
    }

    /// Geometry every image must match.
    pub fn geometry(&self) -> FrameGeometry {
        self.geometry
    }

    /// Bytes per frame.
    pub fn frame_size(&self) -> usize {
        self.buffer.len()
    }

    /// Copy one image file to the display.
    ///
    /// The whole frame is read before the device is touched: an image that
    /// is missing, short or longer than one frame never reaches the display.
    pub fn blit(&mut self, source: impl AsRef<Path>) -> Result<()> {
        let source = source.as_ref();

        let mut image = File::open(source).map_err(|source_err| Error::ImageOpen {
            path: source.to_path_buf(),
            source: source_err,
        })?;
        read_frame(&mut image, &mut self.buffer).map_err(|source_err| Error::ImageRead {
            path: source.to_path_buf(),
            source: source_err,
        })?;
        drop(image);

        let mut device = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&self.device)
            .map_err(|source| Error::DeviceOpen {
                path: self.device.clone(),
                source,
            })?;
        device
            .write_all(&self.buffer)
            .and_then(|()| device.flush())
            .map_err(|source| Error::DeviceWrite {
                path: self.device.clone(),
                source,
            })?;

        log::debug!(
            "wrote {} bytes from {} to {}",
            self.buffer.len(),
            source.display(),
            self.device.display()
        );
        Ok(())
    }
}

/// Fill `frame` from `reader` and require the reader to be exhausted.
fn read_frame(reader: &mut impl Read, frame: &mut [u8]) -> io::Result<()> {
    reader.read_exact(frame).map_err(|err| {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("image is shorter than one {}-byte frame", frame.len()),
            )
        } else {
            err
        }
    })?;

    let mut probe = [0u8; 1];
    loop {
        match reader.read(&mut probe) {
            Ok(0) => return Ok(()),
            Ok(_) => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("image is longer than one {}-byte frame", frame.len()),
                ));
            }
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        }
    }
}
