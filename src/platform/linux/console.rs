//! Virtual console text/graphics mode switching.
//!
//! In text mode the kernel keeps drawing the console (cursor, blanking,
//! messages) on top of the framebuffer. `KD_GRAPHICS` stops that.

use crate::error::{Error, Result};
use std::fs::OpenOptions;
use std::io;
use std::os::unix::io::AsRawFd;
use std::path::Path;

/// Virtual console whose mode is switched.
pub const CONSOLE_DEVICE: &str = "/dev/tty0";

/// `KDSETMODE` from `<linux/kd.h>`.
const KDSETMODE: libc::c_ulong = 0x4B3A;

/// Console display mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConsoleMode {
    /// `KD_TEXT`: the kernel renders the text console.
    Text,
    /// `KD_GRAPHICS`: the kernel leaves the framebuffer alone.
    Graphics,
}

impl ConsoleMode {
    fn raw(self) -> libc::c_int {
        match self {
            ConsoleMode::Text => 0x00,
            ConsoleMode::Graphics => 0x01,
        }
    }
}

/// Switch the virtual console at `path` into `mode`.
pub fn set_console_mode(path: impl AsRef<Path>, mode: ConsoleMode) -> Result<()> {
    let path = path.as_ref();
    let tty = OpenOptions::new()
        .read(true)
        .write(true)
        .open(path)
        .map_err(|e| {
            Error::Console(format!(
                "could not open virtual console {}: {}",
                path.display(),
                e
            ))
        })?;

    // SAFETY: KDSETMODE takes its argument by value; the fd is valid for the
    // lifetime of `tty`.
    let ret = unsafe { libc::ioctl(tty.as_raw_fd(), KDSETMODE as _, mode.raw()) };
    if ret < 0 {
        return Err(Error::Console(format!(
            "could not set {} to {:?} mode: {}",
            path.display(),
            mode,
            io::Error::last_os_error()
        )));
    }

    log::info!("console {} set to {:?} mode", path.display(), mode);
    Ok(())
}
