//! Linux platform implementation.
//!
//! Supports two input backends:
//! - **evdev** (default): reads the dial through the `evdev` crate
//! - **raw**: decodes `struct input_event` records straight from the device
//!   node, used when the `evdev` feature is disabled
//!
//! Console mode switching, the privilege check and the framebuffer geometry
//! probe are plain syscalls and sysfs reads shared by both backends.
//!
//! ## Permissions
//!
//! The carousel needs read access to the input device, write access to
//! `/dev/fb0` and, for the console switch, to `/dev/tty0`. Running as root
//! works; otherwise add the user to the `input` and `video` groups:
//! ```bash
//! sudo usermod -aG input,video,tty $USER
//! # Then log out and back in
//! ```

mod console;
mod sysfs;

#[cfg(feature = "evdev")]
mod evdev;

#[cfg(not(feature = "evdev"))]
mod raw;

pub use console::{CONSOLE_DEVICE, ConsoleMode, set_console_mode};
pub use sysfs::{FB_SYSFS_DIR, probe_geometry};

#[cfg(feature = "evdev")]
pub use self::evdev::EvdevSource as InputDevice;

#[cfg(not(feature = "evdev"))]
pub use raw::RawInputDevice as InputDevice;

/// Whether the process runs with root's effective user id.
pub fn is_root() -> bool {
    // SAFETY: geteuid has no preconditions and cannot fail.
    unsafe { libc::geteuid() == 0 }
}
