//! Platform-specific implementations.

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "linux")]
pub use linux::*;

// Framebuffer, evdev and KDSETMODE are Linux interfaces
#[cfg(not(target_os = "linux"))]
compile_error!("dialframe only supports Linux");
