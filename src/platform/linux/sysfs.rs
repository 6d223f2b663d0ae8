//! Framebuffer geometry as reported by sysfs.

use crate::framebuffer::FrameGeometry;
use std::fs;
use std::path::Path;

/// sysfs directory of the appliance framebuffer.
pub const FB_SYSFS_DIR: &str = "/sys/class/graphics/fb0";

/// Read the geometry the kernel reports for a framebuffer.
///
/// Best-effort: any missing or unparsable attribute yields `None`.
pub fn probe_geometry(sysfs_dir: impl AsRef<Path>) -> Option<FrameGeometry> {
    let dir = sysfs_dir.as_ref();
    let size = fs::read_to_string(dir.join("virtual_size")).ok()?;
    let bpp = fs::read_to_string(dir.join("bits_per_pixel")).ok()?;
    let (width, height) = parse_virtual_size(&size)?;
    let bits_per_pixel = bpp.trim().parse::<u32>().ok()?;
    FrameGeometry::new(width, height, bits_per_pixel).ok()
}

fn parse_virtual_size(input: &str) -> Option<(u32, u32)> {
    let (w, h) = input.trim().split_once(',')?;
    Some((w.trim().parse::<u32>().ok()?, h.trim().parse::<u32>().ok()?))
}
