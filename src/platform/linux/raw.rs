//! Raw `struct input_event` backend for builds without the `evdev` feature.

use crate::error::Result;
use crate::filter::RawSample;
use crate::source::{RawEventReader, SampleSource};
use std::fs::File;
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};

/// Buffer size handed to `EVIOCGNAME`.
const NAME_LEN: usize = 256;

/// `EVIOCGNAME(len)`: `_IOC(_IOC_READ, 'E', 0x06, len)`.
const fn eviocgname(len: usize) -> libc::c_ulong {
    (2 << 30) | ((len as libc::c_ulong) << 16) | ((b'E' as libc::c_ulong) << 8) | 0x06
}

/// The dial input device, read record by record.
pub struct RawInputDevice {
    reader: RawEventReader<File>,
    name: Option<String>,
    path: PathBuf,
}

impl RawInputDevice {
    /// Open the device node and query its name.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reader = RawEventReader::open(path)?;
        let name = query_name(&reader);

        log::info!(
            "reading from {} ({})",
            path.display(),
            name.as_deref().unwrap_or("Unknown")
        );

        Ok(Self {
            reader,
            name,
            path: path.to_path_buf(),
        })
    }

    /// Name the kernel reports for the device.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Device node this source reads.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn query_name(reader: &RawEventReader<File>) -> Option<String> {
    let mut buf = [0u8; NAME_LEN];
    // SAFETY: the kernel writes at most NAME_LEN bytes into `buf`, which
    // outlives the call.
    let ret = unsafe {
        libc::ioctl(
            reader.get_ref().as_raw_fd(),
            eviocgname(NAME_LEN) as _,
            buf.as_mut_ptr(),
        )
    };
    if ret <= 0 {
        return None;
    }
    let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    Some(String::from_utf8_lossy(&buf[..end]).into_owned())
}

impl SampleSource for RawInputDevice {
    fn read_batch(&mut self, batch: &mut Vec<RawSample>) -> Result<()> {
        self.reader.read_batch(batch)
    }
}
