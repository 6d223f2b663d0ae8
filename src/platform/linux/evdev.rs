//! Linux evdev input reading.
//!
//! Reads the dial directly from its `/dev/input/event*` node through the
//! `evdev` crate. Every record of a fetched batch, including `EV_SYN`
//! markers, is handed to the filter; only large magnitudes survive it.

use crate::error::{Error, Result};
use crate::filter::RawSample;
use crate::source::SampleSource;
use ::evdev::{Device, EventType as EvdevEventType};
use std::io;
use std::path::{Path, PathBuf};

/// The dial input device.
pub struct EvdevSource {
    device: Device,
    path: PathBuf,
}

impl EvdevSource {
    /// Open the device node and log what was found there.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let device = Device::open(path).map_err(|source| Error::DeviceOpen {
            path: path.to_path_buf(),
            source,
        })?;

        log::info!(
            "reading from {} ({})",
            path.display(),
            device.name().unwrap_or("Unknown")
        );

        let supported = device.supported_events();
        if !supported.contains(EvdevEventType::RELATIVE)
            && !supported.contains(EvdevEventType::ABSOLUTE)
        {
            log::warn!(
                "{} reports no relative or absolute axes; dial samples may never arrive",
                path.display()
            );
        }

        Ok(Self {
            device,
            path: path.to_path_buf(),
        })
    }

    /// Name the kernel reports for the device.
    pub fn name(&self) -> Option<&str> {
        self.device.name()
    }

    /// Device node this source reads.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SampleSource for EvdevSource {
    fn read_batch(&mut self, batch: &mut Vec<RawSample>) -> Result<()> {
        loop {
            let before = batch.len();
            match self.device.fetch_events() {
                Ok(events) => batch.extend(
                    events.map(|ev| RawSample::with_kind(ev.event_type().0, ev.code(), ev.value())),
                ),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    return Err(Error::InputRead(format!(
                        "read() from {}: {}",
                        self.path.display(),
                        e
                    )));
                }
            }

            if batch.len() > before {
                return Ok(());
            }
        }
    }
}
