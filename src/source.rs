//! Where raw samples come from.
//!
//! The controller only sees the [`SampleSource`] trait. The Linux platform
//! module provides the device-backed source; [`RawEventReader`] decodes kernel
//! `struct input_event` records from any byte stream and backs the device
//! when the `evdev` feature is disabled.

use crate::error::{Error, Result};
use crate::filter::RawSample;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Input device the appliance reads the dial from.
pub const INPUT_DEVICE: &str = "/dev/input/event1";

/// Size of one kernel `struct input_event` record.
pub const EVENT_SIZE: usize = std::mem::size_of::<libc::input_event>();

/// Records requested per read.
pub const BATCH_RECORDS: usize = 64;

// `struct input_event` ends with `__u16 type; __u16 code; __s32 value;`
// after the timestamp, with no trailing padding.
const TYPE_OFFSET: usize = EVENT_SIZE - 8;
const CODE_OFFSET: usize = EVENT_SIZE - 6;
const VALUE_OFFSET: usize = EVENT_SIZE - 4;

/// A blocking supplier of raw input samples.
pub trait SampleSource {
    /// Block until at least one record is available and append the batch to
    /// `batch` in arrival order.
    ///
    /// Any failure, including the end of the stream, is reported as
    /// [`Error::InputRead`].
    fn read_batch(&mut self, batch: &mut Vec<RawSample>) -> Result<()>;
}

impl<S: SampleSource + ?Sized> SampleSource for Box<S> {
    fn read_batch(&mut self, batch: &mut Vec<RawSample>) -> Result<()> {
        (**self).read_batch(batch)
    }
}

impl<S: SampleSource + ?Sized> SampleSource for &mut S {
    fn read_batch(&mut self, batch: &mut Vec<RawSample>) -> Result<()> {
        (**self).read_batch(batch)
    }
}

/// Decode one record.
pub fn decode_event(record: &[u8; EVENT_SIZE]) -> RawSample {
    let kind = u16::from_ne_bytes([record[TYPE_OFFSET], record[TYPE_OFFSET + 1]]);
    let code = u16::from_ne_bytes([record[CODE_OFFSET], record[CODE_OFFSET + 1]]);
    let value = i32::from_ne_bytes([
        record[VALUE_OFFSET],
        record[VALUE_OFFSET + 1],
        record[VALUE_OFFSET + 2],
        record[VALUE_OFFSET + 3],
    ]);
    RawSample::with_kind(kind, code, value)
}

/// Encode a sample as a kernel record with a zero timestamp.
pub fn encode_event(sample: &RawSample) -> [u8; EVENT_SIZE] {
    let mut record = [0u8; EVENT_SIZE];
    record[TYPE_OFFSET..CODE_OFFSET].copy_from_slice(&sample.kind.to_ne_bytes());
    record[CODE_OFFSET..VALUE_OFFSET].copy_from_slice(&sample.code.to_ne_bytes());
    record[VALUE_OFFSET..].copy_from_slice(&sample.value.to_ne_bytes());
    record
}

/// Reads `struct input_event` records from a byte stream.
pub struct RawEventReader<R> {
    reader: R,
    buf: Vec<u8>,
}

impl RawEventReader<File> {
    /// Open an input device node for reading.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| Error::DeviceOpen {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(file))
    }
}

impl<R: Read> RawEventReader<R> {
    /// Wrap a reader.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: vec![0; EVENT_SIZE * BATCH_RECORDS],
        }
    }

    /// Borrow the underlying reader.
    pub fn get_ref(&self) -> &R {
        &self.reader
    }

    /// Unwrap the underlying reader.
    pub fn into_inner(self) -> R {
        self.reader
    }

    fn read_once(&mut self) -> io::Result<usize> {
        loop {
            match self.reader.read(&mut self.buf) {
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                other => return other,
            }
        }
    }
}

impl<R: Read> SampleSource for RawEventReader<R> {
    fn read_batch(&mut self, batch: &mut Vec<RawSample>) -> Result<()> {
        let read = self
            .read_once()
            .map_err(|e| Error::InputRead(format!("read(): {}", e)))?;

        if read < EVENT_SIZE {
            return Err(Error::InputRead(format!(
                "read(): got {} bytes, expected at least one {}-byte event",
                read, EVENT_SIZE
            )));
        }

        let whole = read - read % EVENT_SIZE;
        if whole != read {
            log::warn!("dropping {} bytes of a partial input event", read - whole);
        }

        batch.extend(
            self.buf[..whole]
                .chunks_exact(EVENT_SIZE)
                .filter_map(|chunk| <&[u8; EVENT_SIZE]>::try_from(chunk).ok())
                .map(decode_event),
        );
        Ok(())
    }
}
