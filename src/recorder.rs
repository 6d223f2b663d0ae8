//! Recording and replay of raw dial samples.
//!
//! A recording captures every sample a [`SampleSource`] delivers, with its
//! time since the recording started. On disk it is JSON lines: a header
//! object followed by one object per sample, so a live session can append
//! to its file and a file cut short mid-line still loads. A
//! [`ReplaySource`] feeds a recording back into the carousel, which makes it
//! possible to reproduce a session without the dial attached.
//!
//! # Example
//!
//! ```no_run
//! use dialframe::recorder::{Recording, ReplaySource};
//!
//! let recording = Recording::load("session.jsonl").unwrap();
//! let source = ReplaySource::new(recording).with_speed(2.0).unwrap();
//! ```

use crate::error::{Error, Result};
use crate::filter::RawSample;
use crate::source::SampleSource;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::{Duration, Instant, SystemTime};

/// A sample with its timestamp relative to recording start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedSample {
    /// Time elapsed since recording start.
    pub elapsed: Duration,
    /// The sample that arrived.
    pub sample: RawSample,
}

/// First line of a recording file.
#[derive(Debug, Serialize, Deserialize)]
struct Header {
    created_at: SystemTime,
    description: Option<String>,
}

/// A complete recording of dial samples.
#[derive(Debug, Clone)]
pub struct Recording {
    /// Recorded samples in arrival order.
    pub samples: Vec<RecordedSample>,
    /// When the recording was created.
    pub created_at: SystemTime,
    /// Optional description.
    pub description: Option<String>,
}

impl Recording {
    /// Create a new empty recording.
    pub fn new() -> Self {
        Self {
            samples: Vec::new(),
            created_at: SystemTime::now(),
            description: None,
        }
    }

    /// Set a description for this recording.
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    /// Get the duration of this recording.
    pub fn duration(&self) -> Duration {
        self.samples
            .last()
            .map(|s| s.elapsed)
            .unwrap_or(Duration::ZERO)
    }

    /// Get the number of samples in this recording.
    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    fn header(&self) -> Header {
        Header {
            created_at: self.created_at,
            description: self.description.clone(),
        }
    }

    /// Save the recording to a file (JSON lines).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut text = encode_line(&self.header())?;
        for sample in &self.samples {
            text.push_str(&encode_line(sample)?);
        }
        std::fs::write(path, text)
            .map_err(|e| Error::Recording(format!("Failed to write recording file: {}", e)))?;
        Ok(())
    }

    /// Load a recording from a file (JSON lines).
    ///
    /// A final line without its newline is what an interrupted writer leaves
    /// behind; it is dropped with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Recording(format!("Failed to read recording file: {}", e)))?;

        let complete = match text.rfind('\n') {
            Some(end) => &text[..=end],
            None => "",
        };
        if complete.len() < text.len() {
            log::warn!(
                "dropping {} bytes of an unfinished recording line",
                text.len() - complete.len()
            );
        }

        let mut lines = complete.lines();
        let header: Header = match lines.next() {
            Some(line) => decode_line(line)?,
            None => return Err(Error::Recording("Recording file has no header".into())),
        };
        let samples = lines.map(decode_line).collect::<Result<Vec<RecordedSample>>>()?;

        Ok(Self {
            samples,
            created_at: header.created_at,
            description: header.description,
        })
    }
}

impl Default for Recording {
    fn default() -> Self {
        Self::new()
    }
}

fn encode_line<T: Serialize>(value: &T) -> Result<String> {
    let mut line = serde_json::to_string(value)
        .map_err(|e| Error::Recording(format!("Failed to serialize recording: {}", e)))?;
    line.push('\n');
    Ok(line)
}

fn decode_line<'a, T: Deserialize<'a>>(line: &'a str) -> Result<T> {
    serde_json::from_str(line)
        .map_err(|e| Error::Recording(format!("Failed to deserialize recording: {}", e)))
}

/// Passes samples through from an inner source while recording them.
pub struct RecordingSource<S> {
    inner: S,
    recording: Recording,
    start: Instant,
    log: Option<File>,
}

impl<S: SampleSource> RecordingSource<S> {
    /// Start recording everything `inner` delivers.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            recording: Recording::new(),
            start: Instant::now(),
            log: None,
        }
    }

    /// Also append every batch to the file at `path` as it arrives.
    ///
    /// The carousel only stops on a fatal error or a signal, so there is no
    /// later point at which to save. The file is truncated and its header
    /// written here.
    pub fn with_autosave(mut self, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut file = File::create(path).map_err(|e| {
            Error::Recording(format!("Failed to create {}: {}", path.display(), e))
        })?;
        let header = encode_line(&self.recording.header())?;
        file.write_all(header.as_bytes())
            .map_err(|e| Error::Recording(format!("Failed to write recording file: {}", e)))?;
        self.log = Some(file);
        Ok(self)
    }

    /// The samples recorded so far.
    pub fn recording(&self) -> &Recording {
        &self.recording
    }

    /// Stop recording and return the recording.
    pub fn into_recording(self) -> Recording {
        self.recording
    }

    fn append(file: &mut File, samples: &[RecordedSample]) -> Result<()> {
        let mut text = String::new();
        for sample in samples {
            text.push_str(&encode_line(sample)?);
        }
        file.write_all(text.as_bytes())
            .and_then(|()| file.flush())
            .map_err(|e| Error::Recording(format!("Failed to append to recording file: {}", e)))
    }
}

impl<S: SampleSource> SampleSource for RecordingSource<S> {
    fn read_batch(&mut self, batch: &mut Vec<RawSample>) -> Result<()> {
        let before = batch.len();
        self.inner.read_batch(batch)?;

        let elapsed = self.start.elapsed();
        let recorded = self.recording.samples.len();
        self.recording
            .samples
            .extend(batch[before..].iter().map(|&sample| RecordedSample { elapsed, sample }));

        if let Some(file) = &mut self.log
            && let Err(e) = Self::append(file, &self.recording.samples[recorded..])
        {
            log::warn!("{}", e);
        }
        Ok(())
    }
}

/// Feeds a recording back as if it came from the dial.
pub struct ReplaySource {
    recording: Recording,
    position: usize,
    speed: Option<f64>,
    start: Option<Instant>,
}

impl ReplaySource {
    /// Replay `recording` with its original timing.
    pub fn new(recording: Recording) -> Self {
        Self {
            recording,
            position: 0,
            speed: Some(1.0),
            start: None,
        }
    }

    /// Replay with a speed multiplier (2.0 = double speed).
    pub fn with_speed(mut self, speed: f64) -> Result<Self> {
        if speed <= 0.0 || !speed.is_finite() {
            return Err(Error::Recording("Playback speed must be positive".into()));
        }
        self.speed = Some(speed);
        Ok(self)
    }

    /// Replay without timing (as fast as possible).
    pub fn fast(mut self) -> Self {
        self.speed = None;
        self
    }

    /// Samples not yet replayed.
    pub fn remaining(&self) -> usize {
        self.recording.samples.len() - self.position
    }
}

impl SampleSource for ReplaySource {
    /// Deliver every sample that was recorded at the same instant as the next
    /// one, waiting for its timestamp first.
    fn read_batch(&mut self, batch: &mut Vec<RawSample>) -> Result<()> {
        let samples = &self.recording.samples[self.position..];
        let Some(first) = samples.first() else {
            return Err(Error::InputRead("end of recording".into()));
        };

        if let Some(speed) = self.speed {
            let start = *self.start.get_or_insert_with(Instant::now);
            let target = Duration::from_secs_f64(first.elapsed.as_secs_f64() / speed);
            let elapsed = start.elapsed();
            if target > elapsed {
                std::thread::sleep(target - elapsed);
            }
        }

        let count = samples
            .iter()
            .take_while(|s| s.elapsed == first.elapsed)
            .count();
        batch.extend(samples[..count].iter().map(|s| s.sample));
        self.position += count;
        Ok(())
    }
}
