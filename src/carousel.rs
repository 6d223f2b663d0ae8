//! The dial-to-display control loop.

use crate::catalog::ImageCatalog;
use crate::config::{Config, DEFAULT_SETTLE};
use crate::error::Result;
use crate::filter::{Decision, EventFilter, RawSample};
use crate::framebuffer::FramebufferWriter;
use crate::source::SampleSource;
use std::convert::Infallible;
use std::ffi::OsString;
use std::thread;
use std::time::Duration;

/// What to do when the selected image cannot be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ImageErrorPolicy {
    /// Stop the carousel with the image error.
    #[default]
    Abort,
    /// Log the error, move the cursor anyway and keep reading the dial.
    Skip,
}

/// A wrapping position in `[0, len - 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cursor {
    index: usize,
    len: usize,
}

impl Cursor {
    /// Cursor at index 0 over `len` entries.
    ///
    /// # Panics
    ///
    /// Panics if `len` is zero.
    pub fn new(len: usize) -> Self {
        assert!(len > 0, "cursor over an empty range");
        Self { index: 0, len }
    }

    /// Current index.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Step forward, wrapping from the last index to 0.
    pub fn advance(&mut self) {
        self.index = if self.index + 1 >= self.len {
            0
        } else {
            self.index + 1
        };
    }

    /// Step back, wrapping from 0 to the last index.
    pub fn retreat(&mut self) {
        self.index = if self.index == 0 {
            self.len - 1
        } else {
            self.index - 1
        };
    }

    /// Apply a decision. `Ignore` leaves the cursor where it is.
    pub fn apply(&mut self, decision: Decision) {
        match decision {
            Decision::Advance => self.advance(),
            Decision::Retreat => self.retreat(),
            Decision::Ignore => {}
        }
    }
}

/// An image the controller acted on for one decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shown {
    /// The decision that triggered the blit.
    pub decision: Decision,
    /// Catalog index that was blitted.
    pub index: usize,
    /// File name that was blitted.
    pub name: OsString,
    /// Whether the image actually reached the display.
    pub displayed: bool,
}

/// Owns the cursor and turns dial decisions into blits.
pub struct CarouselController<S> {
    catalog: ImageCatalog,
    source: S,
    filter: EventFilter,
    writer: FramebufferWriter,
    cursor: Cursor,
    settle: Duration,
    on_image_error: ImageErrorPolicy,
    batch: Vec<RawSample>,
}

impl<S: SampleSource> CarouselController<S> {
    /// Build a controller from its parts. The cursor starts at index 0 and
    /// every displayed image is held for [`DEFAULT_SETTLE`].
    pub fn new(
        catalog: ImageCatalog,
        source: S,
        filter: EventFilter,
        writer: FramebufferWriter,
    ) -> Self {
        let cursor = Cursor::new(catalog.count());
        Self {
            catalog,
            source,
            filter,
            writer,
            cursor,
            settle: DEFAULT_SETTLE,
            on_image_error: ImageErrorPolicy::default(),
            batch: Vec::new(),
        }
    }

    /// Build a controller using the knobs in `config`.
    pub fn from_config(
        catalog: ImageCatalog,
        source: S,
        writer: FramebufferWriter,
        config: &Config,
    ) -> Self {
        Self::new(catalog, source, config.event_filter(), writer)
            .with_settle(config.settle)
            .with_image_error_policy(config.on_image_error)
    }

    /// Pause after each displayed image. `Duration::ZERO` disables it.
    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    /// Policy for missing or malformed images.
    pub fn with_image_error_policy(mut self, policy: ImageErrorPolicy) -> Self {
        self.on_image_error = policy;
        self
    }

    /// Pause applied after each displayed image.
    pub fn settle(&self) -> Duration {
        self.settle
    }

    /// Current cursor.
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// File name under the cursor.
    pub fn current_name(&self) -> Result<&std::ffi::OsStr> {
        self.catalog.name_at(self.cursor.index())
    }

    /// The catalog being cycled.
    pub fn catalog(&self) -> &ImageCatalog {
        &self.catalog
    }

    /// Run until a fatal error.
    pub fn run(mut self) -> Result<Infallible> {
        log::info!(
            "carousel running over {} images in {}",
            self.catalog.count(),
            self.catalog.dir().display()
        );
        loop {
            self.step()?;
        }
    }

    /// Read one batch from the source and act on every sample in it.
    ///
    /// Returns the images acted on, in order.
    pub fn step(&mut self) -> Result<Vec<Shown>> {
        let mut batch = std::mem::take(&mut self.batch);
        batch.clear();
        let read = self.source.read_batch(&mut batch);

        let result = read.and_then(|()| {
            let mut shown = Vec::new();
            for sample in batch.iter().copied() {
                if let Some(s) = self.handle(sample)? {
                    shown.push(s);
                }
            }
            Ok(shown)
        });

        self.batch = batch;
        result
    }

    /// Act on a single sample.
    ///
    /// The image under the cursor is blitted first and the cursor moves
    /// afterwards, so the display lags the cursor by one step.
    pub fn handle(&mut self, sample: RawSample) -> Result<Option<Shown>> {
        let decision = self.filter.classify(sample);
        if decision == Decision::Ignore {
            return Ok(None);
        }
        log::debug!("sample {} -> {:?}", sample.value, decision);

        let index = self.cursor.index();
        let name = self.catalog.name_at(index)?.to_os_string();
        let path = self.catalog.path_at(index)?;
        log::info!("showing {}", path.display());

        let displayed = match self.writer.blit(&path) {
            Ok(()) => true,
            Err(err) if err.is_image_error() && self.on_image_error == ImageErrorPolicy::Skip => {
                log::warn!("skipping image: {}", err);
                false
            }
            Err(err) => return Err(err),
        };

        self.cursor.apply(decision);

        if displayed && !self.settle.is_zero() {
            thread::sleep(self.settle);
        }

        Ok(Some(Shown {
            decision,
            index,
            name,
            displayed,
        }))
    }
}
