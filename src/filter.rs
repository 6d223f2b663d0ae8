//! Debouncing of raw dial samples into direction decisions.
//!
//! The dial reports each physical detent as two consecutive samples whose
//! magnitude is well above the noise floor. [`EventFilter`] keeps a two-state
//! machine that lets the first sample of such a pair through and swallows the
//! second. Samples at or below the threshold are noise and never touch the
//! state.

/// Default magnitude a sample must exceed to count as significant.
pub const DEFAULT_THRESHOLD: i32 = 50;

/// One raw input-device record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "recorder", derive(serde::Serialize, serde::Deserialize))]
pub struct RawSample {
    /// Kernel event type (`EV_REL`, `EV_SYN`, ...).
    pub kind: u16,
    /// Kernel event code within the type.
    pub code: u16,
    /// Signed magnitude.
    pub value: i32,
}

impl RawSample {
    /// A sample carrying only a magnitude.
    pub fn new(value: i32) -> Self {
        Self {
            kind: 0,
            code: 0,
            value,
        }
    }

    /// A fully specified sample.
    pub fn with_kind(kind: u16, code: u16, value: i32) -> Self {
        Self { kind, code, value }
    }

    /// Whether the magnitude exceeds `threshold` in either direction.
    #[inline]
    pub fn is_significant(&self, threshold: i32) -> bool {
        self.value.unsigned_abs() > threshold.unsigned_abs()
    }
}

/// What the carousel should do with a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decision {
    /// Move to the next image (clockwise by default).
    Advance,
    /// Move to the previous image (anti-clockwise by default).
    Retreat,
    /// Do nothing.
    Ignore,
}

/// Mapping from the sign of a significant sample to a direction.
///
/// This is a property of how the dial is wired, not of the filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DirectionMap {
    /// Negative magnitude advances, positive retreats.
    #[default]
    Standard,
    /// Positive magnitude advances, negative retreats.
    Inverted,
}

impl DirectionMap {
    /// Direction for a significant magnitude.
    pub fn decide(self, value: i32) -> Decision {
        let clockwise = value < 0;
        match (self, clockwise) {
            (DirectionMap::Standard, true) | (DirectionMap::Inverted, false) => Decision::Advance,
            (DirectionMap::Standard, false) | (DirectionMap::Inverted, true) => Decision::Retreat,
        }
    }
}

/// Position within a detent's sample pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FilterState {
    /// Next significant sample starts a new detent.
    #[default]
    ExpectingFirst,
    /// Next significant sample is the duplicate of the last detent.
    ExpectingSecond,
}

/// Converts raw samples into debounced decisions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventFilter {
    threshold: i32,
    map: DirectionMap,
    state: FilterState,
}

impl Default for EventFilter {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD, DirectionMap::default())
    }
}

impl EventFilter {
    /// Create a filter in the [`FilterState::ExpectingFirst`] state.
    pub fn new(threshold: i32, map: DirectionMap) -> Self {
        Self {
            threshold,
            map,
            state: FilterState::ExpectingFirst,
        }
    }

    /// Classify one sample and advance the state machine.
    pub fn classify(&mut self, sample: RawSample) -> Decision {
        if !sample.is_significant(self.threshold) {
            return Decision::Ignore;
        }

        match self.state {
            FilterState::ExpectingFirst => {
                self.state = FilterState::ExpectingSecond;
                let decision = self.map.decide(sample.value);
                log::trace!("sample {} -> {:?}", sample.value, decision);
                decision
            }
            FilterState::ExpectingSecond => {
                self.state = FilterState::ExpectingFirst;
                log::trace!("sample {} suppressed as duplicate", sample.value);
                Decision::Ignore
            }
        }
    }

    /// Current state of the duplicate suppression.
    pub fn state(&self) -> FilterState {
        self.state
    }

    /// Forget any half-seen detent.
    pub fn reset(&mut self) {
        self.state = FilterState::ExpectingFirst;
    }

    /// Magnitude a sample must exceed.
    pub fn threshold(&self) -> i32 {
        self.threshold
    }

    /// Sign mapping in use.
    pub fn direction_map(&self) -> DirectionMap {
        self.map
    }
}
