//! Random-view selection and slideshow state.
//!
//! The slideshow is an explicit state object owned by whoever renders it;
//! it holds no timer. The caller drives it by calling [`Slideshow::advance`]
//! on every tick of its own interval.

use std::time::Duration;

use rand::seq::IndexedRandom;
use rand::Rng;

use crate::record::{LatLng, Record};
use crate::viewpoint::record_position;

pub const DEFAULT_SLIDE_INTERVAL: Duration = Duration::from_secs(10);

/// Whether a record is worth showing unprompted: it needs a panorama link,
/// an artwork description and a stored heading.
#[must_use]
pub fn is_eligible_for_random_view(record: &Record) -> bool {
    let has_text = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
    has_text(&record.panorama_reference)
        && has_text(&record.art)
        && record.heading.is_some_and(f64::is_finite)
}

/// Picks one eligible, locatable record uniformly at random.
pub fn pick_random<'a, R>(records: &'a [Record], rng: &mut R) -> Option<&'a Record>
where
    R: Rng + ?Sized,
{
    let eligible: Vec<&Record> = records
        .iter()
        .filter(|r| is_eligible_for_random_view(r) && record_position(r).is_some())
        .collect();
    eligible.choose(rng).copied()
}

#[derive(Debug, Clone, PartialEq)]
pub struct SlideshowEntry {
    pub record: Record,
    pub position: LatLng,
}

#[derive(Debug, Clone)]
pub struct Slideshow {
    entries: Vec<SlideshowEntry>,
    index: usize,
    interval: Duration,
    running: bool,
}

impl Default for Slideshow {
    fn default() -> Self {
        Self::new(DEFAULT_SLIDE_INTERVAL)
    }
}

impl Slideshow {
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            entries: Vec::new(),
            index: 0,
            interval,
            running: false,
        }
    }

    /// Replaces the slides with the eligible, locatable subset of `records`
    /// and rewinds to the first slide.
    pub fn refresh(&mut self, records: &[Record]) {
        self.entries = records
            .iter()
            .filter(|r| is_eligible_for_random_view(r))
            .filter_map(|r| {
                record_position(r).map(|position| SlideshowEntry {
                    record: r.clone(),
                    position,
                })
            })
            .collect();
        self.index = 0;
        if self.entries.is_empty() {
            self.running = false;
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn current(&self) -> Option<&SlideshowEntry> {
        self.entries.get(self.index)
    }

    /// Jumps to `index`, wrapping in both directions.
    pub fn show(&mut self, index: i64) -> Option<&SlideshowEntry> {
        let len = i64::try_from(self.entries.len()).ok().filter(|&n| n > 0)?;
        // rem_euclid of a non-negative modulus is in 0..len
        self.index = usize::try_from(index.rem_euclid(len)).unwrap_or(0);
        self.current()
    }

    pub fn advance(&mut self) -> Option<&SlideshowEntry> {
        let next = i64::try_from(self.index).unwrap_or(0).saturating_add(1);
        self.show(next)
    }

    pub fn previous(&mut self) -> Option<&SlideshowEntry> {
        let prev = i64::try_from(self.index).unwrap_or(0).saturating_sub(1);
        self.show(prev)
    }

    /// Starts playback. Returns `false` when there is nothing to show.
    pub fn start(&mut self) -> bool {
        self.running = !self.entries.is_empty();
        self.running
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Changes the slide interval. Zero is rejected and leaves it unchanged.
    pub fn set_interval(&mut self, interval: Duration) -> bool {
        if interval.is_zero() {
            return false;
        }
        self.interval = interval;
        true
    }
}
