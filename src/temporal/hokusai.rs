//! Time-aggregated frequency estimation engine
//!
//! Implements the Hokusai item/time/item-time aggregation algorithms over
//! Count-Min sketches (Matusevych, Smola, Ahmed — "Hokusai: Sketching
//! Streams in Real Time", UAI 2012).

use crate::frequency::{CountMinSketch, DEFAULT_DEPTH, DEFAULT_WIDTH_LOG2};
use crate::traits::Sketch;

#[cfg(feature = "std")]
use std::vec::Vec;

#[cfg(not(feature = "std"))]
extern crate alloc;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

/// One plus the position of the highest set bit; 0 for 0.
#[inline]
fn bit_length(v: usize) -> u32 {
    usize::BITS - v.leading_zeros()
}

/// Number of aggregation levels refreshed at a window boundary.
///
/// Level `j` covers `2^j` windows and is refreshed whenever the completed
/// window count is divisible by `2^j`.
#[inline]
fn boundary_levels(time_units: usize) -> usize {
    time_units.trailing_zeros() as usize + 1
}

/// Time-aggregated frequency estimator
///
/// `Hokusai` ingests `(epoch, item, count)` observations and answers
/// point-in-time queries: an approximate count of how often an item occurred
/// during the window containing a given epoch. It maintains three sketch
/// families over completed windows:
///
/// - **Item aggregates (A)**: one sketch per window. Windows at power-of-two
///   offsets from the present are halved at each boundary, so a window `d`
///   windows old keeps roughly `width / d` columns.
/// - **Time aggregates (M)**: level `j` holds the full-width sum of the most
///   recent `2^j` windows.
/// - **Item-time aggregates (B)**: level `j` covers the same windows as
///   `M[j]` but narrowed by `j` halvings, matching the resolution of the
///   aged per-window sketches.
///
/// Queries into the recent past read the per-window sketch directly; deeper
/// queries rescale it by the ratio of the time aggregate to the narrowed
/// joint aggregate. History older than `2^intervals` windows is dropped and
/// queried as zero.
///
/// The engine is single-writer: `add` and `count` must be externally
/// serialized.
///
/// # Example
///
/// ```
/// use hokusai::Hokusai;
///
/// let mut engine = Hokusai::new(0, 10, 3, 8, 4);
///
/// engine.add(5, b"item", 2);
/// engine.add(15, b"item", 1); // completes the first window
///
/// assert_eq!(engine.count(5, b"item"), 2);
/// assert_eq!(engine.count(15, b"item"), 1);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Hokusai {
    /// Origin of time
    epoch0: i64,
    /// Length of one window
    window_size: i64,
    /// Exclusive upper bound of the open window
    end_epoch: i64,
    /// Number of completed windows
    time_units: usize,
    /// log2 column count of full-width sketches
    width_log2: u32,
    /// Hash rows per sketch
    depth: usize,
    /// Retention parameter: history older than `2^intervals` windows is dropped
    intervals: u32,
    /// Sketch for the open window
    live: CountMinSketch,
    /// Per-window sketches (A), tombstoned past the retention horizon
    item_aggregate: Vec<Option<CountMinSketch>>,
    /// Non-tombstoned tail length of `item_aggregate`
    live_items: usize,
    /// Level-j sums of the most recent `2^j` windows (M), full width
    time_aggregate: Vec<Option<CountMinSketch>>,
    /// Level-j sums narrowed by j halvings (B); index 0 is a placeholder
    item_time_aggregate: Vec<Option<CountMinSketch>>,
}

impl Hokusai {
    /// Create an engine for a stream starting at `epoch0`
    ///
    /// `window_size` is the length of one time unit in the caller's epoch
    /// scale. At most `2^intervals` completed windows are retained.
    /// `width_log2` and `depth` size every sketch the engine maintains.
    ///
    /// # Panics
    ///
    /// Panics if `window_size <= 0`, `intervals == 0`,
    /// `width_log2 <= intervals` (deep joint levels would reach width 1), or
    /// `depth == 0`
    pub fn new(epoch0: i64, window_size: i64, intervals: u32, width_log2: u32, depth: usize) -> Self {
        assert!(window_size > 0, "window_size must be positive");
        assert!(intervals >= 1, "intervals must be at least 1");
        assert!(
            width_log2 > intervals,
            "width_log2 must exceed intervals so narrowed levels keep at least 2 columns"
        );
        assert!(depth >= 1, "depth must be at least 1");

        Self {
            epoch0,
            window_size,
            end_epoch: epoch0 + window_size,
            time_units: 0,
            width_log2,
            depth,
            intervals,
            live: CountMinSketch::new(width_log2, depth),
            item_aggregate: Vec::new(),
            live_items: 0,
            time_aggregate: Vec::new(),
            item_time_aggregate: Vec::new(),
        }
    }

    /// Create an engine with the default sketch dimensions
    ///
    /// Uses [`DEFAULT_WIDTH_LOG2`](crate::frequency::DEFAULT_WIDTH_LOG2)
    /// columns and [`DEFAULT_DEPTH`](crate::frequency::DEFAULT_DEPTH) rows
    /// for every sketch. Note that the default width allocates `2^23`
    /// counters per row; size the dimensions explicitly with
    /// [`new`](Self::new) for smaller deployments.
    pub fn with_default_dimensions(epoch0: i64, window_size: i64, intervals: u32) -> Self {
        Self::new(epoch0, window_size, intervals, DEFAULT_WIDTH_LOG2, DEFAULT_DEPTH)
    }

    /// Origin of time
    pub fn epoch0(&self) -> i64 {
        self.epoch0
    }

    /// Length of one window
    pub fn window_size(&self) -> i64 {
        self.window_size
    }

    /// Exclusive upper bound of the currently open window
    pub fn end_epoch(&self) -> i64 {
        self.end_epoch
    }

    /// Number of completed windows
    pub fn time_units(&self) -> usize {
        self.time_units
    }

    /// Retention parameter
    pub fn intervals(&self) -> u32 {
        self.intervals
    }

    /// log2 column count of full-width sketches
    pub fn width_log2(&self) -> u32 {
        self.width_log2
    }

    /// Hash rows per sketch
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Number of completed windows still answerable from per-window sketches
    pub fn retained_windows(&self) -> usize {
        self.live_items
    }

    /// Total memory held by the engine's sketches, in bytes
    pub fn size_bytes(&self) -> usize {
        let slots = self
            .item_aggregate
            .iter()
            .chain(self.time_aggregate.iter())
            .chain(self.item_time_aggregate.iter())
            .flatten()
            .map(|sketch| sketch.size_bytes())
            .sum::<usize>();
        core::mem::size_of::<Self>() + self.live.size_bytes() + slots
    }

    /// Record `count` occurrences of `item` at `epoch`
    ///
    /// An epoch inside the open window accumulates into it; an epoch past
    /// the open window first completes as many windows as needed (skipped
    /// windows are recorded as empty), then credits the observation to the
    /// window containing its epoch. Epochs may also lag behind the open
    /// window's start; they still accumulate into the open window.
    pub fn add(&mut self, epoch: i64, item: &[u8], count: u32) {
        while epoch >= self.end_epoch {
            self.roll_window();
        }
        self.live.add(item, count);
    }

    /// Complete the open window and refresh the aggregate families.
    fn roll_window(&mut self) {
        self.time_units += 1;
        self.end_epoch += self.window_size;

        self.aggregate_items();
        let levels = boundary_levels(self.time_units);
        self.aggregate_time(levels);
        self.aggregate_item_time(levels);

        self.live.clear();
    }

    /// Append the completed window to A, evicting and aging old windows.
    fn aggregate_items(&mut self) {
        let n = self.item_aggregate.len();
        let levels = bit_length(self.time_units - 1) as usize;

        self.live_items += 1;
        if self.live_items >= (1usize << self.intervals) {
            // tombstone the oldest retained window
            self.item_aggregate[n + 1 - self.live_items] = None;
            self.live_items -= 1;
        }

        // Windows at power-of-two offsets lose one column bit per boundary,
        // which yields the logarithmically degrading width schedule.
        for k in 1..levels {
            let Some(idx) = n.checked_sub(1 << k) else {
                continue;
            };
            if let Some(window) = self.item_aggregate[idx].as_mut() {
                window.compress();
            }
        }

        self.item_aggregate.push(Some(self.live.clone()));
    }

    /// Refresh the full-width level sums M[0..levels].
    ///
    /// After this runs, `M[j]` holds the sum of the most recent `2^j`
    /// completed windows.
    fn aggregate_time(&mut self, levels: usize) {
        let mut rolling = self.live.clone();
        for j in 0..levels {
            if j > self.intervals as usize {
                if let Some(slot) = self.time_aggregate.get_mut(j) {
                    *slot = None;
                }
                continue;
            }

            let snapshot = rolling.clone();
            if self.time_aggregate.len() <= j {
                self.time_aggregate
                    .push(Some(CountMinSketch::new(self.width_log2, self.depth)));
            }
            if let Some(level) = self.time_aggregate[j].as_ref() {
                rolling.merge(level).expect("time levels share dimensions");
            }
            self.time_aggregate[j] = Some(snapshot);
        }
    }

    /// Refresh the narrowed level sums B[1..levels].
    ///
    /// `B[j]` covers the same windows as `M[j]` but after `j` halvings, so
    /// its width matches the aged per-window sketches at that depth of
    /// history.
    fn aggregate_item_time(&mut self, levels: usize) {
        if self.time_units < 2 {
            // placeholder so level indices line up once level 1 exists
            self.item_time_aggregate.push(None);
            return;
        }
        if levels <= 1 {
            return;
        }

        let mut rolling = self.time_aggregate[1]
            .clone()
            .expect("level 1 exists once two windows have completed");
        for j in 1..levels {
            if j > self.intervals as usize {
                if let Some(slot) = self.item_time_aggregate.get_mut(j) {
                    *slot = None;
                }
                continue;
            }

            rolling.compress();
            let snapshot = rolling.clone();
            if self.item_time_aggregate.len() <= j {
                self.item_time_aggregate.push(Some(CountMinSketch::new(
                    self.width_log2 - j as u32,
                    self.depth,
                )));
            }
            if let Some(level) = self.item_time_aggregate[j].as_ref() {
                rolling.merge(level).expect("joint levels share dimensions");
            }
            self.item_time_aggregate[j] = Some(snapshot);
        }
    }

    /// Estimate how often `item` occurred during the window containing `epoch`
    ///
    /// The open window is answered exactly (up to Count-Min collision error);
    /// windows older than `2^intervals` return 0. In between, the estimate
    /// reads the aged per-window sketch and, for items below the collision
    /// noise floor of that width, rescales it by the ratio of the time
    /// aggregate to the narrowed joint aggregate at the matching level.
    ///
    /// # Panics
    ///
    /// Panics if `epoch` precedes `epoch0` or lies past the open window
    pub fn count(&self, epoch: i64, item: &[u8]) -> u32 {
        let offset = epoch - self.epoch0;
        assert!(offset >= 0, "queried epoch precedes the stream origin");
        let t = (offset / self.window_size) as usize;
        assert!(t <= self.time_units, "queried epoch is past the open window");

        if t == self.time_units {
            return self.live.estimate(item);
        }

        let past = self.time_units - t;
        if past >= 1usize << self.intervals {
            return 0;
        }

        // Width the queried window has degraded to by now.
        let width_log2 = if past <= 2 {
            self.width_log2
        } else {
            self.width_log2 - bit_length(past - 1) + 1
        };

        let window_counts = self.item_aggregate[t]
            .as_ref()
            .expect("windows inside the retention horizon are present")
            .counters(item);
        let min_count = window_counts.iter().copied().min().unwrap_or(0);

        // Items above the expected collision noise for this width are
        // trusted directly.
        let noise_floor = core::f64::consts::E * t as f64 / (1u64 << width_log2) as f64;
        if f64::from(min_count) > noise_floor {
            return min_count;
        }

        let level = bit_length(past) as usize - 1;
        let totals = self.time_aggregate[level]
            .as_ref()
            .expect("time level covering a retained window is present")
            .counters(item);
        let narrowed = if level > 0 {
            self.item_time_aggregate[level]
                .as_ref()
                .expect("joint level covering a retained window is present")
                .counters(item)
        } else {
            totals.clone()
        };

        // Per row, M/B is the item's share of the level's mass at the
        // narrowed width; scaling the per-window count by it redistributes
        // the full-width total onto the queried window.
        let mut best = u32::MAX;
        for ((&total, &window), &narrow) in
            totals.iter().zip(window_counts.iter()).zip(narrowed.iter())
        {
            let candidate = if narrow == 0 {
                0
            } else {
                let scaled = u64::from(total) * u64::from(window) / u64::from(narrow);
                scaled.min(u64::from(u32::MAX)) as u32
            };
            best = best.min(candidate);
        }
        best
    }
}
