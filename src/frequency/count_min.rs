//! Count-Min Sketch frequency estimator
//!
//! The Count-Min Sketch is a probabilistic data structure for estimating
//! the frequency of elements in a data stream. This variant keeps its width
//! a power of two and supports width halving, which the time-aggregation
//! engine relies on to age historical windows.

use crate::traits::{FrequencySketch, MergeError, Sketch};
use xxhash_rust::xxh3::xxh3_64_with_seed;

#[cfg(feature = "std")]
use std::vec::Vec;

#[cfg(not(feature = "std"))]
extern crate alloc;
#[cfg(not(feature = "std"))]
use alloc::{format, vec, vec::Vec};

/// Count-Min Sketch for frequency estimation
///
/// Provides frequency estimates with the following guarantees:
/// - Point query: `actual_count <= estimate <= actual_count + ε * N`
/// - Where ε = e/width and N is the total count
/// - Probability of exceeding the error bound: δ = 1/2^depth
///
/// The width is always a power of two, configured as a log2 exponent.
/// Column indices are the low bits of the row hash, so [`compress`]
/// (halving the width) projects columns modulo the new width without
/// re-hashing. Counters are `u32` and saturate instead of wrapping.
///
/// [`compress`]: CountMinSketch::compress
///
/// # Example
///
/// ```
/// use hokusai::frequency::CountMinSketch;
///
/// // 2^10 = 1024 columns, 4 hash rows
/// let mut cms = CountMinSketch::new(10, 4);
///
/// cms.add(b"apple", 5);
/// cms.add(b"banana", 3);
/// cms.add(b"apple", 2);
///
/// let apple_count = cms.estimate(b"apple"); // ~7
/// let banana_count = cms.estimate(b"banana"); // ~3
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CountMinSketch {
    /// log2 of the column count
    width_log2: u32,
    /// Number of rows (hash functions)
    depth: usize,
    /// Counter table, `depth` rows of `1 << width_log2` columns
    rows: Vec<Vec<u32>>,
    /// Total count of all items
    total_count: u64,
    /// Number of updates
    num_updates: u64,
    /// Seeds for hash functions
    seeds: Vec<u64>,
}

impl CountMinSketch {
    /// Create a Count-Min Sketch with `1 << width_log2` columns and `depth` rows
    ///
    /// # Panics
    ///
    /// Panics if `width_log2 > 30` or `depth == 0`
    pub fn new(width_log2: u32, depth: usize) -> Self {
        assert!(width_log2 <= 30, "width_log2 must be at most 30");
        assert!(depth > 0, "depth must be positive");

        let seeds: Vec<u64> = (0..depth)
            .map(|i| (i as u64).wrapping_mul(0x9e3779b97f4a7c15))
            .collect();

        Self {
            width_log2,
            depth,
            rows: vec![vec![0u32; 1 << width_log2]; depth],
            total_count: 0,
            num_updates: 0,
            seeds,
        }
    }

    /// Create a Count-Min Sketch targeting the given error parameters
    ///
    /// # Arguments
    ///
    /// * `epsilon` - Maximum overcount as a fraction of total (e.g., 0.01 for 1%)
    /// * `delta` - Probability of exceeding the error bound (e.g., 0.001 for 0.1%)
    ///
    /// The width is rounded up to the next power of two.
    ///
    /// # Panics
    ///
    /// Panics if epsilon or delta are not in (0, 1)
    pub fn with_error(epsilon: f64, delta: f64) -> Self {
        assert!(epsilon > 0.0 && epsilon < 1.0, "epsilon must be in (0, 1)");
        assert!(delta > 0.0 && delta < 1.0, "delta must be in (0, 1)");

        // width = e / epsilon rounded up to a power of two,
        // depth = ceil(ln(1/delta))
        Self::new(
            super::width_log2_for_error(epsilon),
            super::depth_for_confidence(delta),
        )
    }

    /// Get the number of columns per row
    pub fn width(&self) -> usize {
        1 << self.width_log2
    }

    /// Get the log2 of the column count
    pub fn width_log2(&self) -> u32 {
        self.width_log2
    }

    /// Get the depth of the sketch
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Get the total count of all items
    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    #[inline]
    fn column(&self, item: &[u8], seed: u64) -> usize {
        (xxh3_64_with_seed(item, seed) as usize) & (self.width() - 1)
    }

    /// Add count to an item
    pub fn add(&mut self, item: &[u8], count: u32) {
        self.num_updates += 1;
        self.total_count += u64::from(count);

        let mask = self.width() - 1;
        for (row, &seed) in self.rows.iter_mut().zip(self.seeds.iter()) {
            let col = (xxh3_64_with_seed(item, seed) as usize) & mask;
            row[col] = row[col].saturating_add(count);
        }
    }

    /// Add count using conservative update
    ///
    /// Conservative update improves accuracy by only incrementing counters
    /// up to the new estimated value. This reduces over-counting.
    pub fn add_conservative(&mut self, item: &[u8], count: u32) {
        self.num_updates += 1;
        self.total_count += u64::from(count);

        let new_val = self.estimate(item).saturating_add(count);

        let mask = self.width() - 1;
        for (row, &seed) in self.rows.iter_mut().zip(self.seeds.iter()) {
            let col = (xxh3_64_with_seed(item, seed) as usize) & mask;
            if row[col] < new_val {
                row[col] = new_val;
            }
        }
    }

    /// Estimate the frequency of an item
    ///
    /// The estimate is the minimum counter across rows and never
    /// underestimates the true count (up to saturation).
    pub fn estimate(&self, item: &[u8]) -> u32 {
        let mut min_count = u32::MAX;
        for (row, &seed) in self.rows.iter().zip(self.seeds.iter()) {
            min_count = min_count.min(row[self.column(item, seed)]);
        }
        min_count
    }

    /// Per-row counter values for an item
    ///
    /// Returns one counter per row; [`estimate`](Self::estimate) is their
    /// minimum. The time-aggregation estimator combines per-row values from
    /// several sketches before taking a minimum.
    pub fn counters(&self, item: &[u8]) -> Vec<u32> {
        self.rows
            .iter()
            .zip(self.seeds.iter())
            .map(|(row, &seed)| row[self.column(item, seed)])
            .collect()
    }

    /// Halve the width of the sketch in place
    ///
    /// Each surviving column `c` becomes the saturating sum of old columns
    /// `c` and `c + width/2`. Since column indices are the low bits of the
    /// row hash, this is exactly a projection of indices modulo the new
    /// width: estimates made after compression agree with a sketch built at
    /// the narrower width from the same stream.
    ///
    /// # Panics
    ///
    /// Panics if the width is already 1
    pub fn compress(&mut self) {
        assert!(self.width_log2 >= 1, "cannot compress a sketch of width 1");

        let half = 1usize << (self.width_log2 - 1);
        for row in &mut self.rows {
            for col in 0..half {
                row[col] = row[col].saturating_add(row[col + half]);
            }
            row.truncate(half);
            row.shrink_to_fit();
        }
        self.width_log2 -= 1;
    }

    /// Theoretical error bound (epsilon * total_count)
    pub fn error_bound(&self) -> u64 {
        let epsilon = core::f64::consts::E / self.width() as f64;
        (epsilon * self.total_count as f64) as u64
    }
}

impl Sketch for CountMinSketch {
    type Item = [u8];

    fn update(&mut self, item: &[u8]) {
        self.add(item, 1);
    }

    fn merge(&mut self, other: &Self) -> Result<(), MergeError> {
        if self.width_log2 != other.width_log2 || self.depth != other.depth {
            return Err(MergeError::IncompatibleConfig {
                expected: format!("{}x{}", self.width(), self.depth),
                found: format!("{}x{}", other.width(), other.depth),
            });
        }

        for (row, other_row) in self.rows.iter_mut().zip(other.rows.iter()) {
            for (cell, &other_cell) in row.iter_mut().zip(other_row.iter()) {
                *cell = cell.saturating_add(other_cell);
            }
        }

        self.total_count += other.total_count;
        self.num_updates += other.num_updates;

        Ok(())
    }

    fn clear(&mut self) {
        for row in &mut self.rows {
            row.fill(0);
        }
        self.total_count = 0;
        self.num_updates = 0;
    }

    fn size_bytes(&self) -> usize {
        core::mem::size_of::<Self>()
            + self.depth * self.width() * core::mem::size_of::<u32>()
            + self.seeds.len() * core::mem::size_of::<u64>()
    }

    fn count(&self) -> u64 {
        self.num_updates
    }
}

impl FrequencySketch for CountMinSketch {
    fn estimate_frequency(&self, item: &[u8]) -> u64 {
        u64::from(self.estimate(item))
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for CountMinSketch {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("CountMinSketch", 6)?;
        state.serialize_field("width_log2", &self.width_log2)?;
        state.serialize_field("depth", &self.depth)?;
        state.serialize_field("rows", &self.rows)?;
        state.serialize_field("total_count", &self.total_count)?;
        state.serialize_field("num_updates", &self.num_updates)?;
        state.serialize_field("seeds", &self.seeds)?;
        state.end()
    }
}
