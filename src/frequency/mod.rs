//! Frequency estimation
//!
//! This module provides the Count-Min sketch used both standalone and as the
//! building block of the time-aggregation engine.
//!
//! # Example
//!
//! ```
//! use hokusai::frequency::CountMinSketch;
//!
//! let mut cms = CountMinSketch::new(10, 4); // 1024 columns, 4 rows
//!
//! cms.add(b"item1", 5);
//! cms.add(b"item2", 3);
//!
//! let count = cms.estimate(b"item1");
//! println!("Estimated count: {}", count);
//! ```

mod count_min;

pub use count_min::CountMinSketch;

/// Default log2 width, 2^23 columns
///
/// The Hokusai paper's experiments used 2^23 bins and 4 hash functions
/// (section 5.1).
pub const DEFAULT_WIDTH_LOG2: u32 = 23;

/// Default number of hash rows
pub const DEFAULT_DEPTH: usize = 4;

/// Compute the log2 width needed for a target per-query error fraction
///
/// Count-Min overcounts by at most `e/width * N`; the width is rounded up
/// to a power of two.
pub fn width_log2_for_error(epsilon: f64) -> u32 {
    let width = core::f64::consts::E / epsilon;
    let log2 = crate::math::ceil(crate::math::log2(width));
    (log2 as u32).clamp(1, 30)
}

/// Compute the depth needed for a target failure probability
pub fn depth_for_confidence(delta: f64) -> usize {
    (crate::math::ceil(crate::math::ln(1.0 / delta)) as usize).max(1)
}

/// Compute the counter-table size in bytes for the given dimensions
pub fn memory_for_dimensions(width_log2: u32, depth: usize) -> usize {
    depth * (1usize << width_log2) * core::mem::size_of::<u32>()
}
