//! # Hokusai
//!
//! Time-aggregated frequency estimation for Rust.
//!
//! Hokusai answers the question "how often did this item occur *back then*?"
//! over streams too large to keep per-window exact counts. It maintains
//! Count-Min sketches across time windows following the Hokusai algorithms
//! (Matusevych, Smola, Ahmed — "Hokusai: Sketching Streams in Real Time",
//! UAI 2012): recent windows keep full resolution, older windows are
//! progressively halved, and queries blend three sketch families to
//! reconstruct an estimate for the queried window.
//!
//! ## Features
//!
//! - **Point-in-time queries**: estimate an item's count in any retained window
//! - **Sublinear space**: window resolution degrades logarithmically with age
//! - **Bounded retention**: history older than `2^intervals` windows is dropped
//! - **Deterministic**: identical input streams produce identical estimates
//!
//! ## Quick Start
//!
//! ```rust
//! use hokusai::Hokusai;
//!
//! // Stream starting at epoch 0, 60-second windows, 2^5 windows of
//! // retention, 2^12-column sketches with 4 hash rows.
//! let mut engine = Hokusai::new(0, 60, 5, 12, 4);
//!
//! engine.add(5, b"alice", 1);
//! engine.add(30, b"alice", 2);
//! engine.add(65, b"bob", 1); // rolls into the second window
//!
//! assert_eq!(engine.count(10, b"alice"), 3);
//! assert_eq!(engine.count(70, b"bob"), 1);
//! ```
//!
//! The standalone [`CountMinSketch`](frequency::CountMinSketch) is exported
//! too and can be used on its own wherever a mergeable, compressible
//! frequency sketch is needed.
//!
//! ## Feature Flags
//!
//! - `std` (default): Standard library support
//! - `serde`: Enable sketch serialization

#![cfg_attr(not(feature = "std"), no_std)]
#![cfg_attr(docsrs, feature(doc_cfg))]

#[cfg(not(feature = "std"))]
extern crate alloc;

mod math;
pub mod traits;

pub mod frequency;
pub mod temporal;

pub mod prelude {
    pub use crate::frequency::CountMinSketch;
    pub use crate::temporal::Hokusai;
    pub use crate::traits::*;
}

pub use frequency::CountMinSketch;
pub use temporal::Hokusai;
