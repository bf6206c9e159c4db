//! Core types and helpers shared by the tilesmith crates: tile coordinates,
//! tile-aligned and geographic bounding boxes, byte blobs, deterministic gzip
//! and low-level PBF writing.

pub mod io;
pub mod types;
pub use types::*;
pub mod utils;
