//! Ready-made feature sources: a configurable mock for tests and a debug
//! source that generates synthetic tiles over a set of extents.

mod debug_source;
mod mock_source;

pub use debug_source::{DebugSource, DebugTileFeatures};
pub use mock_source::{MockSource, MockTile};
