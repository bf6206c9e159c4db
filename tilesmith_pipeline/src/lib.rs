//! The tile assembly pipeline: a streaming, concurrent stage graph that reads
//! grouped per-tile features, encodes them into gzipped vector tiles and
//! appends them to a tile archive.
//!
//! The graph has four stages connected by bounded queues:
//!
//! 1. a single **reader** that partitions the ordered feature stream into
//!    batches,
//! 2. `N` **encoder** workers that turn each batch's tiles into compressed
//!    blobs (deduplicating adjacent identical tiles),
//! 3. a single **writer** that appends finished batches to the archive, one
//!    transaction per batch, and
//! 4. passive **telemetry** counters polled by a periodic progress logger.
//!
//! Two topologies are supported: in the default *ordered* topology the
//! reader tees every batch into a completion-handle FIFO which the writer
//! drains in submission order, so archive write order equals read order no
//! matter how encoder workers are scheduled. In the *unordered* topology
//! encoded batches flow to the writer in completion order.

pub mod config;
pub mod helpers;
pub mod postprocess;
pub mod source;
pub mod telemetry;

mod batch;
mod encoder;
mod pipeline;
mod reader;
mod writer;

pub use config::PipelineConfig;
pub use pipeline::run_pipeline;
pub use postprocess::PostProcessors;
pub use source::{FeatureSource, TileFeatures};
pub use telemetry::Telemetry;
