use anyhow::{Result, ensure};
use std::time::Duration;
use tilesmith_core::{MAX_TILE_ZOOM, TileExtents};

/// A batch is emitted once it holds this many tiles...
pub const DEFAULT_MAX_TILES_PER_BATCH: usize = 1000;
/// ...or once the next tile would push it past this many features.
pub const DEFAULT_MAX_FEATURES_PER_BATCH: u64 = 10_000;
/// Default capacity of the queues between the stages, in batches.
pub const DEFAULT_QUEUE_CAPACITY: usize = 5000;
/// Encoded tiles larger than this are logged as a warning.
pub const DEFAULT_WARN_TILE_BYTES: usize = 1_000_000;

/// Configuration of a pipeline run.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
	/// Lowest zoom level covered by the run.
	pub minzoom: u8,
	/// Highest zoom level covered by the run.
	pub maxzoom: u8,
	/// Number of encoder workers.
	pub threads: usize,
	/// Guarantee that archive write order equals read order.
	pub emit_tiles_in_order: bool,
	/// Create the archive's tile index after the last write instead of
	/// before the first one.
	pub defer_index_creation: bool,
	/// Vacuum and analyze the archive at shutdown.
	pub optimize_archive: bool,
	/// Emitting batches: the tile count bound.
	pub max_tiles_per_batch: usize,
	/// Emitting batches: the aggregate feature count bound.
	pub max_features_per_batch: u64,
	/// Encoded-size threshold above which a tile is reported (but still
	/// written).
	pub warn_tile_bytes: usize,
	/// Capacity of the inter-stage queues, in batches.
	pub queue_capacity: usize,
	/// Period of the progress log line.
	pub log_interval: Duration,
	/// Per-zoom tile ranges used for progress computation.
	pub extents: TileExtents,
}

impl Default for PipelineConfig {
	fn default() -> Self {
		PipelineConfig {
			minzoom: 0,
			maxzoom: MAX_TILE_ZOOM,
			threads: num_cpus::get(),
			emit_tiles_in_order: true,
			defer_index_creation: false,
			optimize_archive: false,
			max_tiles_per_batch: DEFAULT_MAX_TILES_PER_BATCH,
			max_features_per_batch: DEFAULT_MAX_FEATURES_PER_BATCH,
			warn_tile_bytes: DEFAULT_WARN_TILE_BYTES,
			queue_capacity: DEFAULT_QUEUE_CAPACITY,
			log_interval: Duration::from_secs(10),
			extents: TileExtents::new_full(0, MAX_TILE_ZOOM).unwrap(),
		}
	}
}

impl PipelineConfig {
	/// Checks the configuration for consistency.
	pub fn validate(&self) -> Result<()> {
		ensure!(self.minzoom <= self.maxzoom, "minzoom ({}) must be <= maxzoom ({})", self.minzoom, self.maxzoom);
		ensure!(self.maxzoom <= MAX_TILE_ZOOM, "maxzoom ({}) must be <= {MAX_TILE_ZOOM}", self.maxzoom);
		ensure!(self.threads >= 1, "threads must be >= 1");
		ensure!(self.max_tiles_per_batch >= 1, "max_tiles_per_batch must be >= 1");
		ensure!(self.max_features_per_batch >= 1, "max_features_per_batch must be >= 1");
		ensure!(self.queue_capacity >= 1, "queue_capacity must be >= 1");
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn default_is_valid() {
		assert!(PipelineConfig::default().validate().is_ok());
	}

	#[test]
	fn rejects_inconsistent_values() {
		let mut config = PipelineConfig {
			minzoom: 10,
			maxzoom: 5,
			..Default::default()
		};
		assert!(config.validate().is_err());

		config = PipelineConfig {
			maxzoom: 15,
			..Default::default()
		};
		assert!(config.validate().is_err());

		config = PipelineConfig {
			threads: 0,
			..Default::default()
		};
		assert!(config.validate().is_err());
	}
}
