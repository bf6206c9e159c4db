//! Process-wide progress counters, exported for an external progress logger.
//!
//! The registry is owned by the pipeline supervisor; stages receive shared
//! handles at construction. Counter write disciplines follow their sharing:
//! per-zoom byte sums and size watermarks are written by every encoder
//! worker (atomic add / atomic max), per-zoom tile counts and the batch-size
//! accumulators only by the writer, feature and deduplication counts by all
//! encoder workers.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use tilesmith_core::{MAX_TILE_ZOOM, TileCoord, TileExtents, utils::format_bytes};

const LEVELS: usize = MAX_TILE_ZOOM as usize + 1;

/// Sentinel for "no tile written yet".
const NO_TILE: i64 = i64::MIN;

/// Progress counters for one pipeline run.
#[derive(Debug)]
pub struct Telemetry {
	extents: TileExtents,
	features_processed: AtomicU64,
	memoized_tiles: AtomicU64,
	tiles_by_zoom: [AtomicU64; LEVELS],
	bytes_by_zoom: [AtomicU64; LEVELS],
	max_tile_bytes_by_zoom: [AtomicU64; LEVELS],
	last_tile_written: AtomicI64,
	min_batch_len: AtomicU64,
	max_batch_len: AtomicU64,
	current_zoom: AtomicU64,
}

impl Telemetry {
	#[must_use]
	pub fn new(extents: TileExtents) -> Telemetry {
		Telemetry {
			extents,
			features_processed: AtomicU64::new(0),
			memoized_tiles: AtomicU64::new(0),
			tiles_by_zoom: std::array::from_fn(|_| AtomicU64::new(0)),
			bytes_by_zoom: std::array::from_fn(|_| AtomicU64::new(0)),
			max_tile_bytes_by_zoom: std::array::from_fn(|_| AtomicU64::new(0)),
			last_tile_written: AtomicI64::new(NO_TILE),
			min_batch_len: AtomicU64::new(u64::MAX),
			max_batch_len: AtomicU64::new(0),
			current_zoom: AtomicU64::new(0),
		}
	}

	// --- encoder-side updates ---

	pub fn add_features_processed(&self, count: u64) {
		self.features_processed.fetch_add(count, Ordering::Relaxed);
	}

	pub fn record_memoized_tile(&self) {
		self.memoized_tiles.fetch_add(1, Ordering::Relaxed);
	}

	/// Records the uncompressed encoded size of a tile.
	pub fn record_encoded_tile(&self, level: u8, encoded_len: usize) {
		let index = (level as usize).min(LEVELS - 1);
		self.bytes_by_zoom[index].fetch_add(encoded_len as u64, Ordering::Relaxed);
		self.max_tile_bytes_by_zoom[index].fetch_max(encoded_len as u64, Ordering::Relaxed);
	}

	// --- reader-side updates ---

	pub fn record_zoom_started(&self, level: u8) {
		self.current_zoom.store(u64::from(level), Ordering::Relaxed);
		log::debug!("reading tiles of zoom level {level}");
	}

	// --- writer-side updates ---

	pub fn record_tile_written(&self, level: u8) {
		self.tiles_by_zoom[(level as usize).min(LEVELS - 1)].fetch_add(1, Ordering::Relaxed);
	}

	pub fn record_batch_len(&self, len: usize) {
		self.min_batch_len.fetch_min(len as u64, Ordering::Relaxed);
		self.max_batch_len.fetch_max(len as u64, Ordering::Relaxed);
	}

	pub fn publish_last_written(&self, coord: TileCoord) {
		self.last_tile_written.store(i64::from(coord.encoded()), Ordering::Relaxed);
	}

	// --- accessors ---

	#[must_use]
	pub fn features_processed(&self) -> u64 {
		self.features_processed.load(Ordering::Relaxed)
	}

	#[must_use]
	pub fn memoized_tiles(&self) -> u64 {
		self.memoized_tiles.load(Ordering::Relaxed)
	}

	#[must_use]
	pub fn tiles_written(&self) -> u64 {
		self.tiles_by_zoom.iter().map(|counter| counter.load(Ordering::Relaxed)).sum()
	}

	#[must_use]
	pub fn tiles_written_at(&self, level: u8) -> u64 {
		self.tiles_by_zoom[(level as usize).min(LEVELS - 1)].load(Ordering::Relaxed)
	}

	#[must_use]
	pub fn last_tile_written(&self) -> Option<TileCoord> {
		match self.last_tile_written.load(Ordering::Relaxed) {
			NO_TILE => None,
			encoded => TileCoord::from_encoded(encoded as i32).ok(),
		}
	}

	#[must_use]
	pub fn current_zoom(&self) -> u8 {
		self.current_zoom.load(Ordering::Relaxed) as u8
	}

	/// The periodic progress line: last written tile, its position within
	/// the zoom's extent, the batch sizes seen since the previous poll and a
	/// map link. Polling resets the batch-size accumulators.
	#[must_use]
	pub fn last_tile_string(&self) -> String {
		let min_batch = self.min_batch_len.swap(u64::MAX, Ordering::Relaxed);
		let max_batch = self.max_batch_len.swap(0, Ordering::Relaxed);

		let Some(coord) = self.last_tile_written() else {
			return "n/a".to_string();
		};

		let (z, x, y) = (coord.level(), coord.x(), coord.y());
		let bbox = self.extents.get_level_bbox(z);
		// P = 100 * (x + 1 - x_min) / (x_max - x_min), with the denominator
		// guarded for single-column extents and the result clamped so tiles
		// outside the extent stay within 0..=100
		let span = i64::from(bbox.x_max()) - i64::from(bbox.x_min());
		let percent = (100 * (i64::from(x) + 1 - i64::from(bbox.x_min())) / span.max(1)).clamp(0, 100);
		let (min_batch, max_batch) = if min_batch > max_batch {
			(0, 0)
		} else {
			(min_batch, max_batch)
		};

		format!(
			"{z}/{x}/{y} (z{z} {percent}%) batch sizes: {min_batch}-{max_batch} {}",
			coord.osm_url()
		)
	}

	/// Logs the per-zoom size summary and the run totals.
	pub fn log_summary(&self, minzoom: u8, maxzoom: u8) {
		let mut total_tiles = 0u64;
		let mut total_bytes = 0u64;
		let mut max_max = 0u64;

		for level in minzoom..=maxzoom.min(MAX_TILE_ZOOM) {
			let index = level as usize;
			let tiles = self.tiles_by_zoom[index].load(Ordering::Relaxed);
			let bytes = self.bytes_by_zoom[index].load(Ordering::Relaxed);
			let max = self.max_tile_bytes_by_zoom[index].load(Ordering::Relaxed);
			total_tiles += tiles;
			total_bytes += bytes;
			max_max = max_max.max(max);

			let avg = if tiles > 0 { bytes / tiles } else { 0 };
			log::info!("	z{level} avg:{} max:{}", format_bytes(avg), format_bytes(max));
		}

		let avg = if total_tiles > 0 { total_bytes / total_tiles } else { 0 };
		log::info!("	all avg:{} max:{}", format_bytes(avg), format_bytes(max_max));
		log::info!("	# features: {}", self.features_processed());
		log::info!("	# tiles: {}", self.tiles_written());
	}
}
