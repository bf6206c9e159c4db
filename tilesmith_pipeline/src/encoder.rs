//! The encoder stage: turns batches of feature groups into gzipped vector
//! tile blobs.
//!
//! Workers share one input queue. Each worker keeps a single-slot memo of
//! the last feature group it encoded together with its encoded and gzipped
//! bytes; a run of content-identical tiles then costs one encode. The memo
//! is strictly worker-local, so correctness never depends on which worker a
//! batch lands on.

use crate::{
	batch::{EncodedBatch, TileBatch},
	postprocess::PostProcessors,
	source::TileFeatures,
	telemetry::Telemetry,
};
use anyhow::{Context, Result};
use std::sync::Arc;
use tilesmith_core::{Blob, utils::compress_gzip};
use tokio::sync::{Mutex, mpsc};

/// One encoder worker: drains the shared queue until it closes, delivering
/// each batch's result (or failure) through the batch's sink.
pub(crate) async fn run_encoder<G: TileFeatures>(
	queue: Arc<Mutex<mpsc::Receiver<TileBatch<G>>>>,
	post_processors: Arc<PostProcessors>,
	telemetry: Arc<Telemetry>,
	warn_tile_bytes: usize,
) -> Result<()> {
	let mut memo: Option<(G, Blob, Blob)> = None;

	loop {
		let batch = { queue.lock().await.recv().await };
		let Some(TileBatch { tiles, sink }) = batch else {
			return Ok(());
		};

		let result = encode_batch(tiles, &mut memo, &post_processors, &telemetry, warn_tile_bytes);
		sink.complete(result).await;
	}
}

/// Encodes all tiles of one batch, in order. Any failure fails the whole
/// batch; no partial output is delivered.
fn encode_batch<G: TileFeatures>(
	tiles: Vec<G>,
	memo: &mut Option<(G, Blob, Blob)>,
	post_processors: &PostProcessors,
	telemetry: &Telemetry,
	warn_tile_bytes: usize,
) -> Result<EncodedBatch> {
	let mut entries = Vec::with_capacity(tiles.len());

	for tile in tiles {
		let coord = tile.coord();
		let features_processed = tile.num_features_processed();

		let mut reused: Option<(usize, Blob)> = None;
		if let Some((last, encoded, gzipped)) = memo.as_ref() {
			if tile.has_same_contents(last) {
				telemetry.record_memoized_tile();
				reused = Some((encoded.len(), gzipped.clone()));
			}
		}

		let (encoded_len, gzipped) = match reused {
			Some(reused) => reused,
			None => {
				let mut vector_tile = tile
					.build_tile()
					.with_context(|| format!("Failed to build tile {coord:?}"))?;
				post_processors
					.apply(coord.level(), &mut vector_tile)
					.with_context(|| format!("Failed to post-process tile {coord:?}"))?;
				let encoded = vector_tile
					.to_blob()
					.with_context(|| format!("Failed to encode tile {coord:?}"))?;
				let gzipped =
					compress_gzip(&encoded).with_context(|| format!("Failed to compress tile {coord:?}"))?;
				let encoded_len = encoded.len();
				*memo = Some((tile, encoded, gzipped.clone()));
				(encoded_len, gzipped)
			}
		};

		telemetry.add_features_processed(features_processed);
		telemetry.record_encoded_tile(coord.level(), encoded_len);
		if encoded_len > warn_tile_bytes {
			log::warn!(
				"tile {}/{}/{} has an encoded size of {encoded_len} bytes",
				coord.level(),
				coord.x(),
				coord.y()
			);
		}

		entries.push((coord, gzipped));
	}

	Ok(entries)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::helpers::MockTile;
	use tilesmith_core::{TileCoord, TileExtents, utils::decompress_gzip};

	fn telemetry() -> Telemetry {
		Telemetry::new(TileExtents::new_full(0, 14).unwrap())
	}

	#[test]
	fn adjacent_identical_tiles_are_memoized() -> Result<()> {
		let tiles = vec![
			MockTile::new(TileCoord::new(14, 0, 2)?).with_content(7),
			MockTile::new(TileCoord::new(14, 0, 1)?).with_content(7),
			MockTile::new(TileCoord::new(14, 0, 0)?).with_content(7),
		];
		let telemetry = telemetry();
		let mut memo = None;
		let entries = encode_batch(tiles, &mut memo, &PostProcessors::new(), &telemetry, 1_000_000)?;

		assert_eq!(entries.len(), 3);
		assert_eq!(telemetry.memoized_tiles(), 2);
		assert_eq!(entries[0].1, entries[1].1);
		assert_eq!(entries[0].1, entries[2].1);
		Ok(())
	}

	#[test]
	fn differing_contents_break_the_memo_run() -> Result<()> {
		let tiles = vec![
			MockTile::new(TileCoord::new(14, 0, 2)?).with_content(1),
			MockTile::new(TileCoord::new(14, 0, 1)?).with_content(2),
			MockTile::new(TileCoord::new(14, 0, 0)?).with_content(2),
		];
		let telemetry = telemetry();
		let mut memo = None;
		let entries = encode_batch(tiles, &mut memo, &PostProcessors::new(), &telemetry, 1_000_000)?;

		assert_eq!(telemetry.memoized_tiles(), 1);
		assert_ne!(entries[0].1, entries[1].1);
		assert_eq!(entries[1].1, entries[2].1);
		Ok(())
	}

	#[test]
	fn memo_survives_across_batches() -> Result<()> {
		let telemetry = telemetry();
		let mut memo = None;
		encode_batch(
			vec![MockTile::new(TileCoord::new(14, 0, 2)?).with_content(7)],
			&mut memo,
			&PostProcessors::new(),
			&telemetry,
			1_000_000,
		)?;
		encode_batch(
			vec![MockTile::new(TileCoord::new(14, 0, 1)?).with_content(7)],
			&mut memo,
			&PostProcessors::new(),
			&telemetry,
			1_000_000,
		)?;
		assert_eq!(telemetry.memoized_tiles(), 1);
		Ok(())
	}

	#[test]
	fn output_is_gzipped_tile_bytes() -> Result<()> {
		let tile = MockTile::new(TileCoord::new(3, 1, 2)?).with_features(2);
		let expected = tile.build_tile_blob()?;

		let telemetry = telemetry();
		let mut memo = None;
		let entries = encode_batch(vec![tile], &mut memo, &PostProcessors::new(), &telemetry, 1_000_000)?;
		assert_eq!(decompress_gzip(&entries[0].1)?, expected);
		Ok(())
	}

	#[test]
	fn build_failure_fails_the_batch() -> Result<()> {
		let tiles = vec![
			MockTile::new(TileCoord::new(3, 1, 2)?),
			MockTile::new(TileCoord::new(3, 1, 1)?).failing(),
		];
		let telemetry = telemetry();
		let mut memo = None;
		let error = encode_batch(tiles, &mut memo, &PostProcessors::new(), &telemetry, 1_000_000).unwrap_err();
		assert!(format!("{error:#}").contains("synthetic build failure"), "{error:#}");
		Ok(())
	}

	#[test]
	fn features_processed_counts_memoized_tiles_too() -> Result<()> {
		let tiles = vec![
			MockTile::new(TileCoord::new(14, 0, 1)?).with_content(7).with_features(3),
			MockTile::new(TileCoord::new(14, 0, 0)?).with_content(7).with_features(3),
		];
		let telemetry = telemetry();
		let mut memo = None;
		encode_batch(tiles, &mut memo, &PostProcessors::new(), &telemetry, 1_000_000)?;
		assert_eq!(telemetry.features_processed(), 6);
		Ok(())
	}
}
