//! The reader stage: partitions the ordered feature stream into batches.

use crate::{
	batch::{BatchHandle, BatchSink, EncodedBatch, TileBatch},
	source::{FeatureSource, TileFeatures},
	telemetry::Telemetry,
};
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

/// Where the reader publishes emitted batches.
pub(crate) struct ReaderOutput<G> {
	/// The encoder workers' input queue.
	pub batch_tx: mpsc::Sender<TileBatch<G>>,
	/// The writer's completion-handle FIFO (ordered topology only).
	pub handle_tx: Option<mpsc::Sender<BatchHandle>>,
	/// The writer's input queue (unordered topology only).
	pub result_tx: Option<mpsc::Sender<Result<EncodedBatch>>>,
}

/// Applies the batching rule: the current batch is emitted before appending
/// the next group when it already holds `max_tiles` tiles or the group's
/// features would push it past `max_features`.
fn batch_is_full(tiles_in_batch: usize, features_in_batch: u64, next_features: u64, max_tiles: usize, max_features: u64) -> bool {
	tiles_in_batch > 0 && (tiles_in_batch >= max_tiles || features_in_batch + next_features > max_features)
}

/// Drains the source, forming batches and teeing each one into the encoder
/// queue (and, in the ordered topology, the writer's handle FIFO). Closed
/// downstream queues mean the run is already failing elsewhere; the reader
/// then stops quietly.
pub(crate) async fn run_reader<S: FeatureSource>(
	mut source: S,
	output: ReaderOutput<S::Group>,
	max_tiles: usize,
	max_features: u64,
	telemetry: Arc<Telemetry>,
) -> Result<()> {
	let mut tiles: Vec<S::Group> = Vec::new();
	let mut features_in_batch = 0u64;
	let mut current_zoom: Option<u8> = None;

	while let Some(group) = source.next_group().context("Failed to read the next feature group")? {
		let zoom = group.coord().level();
		if current_zoom.is_none_or(|last| zoom > last) {
			telemetry.record_zoom_started(zoom);
			current_zoom = Some(zoom);
		}

		let next_features = group.num_features_to_emit();
		if batch_is_full(tiles.len(), features_in_batch, next_features, max_tiles, max_features) {
			if !emit(&output, std::mem::take(&mut tiles)).await {
				return Ok(());
			}
			features_in_batch = 0;
		}

		tiles.push(group);
		features_in_batch += next_features;
	}

	if !tiles.is_empty() {
		emit(&output, tiles).await;
	}
	Ok(())
}

/// Publishes one batch; returns `false` if the downstream stages are gone.
async fn emit<G: TileFeatures>(output: &ReaderOutput<G>, tiles: Vec<G>) -> bool {
	let sink = if let Some(handle_tx) = &output.handle_tx {
		let (done_tx, done_rx) = oneshot::channel();
		if handle_tx.send(done_rx).await.is_err() {
			return false;
		}
		BatchSink::Ordered(done_tx)
	} else if let Some(result_tx) = &output.result_tx {
		BatchSink::Unordered(result_tx.clone())
	} else {
		unreachable!("reader output must carry a handle or result queue")
	};

	output.batch_tx.send(TileBatch { tiles, sink }).await.is_ok()
}
