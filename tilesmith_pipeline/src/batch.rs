//! Batches: the unit of work moving between the stages.

use anyhow::Result;
use tilesmith_core::{Blob, TileCoord};
use tokio::sync::{mpsc, oneshot};

/// The encoded output of one batch: `(coord, gzipped bytes)` per input tile,
/// in input order.
pub(crate) type EncodedBatch = Vec<(TileCoord, Blob)>;

/// The receiving side of a batch's completion handle, drained by the ordered
/// writer in submission order.
pub(crate) type BatchHandle = oneshot::Receiver<Result<EncodedBatch>>;

/// Where an encoder worker delivers a finished batch.
///
/// In the ordered topology every batch carries a one-shot channel whose
/// receiver the reader has already queued for the writer; the one-shot
/// guarantees a batch is completed at most once. In the unordered topology
/// batches are pushed straight into the writer's queue.
pub(crate) enum BatchSink {
	Ordered(oneshot::Sender<Result<EncodedBatch>>),
	Unordered(mpsc::Sender<Result<EncodedBatch>>),
}

impl BatchSink {
	/// Completes the batch. A closed channel means the writer is gone and
	/// the run is already failing, so delivery errors are ignored.
	pub async fn complete(self, result: Result<EncodedBatch>) {
		match self {
			BatchSink::Ordered(tx) => {
				let _ = tx.send(result);
			}
			BatchSink::Unordered(tx) => {
				let _ = tx.send(result).await;
			}
		}
	}
}

/// An ordered group of per-tile feature groups plus the sink its encoded
/// output must be delivered to. Non-empty by construction.
pub(crate) struct TileBatch<G> {
	pub tiles: Vec<G>,
	pub sink: BatchSink,
}
