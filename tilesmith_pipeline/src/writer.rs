//! The writer stage: the single consumer appending finished batches to the
//! archive.
//!
//! The writer owns the archive for the whole run. Each batch goes into the
//! archive through one transactional [`TileArchive::write_batch`] call, so
//! output is durable up to the last committed batch even when the run fails.

use crate::{
	batch::{BatchHandle, EncodedBatch},
	telemetry::Telemetry,
};
use anyhow::{Context, Result, anyhow, ensure};
use std::sync::Arc;
use tilesmith_archive::{ArchiveMetadata, TileArchive};
use tilesmith_core::TileCoord;
use tokio::sync::mpsc;

/// The writer's upstream: completion handles in submission order (ordered
/// topology) or encoded batches in completion order (unordered topology).
pub(crate) enum WriterInput {
	Ordered(mpsc::Receiver<BatchHandle>),
	Unordered(mpsc::Receiver<Result<EncodedBatch>>),
}

pub(crate) struct WriterOptions {
	pub defer_index_creation: bool,
	pub optimize_archive: bool,
}

/// Initializes the archive, drains batches until the input closes, then
/// finishes the archive (deferred index, optional vacuum, durable close).
pub(crate) async fn run_writer(
	mut archive: Box<dyn TileArchive>,
	mut input: WriterInput,
	metadata: ArchiveMetadata,
	options: WriterOptions,
	telemetry: Arc<Telemetry>,
) -> Result<()> {
	archive.setup_schema().context("Failed to set up the archive schema")?;
	if !options.defer_index_creation {
		archive.add_index().context("Failed to create the tile index")?;
	}
	archive
		.set_metadata(&metadata)
		.context("Failed to write the archive metadata")?;

	// Strict write order is only defined (and checked) when the ordered
	// topology feeds batches in submission order.
	let check_order = matches!(input, WriterInput::Ordered(_));
	let mut last_written: Option<TileCoord> = None;

	loop {
		let entries = match &mut input {
			WriterInput::Ordered(handles) => match handles.recv().await {
				None => break,
				Some(handle) => handle
					.await
					.map_err(|_| anyhow!("a batch was dropped before its completion"))??,
			},
			WriterInput::Unordered(results) => match results.recv().await {
				None => break,
				Some(result) => result?,
			},
		};

		if check_order {
			for (coord, _) in &entries {
				ensure!(
					last_written.is_none_or(|last| last < *coord),
					"tile {coord:?} is out of order, the previous tile was {last_written:?}"
				);
				last_written = Some(*coord);
			}
		}

		archive
			.write_batch(&entries)
			.context("Failed to write a batch to the archive")?;

		for (coord, _) in &entries {
			telemetry.record_tile_written(coord.level());
		}
		telemetry.record_batch_len(entries.len());
		if let Some((coord, _)) = entries.last() {
			telemetry.publish_last_written(*coord);
		}
	}

	if options.defer_index_creation {
		archive.add_index().context("Failed to create the deferred tile index")?;
	}
	if options.optimize_archive {
		archive.vacuum_analyze().context("Failed to optimize the archive")?;
	}
	archive.finish().context("Failed to close the archive")?;
	Ok(())
}
