//! The pipeline supervisor: wires the stages together, runs them to
//! completion and propagates the first failure.

use crate::{
	config::PipelineConfig,
	encoder::run_encoder,
	postprocess::PostProcessors,
	reader::{ReaderOutput, run_reader},
	source::FeatureSource,
	telemetry::Telemetry,
	writer::{WriterInput, WriterOptions, run_writer},
};
use anyhow::Result;
use std::sync::Arc;
use tilesmith_archive::{ArchiveMetadata, TileArchive};
use tokio::sync::{Mutex, mpsc};

/// Runs the full assembly pipeline: drains `source`, encodes every tile and
/// appends the results to `archive`. Returns the run's telemetry registry.
///
/// Exactly one reader task, `config.threads` encoder tasks and one writer
/// task run concurrently, connected by queues bounded at
/// `config.queue_capacity` batches; a full queue blocks the producer, an
/// empty one the consumer. There is no in-run cancellation: a fatal error in
/// one stage closes its queues, the other stages drain and stop, and the
/// first real error is returned. A progress line is logged every
/// `config.log_interval`, and the per-zoom summary once the run is done.
pub async fn run_pipeline<S: FeatureSource>(
	source: S,
	archive: Box<dyn TileArchive>,
	metadata: ArchiveMetadata,
	post_processors: PostProcessors,
	config: &PipelineConfig,
) -> Result<Arc<Telemetry>> {
	config.validate()?;
	let telemetry = Arc::new(Telemetry::new(config.extents.clone()));
	let post_processors = Arc::new(post_processors);

	let (batch_tx, batch_rx) = mpsc::channel(config.queue_capacity);
	let batch_rx = Arc::new(Mutex::new(batch_rx));

	let (reader_output, writer_input) = if config.emit_tiles_in_order {
		let (handle_tx, handle_rx) = mpsc::channel(config.queue_capacity);
		(
			ReaderOutput {
				batch_tx,
				handle_tx: Some(handle_tx),
				result_tx: None,
			},
			WriterInput::Ordered(handle_rx),
		)
	} else {
		let (result_tx, result_rx) = mpsc::channel(config.queue_capacity);
		(
			ReaderOutput {
				batch_tx,
				handle_tx: None,
				result_tx: Some(result_tx),
			},
			WriterInput::Unordered(result_rx),
		)
	};

	let reader = tokio::spawn(run_reader(
		source,
		reader_output,
		config.max_tiles_per_batch,
		config.max_features_per_batch,
		telemetry.clone(),
	));

	let mut encoders = Vec::with_capacity(config.threads);
	for _ in 0..config.threads {
		encoders.push(tokio::spawn(run_encoder(
			batch_rx.clone(),
			post_processors.clone(),
			telemetry.clone(),
			config.warn_tile_bytes,
		)));
	}
	drop(batch_rx);

	let writer = tokio::spawn(run_writer(
		archive,
		writer_input,
		metadata,
		WriterOptions {
			defer_index_creation: config.defer_index_creation,
			optimize_archive: config.optimize_archive,
		},
		telemetry.clone(),
	));

	let progress = tokio::spawn({
		let telemetry = telemetry.clone();
		let interval = config.log_interval;
		async move {
			let mut ticker = tokio::time::interval(interval);
			ticker.tick().await; // the first tick fires immediately
			loop {
				ticker.tick().await;
				log::info!("{}", telemetry.last_tile_string());
			}
		}
	});

	// Join every stage before reporting, then fail with the first error:
	// stages that stopped because a neighbor closed their queue return Ok,
	// so the surviving error is the original failure.
	let reader_result = reader.await?;
	let mut encoder_results = Vec::with_capacity(encoders.len());
	for encoder in encoders {
		encoder_results.push(encoder.await?);
	}
	let writer_result = writer.await?;
	progress.abort();

	reader_result?;
	for result in encoder_results {
		result?;
	}
	writer_result?;

	telemetry.log_summary(config.minzoom, config.maxzoom);
	Ok(telemetry)
}
