use super::ArchiveMetadata;
use anyhow::Result;
use tilesmith_core::{Blob, TileCoord};

/// The sink a pipeline run appends finished tiles to.
///
/// The writer stage owns the archive exclusively for the duration of a run:
/// it calls [`setup_schema`](TileArchive::setup_schema),
/// [`set_metadata`](TileArchive::set_metadata) and (possibly deferred)
/// [`add_index`](TileArchive::add_index) at startup, appends each batch with
/// one [`write_batch`](TileArchive::write_batch) call, and at shutdown may
/// run [`vacuum_analyze`](TileArchive::vacuum_analyze) before closing the
/// archive with [`finish`](TileArchive::finish). Every batch must be atomic
/// and durable once `write_batch` returns.
pub trait TileArchive: Send {
	/// Creates the tables the archive needs, without any tile index.
	fn setup_schema(&mut self) -> Result<()>;

	/// Creates the tile lookup index. Callable before the first write or
	/// after the last one.
	fn add_index(&mut self) -> Result<()>;

	/// Persists the archive metadata.
	fn set_metadata(&mut self, metadata: &ArchiveMetadata) -> Result<()>;

	/// Appends all entries of one batch within a single transaction.
	fn write_batch(&mut self, entries: &[(TileCoord, Blob)]) -> Result<()>;

	/// Compacts and re-analyzes the archive.
	fn vacuum_analyze(&mut self) -> Result<()>;

	/// Closes the archive. Everything written so far must be durable once
	/// this returns; no writes may follow.
	fn finish(&mut self) -> Result<()>;
}
