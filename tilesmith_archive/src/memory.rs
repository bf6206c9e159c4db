//! An in-memory [`TileArchive`] used by tests to observe exactly what a
//! pipeline run wrote, including batch boundaries and write order.

use super::{ArchiveMetadata, TileArchive};
use anyhow::{Result, ensure};
use std::sync::{Arc, Mutex};
use tilesmith_core::{Blob, TileCoord};

#[derive(Debug, Default)]
struct Inner {
	schema_ready: bool,
	index_created: bool,
	metadata: Option<ArchiveMetadata>,
	batches: Vec<Vec<(TileCoord, Blob)>>,
	vacuumed: bool,
	finished: bool,
}

/// An archive that records everything in memory. Clones share the same
/// storage, so a test can keep one clone for assertions while the pipeline
/// consumes the other.
#[derive(Clone, Debug, Default)]
pub struct MemoryArchive {
	inner: Arc<Mutex<Inner>>,
}

impl MemoryArchive {
	#[must_use]
	pub fn new() -> MemoryArchive {
		MemoryArchive::default()
	}

	/// All written tiles in write order, flattened across batches.
	#[must_use]
	pub fn entries(&self) -> Vec<(TileCoord, Blob)> {
		self.inner.lock().unwrap().batches.iter().flatten().cloned().collect()
	}

	/// The number of tiles in each written batch, in write order.
	#[must_use]
	pub fn batch_sizes(&self) -> Vec<usize> {
		self.inner.lock().unwrap().batches.iter().map(Vec::len).collect()
	}

	#[must_use]
	pub fn tile_count(&self) -> usize {
		self.inner.lock().unwrap().batches.iter().map(Vec::len).sum()
	}

	#[must_use]
	pub fn metadata(&self) -> Option<ArchiveMetadata> {
		self.inner.lock().unwrap().metadata.clone()
	}

	#[must_use]
	pub fn index_created(&self) -> bool {
		self.inner.lock().unwrap().index_created
	}

	#[must_use]
	pub fn vacuumed(&self) -> bool {
		self.inner.lock().unwrap().vacuumed
	}

	#[must_use]
	pub fn finished(&self) -> bool {
		self.inner.lock().unwrap().finished
	}
}

impl TileArchive for MemoryArchive {
	fn setup_schema(&mut self) -> Result<()> {
		self.inner.lock().unwrap().schema_ready = true;
		Ok(())
	}

	fn add_index(&mut self) -> Result<()> {
		let mut inner = self.inner.lock().unwrap();
		ensure!(inner.schema_ready, "schema must be set up before the index");
		inner.index_created = true;
		Ok(())
	}

	fn set_metadata(&mut self, metadata: &ArchiveMetadata) -> Result<()> {
		let mut inner = self.inner.lock().unwrap();
		ensure!(inner.schema_ready, "schema must be set up before metadata");
		inner.metadata = Some(metadata.clone());
		Ok(())
	}

	fn write_batch(&mut self, entries: &[(TileCoord, Blob)]) -> Result<()> {
		let mut inner = self.inner.lock().unwrap();
		ensure!(inner.schema_ready, "schema must be set up before writing tiles");
		ensure!(!inner.finished, "the archive is already closed");
		inner.batches.push(entries.to_vec());
		Ok(())
	}

	fn vacuum_analyze(&mut self) -> Result<()> {
		self.inner.lock().unwrap().vacuumed = true;
		Ok(())
	}

	fn finish(&mut self) -> Result<()> {
		self.inner.lock().unwrap().finished = true;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use tilesmith_core::GeoBBox;

	#[test]
	fn records_batches_and_metadata() -> Result<()> {
		let archive = MemoryArchive::new();
		let mut writer = archive.clone();

		writer.setup_schema()?;
		writer.set_metadata(&ArchiveMetadata::new("mem", GeoBBox::new_full(), 0, 2))?;
		writer.write_batch(&[
			(TileCoord::new(0, 0, 0)?, Blob::from("a")),
			(TileCoord::new(1, 0, 1)?, Blob::from("b")),
		])?;
		writer.write_batch(&[(TileCoord::new(1, 1, 0)?, Blob::from("c"))])?;
		writer.add_index()?;
		writer.vacuum_analyze()?;
		writer.finish()?;

		assert_eq!(archive.batch_sizes(), vec![2, 1]);
		assert_eq!(archive.tile_count(), 3);
		assert_eq!(archive.metadata().unwrap().name, "mem");
		assert!(archive.index_created());
		assert!(archive.vacuumed());
		assert!(archive.finished());
		Ok(())
	}

	#[test]
	fn rejects_writes_before_schema_setup() {
		let mut archive = MemoryArchive::new();
		assert!(archive.write_batch(&[]).is_err());
	}

	#[test]
	fn rejects_writes_after_close() -> Result<()> {
		let mut archive = MemoryArchive::new();
		archive.setup_schema()?;
		archive.finish()?;
		assert!(archive.write_batch(&[]).is_err());
		Ok(())
	}
}
