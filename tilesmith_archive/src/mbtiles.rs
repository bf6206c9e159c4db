//! This module provides functionality for writing tile data to an MBTiles
//! SQLite database.
//!
//! Tiles are stored under the TMS row convention (`tile_row` counted from the
//! south), as gzip-compressed vector tile blobs with metadata `format` set to
//! `pbf`. Each batch of tiles is written inside a single transaction; the
//! unique tile index lives in [`TileArchive::add_index`] so its creation can
//! be deferred until after the bulk load.

use super::{ArchiveMetadata, TileArchive};
use anyhow::{Context, Result};
use r2d2::Pool;
use r2d2_sqlite::{SqliteConnectionManager, rusqlite::params};
use std::{fs::remove_file, path::Path};
use tilesmith_core::{Blob, TileCoord};

/// A writer for creating and populating MBTiles databases.
pub struct MBTilesArchive {
	pool: Pool<SqliteConnectionManager>,
}

impl MBTilesArchive {
	/// Creates a new, empty MBTiles file, replacing any existing file at the
	/// path.
	///
	/// # Errors
	/// Returns an error if the SQLite connection cannot be established.
	pub fn create(path: &Path) -> Result<MBTilesArchive> {
		if path.exists() {
			remove_file(path).with_context(|| format!("Failed to remove existing file {path:?}"))?;
		}
		let manager = SqliteConnectionManager::file(path);
		let pool = Pool::builder().max_size(10).build(manager)?;

		Ok(MBTilesArchive { pool })
	}
}

impl TileArchive for MBTilesArchive {
	fn setup_schema(&mut self) -> Result<()> {
		self
			.pool
			.get()?
			.execute_batch(
				"CREATE TABLE metadata (name TEXT, value TEXT, UNIQUE (name));
				CREATE TABLE tiles (zoom_level INTEGER, tile_column INTEGER, tile_row INTEGER, tile_data BLOB);",
			)
			.context("Failed to create MBTiles schema")?;
		Ok(())
	}

	fn add_index(&mut self) -> Result<()> {
		self
			.pool
			.get()?
			.execute_batch("CREATE UNIQUE INDEX IF NOT EXISTS tile_index ON tiles (zoom_level, tile_column, tile_row);")
			.context("Failed to create tile index")?;
		Ok(())
	}

	fn set_metadata(&mut self, metadata: &ArchiveMetadata) -> Result<()> {
		let conn = self.pool.get()?;
		for (name, value) in metadata.as_pairs() {
			conn
				.execute(
					"INSERT OR REPLACE INTO metadata (name, value) VALUES (?1, ?2)",
					params![name, value],
				)
				.with_context(|| format!("Failed to write metadata entry {name:?}"))?;
		}
		Ok(())
	}

	fn write_batch(&mut self, entries: &[(TileCoord, Blob)]) -> Result<()> {
		let mut conn = self.pool.get()?;
		let transaction = conn.transaction()?;
		for (coord, blob) in entries {
			transaction
				.execute(
					"INSERT INTO tiles (zoom_level, tile_column, tile_row, tile_data) VALUES (?1, ?2, ?3, ?4)",
					params![coord.level(), coord.x(), coord.tms_y(), blob.as_slice()],
				)
				.with_context(|| format!("Failed to write tile {coord:?}"))?;
		}
		transaction.commit()?;
		Ok(())
	}

	fn vacuum_analyze(&mut self) -> Result<()> {
		log::debug!("running vacuum and analyze");
		self
			.pool
			.get()?
			.execute_batch("VACUUM; ANALYZE;")
			.context("Failed to vacuum/analyze the archive")?;
		Ok(())
	}

	fn finish(&mut self) -> Result<()> {
		// batch transactions commit synchronously, so closing only runs the
		// recommended end-of-session optimization pass
		log::debug!("closing the archive");
		self
			.pool
			.get()?
			.execute_batch("PRAGMA optimize;")
			.context("Failed to close the archive")?;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use assert_fs::{NamedTempFile, fixture::PathChild};
	use tilesmith_core::GeoBBox;

	fn open(archive_path: &Path) -> Result<r2d2_sqlite::rusqlite::Connection> {
		Ok(r2d2_sqlite::rusqlite::Connection::open(archive_path)?)
	}

	fn has_index(conn: &r2d2_sqlite::rusqlite::Connection) -> Result<bool> {
		let count: u32 = conn.query_row(
			"SELECT count(*) FROM sqlite_master WHERE type = 'index' AND name = 'tile_index'",
			[],
			|row| row.get(0),
		)?;
		Ok(count > 0)
	}

	#[test]
	fn schema_metadata_and_tiles() -> Result<()> {
		let file = NamedTempFile::new("test.mbtiles")?;
		let mut archive = MBTilesArchive::create(file.path())?;
		archive.setup_schema()?;
		archive.set_metadata(&ArchiveMetadata::new("test", GeoBBox::new_full(), 0, 3))?;

		archive.write_batch(&[
			(TileCoord::new(1, 0, 0)?, Blob::from("north-west")),
			(TileCoord::new(1, 1, 1)?, Blob::from("south-east")),
		])?;

		let conn = open(file.path())?;
		let name: String = conn.query_row("SELECT value FROM metadata WHERE name = 'name'", [], |row| {
			row.get(0)
		})?;
		assert_eq!(name, "test");
		let format: String = conn.query_row("SELECT value FROM metadata WHERE name = 'format'", [], |row| {
			row.get(0)
		})?;
		assert_eq!(format, "pbf");

		// rows are stored under the TMS convention
		let data: Vec<u8> = conn.query_row(
			"SELECT tile_data FROM tiles WHERE zoom_level = 1 AND tile_column = 0 AND tile_row = 1",
			[],
			|row| row.get(0),
		)?;
		assert_eq!(data, b"north-west");
		let data: Vec<u8> = conn.query_row(
			"SELECT tile_data FROM tiles WHERE zoom_level = 1 AND tile_column = 1 AND tile_row = 0",
			[],
			|row| row.get(0),
		)?;
		assert_eq!(data, b"south-east");
		Ok(())
	}

	#[test]
	fn index_creation_can_be_deferred() -> Result<()> {
		let file = NamedTempFile::new("deferred.mbtiles")?;
		let mut archive = MBTilesArchive::create(file.path())?;
		archive.setup_schema()?;
		archive.write_batch(&[(TileCoord::new(0, 0, 0)?, Blob::from("tile"))])?;

		assert!(!has_index(&open(file.path())?)?);
		archive.add_index()?;
		assert!(has_index(&open(file.path())?)?);
		Ok(())
	}

	#[test]
	fn create_replaces_existing_file() -> Result<()> {
		let dir = assert_fs::TempDir::new()?;
		let path = dir.child("existing.mbtiles");
		std::fs::write(path.path(), b"not a database")?;

		let mut archive = MBTilesArchive::create(path.path())?;
		archive.setup_schema()?;
		archive.vacuum_analyze()?;
		archive.finish()?;
		Ok(())
	}
}
