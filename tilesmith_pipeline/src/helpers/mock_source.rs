//! A fully scriptable feature source: explicit coordinates, feature counts,
//! content identities, size padding and failure injection.

use crate::source::{FeatureSource, TileFeatures};
use anyhow::{Result, bail};
use tilesmith_core::{Blob, TileCoord};
use tilesmith_vector::{TagValue, VectorTile, VectorTileFeature, VectorTileLayer};

/// One scripted tile. By default its content identity is unique (derived
/// from the coordinate), so deduplication only kicks in when tiles are given
/// an explicit shared content id with [`MockTile::with_content`].
#[derive(Clone, Debug)]
pub struct MockTile {
	coord: TileCoord,
	features_to_emit: u64,
	content: u64,
	padding: usize,
	fail_build: bool,
}

impl MockTile {
	#[must_use]
	pub fn new(coord: TileCoord) -> MockTile {
		MockTile {
			coord,
			features_to_emit: 1,
			content: coord.encoded() as u32 as u64,
			padding: 0,
			fail_build: false,
		}
	}

	#[must_use]
	pub fn with_features(mut self, count: u64) -> MockTile {
		self.features_to_emit = count;
		self
	}

	/// Gives the tile an explicit content identity; tiles sharing one build
	/// byte-identical vector tiles.
	#[must_use]
	pub fn with_content(mut self, content: u64) -> MockTile {
		self.content = content;
		self
	}

	/// Pads the tile with a string property of the given length to inflate
	/// its encoded size.
	#[must_use]
	pub fn with_padding(mut self, padding: usize) -> MockTile {
		self.padding = padding;
		self
	}

	/// Makes `build_tile` fail.
	#[must_use]
	pub fn failing(mut self) -> MockTile {
		self.fail_build = true;
		self
	}

	/// The encoded bytes this tile will produce, for assertions.
	pub fn build_tile_blob(&self) -> Result<Blob> {
		self.build_tile()?.to_blob()
	}
}

impl TileFeatures for MockTile {
	fn coord(&self) -> TileCoord {
		self.coord
	}

	fn num_features_to_emit(&self) -> u64 {
		self.features_to_emit
	}

	fn num_features_processed(&self) -> u64 {
		self.features_to_emit
	}

	fn build_tile(&self) -> Result<VectorTile> {
		if self.fail_build {
			bail!("synthetic build failure at {:?}", self.coord);
		}

		// the tile content depends on the content id only, never on the
		// coordinate, so equal content ids encode to equal bytes
		let mut layer = VectorTileLayer::new_standard("mock");
		for index in 0..self.features_to_emit {
			let tag_ids = layer.encode_tags(&[
				("content".to_string(), TagValue::from(self.content)),
				("n".to_string(), TagValue::from(index)),
			]);
			layer
				.features
				.push(VectorTileFeature::from_point((index % 4096) as i64, 2, tag_ids)?);
		}
		if self.padding > 0 {
			let tag_ids = layer.encode_tags(&[("padding".to_string(), TagValue::from("x".repeat(self.padding)))]);
			layer.features.push(VectorTileFeature::from_point(0, 0, tag_ids)?);
		}
		Ok(VectorTile::new(vec![layer]))
	}

	fn has_same_contents(&self, other: &Self) -> bool {
		!self.fail_build
			&& !other.fail_build
			&& self.content == other.content
			&& self.features_to_emit == other.features_to_emit
			&& self.padding == other.padding
	}
}

/// A feature source yielding scripted tiles in the given order.
#[derive(Debug)]
pub struct MockSource {
	tiles: std::vec::IntoIter<MockTile>,
	num_features: u64,
}

impl MockSource {
	#[must_use]
	pub fn new(tiles: Vec<MockTile>) -> MockSource {
		let num_features = tiles.iter().map(|tile| tile.features_to_emit).sum();
		MockSource {
			tiles: tiles.into_iter(),
			num_features,
		}
	}
}

impl FeatureSource for MockSource {
	type Group = MockTile;

	fn num_features(&self) -> u64 {
		self.num_features
	}

	fn next_group(&mut self) -> Result<Option<MockTile>> {
		Ok(self.tiles.next())
	}
}
