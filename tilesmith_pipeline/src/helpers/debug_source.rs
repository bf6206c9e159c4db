//! A feature source generating synthetic point tiles over a set of extents,
//! used by the demo CLI and for end-to-end testing without real data.

use crate::source::{FeatureSource, TileFeatures};
use anyhow::Result;
use std::sync::Arc;
use tilesmith_core::{TileCoord, TileExtents};
use tilesmith_vector::{TagValue, VectorTile, VectorTileFeature, VectorTileLayer};

type LayerSpec = Vec<(String, Vec<Vec<(String, String)>>)>;

/// Generates one tile per extent coordinate, in archive order. Every tile
/// carries the configured layers and features; with `coordinate_tags`
/// enabled each feature is additionally tagged with its tile's x/y/z (making
/// every tile unique), without it all tiles are content-identical and the
/// encoder dedups them down to a single encode.
#[derive(Debug)]
pub struct DebugSource {
	layers: Arc<LayerSpec>,
	coords: std::vec::IntoIter<TileCoord>,
	features_per_tile: u64,
	num_features: u64,
	coordinate_tags: bool,
}

impl DebugSource {
	#[must_use]
	pub fn new(layers: &[(&str, &[&[(&str, &str)]])], extents: &TileExtents, coordinate_tags: bool) -> DebugSource {
		let layers: LayerSpec = layers
			.iter()
			.map(|(name, features)| {
				let features = features
					.iter()
					.map(|properties| {
						properties
							.iter()
							.map(|(key, value)| (key.to_string(), value.to_string()))
							.collect()
					})
					.collect();
				(name.to_string(), features)
			})
			.collect();

		let features_per_tile: u64 = layers.iter().map(|(_, features)| features.len() as u64).sum();
		let coords: Vec<TileCoord> = extents.iter_coords().collect();
		let num_features = features_per_tile * coords.len() as u64;

		DebugSource {
			layers: Arc::new(layers),
			coords: coords.into_iter(),
			features_per_tile,
			num_features,
			coordinate_tags,
		}
	}
}

impl FeatureSource for DebugSource {
	type Group = DebugTileFeatures;

	fn num_features(&self) -> u64 {
		self.num_features
	}

	fn next_group(&mut self) -> Result<Option<DebugTileFeatures>> {
		Ok(self.coords.next().map(|coord| DebugTileFeatures {
			coord,
			layers: self.layers.clone(),
			features_per_tile: self.features_per_tile,
			coordinate_tags: self.coordinate_tags,
		}))
	}
}

/// The feature group of one synthetic tile.
#[derive(Debug)]
pub struct DebugTileFeatures {
	coord: TileCoord,
	layers: Arc<LayerSpec>,
	features_per_tile: u64,
	coordinate_tags: bool,
}

impl TileFeatures for DebugTileFeatures {
	fn coord(&self) -> TileCoord {
		self.coord
	}

	fn num_features_to_emit(&self) -> u64 {
		self.features_per_tile
	}

	fn num_features_processed(&self) -> u64 {
		self.features_per_tile
	}

	fn build_tile(&self) -> Result<VectorTile> {
		let mut tile_layers = Vec::with_capacity(self.layers.len());

		for (name, features) in self.layers.as_ref() {
			let mut layer = VectorTileLayer::new_standard(name);

			for properties in features {
				let mut tags: Vec<(String, TagValue)> = properties
					.iter()
					.map(|(key, value)| (key.clone(), TagValue::from(value.as_str())))
					.collect();
				if self.coordinate_tags {
					tags.push(("x".to_string(), TagValue::from(self.coord.x())));
					tags.push(("y".to_string(), TagValue::from(self.coord.y())));
					tags.push(("z".to_string(), TagValue::from(u32::from(self.coord.level()))));
				}
				let tag_ids = layer.encode_tags(&tags);
				layer.features.push(VectorTileFeature::from_point(1, 2, tag_ids)?);
			}

			tile_layers.push(layer);
		}

		Ok(VectorTile::new(tile_layers))
	}

	fn has_same_contents(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.layers, &other.layers)
			&& self.coordinate_tags == other.coordinate_tags
			&& (!self.coordinate_tags || self.coord == other.coord)
	}
}
