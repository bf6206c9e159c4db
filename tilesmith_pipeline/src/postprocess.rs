//! Per-layer post-processing hooks, applied to each tile before encoding.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fmt::{self, Debug};
use tilesmith_vector::{VectorTile, VectorTileFeature};

/// A post-processing callback: receives the zoom level and a layer's
/// features, returns the replacement feature list or `None` to keep the
/// original.
pub type PostProcessFn = dyn Fn(u8, &[VectorTileFeature]) -> Result<Option<Vec<VectorTileFeature>>> + Send + Sync;

/// A registry of post-processors keyed by layer name.
///
/// The pipeline calls each registered processor once per tile and layer,
/// from whichever encoder worker handles the tile; processors must be
/// stateless or internally synchronized.
#[derive(Default)]
pub struct PostProcessors {
	registry: HashMap<String, Box<PostProcessFn>>,
}

impl PostProcessors {
	#[must_use]
	pub fn new() -> PostProcessors {
		PostProcessors::default()
	}

	/// Registers a post-processor for a layer, replacing any previous one.
	pub fn register<F>(&mut self, layer_name: &str, processor: F)
	where
		F: Fn(u8, &[VectorTileFeature]) -> Result<Option<Vec<VectorTileFeature>>> + Send + Sync + 'static,
	{
		self.registry.insert(layer_name.to_string(), Box::new(processor));
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.registry.is_empty()
	}

	/// Runs the registered processors against a tile, replacing layer
	/// feature lists where a processor returns a new one.
	pub fn apply(&self, zoom: u8, tile: &mut VectorTile) -> Result<()> {
		if self.registry.is_empty() {
			return Ok(());
		}
		for layer in &mut tile.layers {
			if let Some(processor) = self.registry.get(&layer.name) {
				let replacement = processor(zoom, &layer.features)
					.with_context(|| format!("Post-processor failed for layer {:?}", layer.name))?;
				if let Some(features) = replacement {
					layer.features = features;
				}
			}
		}
		Ok(())
	}
}

impl Debug for PostProcessors {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_list().entries(self.registry.keys()).finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use anyhow::bail;
	use tilesmith_vector::VectorTileLayer;

	fn tile_with_features(layer_name: &str, count: usize) -> VectorTile {
		let mut layer = VectorTileLayer::new_standard(layer_name);
		for _ in 0..count {
			layer.features.push(VectorTileFeature::default());
		}
		VectorTile::new(vec![layer])
	}

	#[test]
	fn replaces_features() -> Result<()> {
		let mut processors = PostProcessors::new();
		processors.register("roads", |zoom, features| {
			assert_eq!(zoom, 7);
			Ok(Some(features[..1].to_vec()))
		});

		let mut tile = tile_with_features("roads", 3);
		processors.apply(7, &mut tile)?;
		assert_eq!(tile.layers[0].features.len(), 1);
		Ok(())
	}

	#[test]
	fn none_keeps_the_original() -> Result<()> {
		let mut processors = PostProcessors::new();
		processors.register("roads", |_, _| Ok(None));

		let mut tile = tile_with_features("roads", 3);
		processors.apply(7, &mut tile)?;
		assert_eq!(tile.layers[0].features.len(), 3);
		Ok(())
	}

	#[test]
	fn unregistered_layers_are_untouched() -> Result<()> {
		let mut processors = PostProcessors::new();
		processors.register("roads", |_, _| Ok(Some(vec![])));

		let mut tile = tile_with_features("water", 2);
		processors.apply(7, &mut tile)?;
		assert_eq!(tile.layers[0].features.len(), 2);
		Ok(())
	}

	#[test]
	fn errors_are_propagated() {
		let mut processors = PostProcessors::new();
		processors.register("roads", |_, _| bail!("broken"));

		let mut tile = tile_with_features("roads", 1);
		let error = processors.apply(7, &mut tile).unwrap_err();
		assert!(error.to_string().contains("roads"));
	}
}
