use super::layer::VectorTileLayer;
use anyhow::{Context, Result};
use tilesmith_core::{Blob, io::ValueWriterBlob};

/// An in-memory vector tile: an ordered list of layers.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VectorTile {
	pub layers: Vec<VectorTileLayer>,
}

impl VectorTile {
	#[must_use]
	pub fn new(layers: Vec<VectorTileLayer>) -> VectorTile {
		VectorTile { layers }
	}

	/// Encodes the tile as a `Tile` protobuf message. The encoding is
	/// deterministic: layers and their contents are written in order.
	pub fn to_blob(&self) -> Result<Blob> {
		let mut writer = ValueWriterBlob::new();

		for layer in &self.layers {
			writer.write_pbf_key(3, 2).context("Failed to write PBF key")?;
			writer
				.write_pbf_blob(&layer.to_blob().context("Failed to convert VectorTileLayer to blob")?)
				.context("Failed to write PBF blob")?;
		}

		Ok(writer.into_blob())
	}

	#[must_use]
	pub fn find_layer(&self, name: &str) -> Option<&VectorTileLayer> {
		self.layers.iter().find(|layer| layer.name == name)
	}

	pub fn find_layer_mut(&mut self, name: &str) -> Option<&mut VectorTileLayer> {
		self.layers.iter_mut().find(|layer| layer.name == name)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{TagValue, VectorTileFeature};

	fn example_tile() -> Result<VectorTile> {
		let mut layer = VectorTileLayer::new_standard("hello");
		let tag_ids = layer.encode_tags(&[("key".to_string(), TagValue::from("vl"))]);
		layer.features.push(VectorTileFeature::from_point(10, 20, tag_ids)?);
		Ok(VectorTile::new(vec![layer]))
	}

	#[test]
	fn to_blob_wraps_layers() -> Result<()> {
		let mut layer = VectorTileLayer::new_standard("hello");
		layer.key_id("key");
		layer.value_id(TagValue::from("vl"));
		let tile = VectorTile::new(vec![layer.clone()]);

		let layer_bytes = layer.to_blob()?.into_vec();
		let mut expected = vec![0x1A, layer_bytes.len() as u8];
		expected.extend(layer_bytes);
		assert_eq!(tile.to_blob()?.into_vec(), expected);
		Ok(())
	}

	#[test]
	fn encoding_is_deterministic() -> Result<()> {
		let blob1 = example_tile()?.to_blob()?;
		let blob2 = example_tile()?.to_blob()?;
		assert_eq!(blob1, blob2);
		Ok(())
	}

	#[test]
	fn find_layer() -> Result<()> {
		let mut tile = example_tile()?;
		assert!(tile.find_layer("hello").is_some());
		assert!(tile.find_layer("missing").is_none());
		assert!(tile.find_layer_mut("hello").is_some());
		Ok(())
	}
}
