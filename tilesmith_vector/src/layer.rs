use super::{feature::VectorTileFeature, value::TagValue};
use anyhow::{Context, Result};
use tilesmith_core::{Blob, io::ValueWriterBlob};

/// A named layer of a vector tile, with its feature list and the property
/// tables the features' tag ids point into.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VectorTileLayer {
	pub name: String,
	pub extent: u32,
	pub version: u32,
	pub features: Vec<VectorTileFeature>,
	keys: Vec<String>,
	values: Vec<TagValue>,
}

impl VectorTileLayer {
	/// Creates an empty layer with the standard extent (4096) and version (1).
	#[must_use]
	pub fn new_standard(name: &str) -> VectorTileLayer {
		VectorTileLayer {
			name: name.to_string(),
			extent: 4096,
			version: 1,
			features: Vec::new(),
			keys: Vec::new(),
			values: Vec::new(),
		}
	}

	/// Interns a property key, returning its index in the key table.
	pub fn key_id(&mut self, key: &str) -> u32 {
		if let Some(index) = self.keys.iter().position(|k| k == key) {
			return index as u32;
		}
		self.keys.push(key.to_string());
		(self.keys.len() - 1) as u32
	}

	/// Interns a property value, returning its index in the value table.
	pub fn value_id(&mut self, value: TagValue) -> u32 {
		if let Some(index) = self.values.iter().position(|v| *v == value) {
			return index as u32;
		}
		self.values.push(value);
		(self.values.len() - 1) as u32
	}

	/// Interns a property list into interleaved key/value tag ids.
	pub fn encode_tags(&mut self, properties: &[(String, TagValue)]) -> Vec<u32> {
		let mut tag_ids = Vec::with_capacity(properties.len() * 2);
		for (key, value) in properties {
			tag_ids.push(self.key_id(key));
			tag_ids.push(self.value_id(value.clone()));
		}
		tag_ids
	}

	#[must_use]
	pub fn keys(&self) -> &[String] {
		&self.keys
	}

	#[must_use]
	pub fn values(&self) -> &[TagValue] {
		&self.values
	}

	/// Encodes the layer as a `Layer` protobuf message.
	pub fn to_blob(&self) -> Result<Blob> {
		let mut writer = ValueWriterBlob::new();

		writer.write_pbf_key(1, 2).context("Failed to write PBF key for layer name")?;
		writer.write_pbf_string(&self.name).context("Failed to write layer name")?;

		for feature in &self.features {
			writer.write_pbf_key(2, 2).context("Failed to write PBF key for feature")?;
			writer
				.write_pbf_blob(&feature.to_blob().context("Failed to convert feature to blob")?)
				.context("Failed to write feature blob")?;
		}

		for key in &self.keys {
			writer.write_pbf_key(3, 2).context("Failed to write PBF key for property key")?;
			writer.write_pbf_string(key).context("Failed to write property key")?;
		}

		for value in &self.values {
			writer.write_pbf_key(4, 2).context("Failed to write PBF key for property value")?;
			writer
				.write_pbf_blob(&value.to_blob().context("Failed to convert property value to blob")?)
				.context("Failed to write property value blob")?;
		}

		if self.extent != 4096 {
			writer.write_pbf_key(5, 0).context("Failed to write PBF key for extent")?;
			writer.write_varint(u64::from(self.extent)).context("Failed to write extent")?;
		}

		if self.version != 1 {
			writer.write_pbf_key(15, 0).context("Failed to write PBF key for version")?;
			writer.write_varint(u64::from(self.version)).context("Failed to write version")?;
		}

		Ok(writer.into_blob())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn to_blob() -> Result<()> {
		let mut layer = VectorTileLayer::new_standard("hello");
		layer.key_id("key");
		layer.value_id(TagValue::from("vl"));

		assert_eq!(
			layer.to_blob()?.into_vec(),
			vec![
				0x0A, 0x05, b'h', b'e', b'l', b'l', b'o', // name: "hello"
				0x1A, 0x03, b'k', b'e', b'y', // property key: "key"
				0x22, 0x04, 0x0A, 0x02, b'v', b'l', // property value: "vl"
			]
		);
		Ok(())
	}

	#[test]
	fn interning_deduplicates() {
		let mut layer = VectorTileLayer::new_standard("roads");
		assert_eq!(layer.key_id("name"), 0);
		assert_eq!(layer.key_id("kind"), 1);
		assert_eq!(layer.key_id("name"), 0);
		assert_eq!(layer.value_id(TagValue::from("a")), 0);
		assert_eq!(layer.value_id(TagValue::from("a")), 0);
		assert_eq!(layer.value_id(TagValue::from(1i64)), 1);
		assert_eq!(layer.keys(), &["name", "kind"]);
	}

	#[test]
	fn encode_tags() {
		let mut layer = VectorTileLayer::new_standard("pois");
		let tags = layer.encode_tags(&[
			("name".to_string(), TagValue::from("a")),
			("rank".to_string(), TagValue::from(5u64)),
			("name".to_string(), TagValue::from("a")),
		]);
		assert_eq!(tags, vec![0, 0, 1, 1, 0, 0]);
	}

	#[test]
	fn non_standard_extent_and_version_are_written() -> Result<()> {
		let mut layer = VectorTileLayer::new_standard("x");
		layer.extent = 256;
		layer.version = 2;
		assert_eq!(
			layer.to_blob()?.into_vec(),
			vec![0x0A, 0x01, b'x', 0x28, 0x80, 0x02, 0x78, 0x02]
		);
		Ok(())
	}
}
