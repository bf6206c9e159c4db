use super::geometry_type::GeomType;
use anyhow::{Context, Result};
use tilesmith_core::{Blob, io::ValueWriterBlob};

/// A single feature within a vector tile layer.
///
/// Geometry is carried as the already-encoded command stream
/// (<https://github.com/mapbox/vector-tile-spec/blob/master/2.1/README.md#43-geometry-encoding>);
/// the pipeline never needs to interpret it. `tag_ids` holds interleaved
/// key/value indices into the owning layer's property tables.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VectorTileFeature {
	pub id: Option<u64>,
	pub tag_ids: Vec<u32>,
	pub geom_type: GeomType,
	pub geom_data: Blob,
}

impl VectorTileFeature {
	/// Creates a point feature at the given tile-local position.
	pub fn from_point(x: i64, y: i64, tag_ids: Vec<u32>) -> Result<VectorTileFeature> {
		let mut writer = ValueWriterBlob::new();
		// a single MoveTo command with one coordinate pair
		writer.write_varint(9).context("Failed to write MoveTo command")?;
		writer.write_svarint(x).context("Failed to write x coordinate")?;
		writer.write_svarint(y).context("Failed to write y coordinate")?;

		Ok(VectorTileFeature {
			id: None,
			tag_ids,
			geom_type: GeomType::Point,
			geom_data: writer.into_blob(),
		})
	}

	/// Encodes the feature as a `Feature` protobuf message.
	pub fn to_blob(&self) -> Result<Blob> {
		let mut writer = ValueWriterBlob::new();

		if let Some(id) = self.id {
			writer.write_pbf_key(1, 0).context("Failed to write PBF key for feature ID")?;
			writer.write_varint(id).context("Failed to write feature ID")?;
		}

		if !self.tag_ids.is_empty() {
			writer.write_pbf_key(2, 2).context("Failed to write PBF key for tag IDs")?;
			writer
				.write_pbf_packed_uint32(&self.tag_ids)
				.context("Failed to write tag IDs")?;
		}

		writer.write_pbf_key(3, 0).context("Failed to write PBF key for geometry type")?;
		writer
			.write_varint(self.geom_type.as_u64())
			.context("Failed to write geometry type")?;

		if !self.geom_data.is_empty() {
			writer.write_pbf_key(4, 2).context("Failed to write PBF key for geometry data")?;
			writer.write_pbf_blob(&self.geom_data).context("Failed to write geometry data")?;
		}

		Ok(writer.into_blob())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn point_geometry_command_stream() -> Result<()> {
		let feature = VectorTileFeature::from_point(1, 2, vec![])?;
		assert_eq!(feature.geom_type, GeomType::Point);
		assert_eq!(feature.geom_data.as_slice(), &[9, 2, 4]);
		Ok(())
	}

	#[test]
	fn to_blob() -> Result<()> {
		let mut feature = VectorTileFeature::from_point(1, 2, vec![0, 0])?;
		feature.id = Some(7);
		assert_eq!(
			feature.to_blob()?.into_vec(),
			vec![
				0x08, 7, // id
				0x12, 2, 0, 0, // tag ids
				0x18, 1, // geometry type: point
				0x22, 3, 9, 2, 4, // geometry
			]
		);
		Ok(())
	}

	#[test]
	fn default_feature_still_writes_geometry_type() -> Result<()> {
		let feature = VectorTileFeature::default();
		assert_eq!(feature.to_blob()?.into_vec(), vec![0x18, 0]);
		Ok(())
	}
}
