use tilesmith_core::{GeoBBox, GeoCenter};

/// Whether the archive is a base layer or an overlay.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ArchiveType {
	#[default]
	Baselayer,
	Overlay,
}

impl ArchiveType {
	#[must_use]
	pub fn as_str(&self) -> &'static str {
		match self {
			ArchiveType::Baselayer => "baselayer",
			ArchiveType::Overlay => "overlay",
		}
	}
}

/// The metadata persisted alongside the tiles, rendered into the
/// conventional MBTiles key set.
#[derive(Clone, Debug, PartialEq)]
pub struct ArchiveMetadata {
	pub name: String,
	pub description: String,
	pub attribution: String,
	pub version: String,
	pub archive_type: ArchiveType,
	pub bounds: GeoBBox,
	pub minzoom: u8,
	pub maxzoom: u8,
	/// Opaque per-layer statistics blob, stored under the `json` key.
	pub json: Option<String>,
}

impl ArchiveMetadata {
	#[must_use]
	pub fn new(name: &str, bounds: GeoBBox, minzoom: u8, maxzoom: u8) -> ArchiveMetadata {
		ArchiveMetadata {
			name: name.to_string(),
			description: String::new(),
			attribution: String::new(),
			version: "3.0".to_string(),
			archive_type: ArchiveType::Baselayer,
			bounds,
			minzoom,
			maxzoom,
			json: None,
		}
	}

	#[must_use]
	pub fn with_description(mut self, description: &str) -> ArchiveMetadata {
		self.description = description.to_string();
		self
	}

	#[must_use]
	pub fn with_attribution(mut self, attribution: &str) -> ArchiveMetadata {
		self.attribution = attribution.to_string();
		self
	}

	#[must_use]
	pub fn with_version(mut self, version: &str) -> ArchiveMetadata {
		self.version = version.to_string();
		self
	}

	#[must_use]
	pub fn with_type(mut self, archive_type: ArchiveType) -> ArchiveMetadata {
		self.archive_type = archive_type;
		self
	}

	#[must_use]
	pub fn with_json(mut self, json: &str) -> ArchiveMetadata {
		self.json = Some(json.to_string());
		self
	}

	/// The map center derived from the bounds and zoom range.
	#[must_use]
	pub fn center(&self) -> GeoCenter {
		GeoCenter::from_bbox(&self.bounds, self.minzoom, self.maxzoom)
	}

	/// Renders the metadata as key/value pairs in the conventional MBTiles
	/// key set. Tiles are always gzipped vector tiles, so `format` is `pbf`.
	#[must_use]
	pub fn as_pairs(&self) -> Vec<(&'static str, String)> {
		let mut pairs = vec![
			("name", self.name.clone()),
			("format", "pbf".to_string()),
			("description", self.description.clone()),
			("attribution", self.attribution.clone()),
			("version", self.version.clone()),
			("type", self.archive_type.as_str().to_string()),
			("bounds", self.bounds.as_metadata_value()),
			("center", self.center().as_metadata_value()),
			("minzoom", self.minzoom.to_string()),
			("maxzoom", self.maxzoom.to_string()),
		];
		if let Some(json) = &self.json {
			pairs.push(("json", json.clone()));
		}
		pairs
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn as_pairs() {
		let metadata = ArchiveMetadata::new("test", GeoBBox::new(-10.0, -5.0, 10.0, 5.0).unwrap(), 0, 4)
			.with_description("a test archive")
			.with_attribution("© nobody")
			.with_type(ArchiveType::Overlay)
			.with_json(r#"{"vector_layers":[]}"#);

		let pairs = metadata.as_pairs();
		let get = |key: &str| {
			pairs
				.iter()
				.find(|(k, _)| *k == key)
				.map(|(_, v)| v.clone())
				.unwrap()
		};

		assert_eq!(get("name"), "test");
		assert_eq!(get("format"), "pbf");
		assert_eq!(get("type"), "overlay");
		assert_eq!(get("bounds"), "-10,-5,10,5");
		assert_eq!(get("center"), "0,0,2");
		assert_eq!(get("minzoom"), "0");
		assert_eq!(get("maxzoom"), "4");
		assert_eq!(get("json"), r#"{"vector_layers":[]}"#);
	}

	#[test]
	fn json_is_omitted_when_absent() {
		let metadata = ArchiveMetadata::new("test", GeoBBox::new_full(), 0, 4);
		assert!(!metadata.as_pairs().iter().any(|(k, _)| *k == "json"));
	}
}
