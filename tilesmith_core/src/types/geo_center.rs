use super::GeoBBox;

/// A map center as `(lon, lat, zoom)`, rendered into archive metadata as
/// `lon,lat,zoom`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeoCenter(pub f64, pub f64, pub u8);

impl GeoCenter {
	/// Derives a center from a bounding box: the midpoint at the midpoint of
	/// the zoom range.
	#[must_use]
	pub fn from_bbox(bbox: &GeoBBox, minzoom: u8, maxzoom: u8) -> GeoCenter {
		let (lon, lat) = bbox.center();
		GeoCenter(lon, lat, minzoom.midpoint(maxzoom))
	}

	/// Renders the center as the conventional `lon,lat,zoom` metadata string.
	#[must_use]
	pub fn as_metadata_value(&self) -> String {
		format!("{},{},{}", self.0, self.1, self.2)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn from_bbox() {
		let bbox = GeoBBox::new(10.0, 40.0, 20.0, 50.0).unwrap();
		let center = GeoCenter::from_bbox(&bbox, 2, 9);
		assert_eq!(center, GeoCenter(15.0, 45.0, 5));
		assert_eq!(center.as_metadata_value(), "15,45,5");
	}
}
