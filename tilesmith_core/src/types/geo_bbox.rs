use anyhow::{Result, ensure};
use std::fmt::Debug;

/// Latitude limit of the Web-Mercator projection.
pub const MAX_MERCATOR_LAT: f64 = 85.05112877980659;

/// A geographical bounding box defined by its minimum and maximum longitude
/// (x) and latitude (y) coordinates: west, south, east, north.
#[derive(Clone, Copy, PartialEq)]
pub struct GeoBBox {
	pub x_min: f64,
	pub y_min: f64,
	pub x_max: f64,
	pub y_max: f64,
}

impl GeoBBox {
	/// Creates a new `GeoBBox` from `west, south, east, north`.
	///
	/// # Errors
	/// Returns an error if the coordinates are out of range or inverted.
	pub fn new(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Result<GeoBBox> {
		ensure!(x_min >= -180.0, "x_min ({x_min}) must be >= -180");
		ensure!(x_max <= 180.0, "x_max ({x_max}) must be <= 180");
		ensure!(y_min >= -90.0, "y_min ({y_min}) must be >= -90");
		ensure!(y_max <= 90.0, "y_max ({y_max}) must be <= 90");
		ensure!(x_min <= x_max, "x_min ({x_min}) must be <= x_max ({x_max})");
		ensure!(y_min <= y_max, "y_min ({y_min}) must be <= y_max ({y_max})");
		Ok(GeoBBox { x_min, y_min, x_max, y_max })
	}

	/// The bounding box of the whole Web-Mercator world.
	#[must_use]
	pub fn new_full() -> GeoBBox {
		GeoBBox {
			x_min: -180.0,
			y_min: -MAX_MERCATOR_LAT,
			x_max: 180.0,
			y_max: MAX_MERCATOR_LAT,
		}
	}

	/// Returns the coordinates as `[west, south, east, north]`.
	#[must_use]
	pub fn as_array(&self) -> [f64; 4] {
		[self.x_min, self.y_min, self.x_max, self.y_max]
	}

	/// The midpoint of the bounding box as `(lon, lat)`.
	#[must_use]
	pub fn center(&self) -> (f64, f64) {
		((self.x_min + self.x_max) / 2.0, (self.y_min + self.y_max) / 2.0)
	}

	/// Renders the box as the conventional `west,south,east,north` metadata
	/// string.
	#[must_use]
	pub fn as_metadata_value(&self) -> String {
		format!("{},{},{},{}", self.x_min, self.y_min, self.x_max, self.y_max)
	}
}

impl TryFrom<Vec<f64>> for GeoBBox {
	type Error = anyhow::Error;

	fn try_from(values: Vec<f64>) -> Result<GeoBBox> {
		ensure!(values.len() == 4, "bbox must contain 4 values, got {}", values.len());
		GeoBBox::new(values[0], values[1], values[2], values[3])
	}
}

impl Debug for GeoBBox {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "GeoBBox[{}, {}, {}, {}]", self.x_min, self.y_min, self.x_max, self.y_max)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn new_and_accessors() -> Result<()> {
		let bbox = GeoBBox::new(-10.0, -5.0, 10.0, 5.0)?;
		assert_eq!(bbox.as_array(), [-10.0, -5.0, 10.0, 5.0]);
		assert_eq!(bbox.center(), (0.0, 0.0));
		assert_eq!(bbox.as_metadata_value(), "-10,-5,10,5");
		Ok(())
	}

	#[test]
	fn rejects_inverted_boxes() {
		assert!(GeoBBox::new(10.0, 0.0, -10.0, 5.0).is_err());
		assert!(GeoBBox::new(-10.0, 5.0, 10.0, 0.0).is_err());
		assert!(GeoBBox::new(-200.0, 0.0, 10.0, 5.0).is_err());
	}

	#[test]
	fn try_from_vec() -> Result<()> {
		let bbox = GeoBBox::try_from(vec![13.0, 52.0, 14.0, 53.0])?;
		assert_eq!(bbox.as_array(), [13.0, 52.0, 14.0, 53.0]);
		assert!(GeoBBox::try_from(vec![1.0, 2.0]).is_err());
		Ok(())
	}
}
