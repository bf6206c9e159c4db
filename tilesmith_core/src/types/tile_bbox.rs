//! Tile-aligned bounding boxes for a single zoom level.
//!
//! A `TileBBox` describes a rectangular region of Web-Mercator tiles at a
//! specific zoom level. The internal representation stores
//! `(x_min, y_min, width, height)`; the derived maximum coordinates are
//! inclusive and a bbox is *empty* when `width == 0` or `height == 0`.

use super::{GeoBBox, MAX_MERCATOR_LAT, TileCoord};
use anyhow::{Result, ensure};
use std::f64::consts::PI;
use std::fmt::{self, Debug};

/// A rectangular region of tiles at a specific zoom level.
#[derive(Clone, Copy, Hash, PartialEq, Eq)]
pub struct TileBBox {
	/// Zoom level of the bounding box.
	pub level: u8,
	x_min: u32,
	y_min: u32,
	width: u32,
	height: u32,
}

impl TileBBox {
	/// Creates a bbox from inclusive minimum and maximum tile coordinates.
	///
	/// # Errors
	/// Returns an error if any coordinate exceeds the valid range for the
	/// level or the box is inverted.
	pub fn new(level: u8, x_min: u32, y_min: u32, x_max: u32, y_max: u32) -> Result<TileBBox> {
		ensure!(level <= super::MAX_TILE_ZOOM, "level ({level}) must be <= {}", super::MAX_TILE_ZOOM);
		let size = 1u32 << level;
		ensure!(x_max < size, "x_max ({x_max}) must be < {size}");
		ensure!(y_max < size, "y_max ({y_max}) must be < {size}");
		ensure!(x_min <= x_max, "x_min ({x_min}) must be <= x_max ({x_max})");
		ensure!(y_min <= y_max, "y_min ({y_min}) must be <= y_max ({y_max})");
		Ok(TileBBox {
			level,
			x_min,
			y_min,
			width: x_max - x_min + 1,
			height: y_max - y_min + 1,
		})
	}

	/// Creates a bbox covering the full zoom level.
	pub fn new_full(level: u8) -> Result<TileBBox> {
		ensure!(level <= super::MAX_TILE_ZOOM, "level ({level}) must be <= {}", super::MAX_TILE_ZOOM);
		let size = 1u32 << level;
		Ok(TileBBox {
			level,
			x_min: 0,
			y_min: 0,
			width: size,
			height: size,
		})
	}

	/// Creates an empty bbox at the given zoom level.
	pub fn new_empty(level: u8) -> Result<TileBBox> {
		ensure!(level <= super::MAX_TILE_ZOOM, "level ({level}) must be <= {}", super::MAX_TILE_ZOOM);
		Ok(TileBBox {
			level,
			x_min: 0,
			y_min: 0,
			width: 0,
			height: 0,
		})
	}

	/// Creates the smallest bbox covering a geographical bounding box.
	///
	/// Tiles only touched by the eastern/southern edge of the box are not
	/// included; a small epsilon keeps boundary coordinates from spilling
	/// into the next row or column.
	pub fn from_geo(level: u8, bbox: &GeoBBox) -> Result<TileBBox> {
		ensure!(level <= super::MAX_TILE_ZOOM, "level ({level}) must be <= {}", super::MAX_TILE_ZOOM);
		const EDGE_EPSILON: f64 = 1e-6;
		let max = i64::from(1u32 << level) - 1;
		let clamp = |value: f64, min: i64| (value.floor() as i64).clamp(min, max) as u32;

		let x_min = clamp(lon_to_px(bbox.x_min, level), 0);
		let y_min = clamp(lat_to_px(bbox.y_max, level), 0);
		TileBBox::new(
			level,
			x_min,
			y_min,
			clamp(lon_to_px(bbox.x_max, level) - EDGE_EPSILON, i64::from(x_min)),
			clamp(lat_to_px(bbox.y_min, level) - EDGE_EPSILON, i64::from(y_min)),
		)
	}

	#[must_use]
	pub fn x_min(&self) -> u32 {
		self.x_min
	}

	#[must_use]
	pub fn y_min(&self) -> u32 {
		self.y_min
	}

	/// Inclusive maximum column; meaningless when the bbox is empty.
	#[must_use]
	pub fn x_max(&self) -> u32 {
		self.x_min + self.width.max(1) - 1
	}

	/// Inclusive maximum row; meaningless when the bbox is empty.
	#[must_use]
	pub fn y_max(&self) -> u32 {
		self.y_min + self.height.max(1) - 1
	}

	#[must_use]
	pub fn width(&self) -> u32 {
		self.width
	}

	#[must_use]
	pub fn height(&self) -> u32 {
		self.height
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.width == 0 || self.height == 0
	}

	#[must_use]
	pub fn count_tiles(&self) -> u64 {
		u64::from(self.width) * u64::from(self.height)
	}

	#[must_use]
	pub fn contains(&self, x: u32, y: u32) -> bool {
		!self.is_empty() && x >= self.x_min && x <= self.x_max() && y >= self.y_min && y <= self.y_max()
	}

	#[must_use]
	pub fn contains_coord(&self, coord: &TileCoord) -> bool {
		coord.level() == self.level && self.contains(coord.x(), coord.y())
	}

	/// Expands the bbox so that it includes the given tile.
	pub fn include(&mut self, x: u32, y: u32) {
		if self.is_empty() {
			self.x_min = x;
			self.y_min = y;
			self.width = 1;
			self.height = 1;
		} else {
			let x_max = self.x_max().max(x);
			let y_max = self.y_max().max(y);
			self.x_min = self.x_min.min(x);
			self.y_min = self.y_min.min(y);
			self.width = x_max - self.x_min + 1;
			self.height = y_max - self.y_min + 1;
		}
	}

	/// Iterates over all tiles of the bbox in archive order: columns
	/// ascending, rows within a column from south to north.
	pub fn iter_coords(&self) -> impl Iterator<Item = TileCoord> + '_ {
		let level = self.level;
		(self.x_min..=self.x_max())
			.flat_map(move |x| (self.y_min..=self.y_max()).rev().map(move |y| (x, y)))
			.take(self.count_tiles() as usize)
			.map(move |(x, y)| TileCoord::new(level, i64::from(x), i64::from(y)).unwrap())
	}
}

/// Projects a longitude to fractional tile columns at the given level.
fn lon_to_px(lon: f64, level: u8) -> f64 {
	(lon / 360.0 + 0.5) * f64::from(1u32 << level)
}

/// Projects a latitude to fractional tile rows (from the north) at the given
/// level.
fn lat_to_px(lat: f64, level: u8) -> f64 {
	let lat = lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT);
	f64::from(1u32 << level) * (0.5 - (PI * (lat / 360.0 + 0.25)).tan().ln() / (2.0 * PI))
}

impl Debug for TileBBox {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.is_empty() {
			write!(f, "TileBBox({}: empty)", self.level)
		} else {
			write!(
				f,
				"TileBBox({}: [{},{},{},{}] = {})",
				self.level,
				self.x_min,
				self.y_min,
				self.x_max(),
				self.y_max(),
				self.count_tiles()
			)
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use itertools::Itertools;

	#[test]
	fn new_and_accessors() -> Result<()> {
		let bbox = TileBBox::new(3, 2, 1, 4, 2)?;
		assert_eq!((bbox.x_min(), bbox.y_min(), bbox.x_max(), bbox.y_max()), (2, 1, 4, 2));
		assert_eq!((bbox.width(), bbox.height()), (3, 2));
		assert_eq!(bbox.count_tiles(), 6);
		assert!(!bbox.is_empty());
		Ok(())
	}

	#[test]
	fn full_and_empty() -> Result<()> {
		let full = TileBBox::new_full(2)?;
		assert_eq!(full.count_tiles(), 16);

		let empty = TileBBox::new_empty(2)?;
		assert!(empty.is_empty());
		assert_eq!(empty.count_tiles(), 0);
		assert_eq!(empty.iter_coords().count(), 0);
		Ok(())
	}

	#[test]
	fn rejects_out_of_range() {
		assert!(TileBBox::new(2, 0, 0, 4, 0).is_err());
		assert!(TileBBox::new(2, 3, 0, 2, 0).is_err());
		assert!(TileBBox::new(15, 0, 0, 0, 0).is_err());
	}

	#[test]
	fn from_geo_full_world() -> Result<()> {
		let bbox = TileBBox::from_geo(1, &GeoBBox::new_full())?;
		assert_eq!((bbox.x_min(), bbox.y_min(), bbox.x_max(), bbox.y_max()), (0, 0, 1, 1));
		Ok(())
	}

	#[test]
	fn from_geo_quadrant() -> Result<()> {
		// north-western quadrant only; the equator and meridian edges must
		// not spill into the southern or eastern rows
		let bbox = TileBBox::from_geo(2, &GeoBBox::new(-180.0, 0.0, 0.0, MAX_MERCATOR_LAT)?)?;
		assert_eq!((bbox.x_min(), bbox.y_min(), bbox.x_max(), bbox.y_max()), (0, 0, 1, 1));
		Ok(())
	}

	#[test]
	fn from_geo_point_sized() -> Result<()> {
		let bbox = TileBBox::from_geo(4, &GeoBBox::new(13.4, 52.5, 13.4, 52.5)?)?;
		assert_eq!(bbox.count_tiles(), 1);
		Ok(())
	}

	#[test]
	fn contains() -> Result<()> {
		let bbox = TileBBox::new(3, 2, 1, 4, 2)?;
		assert!(bbox.contains(2, 1));
		assert!(bbox.contains(4, 2));
		assert!(!bbox.contains(5, 2));
		assert!(bbox.contains_coord(&TileCoord::new(3, 3, 2)?));
		assert!(!bbox.contains_coord(&TileCoord::new(4, 3, 2)?));
		Ok(())
	}

	#[test]
	fn include() -> Result<()> {
		let mut bbox = TileBBox::new_empty(3)?;
		bbox.include(3, 4);
		assert_eq!((bbox.x_min(), bbox.y_min(), bbox.x_max(), bbox.y_max()), (3, 4, 3, 4));
		bbox.include(1, 6);
		assert_eq!((bbox.x_min(), bbox.y_min(), bbox.x_max(), bbox.y_max()), (1, 4, 3, 6));
		Ok(())
	}

	#[test]
	fn iter_coords_in_archive_order() -> Result<()> {
		let bbox = TileBBox::new(2, 1, 1, 2, 2)?;
		let tiles = bbox
			.iter_coords()
			.map(|c| format!("{}{}", c.x(), c.y()))
			.join(" ");
		assert_eq!(tiles, "12 11 22 21");

		let coords = bbox.iter_coords().collect::<Vec<_>>();
		assert!(coords.windows(2).all(|w| w[0] < w[1]));
		Ok(())
	}
}
