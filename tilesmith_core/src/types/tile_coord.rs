//! This module defines [`TileCoord`], a Web-Mercator tile address packed into
//! a single 32-bit value.
//!
//! # Packing
//!
//! The encoded value holds the remapped zoom in bits 28..=31, the column `x`
//! in bits 14..=27 and the complemented row `(2^z − 1) − y` (the TMS row) in
//! bits 0..=13. Zoom levels below 8 are remapped to codes 8..=15, levels 8
//! and above to codes 0..=6, so that the **signed** 32-bit comparison of two
//! encoded values matches the (zoom, x, tms-row) lexicographic order. That
//! order is the order tiles are appended to an archive: zoom-major, then
//! column-major, then rows from south to north.
//!
//! # Examples
//!
//! ```
//! use tilesmith_core::TileCoord;
//!
//! let coord = TileCoord::new(5, 3, 4).unwrap();
//! assert_eq!((coord.level(), coord.x(), coord.y()), (5, 3, 4));
//! assert_eq!(TileCoord::from_encoded(coord.encoded()).unwrap(), coord);
//! ```

use anyhow::{Result, ensure};
use std::{
	f64::consts::PI,
	fmt::{self, Debug},
};

/// The highest zoom level a [`TileCoord`] can address.
pub const MAX_TILE_ZOOM: u8 = 14;

const COORD_BITS: u32 = 14;
const COORD_MASK: i32 = (1 << COORD_BITS) - 1;

/// A tile address `(z, x, y)` with `z ∈ 0..=14` and `x, y ∈ 0..2^z`, packed
/// into one `i32` whose signed ordering is the archive write order.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileCoord {
	encoded: i32,
}

impl TileCoord {
	/// Creates a new `TileCoord`.
	///
	/// `x` is wrapped modulo `2^level` (negative columns address tiles across
	/// the antimeridian), `y` is clamped into `0..2^level`.
	///
	/// # Errors
	/// Returns an error if `level` exceeds [`MAX_TILE_ZOOM`].
	pub fn new(level: u8, x: i64, y: i64) -> Result<TileCoord> {
		ensure!(level <= MAX_TILE_ZOOM, "level ({level}) must be <= {MAX_TILE_ZOOM}");
		let size = 1i64 << level;
		let x = x.rem_euclid(size) as u32;
		let row = (size - 1 - y.clamp(0, size - 1)) as u32;
		let code = u32::from(if level < 8 { level + 8 } else { level - 8 });
		Ok(TileCoord {
			encoded: ((code << (2 * COORD_BITS)) | (x << COORD_BITS) | row) as i32,
		})
	}

	/// Reconstructs a `TileCoord` from its packed representation.
	///
	/// # Errors
	/// Returns an error if the zoom nibble or the coordinate fields are out of
	/// range for a valid tile address.
	pub fn from_encoded(encoded: i32) -> Result<TileCoord> {
		let code = ((encoded >> (2 * COORD_BITS)) & 0xF) as u8;
		ensure!(code != 7, "invalid zoom code ({code})");
		let level = if code >= 8 { code - 8 } else { code + 8 };
		ensure!(level <= MAX_TILE_ZOOM, "level ({level}) must be <= {MAX_TILE_ZOOM}");
		let size = 1i32 << level;
		let x = (encoded >> COORD_BITS) & COORD_MASK;
		let row = encoded & COORD_MASK;
		ensure!(x < size, "x ({x}) must be < {size}");
		ensure!(row < size, "row ({row}) must be < {size}");
		Ok(TileCoord { encoded })
	}

	/// Returns the packed representation. Comparing encoded values as signed
	/// integers yields the same order as comparing the coordinates themselves.
	#[must_use]
	pub fn encoded(&self) -> i32 {
		self.encoded
	}

	/// The zoom level.
	#[must_use]
	pub fn level(&self) -> u8 {
		let code = ((self.encoded >> (2 * COORD_BITS)) & 0xF) as u8;
		if code >= 8 { code - 8 } else { code + 8 }
	}

	/// The column, counted from the antimeridian eastwards.
	#[must_use]
	pub fn x(&self) -> u32 {
		((self.encoded >> COORD_BITS) & COORD_MASK) as u32
	}

	/// The row, counted from the north pole southwards (XYZ convention).
	#[must_use]
	pub fn y(&self) -> u32 {
		(1u32 << self.level()) - 1 - self.tms_y()
	}

	/// The row under the TMS convention, `(2^z − 1) − y`. This is the row
	/// stored in MBTiles archives and also the complement kept in the packed
	/// representation.
	#[must_use]
	pub fn tms_y(&self) -> u32 {
		(self.encoded & COORD_MASK) as u32
	}

	/// Longitude and latitude of the tile's top-left corner.
	#[must_use]
	pub fn as_geo(&self) -> [f64; 2] {
		let zoom: f64 = 2.0f64.powi(i32::from(self.level()));

		[
			((f64::from(self.x())) / zoom - 0.5) * 360.0,
			((PI * (1.0 - 2.0 * f64::from(self.y()) / zoom)).exp().atan() / PI - 0.25) * 360.0,
		]
	}

	/// An OpenStreetMap deep link centered on the tile's top-left corner.
	#[must_use]
	pub fn osm_url(&self) -> String {
		let [lon, lat] = self.as_geo();
		format!("https://www.openstreetmap.org/#map={}/{lat:.5}/{lon:.5}", self.level())
	}
}

impl Debug for TileCoord {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_fmt(format_args!("TileCoord({}, [{}, {}])", self.level(), self.x(), self.y()))
	}
}
