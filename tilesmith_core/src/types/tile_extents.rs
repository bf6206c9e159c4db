//! This module defines [`TileExtents`], the per-zoom rectangular tile ranges
//! a run is expected to cover. The extents drive progress percentages and
//! tile totals; they do not constrain which tiles upstream may emit.

use super::{GeoBBox, TileBBox, TileCoord, tile_coord::MAX_TILE_ZOOM};
use anyhow::{Result, ensure};
use std::array::from_fn;
use std::fmt::{self, Debug};

const LEVELS: usize = MAX_TILE_ZOOM as usize + 1;

/// One [`TileBBox`] per zoom level `0..=14`.
#[derive(Clone, PartialEq, Eq)]
pub struct TileExtents {
	level_bbox: [TileBBox; LEVELS],
}

impl TileExtents {
	/// Creates extents with empty coverage on all zoom levels.
	#[must_use]
	pub fn new_empty() -> TileExtents {
		TileExtents {
			level_bbox: from_fn(|z| TileBBox::new_empty(z as u8).unwrap()),
		}
	}

	/// Creates extents with full world coverage for `minzoom..=maxzoom`.
	pub fn new_full(minzoom: u8, maxzoom: u8) -> Result<TileExtents> {
		ensure!(minzoom <= maxzoom, "minzoom ({minzoom}) must be <= maxzoom ({maxzoom})");
		ensure!(maxzoom <= MAX_TILE_ZOOM, "maxzoom ({maxzoom}) must be <= {MAX_TILE_ZOOM}");
		Ok(TileExtents {
			level_bbox: from_fn(|z| {
				let z = z as u8;
				if z >= minzoom && z <= maxzoom {
					TileBBox::new_full(z).unwrap()
				} else {
					TileBBox::new_empty(z).unwrap()
				}
			}),
		})
	}

	/// Creates extents covering a geographical bounding box for
	/// `minzoom..=maxzoom`.
	pub fn from_geo_bbox(minzoom: u8, maxzoom: u8, bbox: &GeoBBox) -> Result<TileExtents> {
		ensure!(minzoom <= maxzoom, "minzoom ({minzoom}) must be <= maxzoom ({maxzoom})");
		ensure!(maxzoom <= MAX_TILE_ZOOM, "maxzoom ({maxzoom}) must be <= {MAX_TILE_ZOOM}");
		let mut extents = TileExtents::new_empty();
		for z in minzoom..=maxzoom {
			extents.level_bbox[z as usize] = TileBBox::from_geo(z, bbox)?;
		}
		Ok(extents)
	}

	/// Returns the bounding box at the specified zoom level; empty above
	/// [`MAX_TILE_ZOOM`].
	#[must_use]
	pub fn get_level_bbox(&self, level: u8) -> &TileBBox {
		&self.level_bbox[(level as usize).min(LEVELS - 1)]
	}

	/// Iterates over the non-empty bounding boxes, by ascending zoom level.
	pub fn iter_levels(&self) -> impl Iterator<Item = &TileBBox> {
		self.level_bbox.iter().filter(|bbox| !bbox.is_empty())
	}

	/// Iterates over every covered tile in archive order.
	pub fn iter_coords(&self) -> impl Iterator<Item = TileCoord> + '_ {
		self.iter_levels().flat_map(TileBBox::iter_coords)
	}

	/// The total number of covered tiles across all zoom levels.
	#[must_use]
	pub fn count_tiles(&self) -> u64 {
		self.level_bbox.iter().map(TileBBox::count_tiles).sum()
	}

	#[must_use]
	pub fn contains_coord(&self, coord: &TileCoord) -> bool {
		self.get_level_bbox(coord.level()).contains_coord(coord)
	}

	/// The lowest zoom level with coverage, or `None` if all levels are
	/// empty.
	#[must_use]
	pub fn zoom_min(&self) -> Option<u8> {
		self.level_bbox.iter().find(|bbox| !bbox.is_empty()).map(|bbox| bbox.level)
	}

	/// The highest zoom level with coverage, or `None` if all levels are
	/// empty.
	#[must_use]
	pub fn zoom_max(&self) -> Option<u8> {
		self
			.level_bbox
			.iter()
			.rev()
			.find(|bbox| !bbox.is_empty())
			.map(|bbox| bbox.level)
	}
}

impl Debug for TileExtents {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_list().entries(self.iter_levels()).finish()
	}
}
