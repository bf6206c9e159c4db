//! Contains types like coordinates, bounding boxes and byte blobs.

mod blob;
mod geo_bbox;
mod geo_center;
mod tile_bbox;
mod tile_coord;
mod tile_extents;

pub use blob::*;
pub use geo_bbox::*;
pub use geo_center::*;
pub use tile_bbox::*;
pub use tile_coord::*;
pub use tile_extents::*;
