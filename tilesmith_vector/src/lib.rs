//! An in-memory model of Mapbox vector tiles with a canonical, deterministic
//! protobuf encoding.
//!
//! The pipeline treats tiles as mostly opaque: it builds them through an
//! upstream callback, optionally swaps the feature list of individual layers,
//! and serializes the result with [`VectorTile::to_blob`]. Encoding the same
//! in-memory tile twice always yields identical bytes.

mod feature;
mod geometry_type;
mod layer;
mod tile;
mod value;

pub use feature::VectorTileFeature;
pub use geometry_type::GeomType;
pub use layer::VectorTileLayer;
pub use tile::VectorTile;
pub use value::TagValue;
