//! The upstream seam: an ordered stream of per-tile feature groups.
//!
//! Ingestion, classification and geometry processing happen upstream; the
//! pipeline only requires that the feature store can hand out one group of
//! features per output tile, sorted by [`TileCoord`].

use anyhow::Result;
use tilesmith_core::TileCoord;
use tilesmith_vector::VectorTile;

/// The features of one output tile, owned by the upstream feature store and
/// borrowed by the pipeline for the duration of a batch.
pub trait TileFeatures: Send + 'static {
	/// The tile this group belongs to.
	fn coord(&self) -> TileCoord;

	/// How many features this group will emit, used for batch sizing.
	fn num_features_to_emit(&self) -> u64;

	/// How many source features were processed to produce this group, used
	/// for progress accounting.
	fn num_features_processed(&self) -> u64;

	/// Builds the in-memory vector tile for this group.
	fn build_tile(&self) -> Result<VectorTile>;

	/// Content equality, used to replay the previous tile's encoded bytes
	/// for runs of identical tiles. Implementations must be reflexive, and
	/// groups with equal contents must build tiles that encode to equal
	/// bytes; a store that cannot guarantee that must always return `false`.
	fn has_same_contents(&self, other: &Self) -> bool;
}

/// A lazy, finite stream of [`TileFeatures`] groups in ascending
/// [`TileCoord`] order. Iterable once.
pub trait FeatureSource: Send + 'static {
	type Group: TileFeatures;

	/// The cumulative number of features the source will emit, for progress
	/// reporting.
	fn num_features(&self) -> u64;

	/// The next per-tile feature group, or `None` once the stream is
	/// exhausted.
	fn next_group(&mut self) -> Result<Option<Self::Group>>;
}
