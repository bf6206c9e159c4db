//! This module provides the [`Blob`] struct, a thin wrapper around [`Vec<u8>`]
//! used for tile payloads moving through the pipeline.

use std::fmt::Debug;

/// A simple wrapper around [`Vec<u8>`] that provides additional methods for
/// working with byte data.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Blob(Vec<u8>);

impl Blob {
	/// Creates an empty `Blob`.
	#[must_use]
	pub fn new_empty() -> Blob {
		Blob(Vec::new())
	}

	/// Returns the underlying bytes as a slice.
	#[must_use]
	pub fn as_slice(&self) -> &[u8] {
		&self.0
	}

	/// Returns the length of the underlying data in bytes.
	#[must_use]
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns `true` if the `Blob` contains no bytes.
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Consumes the `Blob` and returns the underlying vector.
	#[must_use]
	pub fn into_vec(self) -> Vec<u8> {
		self.0
	}
}

impl From<Vec<u8>> for Blob {
	fn from(vec: Vec<u8>) -> Self {
		Blob(vec)
	}
}

impl From<&Vec<u8>> for Blob {
	fn from(vec: &Vec<u8>) -> Self {
		Blob(vec.clone())
	}
}

impl From<&[u8]> for Blob {
	fn from(slice: &[u8]) -> Self {
		Blob(slice.to_vec())
	}
}

impl<const N: usize> From<&[u8; N]> for Blob {
	fn from(slice: &[u8; N]) -> Self {
		Blob(slice.to_vec())
	}
}

impl From<&str> for Blob {
	fn from(text: &str) -> Self {
		Blob(text.as_bytes().to_vec())
	}
}

impl From<String> for Blob {
	fn from(text: String) -> Self {
		Blob(text.into_bytes())
	}
}

impl Debug for Blob {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Blob").field("length", &self.0.len()).finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn basic_accessors() {
		let blob = Blob::from(vec![0u8, 1, 2, 3]);
		assert_eq!(blob.len(), 4);
		assert!(!blob.is_empty());
		assert_eq!(blob.as_slice(), &[0, 1, 2, 3]);
		assert_eq!(blob.clone().into_vec(), vec![0, 1, 2, 3]);
	}

	#[test]
	fn empty() {
		let blob = Blob::new_empty();
		assert_eq!(blob.len(), 0);
		assert!(blob.is_empty());
	}

	#[test]
	fn from_text() {
		let blob = Blob::from("pbf");
		assert_eq!(blob.as_slice(), b"pbf");
	}

	#[test]
	fn debug() {
		assert_eq!(format!("{:?}", Blob::from(&[1u8, 2, 3])), "Blob { length: 3 }");
	}
}
