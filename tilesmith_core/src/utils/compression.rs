//! Gzip compression with a canonical, deterministic configuration.
//!
//! Tile deduplication relies on equal inputs producing byte-equal outputs,
//! so the compressor always runs with the default level and `flate2`'s
//! zeroed header timestamp.

use crate::Blob;
use anyhow::{Context, Result};
use flate2::bufread::{GzDecoder, GzEncoder};
use std::io::Read;

/// Compresses data using Gzip. Two equal inputs yield byte-equal outputs.
pub fn compress_gzip(blob: &Blob) -> Result<Blob> {
	let mut encoder = GzEncoder::new(blob.as_slice(), flate2::Compression::default());
	let mut compressed_data = Vec::new();
	encoder
		.read_to_end(&mut compressed_data)
		.context("Failed to compress data using Gzip")?;
	Ok(Blob::from(compressed_data))
}

/// Decompresses data that was compressed using Gzip.
pub fn decompress_gzip(blob: &Blob) -> Result<Blob> {
	let mut decoder = GzDecoder::new(blob.as_slice());
	let mut decompressed_data = Vec::new();
	decoder
		.read_to_end(&mut decompressed_data)
		.context("Failed to decompress data using Gzip")?;
	Ok(Blob::from(decompressed_data))
}

#[cfg(test)]
mod tests {
	use super::*;

	fn generate_test_data(size: usize) -> Blob {
		let mut data = Vec::with_capacity(size);
		for index in 0..size {
			data.push((index % 232 + index % 102) as u8);
		}
		Blob::from(data)
	}

	#[test]
	fn should_compress_and_decompress_gzip_correctly() -> Result<()> {
		let data = generate_test_data(100_000);
		let compressed = compress_gzip(&data)?;
		let decompressed = decompress_gzip(&compressed)?;
		assert_eq!(data, decompressed, "Gzip compression and decompression failed");
		Ok(())
	}

	#[test]
	fn equal_inputs_produce_equal_outputs() -> Result<()> {
		let data = generate_test_data(10_000);
		assert_eq!(compress_gzip(&data)?, compress_gzip(&data.clone())?);
		Ok(())
	}

	#[test]
	fn rejects_garbage() {
		assert!(decompress_gzip(&Blob::from(&[1u8, 2, 3])).is_err());
	}
}
