//! This module defines [`ValueWriterBlob`], an in-memory writer for the
//! protobuf wire format used by vector tiles.
//!
//! # Examples
//!
//! ```
//! use tilesmith_core::io::ValueWriterBlob;
//!
//! let mut writer = ValueWriterBlob::new();
//! writer.write_varint(300).unwrap();
//! assert_eq!(writer.into_blob().into_vec(), vec![0b10101100, 0b00000010]);
//! ```

use crate::Blob;
use anyhow::{Context, Result};
use byteorder::{LittleEndian, WriteBytesExt};
use std::io::{Cursor, Write};

/// An in-memory writer producing a [`Blob`], with helpers for the protobuf
/// wire format (varints, length-delimited fields, little-endian floats).
#[derive(Default)]
pub struct ValueWriterBlob {
	cursor: Cursor<Vec<u8>>,
}

impl ValueWriterBlob {
	#[must_use]
	pub fn new() -> ValueWriterBlob {
		ValueWriterBlob::default()
	}

	/// The current write position in bytes.
	#[must_use]
	pub fn position(&self) -> u64 {
		self.cursor.position()
	}

	/// Writes an unsigned variable-length integer.
	pub fn write_varint(&mut self, mut value: u64) -> Result<()> {
		while value >= 0x80 {
			self.cursor.write_all(&[((value & 0x7F) as u8) | 0x80])?;
			value >>= 7;
		}
		self.cursor.write_all(&[value as u8])?;
		Ok(())
	}

	/// Writes a signed, zigzag-encoded variable-length integer.
	pub fn write_svarint(&mut self, value: i64) -> Result<()> {
		self.write_varint(((value << 1) ^ (value >> 63)) as u64)
	}

	/// Writes a 32-bit float in little-endian order.
	pub fn write_f32(&mut self, value: f32) -> Result<()> {
		self.cursor.write_f32::<LittleEndian>(value).context("Failed to write f32")
	}

	/// Writes a 64-bit float in little-endian order.
	pub fn write_f64(&mut self, value: f64) -> Result<()> {
		self.cursor.write_f64::<LittleEndian>(value).context("Failed to write f64")
	}

	/// Writes a protobuf field key: field number and wire type.
	pub fn write_pbf_key(&mut self, field_number: u32, wire_type: u8) -> Result<()> {
		self.write_varint((u64::from(field_number) << 3) | u64::from(wire_type))
	}

	/// Writes a length-delimited byte field.
	pub fn write_pbf_blob(&mut self, blob: &Blob) -> Result<()> {
		self.write_varint(blob.len() as u64)?;
		self.cursor.write_all(blob.as_slice())?;
		Ok(())
	}

	/// Writes a length-delimited string field.
	pub fn write_pbf_string(&mut self, text: &str) -> Result<()> {
		self.write_varint(text.len() as u64)?;
		self.cursor.write_all(text.as_bytes())?;
		Ok(())
	}

	/// Writes a packed repeated uint32 field.
	pub fn write_pbf_packed_uint32(&mut self, values: &[u32]) -> Result<()> {
		let mut payload = ValueWriterBlob::new();
		for value in values {
			payload.write_varint(u64::from(*value))?;
		}
		self.write_pbf_blob(&payload.into_blob())
	}

	/// Consumes the writer and returns the written bytes.
	#[must_use]
	pub fn into_blob(self) -> Blob {
		Blob::from(self.cursor.into_inner())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn varint() -> Result<()> {
		let mut writer = ValueWriterBlob::new();
		writer.write_varint(0)?;
		writer.write_varint(127)?;
		writer.write_varint(300)?;
		assert_eq!(writer.into_blob().into_vec(), vec![0, 127, 0b10101100, 0b00000010]);
		Ok(())
	}

	#[test]
	fn svarint() -> Result<()> {
		let mut writer = ValueWriterBlob::new();
		writer.write_svarint(0)?;
		writer.write_svarint(-1)?;
		writer.write_svarint(1)?;
		writer.write_svarint(-2)?;
		assert_eq!(writer.into_blob().into_vec(), vec![0, 1, 2, 3]);
		Ok(())
	}

	#[test]
	fn pbf_key_and_string() -> Result<()> {
		let mut writer = ValueWriterBlob::new();
		writer.write_pbf_key(1, 2)?;
		writer.write_pbf_string("hello")?;
		assert_eq!(
			writer.into_blob().into_vec(),
			vec![0x0A, 0x05, b'h', b'e', b'l', b'l', b'o']
		);
		Ok(())
	}

	#[test]
	fn packed_uint32() -> Result<()> {
		let mut writer = ValueWriterBlob::new();
		writer.write_pbf_packed_uint32(&[1, 2, 300])?;
		assert_eq!(writer.into_blob().into_vec(), vec![4, 1, 2, 0b10101100, 0b00000010]);
		Ok(())
	}

	#[test]
	fn floats_are_little_endian() -> Result<()> {
		let mut writer = ValueWriterBlob::new();
		writer.write_f32(1.0)?;
		writer.write_f64(1.0)?;
		assert_eq!(
			writer.into_blob().into_vec(),
			vec![0, 0, 0x80, 0x3F, 0, 0, 0, 0, 0, 0, 0xF0, 0x3F]
		);
		Ok(())
	}
}
