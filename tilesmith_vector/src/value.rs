use anyhow::{Context, Result};
use tilesmith_core::{Blob, io::ValueWriterBlob};

/// A typed tag value as stored in a vector tile layer's value table.
#[derive(Clone, Debug, PartialEq)]
pub enum TagValue {
	String(String),
	Float(f32),
	Double(f64),
	Int(i64),
	UInt(u64),
	Bool(bool),
}

impl TagValue {
	/// Encodes the value as a `Value` protobuf message.
	pub fn to_blob(&self) -> Result<Blob> {
		let mut writer = ValueWriterBlob::new();

		match self {
			TagValue::String(value) => {
				writer.write_pbf_key(1, 2).context("Failed to write string key")?;
				writer.write_pbf_string(value).context("Failed to write string value")?;
			}
			TagValue::Float(value) => {
				writer.write_pbf_key(2, 5).context("Failed to write float key")?;
				writer.write_f32(*value).context("Failed to write float value")?;
			}
			TagValue::Double(value) => {
				writer.write_pbf_key(3, 1).context("Failed to write double key")?;
				writer.write_f64(*value).context("Failed to write double value")?;
			}
			TagValue::Int(value) => {
				writer.write_pbf_key(4, 0).context("Failed to write int key")?;
				writer.write_varint(*value as u64).context("Failed to write int value")?;
			}
			TagValue::UInt(value) => {
				writer.write_pbf_key(5, 0).context("Failed to write uint key")?;
				writer.write_varint(*value).context("Failed to write uint value")?;
			}
			TagValue::Bool(value) => {
				writer.write_pbf_key(7, 0).context("Failed to write bool key")?;
				writer.write_varint(u64::from(*value)).context("Failed to write bool value")?;
			}
		}

		Ok(writer.into_blob())
	}
}

impl From<&str> for TagValue {
	fn from(value: &str) -> Self {
		TagValue::String(value.to_string())
	}
}

impl From<String> for TagValue {
	fn from(value: String) -> Self {
		TagValue::String(value)
	}
}

impl From<f64> for TagValue {
	fn from(value: f64) -> Self {
		TagValue::Double(value)
	}
}

impl From<i64> for TagValue {
	fn from(value: i64) -> Self {
		TagValue::Int(value)
	}
}

impl From<u64> for TagValue {
	fn from(value: u64) -> Self {
		TagValue::UInt(value)
	}
}

impl From<u32> for TagValue {
	fn from(value: u32) -> Self {
		TagValue::UInt(u64::from(value))
	}
}

impl From<bool> for TagValue {
	fn from(value: bool) -> Self {
		TagValue::Bool(value)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn string() -> Result<()> {
		let blob = TagValue::from("vl").to_blob()?;
		assert_eq!(blob.into_vec(), vec![0x0A, 0x02, b'v', b'l']);
		Ok(())
	}

	#[test]
	fn uint() -> Result<()> {
		assert_eq!(TagValue::from(300u64).to_blob()?.into_vec(), vec![0x28, 0xAC, 0x02]);
		Ok(())
	}

	#[test]
	fn bool() -> Result<()> {
		assert_eq!(TagValue::from(true).to_blob()?.into_vec(), vec![0x38, 1]);
		Ok(())
	}

	#[test]
	fn double() -> Result<()> {
		assert_eq!(
			TagValue::Double(1.0).to_blob()?.into_vec(),
			vec![0x19, 0, 0, 0, 0, 0, 0, 0xF0, 0x3F]
		);
		Ok(())
	}
}
