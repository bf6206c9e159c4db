/// The geometry type of a vector tile feature.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GeomType {
	#[default]
	Unknown,
	Point,
	LineString,
	Polygon,
}

impl GeomType {
	#[must_use]
	pub fn as_u64(&self) -> u64 {
		match self {
			GeomType::Unknown => 0,
			GeomType::Point => 1,
			GeomType::LineString => 2,
			GeomType::Polygon => 3,
		}
	}
}

impl From<u64> for GeomType {
	fn from(value: u64) -> Self {
		match value {
			1 => GeomType::Point,
			2 => GeomType::LineString,
			3 => GeomType::Polygon,
			_ => GeomType::Unknown,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn round_trip() {
		for geom_type in [GeomType::Unknown, GeomType::Point, GeomType::LineString, GeomType::Polygon] {
			assert_eq!(GeomType::from(geom_type.as_u64()), geom_type);
		}
		assert_eq!(GeomType::from(99), GeomType::Unknown);
	}
}
