//! Low-level writing of protobuf-encoded values.

mod value_writer;

pub use value_writer::*;
