//! JSON data format.
//!
//! The reader and writer convert between text and [`Value`]. Typed encoding
//! goes through a [`Registry`](crate::Registry), which uses these at its
//! boundary.

mod ser;
pub use self::ser::{to_string, to_writer};

mod de;
pub use self::de::{from_reader, from_str, MAX_DEPTH};

mod value;
pub use self::value::Value;

pub mod number;

mod object;
pub use self::object::Object;
