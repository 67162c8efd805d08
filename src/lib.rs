//! JSON codecs derived from the shape of your types.
//!
//! Types describe themselves through [`Wire`], usually with
//! `#[derive(Wire)]`. A [`Registry`] walks that description once per type,
//! builds a [`Codec`] and caches it; after that, encoding and decoding only
//! run the cached functions.
//!
//! # Struct
//!
//! ```rust
//! use wirejson::{Registry, Wire};
//!
//! #[derive(Wire, Debug, PartialEq)]
//! struct Example {
//!     code: u32,
//!     #[wire(rename = "msg")]
//!     message: String,
//!     detail: Option<String>,
//! }
//!
//! fn main() -> wirejson::Result<()> {
//!     let registry = Registry::new();
//!     let example = Example {
//!         code: 200,
//!         message: "ok".to_owned(),
//!         detail: None,
//!     };
//!
//!     let j = registry.serialize(&example)?;
//!     assert_eq!(j, r#"{"code":200,"msg":"ok"}"#);
//!
//!     let out: Example = registry.deserialize(&j)?;
//!     assert_eq!(out, example);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Enum
//!
//! Cases are tagged with `"$": <index>` unless the enum asks for a named tag
//! or none at all. Without a tag each case is recognized by a field only it
//! has.
//!
//! ```rust
//! use wirejson::{Registry, Wire};
//!
//! #[derive(Wire, Debug, PartialEq)]
//! #[wire(untagged)]
//! enum Shape {
//!     Circle { radius: f64 },
//!     Rect { width: f64, height: f64 },
//!     #[wire(constant = "empty")]
//!     Empty,
//! }
//!
//! let registry = Registry::new();
//! let j = registry.serialize(&Shape::Circle { radius: 1.5 }).unwrap();
//! assert_eq!(j, r#"{"radius":1.5}"#);
//! assert_eq!(registry.serialize(&Shape::Empty).unwrap(), r#""empty""#);
//!
//! let back: Shape = registry.deserialize(r#"{"height":2,"width":1}"#).unwrap();
//! assert_eq!(back, Shape::Rect { width: 1.0, height: 2.0 });
//! ```

#![doc(html_root_url = "https://docs.rs/wirejson/0.1.0")]
#![allow(clippy::needless_doctest_main)]

#[doc(hidden)]
pub use wirejson_internal::*;

// Not public API.
#[doc(hidden)]
pub mod export;

mod error;
mod registry;
mod stack;

pub mod codec;
pub mod json;
pub mod shape;

pub use crate::codec::Codec;
pub use crate::error::{Error, Result};
pub use crate::registry::{Registry, RegistryBuilder};
#[doc(inline)]
pub use crate::shape::Wire;
pub use crate::stack::Stack;
