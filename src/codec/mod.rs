//! Derived codecs.
//!
//! A [`Codec`] converts between an erased value and a [`Value`] tree. Codecs
//! are built once per [`TypeDescriptor`] by the [`Registry`](crate::Registry)
//! and then shared read-only.

pub(crate) mod default;
pub mod descriptor;
pub(crate) mod dispatch;
pub mod scalar;
#[cfg(feature = "chrono")]
pub(crate) mod time;
pub mod union;

use std::any::Any;
use std::fmt::{self, Debug};
use std::sync::{Arc, Weak};

use once_cell::sync::OnceCell;

use crate::error::{Error, Result};
use crate::json::Value;

pub use self::descriptor::TypeDescriptor;

type EncodeFn = dyn Fn(&dyn Any) -> Result<Value> + Send + Sync;
type DecodeFn = dyn Fn(&Value) -> Result<Box<dyn Any>> + Send + Sync;
type AbsentFn = dyn Fn(&dyn Any) -> Result<bool> + Send + Sync;

/// Encode and decode functions for one type.
#[derive(Clone)]
pub struct Codec {
    encode: Arc<EncodeFn>,
    decode: Arc<DecodeFn>,
    absent: Option<Arc<AbsentFn>>,
}

impl Codec {
    pub fn new<E, D>(encode: E, decode: D) -> Self
    where
        E: Fn(&dyn Any) -> Result<Value> + Send + Sync + 'static,
        D: Fn(&Value) -> Result<Box<dyn Any>> + Send + Sync + 'static,
    {
        Codec {
            encode: Arc::new(encode),
            decode: Arc::new(decode),
            absent: None,
        }
    }

    /// Marks values for which `absent` holds as left off the enclosing
    /// object, instead of written as `null`.
    pub(crate) fn omit_when<A>(mut self, absent: A) -> Self
    where
        A: Fn(&dyn Any) -> Result<bool> + Send + Sync + 'static,
    {
        self.absent = Some(Arc::new(absent));
        self
    }

    pub fn encode(&self, value: &dyn Any) -> Result<Value> {
        (self.encode)(value)
    }

    pub fn decode(&self, value: &Value) -> Result<Box<dyn Any>> {
        (self.decode)(value)
    }

    pub fn is_absent(&self, value: &dyn Any) -> Result<bool> {
        match &self.absent {
            Some(absent) => absent(value),
            None => Ok(false),
        }
    }

    /// Encoding of an object member; `None` leaves the member out.
    pub(crate) fn encode_member(&self, value: &dyn Any) -> Result<Option<Value>> {
        if self.is_absent(value)? {
            Ok(None)
        } else {
            self.encode(value).map(Some)
        }
    }

    /// Stand-in for a codec still being derived. Every call looks up the
    /// slot, which holds the real codec once derivation is over.
    pub(crate) fn forward(name: &'static str, slot: Weak<OnceCell<Codec>>) -> Self {
        fn resolve<R>(
            name: &'static str,
            slot: &Weak<OnceCell<Codec>>,
            f: impl FnOnce(&Codec) -> Result<R>,
        ) -> Result<R> {
            let slot = slot
                .upgrade()
                .ok_or_else(|| Error::unsupported(name, "codec derivation was abandoned"))?;
            let codec = slot
                .get()
                .ok_or_else(|| Error::unsupported(name, "codec is not published yet"))?;
            f(codec)
        }

        let encode_slot = slot.clone();
        let absent_slot = slot.clone();
        Codec {
            encode: Arc::new(move |v| resolve(name, &encode_slot, |c| c.encode(v))),
            decode: Arc::new(move |j| resolve(name, &slot, |c| c.decode(j))),
            absent: Some(Arc::new(move |v| {
                resolve(name, &absent_slot, |c| c.is_absent(v))
            })),
        }
    }
}

impl Debug for Codec {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter
            .debug_struct("Codec")
            .field("omits_absent", &self.absent.is_some())
            .finish()
    }
}

/// Fails with a mismatch naming the expected type.
pub(crate) fn mismatch<T>(expected: &'static str, found: &Value, message: &str) -> Result<T> {
    Err(Error::decode_mismatch(expected, found, message))
}
