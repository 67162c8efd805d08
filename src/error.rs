use std::io;

use thiserror::Error;

use crate::json::Value;

/// Error type returned by every fallible wirejson operation.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed JSON text.
    #[error("parse error at {line}:{column}: {message}")]
    Parse {
        line: usize,
        column: usize,
        message: String,
    },

    /// The JSON tree does not have the shape the target type expects.
    #[error("cannot decode {expected} from {found}: {message}")]
    DecodeMismatch {
        expected: &'static str,
        found: Box<Value>,
        message: String,
    },

    /// A value handed to an encoder is not of the expected runtime type, or
    /// one of its scalars formats to invalid JSON.
    #[error("cannot encode {expected}: {message}")]
    EncodeMismatch {
        expected: &'static str,
        message: String,
    },

    /// A `Value::Number` whose text is not a JSON number literal reached the
    /// writer.
    #[error("invalid JSON number literal `{0}`")]
    InvalidNumber(String),

    /// No codec can be derived for the type.
    #[error("no codec available for {ty}: {reason}")]
    Unsupported { ty: &'static str, reason: String },

    /// An untagged union has a case without a field no other case carries.
    #[error("ambiguous union {ty}: case `{case}` has no field unique to it")]
    AmbiguousUnion { ty: &'static str, case: String },

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Result type returned by wirejson functions.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn parse(line: usize, column: usize, message: impl Into<String>) -> Self {
        Error::Parse {
            line,
            column,
            message: message.into(),
        }
    }

    pub fn decode_mismatch(
        expected: &'static str,
        found: &Value,
        message: impl Into<String>,
    ) -> Self {
        Error::DecodeMismatch {
            expected,
            found: Box::new(found.clone()),
            message: message.into(),
        }
    }

    pub fn encode_mismatch(expected: &'static str, message: impl Into<String>) -> Self {
        Error::EncodeMismatch {
            expected,
            message: message.into(),
        }
    }

    pub fn unsupported(ty: &'static str, reason: impl Into<String>) -> Self {
        Error::Unsupported {
            ty,
            reason: reason.into(),
        }
    }

    /// Raised by erased accessors when a value does not match its shape.
    pub fn type_mismatch<T: ?Sized>() -> Self {
        Error::encode_mismatch(
            std::any::type_name::<T>(),
            "value has a different runtime type",
        )
    }

    /// Raised by a case accessor called on a value of another case.
    pub fn variant_mismatch<T: ?Sized>() -> Self {
        Error::encode_mismatch(
            std::any::type_name::<T>(),
            "value belongs to another case",
        )
    }

    /// Names the type the failure is about, if it is a derivation failure.
    pub(crate) fn derivation_subject(&self) -> Option<&'static str> {
        match self {
            Error::Unsupported { ty, .. } | Error::AmbiguousUnion { ty, .. } => Some(ty),
            _ => None,
        }
    }
}
