use std::io;

use crate::error::{Error, Result};
use crate::json::{number, Value};

/// Write a JSON tree as compact text.
///
/// Keys are always quoted. Number payloads are checked against the JSON
/// number grammar before being written, so a hand-built `Value::Number` with
/// bad text fails with [`Error::InvalidNumber`] instead of producing
/// unreadable output.
///
/// ```rust
/// use wirejson::json::{self, Object, Value};
///
/// let mut object = Object::new();
/// object.insert("path", Value::string("a/b"));
/// assert_eq!(json::to_string(&Value::Object(object)).unwrap(), r#"{"path":"a\/b"}"#);
/// ```
pub fn to_string(value: &Value) -> Result<String> {
    let mut json = JsonSer {
        out: String::new(),
        strict: true,
    };
    json.value(value)?;
    Ok(json.out)
}

/// Write a JSON tree into an `io::Write`.
pub fn to_writer<W: io::Write>(mut writer: W, value: &Value) -> Result<()> {
    let text = to_string(value)?;
    writer.write_all(text.as_bytes())?;
    writer.flush()?;
    Ok(())
}

/// Same output as `to_string` but numbers are not validated, for `Display`.
pub(crate) fn write_lossy(out: &mut String, value: &Value) {
    let mut json = JsonSer {
        out: std::mem::take(out),
        strict: false,
    };
    // Lossy mode has no failure path.
    let _ = json.value(value);
    *out = json.out;
}

struct JsonSer {
    out: String,
    strict: bool,
}

impl JsonSer {
    #[inline]
    fn push(&mut self, c: char) {
        self.out.push(c)
    }

    #[inline]
    fn push_str(&mut self, s: &str) {
        self.out.push_str(s)
    }

    fn value(&mut self, value: &Value) -> Result<()> {
        match value {
            Value::Null => self.push_str("null"),
            Value::True => self.push_str("true"),
            Value::False => self.push_str("false"),
            Value::Number(n) => {
                if self.strict && !number::is_valid(n) {
                    return Err(Error::InvalidNumber(n.clone()));
                }
                self.push_str(n);
            }
            Value::String(s) => self.push_str_escaped(s),
            Value::Array(items) => {
                self.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        self.push(',');
                    }
                    self.value(item)?;
                }
                self.push(']');
            }
            Value::Object(object) => {
                self.push('{');
                for (i, (k, v)) in object.iter().enumerate() {
                    if i > 0 {
                        self.push(',');
                    }
                    self.push_str_escaped(k);
                    self.push(':');
                    self.value(v)?;
                }
                self.push('}');
            }
        }
        Ok(())
    }

    // Clippy false positive: https://github.com/rust-lang/rust-clippy/issues/5169
    #[allow(clippy::zero_prefixed_literal)]
    fn push_str_escaped(&mut self, value: &str) {
        self.push('"');

        let bytes = value.as_bytes();
        let mut start = 0;

        for (i, &byte) in bytes.iter().enumerate() {
            let escape = ESCAPE[byte as usize];
            if escape == 0 {
                continue;
            }

            if start < i {
                self.push_str(&value[start..i]);
            }

            match escape {
                self::BB => self.push_str("\\b"),
                self::TT => self.push_str("\\t"),
                self::NN => self.push_str("\\n"),
                self::FF => self.push_str("\\f"),
                self::RR => self.push_str("\\r"),
                self::QU => self.push_str("\\\""),
                self::BS => self.push_str("\\\\"),
                self::SL => self.push_str("\\/"),
                self::U => {
                    static HEX_DIGITS: [u8; 16] = *b"0123456789abcdef";
                    self.push_str("\\u00");
                    self.push(HEX_DIGITS[(byte >> 4) as usize] as char);
                    self.push(HEX_DIGITS[(byte & 0xF) as usize] as char);
                }
                _ => unreachable!(),
            }

            start = i + 1;
        }

        if start != bytes.len() {
            self.push_str(&value[start..]);
        }

        self.push('"');
    }
}

const BB: u8 = b'b'; // \x08
const TT: u8 = b't'; // \x09
const NN: u8 = b'n'; // \x0A
const FF: u8 = b'f'; // \x0C
const RR: u8 = b'r'; // \x0D
const QU: u8 = b'"'; // \x22
const SL: u8 = b'/'; // \x2F
const BS: u8 = b'\\'; // \x5C
const U: u8 = b'u'; // \x00...\x1F except the ones above

// Lookup table of escape sequences. A value of b'x' at index i means that byte
// i is escaped as "\x" in JSON. A value of 0 means that byte i is not escaped.
// Only ASCII bytes are ever escaped, so slicing at escape points stays on char
// boundaries.
#[rustfmt::skip]
static ESCAPE: [u8; 256] = [
    //  1   2   3   4   5   6   7   8   9   A   B   C   D   E   F
    U,  U,  U,  U,  U,  U,  U,  U, BB, TT, NN,  U, FF, RR,  U,  U, // 0
    U,  U,  U,  U,  U,  U,  U,  U,  U,  U,  U,  U,  U,  U,  U,  U, // 1
    0,  0, QU,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0, SL, // 2
    0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0, // 3
    0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0, // 4
    0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0, BS,  0,  0,  0, // 5
    0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0, // 6
    0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0, // 7
    0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0, // 8
    0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0, // 9
    0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0, // A
    0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0, // B
    0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0, // C
    0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0, // D
    0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0, // E
    0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0, // F
];
