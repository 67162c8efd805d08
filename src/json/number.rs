//! JSON number literals.
//!
//! Numbers travel as text inside [`Value::Number`](super::Value) so no
//! precision is lost between the wire and the scalar codec that finally
//! parses them. Formatting and parsing never consult the host locale.

/// Checks `text` against `-?(0|[1-9]\d*)(\.\d+)?([eE][-+]?\d+)?`.
pub fn is_valid(text: &str) -> bool {
    let bytes = text.as_bytes();
    let mut i = 0;

    if bytes.get(i) == Some(&b'-') {
        i += 1;
    }

    match bytes.get(i) {
        Some(b'0') => i += 1,
        Some(b'1'..=b'9') => {
            i += 1;
            i += digits(&bytes[i..]);
        }
        _ => return false,
    }

    if bytes.get(i) == Some(&b'.') {
        i += 1;
        let n = digits(&bytes[i..]);
        if n == 0 {
            return false;
        }
        i += n;
    }

    if let Some(b'e') | Some(b'E') = bytes.get(i) {
        i += 1;
        if let Some(b'+') | Some(b'-') = bytes.get(i) {
            i += 1;
        }
        let n = digits(&bytes[i..]);
        if n == 0 {
            return false;
        }
        i += n;
    }

    i == bytes.len()
}

fn digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

pub(crate) fn format_int<I: itoa::Integer>(n: I) -> String {
    itoa::Buffer::new().format(n).to_owned()
}

/// Shortest round-trip text. Non-finite values come back as `None`.
pub(crate) fn format_f64(n: f64) -> Option<String> {
    if n.is_finite() {
        Some(ryu::Buffer::new().format_finite(n).to_owned())
    } else {
        None
    }
}

pub(crate) fn format_f32(n: f32) -> Option<String> {
    if n.is_finite() {
        Some(ryu::Buffer::new().format_finite(n).to_owned())
    } else {
        None
    }
}
