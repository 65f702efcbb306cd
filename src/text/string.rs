//! Escaping for string nodes built from Rust values.
//!
//! Parsed strings keep their source text between the quotes, escapes
//! included. Values coming from a serializer are escaped into that same form.

/// Returns `true` if `value` holds a byte that must be escaped inside quotes.
pub fn needs_escape(value: &str) -> bool {
    value
        .bytes()
        .any(|b| matches!(b, b'\\' | b'"' | b'\n' | b'\r' | b'\t'))
}

pub fn escape_string(value: &str) -> String {
    if !needs_escape(value) {
        return value.to_string();
    }
    let mut out = String::with_capacity(value.len() + 2);
    escape_string_into(&mut out, value);
    out
}

pub fn escape_string_into(out: &mut String, value: &str) {
    let bytes = value.as_bytes();
    let mut start = 0;
    for (idx, byte) in bytes.iter().enumerate() {
        let escaped = match byte {
            b'\n' => "\\n",
            b'\r' => "\\r",
            b'\t' => "\\t",
            b'"' => "\\\"",
            b'\\' => "\\\\",
            _ => continue,
        };
        if start < idx {
            out.push_str(&value[start..idx]);
        }
        out.push_str(escaped);
        start = idx + 1;
    }
    if start < value.len() {
        out.push_str(&value[start..]);
    }
}
