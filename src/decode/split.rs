//! Depth-0 splitting of the inside of a bracketed construct.
//!
//! Separators found at nesting depth zero are swapped for a sentinel
//! character that does not occur in the input, and the rebuilt string is then
//! split on that sentinel.

use memchr::memchr;
use smallvec::SmallVec;

use crate::options::SplitMode;

/// First sentinel candidate; the search walks upward from here.
pub const DEFAULT_SENTINEL: char = '\u{2D94}';

pub type SeparatorIndexes = SmallVec<[usize; 16]>;

/// Byte offsets of every `separator` that sits outside all nested `{}`/`[]`.
///
/// A closer only pops the stack when it matches the innermost opener, so a
/// stray `]` or `}` is ignored rather than rejected.
pub fn separator_indexes(inside: &str, separator: u8, mode: SplitMode) -> SeparatorIndexes {
    debug_assert!(separator.is_ascii());
    let track_quotes = mode == SplitMode::QuoteAware;
    let mut closers: SmallVec<[u8; 32]> = SmallVec::new();
    let mut indexes = SeparatorIndexes::new();
    let mut in_string = false;
    let mut escaped = false;

    for (idx, &byte) in inside.as_bytes().iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == b'"' {
                in_string = false;
            }
            continue;
        }
        match byte {
            b'"' if track_quotes => in_string = true,
            b'{' => closers.push(b'}'),
            b'[' => closers.push(b']'),
            b'}' | b']' => {
                if closers.last() == Some(&byte) {
                    closers.pop();
                }
            }
            _ => {}
        }
        if byte == separator && closers.is_empty() {
            indexes.push(idx);
        }
    }
    indexes
}

/// Lowest character at or above [`DEFAULT_SENTINEL`] that `inside` does not contain.
pub fn sentinel_for(inside: &str) -> char {
    let mut candidate = DEFAULT_SENTINEL as u32;
    loop {
        if let Some(ch) = char::from_u32(candidate) {
            if !inside.contains(ch) {
                if ch != DEFAULT_SENTINEL {
                    tracing::trace!(sentinel = %ch.escape_unicode(), "default sentinel present in input");
                }
                return ch;
            }
        }
        candidate += 1;
    }
}

/// Splits `inside` on its depth-0 separators.
///
/// The returned iterator owns the rebuilt buffer and yields pieces left to
/// right. It cannot be rewound; call this again to start over.
pub fn split_top_level(inside: &str, separator: u8, mode: SplitMode) -> TopLevelSplit {
    let indexes = separator_indexes(inside, separator, mode);
    let sentinel = sentinel_for(inside);

    let mut buffer = String::with_capacity(inside.len() + indexes.len() * sentinel.len_utf8());
    let mut last = 0;
    for &idx in &indexes {
        buffer.push_str(&inside[last..idx]);
        buffer.push(sentinel);
        last = idx + 1;
    }
    buffer.push_str(&inside[last..]);

    TopLevelSplit {
        buffer,
        sentinel,
        cursor: Some(0),
    }
}

#[derive(Debug, Clone)]
pub struct TopLevelSplit {
    buffer: String,
    sentinel: char,
    cursor: Option<usize>,
}

impl TopLevelSplit {
    pub fn sentinel(&self) -> char {
        self.sentinel
    }
}

impl Iterator for TopLevelSplit {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.cursor?;
        let rest = &self.buffer[start..];
        match rest.find(self.sentinel) {
            Some(offset) => {
                self.cursor = Some(start + offset + self.sentinel.len_utf8());
                Some(rest[..offset].to_string())
            }
            None => {
                self.cursor = None;
                Some(rest.to_string())
            }
        }
    }
}

/// Splits an object entry on its first `:`; everything after it, further
/// colons included, is the value text.
pub fn split_key_value(piece: &str, mode: SplitMode) -> Option<(&str, &str)> {
    let bytes = piece.as_bytes();
    let colon = match mode {
        SplitMode::Legacy => memchr(b':', bytes)?,
        SplitMode::QuoteAware => first_colon_outside_quotes(bytes)?,
    };
    Some((&piece[..colon], &piece[colon + 1..]))
}

fn first_colon_outside_quotes(bytes: &[u8]) -> Option<usize> {
    let mut in_string = false;
    let mut escaped = false;
    for (idx, &byte) in bytes.iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == b'"' {
                in_string = false;
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b':' => return Some(idx),
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn pieces(inside: &str, mode: SplitMode) -> Vec<String> {
        split_top_level(inside, b',', mode).collect()
    }

    #[rstest::rstest]
    fn test_nested_separators_are_skipped() {
        let inside = "5, 6, [1,2], 60";
        assert_eq!(
            separator_indexes(inside, b',', SplitMode::Legacy).as_slice(),
            &[1, 4, 11]
        );
        assert_eq!(
            pieces(inside, SplitMode::Legacy),
            vec!["5", " 6", " [1,2]", " 60"]
        );
    }

    #[rstest::rstest]
    fn test_mixed_nesting() {
        let inside = r#""a": {"b": [1, {"c": 2}]}, "d": [3, 4]"#;
        let parts = pieces(inside, SplitMode::QuoteAware);
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0], r#""a": {"b": [1, {"c": 2}]}"#);
        assert_eq!(parts[1], r#" "d": [3, 4]"#);
    }

    #[rstest::rstest]
    fn test_mismatched_closer_is_ignored() {
        let inside = "[1, 2}, 3";
        assert_eq!(pieces(inside, SplitMode::Legacy), vec!["[1, 2}, 3"]);
    }

    #[rstest]
    #[case(SplitMode::QuoteAware, vec![r#""a,b""#, r#" "[""#, " 1"])]
    #[case(SplitMode::Legacy, vec![r#""a"#, r#"b""#, r#" "[", 1"#])]
    fn test_quotes_per_mode(#[case] mode: SplitMode, #[case] expected: Vec<&str>) {
        // In legacy mode the quoted `[` opens a level that never closes.
        let inside = r#""a,b", "[", 1"#;
        let parts = pieces(inside, mode);
        assert_eq!(parts, expected);
    }

    #[rstest::rstest]
    fn test_escaped_quote_stays_inside_string() {
        let inside = r#""say \"hi, there\"", 2"#;
        let parts = pieces(inside, SplitMode::QuoteAware);
        assert_eq!(parts, vec![r#""say \"hi, there\"""#, " 2"]);
    }

    #[rstest::rstest]
    fn test_sentinel_skips_characters_in_input() {
        assert_eq!(sentinel_for("1, 2"), DEFAULT_SENTINEL);
        assert_eq!(sentinel_for("\u{2D94}"), '\u{2D95}');
        assert_eq!(sentinel_for("\u{2D94}\u{2D95}x"), '\u{2D96}');

        let inside = " 5, 6, \"\u{2D94}\" , 60";
        let split = split_top_level(inside, b',', SplitMode::QuoteAware);
        assert_eq!(split.sentinel(), '\u{2D95}');
        assert_eq!(split.count(), 4);
    }

    #[rstest::rstest]
    fn test_empty_input_yields_single_empty_piece() {
        assert_eq!(pieces("", SplitMode::QuoteAware), vec![""]);
    }

    #[rstest]
    #[case(SplitMode::QuoteAware, r#""url""#, r#" "http://x""#)]
    #[case(SplitMode::Legacy, r#""url""#, r#" "http://x""#)]
    fn test_split_key_value_keeps_later_colons(
        #[case] mode: SplitMode,
        #[case] key: &str,
        #[case] value: &str,
    ) {
        assert_eq!(
            split_key_value(r#""url": "http://x""#, mode),
            Some((key, value))
        );
    }

    #[rstest::rstest]
    fn test_split_key_value_colon_in_key() {
        let piece = r#""a:b": 1"#;
        assert_eq!(
            split_key_value(piece, SplitMode::QuoteAware),
            Some((r#""a:b""#, " 1"))
        );
        assert_eq!(
            split_key_value(piece, SplitMode::Legacy),
            Some((r#""a"#, r#"b": 1"#))
        );
        assert_eq!(split_key_value("\"a\" 1", SplitMode::QuoteAware), None);
    }
}
