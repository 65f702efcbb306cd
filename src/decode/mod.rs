//! Classifying parser: text to [`Value`] by prefix/suffix sniffing.
//!
//! Every fragment is trimmed and then tested, in order, as a string, a
//! number, `null`, an array and an object. Arrays and objects strip their outer
//! brackets, split on depth-0 commas and recurse into each piece.

pub mod split;

use std::io::Read;

use serde::de::DeserializeOwned;
use smol_str::SmolStr;

use self::split::{split_key_value, split_top_level};
use crate::num::Number;
use crate::options::{ParseOptions, SplitMode};
use crate::types::{Object, Value};
use crate::{Error, Result};

pub fn parse(input: &str, options: &ParseOptions) -> Result<Value> {
    tracing::trace!(
        len = input.len(),
        max_depth = ?options.max_depth,
        split_mode = ?options.split_mode,
        "parse"
    );
    Parser::new(options).parse_node(input, 0)
}

pub fn from_str<T: DeserializeOwned>(input: &str, options: &ParseOptions) -> Result<T> {
    let value = parse(input, options)?;
    crate::serde::de::from_value(&value)
}

pub fn from_slice<T: DeserializeOwned>(input: &[u8], options: &ParseOptions) -> Result<T> {
    let text = std::str::from_utf8(input)?;
    from_str(text, options)
}

pub fn from_reader<T: DeserializeOwned, R: Read>(
    mut reader: R,
    options: &ParseOptions,
) -> Result<T> {
    let mut buf = String::new();
    reader.read_to_string(&mut buf)?;
    from_str(&buf, options)
}

struct Parser {
    max_depth: Option<usize>,
    split_mode: SplitMode,
}

impl Parser {
    fn new(options: &ParseOptions) -> Self {
        Self {
            max_depth: options.max_depth,
            split_mode: options.split_mode,
        }
    }

    /// `depth` is the number of containers enclosing `text`.
    fn parse_node(&self, text: &str, depth: usize) -> Result<Value> {
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::parse(text, "empty value"));
        }
        if is_string(text) {
            return Ok(Value::String(strip_delimiters(text).to_string()));
        }
        if let Some(number) = parse_number(text)? {
            return Ok(Value::Number(number));
        }
        if text == "null" {
            return Ok(Value::Null);
        }
        if text.starts_with('[') && text.ends_with(']') {
            return self.parse_array(text, depth + 1);
        }
        if text.starts_with('{') && text.ends_with('}') {
            return self.parse_object(text, depth + 1);
        }
        Err(Error::parse(text, "unrecognized value"))
    }

    fn parse_array(&self, text: &str, depth: usize) -> Result<Value> {
        self.check_depth(text, depth)?;
        let inside = strip_delimiters(text);
        if inside.trim().is_empty() {
            return Ok(Value::Array(Vec::new()));
        }

        let mut items = Vec::new();
        for piece in split_top_level(inside, b',', self.split_mode) {
            if piece.trim().is_empty() {
                return Err(Error::parse(text, "empty element"));
            }
            items.push(self.parse_node(&piece, depth)?);
        }
        Ok(Value::Array(items))
    }

    fn parse_object(&self, text: &str, depth: usize) -> Result<Value> {
        self.check_depth(text, depth)?;
        let inside = strip_delimiters(text);
        let mut entries = Object::new();
        if inside.trim().is_empty() {
            return Ok(Value::Object(entries));
        }

        for piece in split_top_level(inside, b',', self.split_mode) {
            if piece.trim().is_empty() {
                return Err(Error::parse(text, "empty element"));
            }
            let (key_text, value_text) = split_key_value(&piece, self.split_mode)
                .ok_or_else(|| Error::parse(piece.trim(), "missing ':' in object entry"))?;
            let key_text = key_text.trim();
            if !is_string(key_text) {
                return Err(Error::parse(key_text, "object key is not a string"));
            }
            let key = SmolStr::new(strip_delimiters(key_text));
            let value = self.parse_node(value_text, depth)?;
            // A repeated key keeps its first slot and takes the new value.
            entries.insert(key, value);
        }
        Ok(Value::Object(entries))
    }

    fn check_depth(&self, text: &str, depth: usize) -> Result<()> {
        match self.max_depth {
            Some(max) if depth > max => {
                tracing::debug!(depth, max, "nesting depth limit reached");
                Err(Error::parse(text, format!("nesting depth exceeds {max}")))
            }
            _ => Ok(()),
        }
    }
}

fn is_string(text: &str) -> bool {
    text.len() >= 2 && text.starts_with('"') && text.ends_with('"')
}

/// Drops the first and last byte; callers have checked both are ASCII delimiters.
fn strip_delimiters(text: &str) -> &str {
    &text[1..text.len() - 1]
}

/// `Ok(None)` when `text` is not a floating-point literal at all.
fn parse_number(text: &str) -> Result<Option<Number>> {
    let Ok(float) = text.parse::<f64>() else {
        return Ok(None);
    };
    if !float.is_finite() {
        return Err(Error::parse(text, "not a finite number"));
    }
    Ok(Number::parse(text))
}
