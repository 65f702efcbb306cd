//! Lenient JSON-like text into a generic value tree, and that tree into
//! strongly typed Rust values.
//!
//! Parsing classifies each fragment by its first and last characters rather
//! than tokenizing it. Numbers are held as exact decimals so conversion into
//! an integer type succeeds only when no digits would be lost.
//!
//! ```
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Book {
//!     id: i32,
//!     title: String,
//!     scores: Vec<u8>,
//! }
//!
//! let book: Book =
//!     sniffjson::from_str(r#"{"id": 7234, "title": "The lost paradise", "scores": [4, 2, 5]}"#)
//!         .unwrap();
//! assert_eq!(book.scores, vec![4, 2, 5]);
//! ```

pub mod decode;
pub mod error;
pub mod num;
pub mod options;
pub mod serde;
pub mod text;
pub mod types;

use std::io::Read;

use ::serde::de::DeserializeOwned;
use ::serde::Serialize;

pub use crate::error::{Error, ErrorKind, NumericError};
pub use crate::num::{FromNumber, Number, NumberKind};
pub use crate::options::{ParseOptions, SplitMode, DEFAULT_MAX_DEPTH};
pub use crate::types::{Object, Value};

pub type Result<T> = std::result::Result<T, Error>;

pub fn parse(input: &str) -> Result<Value> {
    parse_with_options(input, &ParseOptions::default())
}

pub fn parse_with_options(input: &str, options: &ParseOptions) -> Result<Value> {
    decode::parse(input, options)
}

pub fn from_str<T: DeserializeOwned>(input: &str) -> Result<T> {
    from_str_with_options(input, &ParseOptions::default())
}

pub fn from_str_with_options<T: DeserializeOwned>(
    input: &str,
    options: &ParseOptions,
) -> Result<T> {
    decode::from_str(input, options)
}

pub fn from_slice<T: DeserializeOwned>(input: &[u8]) -> Result<T> {
    from_slice_with_options(input, &ParseOptions::default())
}

pub fn from_slice_with_options<T: DeserializeOwned>(
    input: &[u8],
    options: &ParseOptions,
) -> Result<T> {
    decode::from_slice(input, options)
}

pub fn from_reader<T: DeserializeOwned, R: Read>(reader: R) -> Result<T> {
    from_reader_with_options(reader, &ParseOptions::default())
}

pub fn from_reader_with_options<T: DeserializeOwned, R: Read>(
    reader: R,
    options: &ParseOptions,
) -> Result<T> {
    decode::from_reader(reader, options)
}

pub fn from_value<T: DeserializeOwned>(value: &Value) -> Result<T> {
    crate::serde::de::from_value(value)
}

pub fn to_value<T: ?Sized + Serialize>(value: &T) -> Result<Value> {
    crate::serde::ser::to_value(value)
}

/// Serializes `value` and renders it in canonical form.
pub fn to_string<T: ?Sized + Serialize>(value: &T) -> Result<String> {
    Ok(to_value(value)?.render())
}
