use std::fmt;

use thiserror::Error;

use crate::num::NumberKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Parse,
    NumericConversion,
    Conversion,
    Io,
}

/// Failure while narrowing an exact decimal to a native numeric kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NumericError {
    #[error("{value} is not an integer, cannot convert to {target}")]
    NotAnInteger { value: String, target: NumberKind },

    #[error("{value} does not fit exactly in {target}")]
    Overflow { value: String, target: NumberKind },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("could not parse ({reason}): {fragment}")]
    Parse { fragment: String, reason: String },

    #[error(transparent)]
    Numeric(#[from] NumericError),

    #[error("could not convert to {target} the following JSON: {json}")]
    Conversion {
        target: String,
        json: String,
        #[source]
        source: Option<Box<Error>>,
    },

    #[error("{0}")]
    Message(String),

    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid utf-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
}

impl Error {
    pub fn parse(fragment: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Parse {
            fragment: fragment.into(),
            reason: reason.into(),
        }
    }

    pub fn conversion(target: impl Into<String>, json: impl Into<String>) -> Self {
        Error::Conversion {
            target: target.into(),
            json: json.into(),
            source: None,
        }
    }

    /// Wraps a nested failure with the context of the enclosing node.
    pub fn nested(target: impl Into<String>, json: impl Into<String>, source: Error) -> Self {
        Error::Conversion {
            target: target.into(),
            json: json.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Parse { .. } | Error::Utf8(_) => ErrorKind::Parse,
            Error::Numeric(_) => ErrorKind::NumericConversion,
            Error::Conversion { .. } | Error::Message(_) => ErrorKind::Conversion,
            Error::Io(_) => ErrorKind::Io,
        }
    }

    /// Walks the `source` chain down to the innermost failure.
    pub fn root_cause(&self) -> &Error {
        let mut current = self;
        while let Error::Conversion {
            source: Some(inner),
            ..
        } = current
        {
            current = inner;
        }
        current
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Message(msg.to_string())
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Message(msg.to_string())
    }
}
