use std::{error::Error, fmt};

/// The error type returned when reading malformed or truncated bit streams.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SerdeErr {
    /// The reader ran out of bits mid-value.
    UnexpectedEnd,
    /// The bits read do not form a valid value of the requested type.
    InvalidValue,
}

impl fmt::Display for SerdeErr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SerdeErr::UnexpectedEnd => write!(f, "bit stream ended unexpectedly"),
            SerdeErr::InvalidValue => write!(f, "bit stream contained an invalid value"),
        }
    }
}

impl Error for SerdeErr {}
