//! The `errors` module defines the common error types.

use std::error;
use std::fmt;
use std::io;

use super::Result;

/// `Error` provides an enumeration of all possible errors reported by NEAC.
#[derive(Debug)]
pub enum Error {
    /// An IO error occurred while reading or writing the bitstream.
    IoError(io::Error),
    /// The stream contained malformed data and could not be parsed: bad
    /// magic, unsupported format version, or a malformed tag record.
    MalformedInput(&'static str),
    /// A parameter was out of its valid range: a corrupt rice parameter
    /// during decode, or filter taps out of range during encode.
    InvalidParameter(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::IoError(ref err) => err.fmt(f),
            Error::MalformedInput(ref msg) => write!(f, "malformed NEAC stream: {}", msg),
            Error::InvalidParameter(ref msg) => write!(f, "invalid parameter: {}", msg),
        }
    }
}

impl error::Error for Error {
    fn cause(&self) -> Option<&dyn error::Error> {
        match *self {
            Error::IoError(ref err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::IoError(err)
    }
}

/// function to create a malformed-input error.
pub fn malformed_error<T>(desc: &'static str) -> Result<T> {
    Err(Error::MalformedInput(desc))
}

/// function to create an invalid-parameter error.
pub fn invalid_parameter_error<T>(desc: &'static str) -> Result<T> {
    Err(Error::InvalidParameter(desc))
}
