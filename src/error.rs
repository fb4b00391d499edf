// Copyright 2019 Petar Dambovaliev. All rights reserved.
// This software may be modified and distributed under the terms
// of the BSD license. See the LICENSE file for details.

use std::error;
use std::fmt;
use std::io::{Error as IOError, ErrorKind};

/// The reasons a codec or transport call can fail.
///
/// The codec itself never retries; every failure is surfaced to the caller,
/// which owns the retry / reconnect policy.
#[derive(Debug)]
pub enum Error {
    /// A caller supplied value is out of range or does not belong to the
    /// family the builder expected.
    InvalidArgument { reason: String },
    /// The frame bytes are not a valid MEP frame: unknown command, size over
    /// the ceiling, an illegal escape sequel or a CRC mismatch.
    BadFrame { reason: &'static str },
    /// The device reported a global error, or the frame is not a DAT
    /// response where one was required.
    NotPermitted { reason: &'static str },
    /// Reserved for allocation failure.
    OutOfMemory,
    /// The frame ended early or at the wrong place: premature ETX, a partial
    /// escape at the end of input, trailing bytes after the payload.
    MalformedSequence { reason: &'static str },
    Connect(String),
    IOError(ErrorKind),
    Lock,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::InvalidArgument { reason } => write!(f, "Invalid argument: {}", reason),
            Error::BadFrame { reason } => write!(f, "Bad frame: {}", reason),
            Error::NotPermitted { reason } => write!(f, "Not permitted: {}", reason),
            Error::OutOfMemory => write!(f, "Out of memory"),
            Error::MalformedSequence { reason } => write!(f, "Malformed sequence: {}", reason),
            Error::Connect(s) => write!(f, "connection error: {}", s),
            Error::IOError(kind) => write!(f, "IO error: {:?}", kind),
            Error::Lock => write!(f, "Lock error: panicked"),
        }
    }
}

impl From<IOError> for Error {
    fn from(e: IOError) -> Self {
        Error::IOError(e.kind())
    }
}

// This is important for other errors to wrap this one.
impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        None
    }
}
