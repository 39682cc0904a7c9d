//
// Copyright 2020 bplist Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

use std::fmt::{self, Display};

use crate::bplist;

pub type Result<T> = std::result::Result<T, ExtractError>;

/// Failure extracting a `.webarchive` file.
#[derive(Debug)]
pub enum ExtractError {
    /// The input could not be decoded as a `bplist00` document.
    InvalidFile(bplist::Error),
    /// The decoded document has no `WebMainResource`.
    MissingResource,
    /// The caller's output directory does not exist.
    OutputDirectoryMissing,
    /// A read or write failed.
    IoFailure(std::io::Error),
    /// A resource's declared text encoding is not recognized.
    EncodingUnsupported(String),
}

impl Display for ExtractError {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ExtractError::InvalidFile(cause) => write!(formatter, "invalid webarchive file: {}", cause),
            ExtractError::MissingResource => formatter.write_str("archive has no WebMainResource"),
            ExtractError::OutputDirectoryMissing => formatter.write_str("output directory does not exist"),
            ExtractError::IoFailure(cause) => write!(formatter, "i/o failure: {}", cause),
            ExtractError::EncodingUnsupported(label) => {
                write!(formatter, "unsupported text encoding: {}", label)
            }
        }
    }
}

impl std::error::Error for ExtractError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExtractError::InvalidFile(cause) => Some(cause),
            ExtractError::IoFailure(cause) => Some(cause),
            _ => None,
        }
    }
}

impl From<bplist::Error> for ExtractError {
    fn from(cause: bplist::Error) -> Self {
        ExtractError::InvalidFile(cause)
    }
}

impl From<std::io::Error> for ExtractError {
    fn from(cause: std::io::Error) -> Self {
        ExtractError::IoFailure(cause)
    }
}

impl From<crate::archive::Error> for ExtractError {
    fn from(_: crate::archive::Error) -> Self {
        ExtractError::MissingResource
    }
}
