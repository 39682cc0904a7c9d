//
// Copyright 2020 bplist Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

use std::fmt::{self, Display};

pub type Result<T> = std::result::Result<T, Error>;

/// Binary property list decoding error.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Error {
    /// The stream is shorter than the minimum possible bplist document.
    StreamTooShort,
    /// The `bplist00` magic number is missing or invalid.
    InvalidHeader,
    /// The trailer failed one of the sanity constraints in the document
    /// layout (offset sizes, offset table bounds, or the root object index).
    InvalidTrailer,
    /// The offset table could not be read from the position and size
    /// given by the trailer.
    InvalidOffsetTable,
    /// A marker byte did not match any recognized object format.
    InvalidOrUnsupportedMarker,
    /// An object's payload could not be parsed as its marker's format
    /// (for example, a truncated string or an unsupported integer width).
    MalformedObject,
    /// The root object is not a dictionary.
    RootObjectNotDictionary,
}

impl Display for Error {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::StreamTooShort => formatter.write_str("stream is too short to be a bplist00 document"),
            Error::InvalidHeader => formatter.write_str("missing or invalid bplist00 header"),
            Error::InvalidTrailer => formatter.write_str("missing or invalid bplist trailer"),
            Error::InvalidOffsetTable => formatter.write_str("missing or invalid bplist offset table"),
            Error::InvalidOrUnsupportedMarker => formatter.write_str("invalid or unsupported object marker"),
            Error::MalformedObject => formatter.write_str("object payload did not match its marker"),
            Error::RootObjectNotDictionary => formatter.write_str("root object is not a dictionary"),
        }
    }
}

impl std::error::Error for Error {}
