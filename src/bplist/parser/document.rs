//
// Copyright 2020 bplist Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

use nom::bytes::complete::take;
use nom::combinator::{map, verify};
use nom::multi::many_m_n;
use nom::number::complete::be_u32;
use nom::sequence::tuple;
use nom::IResult;

use crate::bplist::document::{
    Trailer, HEADER_MAGIC_WORD_1, HEADER_MAGIC_WORD_2, TRAILER_PREAMBLE_UNUSED_SIZE,
};
use crate::bplist::parser::utils::be_usize_n;

/// Parses the fixed 8-byte header, verifying the `bplist00` magic. Yields
/// nothing on success; the version is fixed by construction.
pub fn header(input: &[u8]) -> IResult<&[u8], ()> {
    map(
        verify(
            tuple((be_u32, be_u32)),
            |(word1, word2): &(u32, u32)| {
                *word1 == HEADER_MAGIC_WORD_1 && *word2 == HEADER_MAGIC_WORD_2
            },
        ),
        |_| (),
    )(input)
}

/// Returns a parser for an offset table with the specified number of entries,
/// each of the specified size.
pub fn offset_table(
    entries: usize,
    entry_size: usize,
) -> impl Fn(&[u8]) -> IResult<&[u8], Vec<usize>> {
    move |input: &[u8]| many_m_n(entries, entries, be_usize_n(entry_size))(input)
}

/// Parses the fixed 32-byte trailer: 6 unused bytes, then the five fields
/// needed to interpret the rest of the document.
pub fn trailer(input: &[u8]) -> IResult<&[u8], Trailer> {
    map(
        tuple((
            take(TRAILER_PREAMBLE_UNUSED_SIZE),
            be_usize_n(1),
            be_usize_n(1),
            be_usize_n(8),
            be_usize_n(8),
            be_usize_n(8),
        )),
        |(_, offset_int_size, object_ref_size, object_count, top_level_object_offset, offset_table_offset)| {
            Trailer {
                offset_int_size,
                object_ref_size,
                object_count,
                top_level_object_offset,
                offset_table_offset,
            }
        },
    )(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_bplist00() {
        let bytes = [0x62, 0x70, 0x6C, 0x69, 0x73, 0x74, 0x30, 0x30];
        let (residual, ()) = header(&bytes).unwrap();
        assert_eq!(residual.len(), 0);
    }

    #[test]
    fn test_header_rejects_bad_magic() {
        let bytes = [0x00, 0x70, 0x6C, 0x69, 0x73, 0x74, 0x30, 0x30];
        assert!(header(&bytes).is_err());
    }

    #[test]
    fn test_offset_table_1bx5() {
        let (input, result) =
            offset_table(5, 1)(&[0x08, 0x09, 0x10, 0x11, 0x12]).unwrap();
        assert_eq!(input.len(), 0);
        assert_eq!(result, &[8usize, 9usize, 16usize, 17usize, 18usize]);
    }

    #[test]
    fn test_trailer() {
        let bytes: [u8; 32] = [
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // 6 unused bytes
            0x01, // offset_int_size
            0x01, // object_ref_size
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, // object_count = 1
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // top_level_object_offset = 0
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x09, // offset_table_offset = 9
        ];
        let (residual, value) = trailer(&bytes).unwrap();
        assert_eq!(residual.len(), 0);
        assert_eq!(
            value,
            Trailer {
                offset_int_size: 1,
                object_ref_size: 1,
                object_count: 1,
                top_level_object_offset: 0,
                offset_table_offset: 9,
            }
        );
    }
}
