//
// Copyright 2020 bplist Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

use ascii::AsciiStr;
use nom::branch::alt;
use nom::bytes::complete::take;
use nom::combinator::{map, map_res, verify};
use nom::multi::many_m_n;
use nom::number::complete::{be_f32, be_f64, be_i64, be_u16, be_u8};
use nom::IResult;

use std::convert::TryFrom;

use crate::bplist::document::ObjectFormat;
use crate::bplist::parser::utils::{be_u128_n, be_usize_n};

/// A decoded marker byte: its format and the four value bits embedded in the
/// low nibble (the "encoded value", e.g. an inline count or boolean bit).
pub type Marker = (ObjectFormat, u8);

/// Parses a marker byte of any recognized format, splitting it into the
/// object format and its embedded low-nibble value.
pub fn any_marker(input: &[u8]) -> IResult<&[u8], Marker> {
    map(
        verify(be_u8, |b: &u8| ObjectFormat::from_high_nibble(b >> 4).is_some()),
        |b: u8| (ObjectFormat::from_high_nibble(b >> 4).unwrap(), b & 0x0F),
    )(input)
}

/// Returns a parser which matches a marker byte only if it is of the given format.
fn marker(format: ObjectFormat) -> impl Fn(&[u8]) -> IResult<&[u8], u8> {
    move |input: &[u8]| {
        map(
            verify(any_marker, move |(found, _)| *found == format),
            |(_, value)| value,
        )(input)
    }
}

/// Parses a `null` primitive. Returns `()`.
pub fn null(input: &[u8]) -> IResult<&[u8], ()> {
    map(verify(marker(ObjectFormat::Primitive), |v| *v == 0x0), |_| ())(input)
}

/// Parses a `false`/`true` boolean primitive.
pub fn boolean(input: &[u8]) -> IResult<&[u8], bool> {
    map(
        verify(marker(ObjectFormat::Primitive), |v| *v == 0x8 || *v == 0x9),
        |v| v == 0x9,
    )(input)
}

/// Parses a `fill` padding byte. Returns `()`.
pub fn fill(input: &[u8]) -> IResult<&[u8], ()> {
    map(verify(marker(ObjectFormat::Primitive), |v| *v == 0xF), |_| ())(input)
}

/// Parses an integer object of width 1, 2, 4, or 8 bytes into a signed 64-bit
/// value. Widths 1/2/4 are widened as unsigned; width 8 is two's-complement
/// signed, matching observed `CFBinaryPList` behavior for large values.
pub fn integer(input: &[u8]) -> IResult<&[u8], i64> {
    let (input, size_nibble) = marker(ObjectFormat::Integer)(input)?;
    match size_nibble {
        0 => map(be_u8, |v| v as i64)(input),
        1 => map(be_u16, |v| v as i64)(input),
        2 => map(nom::number::complete::be_u32, |v| v as i64)(input),
        3 => be_i64(input),
        _ => Err(nom::Err::Failure(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Verify,
        ))),
    }
}

/// Parses a 32- or 64-bit big-endian IEEE-754 real object.
pub fn real(input: &[u8]) -> IResult<&[u8], f64> {
    let (input, size_nibble) = marker(ObjectFormat::Real)(input)?;
    match size_nibble {
        2 => map(be_f32, |v| v as f64)(input),
        3 => be_f64(input),
        _ => Err(nom::Err::Failure(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Verify,
        ))),
    }
}

/// Parses a date object: a CFAbsoluteTime 64-bit double, seconds since
/// 2001-01-01T00:00:00Z.
pub fn date(input: &[u8]) -> IResult<&[u8], f64> {
    let (input, size_nibble) = marker(ObjectFormat::Date)(input)?;
    if size_nibble != 3 {
        return Err(nom::Err::Failure(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Verify,
        )));
    }
    be_f64(input)
}

/// Returns a parser for the length of an object payload.
///
/// If the encoded value (the marker's low nibble) is `0xF`, an additional
/// integer object follows giving the true count; otherwise the nibble value
/// itself is the count.
fn payload_count(encoded_value: u8) -> impl Fn(&[u8]) -> IResult<&[u8], usize> {
    assert!(encoded_value & 0xF0 == 0, "encoded length must be a 4-bit value");
    move |input: &[u8]| {
        if encoded_value == 0x0F {
            map_res(integer, |value| usize::try_from(value))(input)
        } else {
            Ok((input, encoded_value as usize))
        }
    }
}

/// Parses a variable-length data object, returning the corresponding slice.
pub fn data(input: &[u8]) -> IResult<&[u8], &[u8]> {
    let (input, encoded_value) = marker(ObjectFormat::Data)(input)?;
    let (input, length) = payload_count(encoded_value)(input)?;
    take(length)(input)
}

/// Parses a variable-length 7-bit ASCII string object.
pub fn ascii_string(input: &[u8]) -> IResult<&[u8], &str> {
    let (input, encoded_value) = marker(ObjectFormat::AsciiString)(input)?;
    let (input, char_count) = payload_count(encoded_value)(input)?;
    map_res(take(char_count), |bytes: &[u8]| {
        AsciiStr::from_ascii(bytes).map(|s| s.as_str())
    })(input)
}

/// Parses a variable-length big-endian UTF-16 string object.
pub fn utf16_string(input: &[u8]) -> IResult<&[u8], String> {
    let (input, encoded_value) = marker(ObjectFormat::Utf16String)(input)?;
    let (input, char_count) = payload_count(encoded_value)(input)?;
    map_res(many_m_n(char_count, char_count, be_u16), |code_points| {
        String::from_utf16(&code_points)
    })(input)
}

/// Parses a variable-length UID object, widened into a `u128`.
pub fn uid(input: &[u8]) -> IResult<&[u8], u128> {
    let (input, encoded_value) = marker(ObjectFormat::Uid)(input)?;
    let width = encoded_value as usize + 1;
    if width > 16 {
        return Err(nom::Err::Failure(nom::error::Error::new(
            input,
            nom::error::ErrorKind::TooLarge,
        )));
    }
    be_u128_n(width)(input)
}

/// Returns a parser for an array of object references of the given width.
pub fn array(object_ref_size: usize) -> impl Fn(&[u8]) -> IResult<&[u8], Vec<usize>> {
    assert!(object_ref_size >= 1 && object_ref_size <= 8);
    move |input: &[u8]| {
        let (input, encoded_value) = marker(ObjectFormat::Array)(input)?;
        let (input, length) = payload_count(encoded_value)(input)?;
        many_m_n(length, length, be_usize_n(object_ref_size))(input)
    }
}

/// Returns a parser for a dictionary of key/value object reference pairs of
/// the given reference width. Key references are followed by value
/// references in the wire format; the result interleaves them in order.
pub fn dictionary(
    object_ref_size: usize,
) -> impl Fn(&[u8]) -> IResult<&[u8], Vec<(usize, usize)>> {
    assert!(object_ref_size >= 1 && object_ref_size <= 8);
    move |input: &[u8]| {
        let (input, encoded_value) = marker(ObjectFormat::Dictionary)(input)?;
        let (input, count) = payload_count(encoded_value)(input)?;
        let (input, keys) = many_m_n(count, count, be_usize_n(object_ref_size))(input)?;
        let (input, values) = many_m_n(count, count, be_usize_n(object_ref_size))(input)?;
        Ok((input, keys.into_iter().zip(values).collect()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_and_booleans() {
        assert_eq!(null(&[0b0000_0000]), Ok((&[][..], ())));
        assert_eq!(boolean(&[0b0000_1000]), Ok((&[][..], false)));
        assert_eq!(boolean(&[0b0000_1001]), Ok((&[][..], true)));
        assert_eq!(fill(&[0b0000_1111]), Ok((&[][..], ())));
    }

    #[test]
    fn test_integer_widths_are_unsigned_widened_except_64_bit() {
        assert_eq!(integer(&[0b0001_0000, 0xFF]), Ok((&[][..], 255)));
        assert_eq!(
            integer(&[0b0001_0001, 0xFF, 0x00]),
            Ok((&[][..], 65280))
        );
        assert_eq!(
            integer(&[0b0001_0011, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]),
            Ok((&[][..], -1))
        );
    }

    #[test]
    fn test_date_zero_is_epoch() {
        let bytes = [0b0011_0011, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];
        assert_eq!(date(&bytes), Ok((&[][..], 0.0)));
    }

    #[test]
    fn test_utf16_string_ab() {
        let bytes = [0b0110_0010, 0x00, 0x41, 0x00, 0x42];
        assert_eq!(utf16_string(&bytes), Ok((&[][..], "AB".to_string())));
    }

    #[test]
    fn test_ascii_string_hello() {
        let bytes = [0b0101_0101, 0x48, 0x65, 0x6c, 0x6c, 0x6f];
        assert_eq!(ascii_string(&bytes), Ok((&[][..], "Hello")));
    }

    #[test]
    fn test_data_with_trailing_length() {
        let bytes = [0b0100_1111, 0b0001_0000, 0b0000_0010, 0xAA, 0xBB];
        assert_eq!(data(&bytes), Ok((&[][..], &[0xAA, 0xBB][..])));
    }

    #[test]
    fn test_uid_widths() {
        assert_eq!(uid(&[0b1000_0000, 0x05]), Ok((&[][..], 5u128)));
        let wide = [
            0b1000_1111, 0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0A, 0x0B,
            0x0C, 0x0D, 0x0E, 0x0F,
        ];
        assert_eq!(
            uid(&wide),
            Ok((&[][..], 0x000102030405060708090A0B0C0D0E0Fu128))
        );
    }

    #[test]
    fn test_array_of_refs() {
        let bytes = [0b1010_0100, 0x00, 0x00, 0x00, 0x01, 0x00, 0x02, 0x00, 0x03];
        assert_eq!(array(2)(&bytes), Ok((&[][..], vec![0, 1, 2, 3])));
    }

    #[test]
    fn test_dictionary_interleaves_keys_and_values() {
        let bytes = [0b1101_0010, 0x00, 0x00, 0x00, 0x01, 0x00, 0x02, 0x00, 0x03];
        assert_eq!(
            dictionary(2)(&bytes),
            Ok((&[][..], vec![(0, 2), (1, 3)]))
        );
    }
}
