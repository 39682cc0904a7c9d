//
// Copyright 2020 bplist Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

use nom::bytes::complete::take;
use nom::combinator::map_res;
use nom::IResult;

use std::convert::TryFrom;

/// Returns a parser which recognizes a variable-length big-endian number
/// between 1 and 8 bytes long, inclusive.
pub fn be_u64_n(n: usize) -> impl Fn(&[u8]) -> IResult<&[u8], u64> {
    assert!(n >= 1 && n <= 8, "number must be between 1 and 8 bytes, inclusive");
    move |input: &[u8]| {
        let (input, bytes) = take(n)(input)?;
        let value = bytes.iter().fold(0u64, |acc, x| (acc << 8) + *x as u64);
        Ok((input, value))
    }
}

/// Returns a parser which recognizes a variable-length big-endian number
/// between 1 and 16 bytes long, inclusive, widened into a `u128`. Used for
/// UID objects, which may be wider than 8 bytes in the wire format.
pub fn be_u128_n(n: usize) -> impl Fn(&[u8]) -> IResult<&[u8], u128> {
    assert!(n >= 1 && n <= 16, "number must be between 1 and 16 bytes, inclusive");
    move |input: &[u8]| {
        let (input, bytes) = take(n)(input)?;
        let value = bytes.iter().fold(0u128, |acc, x| (acc << 8) + *x as u128);
        Ok((input, value))
    }
}

/// Returns a parser which recognizes a variable-length unsigned big-endian number
/// between 1 and 8 bytes long, inclusive, then converts it safely into a `usize`.
pub fn be_usize_n(n: usize) -> impl Fn(&[u8]) -> IResult<&[u8], usize> {
    move |input: &[u8]| map_res(be_u64_n(n), usize::try_from)(input)
}
