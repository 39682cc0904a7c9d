//
// Copyright 2020 bplist Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

use indexmap::IndexMap;

use std::collections::HashSet;

use crate::bplist::document::{self, ObjectFormat};
use crate::bplist::error::{Error, Result};
use crate::bplist::parser;
use crate::bplist::value::Value;

/// An object as it sits in the object table before its array/dict entries
/// are resolved into values. Arrays and dicts record references (indices
/// into the object table) rather than resolved `Value`s, matching the
/// two-phase decode/materialize split described for the format.
#[derive(Debug, Clone)]
enum RawObject {
    Null,
    Bool(bool),
    Int(i64),
    Real(f64),
    Date(f64),
    Data(Vec<u8>),
    AsciiString(String),
    UnicodeString(String),
    Uid(u128),
    Array(Vec<usize>),
    Dict(Vec<(usize, usize)>),
}

/// Decodes a complete binary property list from a byte slice, producing the
/// generic value tree. The root object must be a dictionary.
pub fn decode(input: &[u8]) -> Result<Value> {
    if input.len() < document::MINIMUM_STREAM_LENGTH {
        return Err(Error::StreamTooShort);
    }

    parser::document::header(&input[0..document::HEADER_SIZE])
        .map_err(|_| Error::InvalidHeader)?;

    let trailer_slice = &input[input.len() - document::TRAILER_SIZE..];
    let (_, trailer) = parser::document::trailer(trailer_slice).map_err(|_| Error::InvalidTrailer)?;

    if trailer.offset_int_size < 1
        || trailer.offset_int_size > 8
        || trailer.object_ref_size < 1
        || trailer.object_ref_size > 8
        || trailer.offset_table_offset < 8
        || trailer.top_level_object_offset >= trailer.object_count
    {
        return Err(Error::InvalidTrailer);
    }

    let offset_table_span = trailer
        .offset_int_size
        .checked_mul(trailer.object_count)
        .and_then(|span| trailer.offset_table_offset.checked_add(span))
        .ok_or(Error::InvalidTrailer)?;
    if offset_table_span
        .checked_add(document::TRAILER_SIZE)
        .ok_or(Error::InvalidTrailer)?
        > input.len()
    {
        return Err(Error::InvalidTrailer);
    }

    let offset_table_slice = &input[trailer.offset_table_offset..offset_table_span];
    let (_, offset_table) = parser::document::offset_table(
        trailer.object_count,
        trailer.offset_int_size,
    )(offset_table_slice)
    .map_err(|_| Error::InvalidOffsetTable)?;

    let mut raw_objects = Vec::with_capacity(trailer.object_count);
    for &offset in &offset_table {
        if offset >= input.len() {
            return Err(Error::InvalidOffsetTable);
        }
        raw_objects.push(parse_raw_object(&input[offset..], trailer.object_ref_size)?);
    }

    let mut in_progress = HashSet::new();
    let root = materialize(&raw_objects, trailer.top_level_object_offset, &mut in_progress);

    match root {
        Value::Dict(_) => Ok(root),
        _ => Err(Error::RootObjectNotDictionary),
    }
}

fn parse_raw_object(data: &[u8], object_ref_size: usize) -> Result<RawObject> {
    let (_, (format, low)) =
        parser::object::any_marker(data).map_err(|_| Error::InvalidOrUnsupportedMarker)?;

    match format {
        ObjectFormat::Primitive => match low {
            0x0 => Ok(RawObject::Null),
            0x8 => Ok(RawObject::Bool(false)),
            0x9 => Ok(RawObject::Bool(true)),
            0xF => Ok(RawObject::Null),
            _ => Err(Error::InvalidOrUnsupportedMarker),
        },
        ObjectFormat::Integer => parser::object::integer(data)
            .map(|(_, v)| RawObject::Int(v))
            .map_err(|_| Error::MalformedObject),
        ObjectFormat::Real => parser::object::real(data)
            .map(|(_, v)| RawObject::Real(v))
            .map_err(|_| Error::MalformedObject),
        ObjectFormat::Date => parser::object::date(data)
            .map(|(_, v)| RawObject::Date(v))
            .map_err(|_| Error::MalformedObject),
        ObjectFormat::Data => parser::object::data(data)
            .map(|(_, v)| RawObject::Data(v.to_vec()))
            .map_err(|_| Error::MalformedObject),
        ObjectFormat::AsciiString => parser::object::ascii_string(data)
            .map(|(_, v)| RawObject::AsciiString(v.to_string()))
            .map_err(|_| Error::MalformedObject),
        ObjectFormat::Utf16String => parser::object::utf16_string(data)
            .map(|(_, v)| RawObject::UnicodeString(v))
            .map_err(|_| Error::MalformedObject),
        ObjectFormat::Uid => parser::object::uid(data)
            .map(|(_, v)| RawObject::Uid(v))
            .map_err(|_| Error::MalformedObject),
        ObjectFormat::Array => parser::object::array(object_ref_size)(data)
            .map(|(_, refs)| RawObject::Array(refs))
            .map_err(|_| Error::MalformedObject),
        ObjectFormat::Dictionary => parser::object::dictionary(object_ref_size)(data)
            .map(|(_, pairs)| RawObject::Dict(pairs))
            .map_err(|_| Error::MalformedObject),
    }
}

/// Resolves a raw object into a `Value`, recursively materializing arrays
/// and dicts. `in_progress` is the set of object-table indices currently
/// being materialized on the call stack; a reference back into that set
/// (a cycle, including a self-reference) is tolerated by omitting the slot
/// rather than failing, per the observed behavior of real Safari archives.
/// A reference outside the object table is tolerated the same way.
fn materialize(raw_objects: &[RawObject], index: usize, in_progress: &mut HashSet<usize>) -> Value {
    let raw = match raw_objects.get(index) {
        Some(raw) => raw,
        None => return Value::Null,
    };

    match raw {
        RawObject::Null => Value::Null,
        RawObject::Bool(b) => Value::Bool(*b),
        RawObject::Int(i) => Value::Int(*i),
        RawObject::Real(r) => Value::Real(*r),
        RawObject::Date(d) => Value::Date(*d),
        RawObject::Data(d) => Value::Data(d.clone()),
        RawObject::AsciiString(s) => Value::AsciiString(s.clone()),
        RawObject::UnicodeString(s) => Value::UnicodeString(s.clone()),
        RawObject::Uid(u) => Value::Uid(*u),

        RawObject::Array(refs) => {
            in_progress.insert(index);
            let mut values = Vec::with_capacity(refs.len());
            for &r in refs {
                if r >= raw_objects.len() || in_progress.contains(&r) {
                    continue;
                }
                values.push(materialize(raw_objects, r, in_progress));
            }
            in_progress.remove(&index);
            Value::Array(values)
        }

        RawObject::Dict(pairs) => {
            in_progress.insert(index);
            let mut map = IndexMap::new();
            for &(k, v) in pairs {
                if k >= raw_objects.len() || v >= raw_objects.len() || in_progress.contains(&k) || in_progress.contains(&v) {
                    continue;
                }
                let key = match materialize(raw_objects, k, in_progress).as_str() {
                    Some(s) => s.to_string(),
                    None => continue,
                };
                let value = materialize(raw_objects, v, in_progress);
                map.insert(key, value);
            }
            in_progress.remove(&index);
            Value::Dict(map)
        }
    }
}
