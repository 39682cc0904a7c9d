//
// Copyright 2020 bplist Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

//! # The `.webarchive` schema, layered over the decoded plist tree.
//!
//! Everything here is a typed, hand-walked view constructed once from a
//! [`crate::bplist::Value`]; there is no generic deserialization.

use crate::bplist::Value;

const KEY_MAIN_RESOURCE: &str = "WebMainResource";
const KEY_SUBRESOURCES: &str = "WebSubresources";
const KEY_SUBFRAME_ARCHIVES: &str = "WebSubframeArchives";
const KEY_URL: &str = "WebResourceURL";
const KEY_DATA: &str = "WebResourceData";
const KEY_MIME_TYPE: &str = "WebResourceMIMEType";
const KEY_TEXT_ENCODING_NAME: &str = "WebResourceTextEncodingName";
const KEY_FRAME_NAME: &str = "WebResourceFrameName";

const DEFAULT_TEXT_ENCODING_NAME: &str = "UTF-8";

/// A web archive's main resource: the document displayed when the archive
/// is opened.
#[derive(Debug, Clone, PartialEq)]
pub struct MainResource {
    pub url: String,
    pub data: Vec<u8>,
    pub text_encoding: String,
    pub frame_name: Option<String>,
}

/// A single resource referenced by the main document (an image, a
/// stylesheet, a script, ...).
#[derive(Debug, Clone, PartialEq)]
pub struct SubResource {
    pub url: String,
    pub data: Vec<u8>,
    pub mime_type: Option<String>,
}

/// An archive for a sub-frame embedded in the main document.
#[derive(Debug, Clone, PartialEq)]
pub struct SubframeArchive {
    pub main: MainResource,
    pub sub_resources: Vec<SubResource>,
    /// Archives nested within this sub-frame's own sub-frames. Reserved:
    /// real-world Safari archives are observed one level deep, but nothing
    /// in the decoder or this model assumes that depth.
    pub children: Vec<SubframeArchive>,
}

/// A fully parsed `.webarchive`, ready for extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct WebArchive {
    pub main: MainResource,
    pub sub_resources: Vec<SubResource>,
    pub subframes: Vec<SubframeArchive>,
}

/// Failure building the archive view out of a decoded plist tree.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Error {
    /// The root dictionary has no `WebMainResource` entry.
    MissingMainResource,
}

impl std::fmt::Display for Error {
    fn fmt(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::MissingMainResource => formatter.write_str("archive has no WebMainResource"),
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;

impl WebArchive {
    /// Builds an archive view from a decoded plist tree. The root must be a
    /// dictionary containing at least `WebMainResource`; everything else is
    /// optional and defaults to empty.
    pub fn from_value(root: &Value) -> Result<WebArchive> {
        let root = root.as_dict().ok_or(Error::MissingMainResource)?;

        let main_resource_value = root.get(KEY_MAIN_RESOURCE).ok_or(Error::MissingMainResource)?;
        let main = main_resource_from_value(main_resource_value).ok_or(Error::MissingMainResource)?;

        let sub_resources = root
            .get(KEY_SUBRESOURCES)
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(sub_resource_from_value).collect())
            .unwrap_or_default();

        let subframes = root
            .get(KEY_SUBFRAME_ARCHIVES)
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(subframe_archive_from_value).collect())
            .unwrap_or_default();

        Ok(WebArchive { main, sub_resources, subframes })
    }
}

fn main_resource_from_value(value: &Value) -> Option<MainResource> {
    let dict = value.as_dict()?;
    let url = dict.get(KEY_URL).and_then(Value::as_str)?.to_string();
    let data = dict.get(KEY_DATA).and_then(Value::as_data)?.to_vec();
    let text_encoding = dict
        .get(KEY_TEXT_ENCODING_NAME)
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_TEXT_ENCODING_NAME)
        .to_string();
    let frame_name = dict.get(KEY_FRAME_NAME).and_then(Value::as_str).map(str::to_string);

    Some(MainResource { url, data, text_encoding, frame_name })
}

fn sub_resource_from_value(value: &Value) -> Option<SubResource> {
    let dict = value.as_dict()?;
    let url = dict.get(KEY_URL).and_then(Value::as_str)?.to_string();
    let data = dict.get(KEY_DATA).and_then(Value::as_data)?.to_vec();
    let mime_type = dict.get(KEY_MIME_TYPE).and_then(Value::as_str).map(str::to_string);

    Some(SubResource { url, data, mime_type })
}

fn subframe_archive_from_value(value: &Value) -> Option<SubframeArchive> {
    let dict = value.as_dict()?;

    let main = dict.get(KEY_MAIN_RESOURCE).and_then(main_resource_from_value)?;

    let sub_resources = dict
        .get(KEY_SUBRESOURCES)
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(sub_resource_from_value).collect())
        .unwrap_or_default();

    let children = dict
        .get(KEY_SUBFRAME_ARCHIVES)
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(subframe_archive_from_value).collect())
        .unwrap_or_default();

    Some(SubframeArchive { main, sub_resources, children })
}
