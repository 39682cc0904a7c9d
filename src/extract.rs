//
// Copyright 2020 bplist Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

//! # The top-level extraction driver.
//!
//! Ties the decoder, archive model, writer, and rewriter together into the
//! single [`extract`] entry point.

use std::fs;
use std::io::Write;
use std::path::Path;

use url::Url;

use crate::archive::{SubResource, SubframeArchive, WebArchive};
use crate::bplist;
use crate::error::{ExtractError, Result};
use crate::options::ExtractOptions;
use crate::rewrite;
use crate::writer;

/// Decodes `input_file` (a `.webarchive`, i.e. a `bplist00` document) and
/// materializes it under `output_dir`, which must already exist.
pub fn extract(
    input_file: &Path,
    output_dir: &Path,
    options: ExtractOptions,
    mut sink: Option<&mut dyn Write>,
) -> Result<()> {
    if !output_dir.is_dir() {
        return Err(ExtractError::OutputDirectoryMissing);
    }

    let bytes = fs::read(input_file)?;
    let root = bplist::decode(&bytes)?;
    let archive = WebArchive::from_value(&root)?;

    let main_url = Url::parse(&archive.main.url)
        .map_err(|_| ExtractError::InvalidFile(bplist::Error::MalformedObject))?;
    let document = decode_text(&archive.main.data, &archive.main.text_encoding)?;

    extract_into(
        output_dir,
        &main_url,
        document,
        &archive.sub_resources,
        &archive.subframes,
        options,
        &mut sink,
    )
}

fn decode_text(data: &[u8], encoding_label: &str) -> Result<String> {
    let encoding = encoding_rs::Encoding::for_label(encoding_label.as_bytes())
        .ok_or_else(|| ExtractError::EncodingUnsupported(encoding_label.to_string()))?;
    let (decoded, _, _had_errors) = encoding.decode(data);
    Ok(decoded.into_owned())
}

/// Writes every sub-resource under `dir`, rewriting each occurrence found in
/// `document`; recurses into every sub-frame, then writes `document` itself
/// to `dir/webpage.html`. Used for both the outer archive and every nested
/// sub-frame archive, which is why `document` arrives already decoded
/// rather than being decoded inside this function.
fn extract_into(
    dir: &Path,
    main_url: &Url,
    mut document: String,
    sub_resources: &[SubResource],
    subframes: &[SubframeArchive],
    options: ExtractOptions,
    sink: &mut Option<&mut dyn Write>,
) -> Result<()> {
    for sub in sub_resources {
        let resource_url = match Url::parse(&sub.url) {
            Ok(url) => url,
            Err(_) => {
                if let Some(out) = sink.as_mut() {
                    writeln!(out, "skipping sub-resource with unparsable URL: {}", sub.url)?;
                }
                continue;
            }
        };

        let ignore_javascript = options.contains(ExtractOptions::IGNORE_JAVASCRIPT_FILES)
            && rewrite::is_javascript_mime(sub.mime_type.as_deref());

        if ignore_javascript {
            rewrite::rewrite(&mut document, &resource_url, main_url, "", sink)?;
            continue;
        }

        if let Some(relative) = writer::write(dir, &resource_url, main_url, &sub.data, sink)? {
            rewrite::rewrite(&mut document, &resource_url, main_url, &relative, sink)?;
        }
    }

    for (position, subframe) in subframes.iter().enumerate() {
        let index = position + 1;
        let subframe_dir = dir.join(format!("subframe_{}", index));
        fs::create_dir_all(&subframe_dir)?;

        let subframe_main_url = Url::parse(&subframe.main.url)
            .map_err(|_| ExtractError::InvalidFile(bplist::Error::MalformedObject))?;
        let subframe_document = decode_text(&subframe.main.data, &subframe.main.text_encoding)?;

        extract_into(
            &subframe_dir,
            &subframe_main_url,
            subframe_document,
            &subframe.sub_resources,
            &subframe.children,
            options,
            sink,
        )?;

        rewrite::rewrite_subframe(
            &mut document,
            &subframe_main_url,
            main_url,
            &rewrite::subframe_target(index),
            sink,
        )?;
    }

    fs::write(dir.join("webpage.html"), document.as_bytes())?;
    Ok(())
}
