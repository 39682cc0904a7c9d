//
// Copyright 2020 bplist Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

//! # Rewriting references to extracted resources inside the main document.
//!
//! The in-source HTML may reference the same resource in several equivalent
//! textual forms (absolute, scheme-relative, host-relative, ...); this
//! module tries each in turn and stops at the first substring match. No
//! HTML parsing is performed; everything here is plain substring search and
//! replace-all.

use std::io::{self, Write};

use url::Url;

const JAVASCRIPT_MIME_TYPES: [&str; 3] =
    ["text/javascript", "application/javascript", "application/x-javascript"];

/// True if `mime` names one of the MIME types treated as a script the
/// `IGNORE_JAVASCRIPT_FILES` option suppresses.
pub fn is_javascript_mime(mime: Option<&str>) -> bool {
    mime.map(|m| JAVASCRIPT_MIME_TYPES.contains(&m)).unwrap_or(false)
}

/// The output path a sub-frame at position `index` (1-based) is written to
/// and rewritten to point at.
pub fn subframe_target(index: usize) -> String {
    format!("subframe_{}/webpage.html", index)
}

fn html_encode_query(query: Option<&str>) -> String {
    match query {
        None => String::new(),
        Some(q) => {
            let escaped = q
                .replace('&', "&amp;")
                .replace('<', "&lt;")
                .replace('>', "&gt;")
                .replace('"', "&quot;");
            format!("?{}", escaped)
        }
    }
}

/// Builds the ordered list of candidate textual forms of `resource_url` to
/// search for inside a document whose own URL is `main_url`. Candidates
/// that only make sense under a shared scheme/host/path prefix with
/// `main_url` are omitted when that prefix does not literally apply.
///
/// `include_bare_path_candidate` gates the fifth form (the raw
/// `path[?query]`, valid whenever `resource_url` and `main_url` share a
/// host): sub-frame references are only ever adapted from forms (1)-(4),
/// since a sub-frame's own URL is not itself a same-document path reference.
fn candidates(resource_url: &Url, main_url: &Url, include_bare_path_candidate: bool) -> Vec<String> {
    let mut candidates = Vec::new();

    let scheme = resource_url.scheme();
    let host = resource_url.host_str().unwrap_or("");
    let path = resource_url.path();
    let query = html_encode_query(resource_url.query());

    let absolute = format!("{}://{}{}{}", scheme, host, path, query);
    candidates.push(absolute.clone());

    let scheme_relative = format!("//{}{}{}", host, path, query);
    candidates.push(scheme_relative);

    let main_scheme_host = format!("{}://{}", main_url.scheme(), main_url.host_str().unwrap_or(""));
    if let Some(host_relative) = absolute.strip_prefix(&main_scheme_host) {
        candidates.push(host_relative.to_string());
    }

    let main_scheme_host_path = format!("{}{}", main_scheme_host, main_url.path());
    if let Some(sibling_relative) = absolute.strip_prefix(&main_scheme_host_path) {
        candidates.push(sibling_relative.to_string());
    }

    if include_bare_path_candidate && resource_url.host_str() == main_url.host_str() {
        let mut path_and_query = path.to_string();
        if let Some(q) = resource_url.query() {
            path_and_query.push('?');
            path_and_query.push_str(q);
        }
        candidates.push(path_and_query);
    }

    candidates
}

fn rewrite_with_candidates(
    document: &mut String,
    resource_url: &Url,
    main_url: &Url,
    replacement: &str,
    sink: &mut Option<&mut dyn Write>,
    include_bare_path_candidate: bool,
) -> io::Result<()> {
    for candidate in candidates(resource_url, main_url, include_bare_path_candidate) {
        if document.contains(candidate.as_str()) {
            *document = document.replace(candidate.as_str(), replacement);
            return Ok(());
        }
    }

    if let Some(writer) = sink.as_mut() {
        writeln!(writer, "could not find {} in document to rewrite", resource_url)?;
    }
    Ok(())
}

/// Replaces every occurrence of the first candidate textual form of
/// `resource_url` that appears in `document` with `replacement`. If none of
/// the candidates occur, logs a "could not find" line; this is not an
/// error, since archives often contain resources never referenced from the
/// main text.
pub fn rewrite(
    document: &mut String,
    resource_url: &Url,
    main_url: &Url,
    replacement: &str,
    sink: &mut Option<&mut dyn Write>,
) -> io::Result<()> {
    rewrite_with_candidates(document, resource_url, main_url, replacement, sink, true)
}

/// Same as [`rewrite`], but restricted to candidate forms (1)-(4): the bare
/// same-host path form is never tried, since a sub-frame's URL does not
/// appear in the outer document as its own path reference.
pub fn rewrite_subframe(
    document: &mut String,
    subframe_url: &Url,
    main_url: &Url,
    replacement: &str,
    sink: &mut Option<&mut dyn Write>,
) -> io::Result<()> {
    rewrite_with_candidates(document, subframe_url, main_url, replacement, sink, false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_rewrite_absolute_reference() {
        let mut document = "<img src=\"https://ex.com/a/b.png\">".to_string();
        let mut sink: Option<&mut dyn Write> = None;
        rewrite(&mut document, &url("https://ex.com/a/b.png"), &url("https://ex.com/p"), "a/b.png", &mut sink).unwrap();
        assert_eq!(document, "<img src=\"a/b.png\">");
    }

    #[test]
    fn test_rewrite_scheme_relative_reference() {
        let mut document = "<img src=\"//ex.com/a/b.png\">".to_string();
        let mut sink: Option<&mut dyn Write> = None;
        rewrite(&mut document, &url("https://ex.com/a/b.png"), &url("https://ex.com/p"), "a/b.png", &mut sink).unwrap();
        assert_eq!(document, "<img src=\"a/b.png\">");
    }

    #[test]
    fn test_rewrite_missing_reference_is_not_an_error() {
        let mut document = "<p>no references here</p>".to_string();
        let mut sink: Option<&mut dyn Write> = None;
        let result = rewrite(&mut document, &url("https://ex.com/a/b.png"), &url("https://ex.com/p"), "a/b.png", &mut sink);
        assert!(result.is_ok());
        assert_eq!(document, "<p>no references here</p>");
    }

    #[test]
    fn test_rewrite_subframe_does_not_match_bare_path_candidate() {
        let mut document = "<p>/a/b</p>".to_string();
        let mut sink: Option<&mut dyn Write> = None;
        rewrite_subframe(&mut document, &url("https://ex.com/a/b"), &url("https://ex.com/p"), "subframe_1/webpage.html", &mut sink).unwrap();
        assert_eq!(document, "<p>/a/b</p>");
    }

    #[test]
    fn test_javascript_mime_detection() {
        assert!(is_javascript_mime(Some("application/javascript")));
        assert!(is_javascript_mime(Some("text/javascript")));
        assert!(is_javascript_mime(Some("application/x-javascript")));
        assert!(!is_javascript_mime(Some("image/png")));
        assert!(!is_javascript_mime(None));
    }

    #[test]
    fn test_subframe_target_is_not_off_by_one() {
        assert_eq!(subframe_target(1), "subframe_1/webpage.html");
        assert_eq!(subframe_target(2), "subframe_2/webpage.html");
    }
}
