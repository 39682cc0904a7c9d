//! A minimal `bplist00` encoder for building test fixtures.
//!
//! This is test-only: the crate under test never writes property lists, it
//! only reads them (see its documented non-goals). Every object allocated
//! through a [`FixtureBuilder`] gets a one-byte reference and a two-byte
//! offset, which comfortably covers the small fixtures these tests build.

/// Encodes a marker byte, followed by an extended-count integer object when
/// `count` does not fit the marker's 4-bit inline count (mirrors the decode
/// side in `bplist::parser::object::payload_count`).
fn marker(high_nibble: u8, count: usize) -> Vec<u8> {
    if count < 0xF {
        vec![(high_nibble << 4) | (count as u8)]
    } else {
        let mut bytes = vec![(high_nibble << 4) | 0x0F];
        bytes.extend(integer_object(count as i64));
        bytes
    }
}

/// Encodes an integer object using the narrowest of the four widths the
/// decoder accepts (1/2/4/8 bytes), unsigned-widened like the wire format.
fn integer_object(value: i64) -> Vec<u8> {
    if let Ok(v) = u8::try_from(value) {
        vec![0x10, v]
    } else if let Ok(v) = u16::try_from(value) {
        let mut bytes = vec![0x11];
        bytes.extend_from_slice(&v.to_be_bytes());
        bytes
    } else if let Ok(v) = u32::try_from(value) {
        let mut bytes = vec![0x12];
        bytes.extend_from_slice(&v.to_be_bytes());
        bytes
    } else {
        let mut bytes = vec![0x13];
        bytes.extend_from_slice(&value.to_be_bytes());
        bytes
    }
}

pub struct FixtureBuilder {
    objects: Vec<Vec<u8>>,
}

impl FixtureBuilder {
    pub fn new() -> Self {
        FixtureBuilder { objects: Vec::new() }
    }

    fn push(&mut self, bytes: Vec<u8>) -> usize {
        self.objects.push(bytes);
        self.objects.len() - 1
    }

    pub fn string(&mut self, s: &str) -> usize {
        assert!(s.is_ascii(), "fixture helper only encodes ASCII strings");
        let mut bytes = marker(0x5, s.len());
        bytes.extend_from_slice(s.as_bytes());
        self.push(bytes)
    }

    pub fn data(&mut self, d: &[u8]) -> usize {
        let mut bytes = marker(0x4, d.len());
        bytes.extend_from_slice(d);
        self.push(bytes)
    }

    pub fn array(&mut self, refs: &[usize]) -> usize {
        let mut bytes = marker(0xA, refs.len());
        bytes.extend(refs.iter().map(|&r| r as u8));
        self.push(bytes)
    }

    pub fn dict(&mut self, pairs: &[(usize, usize)]) -> usize {
        let mut bytes = marker(0xD, pairs.len());
        bytes.extend(pairs.iter().map(|&(k, _)| k as u8));
        bytes.extend(pairs.iter().map(|&(_, v)| v as u8));
        self.push(bytes)
    }

    /// Assembles the final document, with `root` as the top-level object.
    pub fn finish(self, root: usize) -> Vec<u8> {
        let mut document = Vec::new();
        document.extend_from_slice(b"bplist00");

        let mut offsets = Vec::with_capacity(self.objects.len());
        for object in &self.objects {
            offsets.push(document.len());
            document.extend_from_slice(object);
        }

        let offset_table_offset = document.len();
        for &offset in &offsets {
            document.extend_from_slice(&(offset as u16).to_be_bytes());
        }

        document.extend_from_slice(&[0u8; 6]);
        document.push(2); // offset_int_size
        document.push(1); // object_ref_size
        document.extend_from_slice(&(self.objects.len() as i64).to_be_bytes());
        document.extend_from_slice(&(root as i64).to_be_bytes());
        document.extend_from_slice(&(offset_table_offset as i64).to_be_bytes());

        document
    }
}

/// Builds a `WebResource`-shaped dict for a main resource.
pub fn main_resource(
    b: &mut FixtureBuilder,
    url: &str,
    html: &[u8],
    encoding: Option<&str>,
    frame_name: Option<&str>,
) -> usize {
    let url_key = b.string("WebResourceURL");
    let url_value = b.string(url);
    let data_key = b.string("WebResourceData");
    let data_value = b.data(html);

    let mut pairs = vec![(url_key, url_value), (data_key, data_value)];

    if let Some(encoding) = encoding {
        let key = b.string("WebResourceTextEncodingName");
        let value = b.string(encoding);
        pairs.push((key, value));
    }

    if let Some(frame_name) = frame_name {
        let key = b.string("WebResourceFrameName");
        let value = b.string(frame_name);
        pairs.push((key, value));
    }

    b.dict(&pairs)
}

/// Builds a `WebResource`-shaped dict for a sub-resource.
pub fn sub_resource(b: &mut FixtureBuilder, url: &str, data: &[u8], mime_type: Option<&str>) -> usize {
    let url_key = b.string("WebResourceURL");
    let url_value = b.string(url);
    let data_key = b.string("WebResourceData");
    let data_value = b.data(data);

    let mut pairs = vec![(url_key, url_value), (data_key, data_value)];

    if let Some(mime_type) = mime_type {
        let key = b.string("WebResourceMIMEType");
        let value = b.string(mime_type);
        pairs.push((key, value));
    }

    b.dict(&pairs)
}

/// Builds the root dict of a `.webarchive`.
pub fn archive_root(
    b: &mut FixtureBuilder,
    main: usize,
    sub_resources: &[usize],
    subframes: &[usize],
) -> usize {
    let main_key = b.string("WebMainResource");
    let mut pairs = vec![(main_key, main)];

    if !sub_resources.is_empty() {
        let key = b.string("WebSubresources");
        let value = b.array(sub_resources);
        pairs.push((key, value));
    }

    if !subframes.is_empty() {
        let key = b.string("WebSubframeArchives");
        let value = b.array(subframes);
        pairs.push((key, value));
    }

    b.dict(&pairs)
}
