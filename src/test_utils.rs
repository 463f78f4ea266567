//! Builders for small synthetic PNG files used by tests and fuzz targets.
//!
//! The images are not decodable pictures (no IDAT unless added), but their
//! chunk framing and CRCs are valid, which is all the codec looks at.
//!
//! # Usage
//!
//! ```
//! use png_scrub::test_utils::*;
//!
//! let png = text_png(&[("Author", "Jane Doe")]);
//! assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
//! ```

use crate::{
    chunk::{Chunk, ChunkType},
    codec,
};

/// IHDR for a 1x1, 8-bit RGB image
pub fn ihdr_chunk() -> Chunk {
    Chunk::new(
        ChunkType::IHDR,
        vec![
            0x00, 0x00, 0x00, 0x01, // Width: 1
            0x00, 0x00, 0x00, 0x01, // Height: 1
            0x08, // Bit depth: 8
            0x02, // Color type: RGB
            0x00, // Compression: deflate
            0x00, // Filter: adaptive
            0x00, // Interlace: none
        ],
    )
}

pub fn iend_chunk() -> Chunk {
    Chunk::new(ChunkType::IEND, Vec::new())
}

/// `tEXt` chunk holding `keyword\0text`
pub fn text_chunk(keyword: &str, text: &str) -> Chunk {
    let mut data = keyword.as_bytes().to_vec();
    data.push(0);
    data.extend_from_slice(text.as_bytes());
    Chunk::new(ChunkType::TEXT, data)
}

/// Uncompressed `iTXt` chunk
pub fn itxt_chunk(keyword: &str, language: &str, translated: &str, text: &str) -> Chunk {
    let mut data = Vec::new();
    data.extend_from_slice(keyword.as_bytes());
    data.extend_from_slice(&[0, 0, 0]); // terminator, flag, method
    data.extend_from_slice(language.as_bytes());
    data.push(0);
    data.extend_from_slice(translated.as_bytes());
    data.push(0);
    data.extend_from_slice(text.as_bytes());
    Chunk::new(ChunkType::ITXT, data)
}

/// Signature followed by `chunks`
pub fn png_bytes(chunks: &[Chunk]) -> Vec<u8> {
    codec::encode(chunks)
}

/// Signature + IHDR + IEND
pub fn minimal_png() -> Vec<u8> {
    png_bytes(&[ihdr_chunk(), iend_chunk()])
}

/// Signature + IHDR + one `tEXt` chunk per pair + IEND
pub fn text_png(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut chunks = vec![ihdr_chunk()];
    chunks.extend(entries.iter().map(|(k, v)| text_chunk(k, v)));
    chunks.push(iend_chunk());
    png_bytes(&chunks)
}
