//! PNG chunk data model

use crate::crc;
use std::fmt;

/// A 4-byte PNG chunk type tag such as `IHDR` or `tEXt`
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkType(pub [u8; 4]);

impl ChunkType {
    pub const IHDR: ChunkType = ChunkType(*b"IHDR");
    pub const IDAT: ChunkType = ChunkType(*b"IDAT");
    pub const IEND: ChunkType = ChunkType(*b"IEND");
    /// Uncompressed Latin-1 text
    pub const TEXT: ChunkType = ChunkType(*b"tEXt");
    /// International (UTF-8) text
    pub const ITXT: ChunkType = ChunkType(*b"iTXt");

    /// Raw tag bytes
    pub fn bytes(&self) -> &[u8; 4] {
        &self.0
    }

    /// True for `tEXt` and `iTXt`, the chunks whose values get scrubbed
    pub fn is_text(&self) -> bool {
        *self == Self::TEXT || *self == Self::ITXT
    }

    /// Ancillary bit: lowercase first letter
    pub fn is_ancillary(&self) -> bool {
        self.0[0] & 0x20 != 0
    }

    /// Private bit: lowercase second letter
    pub fn is_private(&self) -> bool {
        self.0[1] & 0x20 != 0
    }

    /// Safe-to-copy bit: lowercase fourth letter
    pub fn is_safe_to_copy(&self) -> bool {
        self.0[3] & 0x20 != 0
    }
}

impl fmt::Display for ChunkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            if b.is_ascii_graphic() {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{:02x}", b)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for ChunkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChunkType({})", self)
    }
}

/// A single PNG chunk
///
/// `length` and `crc` are kept as stored so a decoded stream can be written
/// back byte for byte. Code that changes `data` must call
/// [`Chunk::refresh`] before the chunk is encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Byte count of `data`
    pub length: u32,
    /// Chunk type tag
    pub chunk_type: ChunkType,
    /// Chunk payload
    pub data: Vec<u8>,
    /// CRC-32 over type and data
    pub crc: u32,
}

impl Chunk {
    /// Create a chunk with length and CRC computed from `data`
    pub fn new(chunk_type: ChunkType, data: Vec<u8>) -> Self {
        let mut chunk = Self {
            length: 0,
            chunk_type,
            data,
            crc: 0,
        };
        chunk.refresh();
        chunk
    }

    /// Recompute `length` and `crc` from the current `data`
    pub fn refresh(&mut self) {
        self.length = self.data.len() as u32;
        self.crc = self.computed_crc();
    }

    /// CRC-32 of the current type and data, ignoring the stored value
    pub fn computed_crc(&self) -> u32 {
        crc::chunk_crc(self.chunk_type.bytes(), &self.data)
    }

    /// Whether the stored CRC matches type and data
    pub fn crc_matches(&self) -> bool {
        self.crc == self.computed_crc()
    }

    /// Whether both `length` and `crc` agree with the payload
    pub fn is_consistent(&self) -> bool {
        self.length as usize == self.data.len() && self.crc_matches()
    }

    /// Whether this is a `tEXt` or `iTXt` chunk
    pub fn is_text(&self) -> bool {
        self.chunk_type.is_text()
    }

    /// Encoded size: length + type + data + CRC
    pub fn encoded_len(&self) -> usize {
        4 + 4 + self.data.len() + 4
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_consistent() {
        let chunk = Chunk::new(ChunkType::TEXT, b"Title\0Sunset".to_vec());
        assert_eq!(chunk.length, 12);
        assert_eq!(chunk.crc, crc::chunk_crc(b"tEXt", b"Title\0Sunset"));
        assert!(chunk.is_consistent());
        assert_eq!(chunk.encoded_len(), 24);
    }

    #[test]
    fn test_refresh_after_mutation() {
        let mut chunk = Chunk::new(ChunkType::TEXT, b"a\0bc".to_vec());
        chunk.data.truncate(2);
        assert!(!chunk.is_consistent());

        chunk.refresh();
        assert!(chunk.is_consistent());
        assert_eq!(chunk.length, 2);
    }

    #[test]
    fn test_chunk_type_properties() {
        assert!(ChunkType::TEXT.is_text());
        assert!(ChunkType::ITXT.is_text());
        assert!(!ChunkType(*b"zTXt").is_text());
        assert!(!ChunkType(*b"TEXT").is_text());

        assert!(!ChunkType::IHDR.is_ancillary());
        assert!(ChunkType::TEXT.is_ancillary());
        assert!(ChunkType::TEXT.is_safe_to_copy());
        assert!(!ChunkType::TEXT.is_private());
        assert!(ChunkType(*b"prVt").is_private());
    }

    #[test]
    fn test_chunk_type_display() {
        assert_eq!(ChunkType::IEND.to_string(), "IEND");
        assert_eq!(ChunkType([b'a', 0, b'b', 0xFF]).to_string(), "a\\x00b\\xff");
    }
}
