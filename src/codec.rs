//! PNG chunk stream codec
//!
//! Decodes the bytes following the PNG signature into an ordered list of
//! [`Chunk`]s and encodes a list of chunks back into a PNG byte stream.
//! The codec knows nothing about chunk semantics: it does not check chunk
//! order, does not validate CRCs for output, and writes `length` and `crc`
//! exactly as stored on each chunk.

use crate::{
    chunk::{Chunk, ChunkType},
    error::{Error, Result},
};
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Cursor, ErrorKind, Read, Write};
use tracing::{debug, warn};

/// PNG file signature: 89 50 4E 47 0D 0A 1A 0A
pub const PNG_SIGNATURE: &[u8; 8] = b"\x89PNG\r\n\x1a\n";

/// Bytes in a chunk record besides its data: length + type + CRC
const RECORD_OVERHEAD: u64 = 12;

/// How [`decode`] treats a chunk record cut off by the end of the input
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DecodeMode {
    /// Return the chunks decoded so far and drop the partial record
    #[default]
    Lenient,
    /// Fail with [`Error::TruncatedStream`]
    Strict,
}

/// Check the PNG signature and return the chunk stream that follows it
pub fn verify_signature(bytes: &[u8]) -> Result<&[u8]> {
    match bytes.split_first_chunk::<8>() {
        Some((sig, rest)) if sig == PNG_SIGNATURE => Ok(rest),
        _ => Err(Error::InvalidSignature),
    }
}

/// Decode a chunk stream (the bytes after the signature)
///
/// Decoding runs until the input is exhausted. A record that does not fit
/// in the remaining bytes ends decoding; what happens to it depends on
/// `mode`. An empty remainder is always a clean end.
pub fn decode(bytes: &[u8], mode: DecodeMode) -> Result<Vec<Chunk>> {
    let total = bytes.len() as u64;
    let mut source = Cursor::new(bytes);
    let mut chunks = Vec::new();

    loop {
        let offset = source.position();
        let available = total - offset;
        if available == 0 {
            break;
        }

        // Length field
        let length = match source.read_u32::<BigEndian>() {
            Ok(len) => len,
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                return cut_short(mode, chunks, offset, RECORD_OVERHEAD, available);
            }
            Err(e) => return Err(e.into()),
        };

        let needed = RECORD_OVERHEAD + length as u64;
        if available < needed {
            // Checked before allocating so a bogus length cannot force a huge buffer
            return cut_short(mode, chunks, offset, needed, available);
        }

        let mut chunk_type = [0u8; 4];
        source.read_exact(&mut chunk_type)?;

        let mut data = vec![0u8; length as usize];
        source.read_exact(&mut data)?;

        let crc = source.read_u32::<BigEndian>()?;

        let chunk = Chunk {
            length,
            chunk_type: ChunkType(chunk_type),
            data,
            crc,
        };

        debug!(
            offset,
            chunk_type = %chunk.chunk_type,
            length,
            ancillary = chunk.chunk_type.is_ancillary(),
            private = chunk.chunk_type.is_private(),
            safe_to_copy = chunk.chunk_type.is_safe_to_copy(),
            "decoded chunk"
        );

        if !chunk.crc_matches() {
            warn!(
                offset,
                chunk_type = %chunk.chunk_type,
                stored = chunk.crc,
                computed = chunk.computed_crc(),
                "stored chunk CRC does not match its contents"
            );
        }

        chunks.push(chunk);
    }

    Ok(chunks)
}

fn cut_short(
    mode: DecodeMode,
    chunks: Vec<Chunk>,
    offset: u64,
    needed: u64,
    available: u64,
) -> Result<Vec<Chunk>> {
    match mode {
        DecodeMode::Strict => Err(Error::TruncatedStream {
            offset,
            needed,
            available,
        }),
        DecodeMode::Lenient => {
            debug!(
                offset,
                needed,
                dropped = available,
                "dropping incomplete trailing chunk record"
            );
            Ok(chunks)
        }
    }
}

/// Verify the signature of a whole PNG file and decode its chunks
pub fn read_png(bytes: &[u8], mode: DecodeMode) -> Result<Vec<Chunk>> {
    decode(verify_signature(bytes)?, mode)
}

/// Encode chunks into a complete PNG byte stream, signature included
pub fn encode(chunks: &[Chunk]) -> Vec<u8> {
    let size = PNG_SIGNATURE.len() + chunks.iter().map(Chunk::encoded_len).sum::<usize>();
    let mut out = Vec::with_capacity(size);

    out.extend_from_slice(PNG_SIGNATURE);
    for chunk in chunks {
        out.extend_from_slice(&chunk.length.to_be_bytes());
        out.extend_from_slice(chunk.chunk_type.bytes());
        out.extend_from_slice(&chunk.data);
        out.extend_from_slice(&chunk.crc.to_be_bytes());
    }
    out
}

/// Stream chunks to `writer` as a complete PNG, signature included
pub fn write_png<W: Write>(writer: &mut W, chunks: &[Chunk]) -> Result<()> {
    writer.write_all(PNG_SIGNATURE)?;
    for chunk in chunks {
        write_chunk(writer, chunk)?;
    }
    Ok(())
}

/// Write one chunk record exactly as stored
pub fn write_chunk<W: Write>(writer: &mut W, chunk: &Chunk) -> Result<()> {
    writer.write_u32::<BigEndian>(chunk.length)?;
    writer.write_all(chunk.chunk_type.bytes())?;
    writer.write_all(&chunk.data)?;
    writer.write_u32::<BigEndian>(chunk.crc)?;
    Ok(())
}
