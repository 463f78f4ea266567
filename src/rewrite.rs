//! Text chunk rewriting
//!
//! The [`Rewriter`] removes every occurrence of a list of literal byte
//! strings from the value of `tEXt` and `iTXt` chunks and refreshes the
//! chunk length and CRC afterwards. All other chunks pass through as-is.

use crate::{
    chunk::{Chunk, ChunkType},
    text::{ItxtFields, TextPayload},
};
use serde::Deserialize;
use tracing::debug;

/// How the value of an `iTXt` chunk is located
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItxtMode {
    /// Treat everything after the first zero byte as the value, like `tEXt`
    ///
    /// Removals can then also hit the compression bytes, language tag and
    /// translated keyword.
    #[default]
    Simple,
    /// Parse the `iTXt` fields and only touch the text field
    ///
    /// Compressed text and payloads that do not parse are left unchanged.
    Structured,
}

/// Counters collected while rewriting a chunk stream
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewriteStats {
    /// `tEXt`/`iTXt` chunks seen
    pub text_chunks: usize,
    /// Chunks whose data changed
    pub modified_chunks: usize,
    /// Total bytes removed from chunk data
    pub bytes_removed: usize,
}

/// Removes configured strings from text chunk values
#[derive(Debug, Clone, Default)]
pub struct Rewriter {
    removals: Vec<Vec<u8>>,
    itxt_mode: ItxtMode,
}

impl Rewriter {
    /// Create a rewriter; removals are applied in the given order and empty
    /// entries are skipped
    pub fn new<I, S>(removals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        Self {
            removals: removals
                .into_iter()
                .map(|s| s.as_ref().to_vec())
                .filter(|s| !s.is_empty())
                .collect(),
            itxt_mode: ItxtMode::default(),
        }
    }

    /// Select how `iTXt` values are located
    pub fn with_itxt_mode(mut self, mode: ItxtMode) -> Self {
        self.itxt_mode = mode;
        self
    }

    /// The removal strings in application order
    pub fn removals(&self) -> &[Vec<u8>] {
        &self.removals
    }

    pub fn itxt_mode(&self) -> ItxtMode {
        self.itxt_mode
    }

    /// Apply every removal string, in order, to `value`
    pub fn scrub(&self, value: &[u8]) -> Vec<u8> {
        self.removals
            .iter()
            .fold(value.to_vec(), |acc, needle| remove_all(&acc, needle))
    }

    /// Rewrite a single chunk
    ///
    /// Non-text chunks and text chunks without a zero byte come back
    /// untouched. Otherwise the value is scrubbed and `length`/`crc` are
    /// recomputed, even when nothing was removed.
    pub fn rewrite(&self, mut chunk: Chunk) -> Chunk {
        if let Some(data) = self.rewrite_data(&chunk) {
            chunk.data = data;
            chunk.refresh();
        }
        chunk
    }

    /// Rewrite every chunk in place, keeping order
    pub fn rewrite_stream(&self, chunks: &mut [Chunk]) -> RewriteStats {
        let mut stats = RewriteStats::default();

        for chunk in chunks.iter_mut() {
            if !chunk.is_text() {
                continue;
            }
            stats.text_chunks += 1;

            let Some(data) = self.rewrite_data(chunk) else {
                debug!(chunk_type = %chunk.chunk_type, "text chunk left unchanged");
                continue;
            };

            if data != chunk.data {
                stats.modified_chunks += 1;
                stats.bytes_removed += chunk.data.len() - data.len();
                debug!(
                    chunk_type = %chunk.chunk_type,
                    removed = chunk.data.len() - data.len(),
                    "scrubbed text chunk"
                );
            }
            chunk.data = data;
            chunk.refresh();
        }

        stats
    }

    /// New payload for `chunk`, or `None` when it must pass through
    fn rewrite_data(&self, chunk: &Chunk) -> Option<Vec<u8>> {
        match chunk.chunk_type {
            ChunkType::TEXT => self.rewrite_simple(&chunk.data),
            ChunkType::ITXT => match self.itxt_mode {
                ItxtMode::Simple => self.rewrite_simple(&chunk.data),
                ItxtMode::Structured => self.rewrite_itxt(&chunk.data),
            },
            _ => None,
        }
    }

    fn rewrite_simple(&self, data: &[u8]) -> Option<Vec<u8>> {
        let payload = TextPayload::split(data)?;
        Some(TextPayload::assemble(payload.key, &self.scrub(payload.value)))
    }

    fn rewrite_itxt(&self, data: &[u8]) -> Option<Vec<u8>> {
        let fields = ItxtFields::parse(data)?;
        if fields.is_compressed() {
            return None;
        }
        Some(fields.assemble_with_text(&self.scrub(fields.text)))
    }
}

/// Remove all non-overlapping occurrences of `needle`, scanning left to right
pub fn remove_all(haystack: &[u8], needle: &[u8]) -> Vec<u8> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return haystack.to_vec();
    }

    let mut out = Vec::with_capacity(haystack.len());
    let mut i = 0;
    while i < haystack.len() {
        if haystack[i..].starts_with(needle) {
            i += needle.len();
        } else {
            out.push(haystack[i]);
            i += 1;
        }
    }
    out
}
