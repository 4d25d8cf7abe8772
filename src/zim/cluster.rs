//! Cluster and blob resolution.
//!
//! A cluster starts with a one-byte compression tag followed by its
//! decompressed payload: a table of `blob count + 1` little-endian u32
//! boundaries, then the blob bytes. Boundaries are relative to the start of
//! the decompressed payload (the tag byte excluded), so blob `i` occupies
//! `[table[i], table[i+1])` of the decompressed stream.

use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Cursor;
use tracing::warn;

use crate::error::Result;
use crate::io::{ReadAt, SegmentedSource};

use super::decompress::XzSliceReader;
use super::parser::ZimParser;

/// Stored cluster, pre-2006 variant (no compression)
const COMP_STORED_LEGACY: u8 = 0;
/// Stored cluster (no compression)
const COMP_STORED: u8 = 1;
/// LZMA-family compressed cluster (XZ container)
const COMP_LZMA: u8 = 4;

/// Uniform reads into a cluster's decompressed stream, whatever its
/// compression tag says.
enum SliceReader<'a, R: ReadAt> {
    /// Pass-through for stored clusters: every offset shifted past the tag
    /// byte, no decoding
    Stored {
        source: &'a SegmentedSource<R>,
        base: u64,
    },
    Lzma(XzSliceReader<'a, R>),
}

impl<R: ReadAt> SliceReader<'_, R> {
    async fn read_slice(&mut self, offset: u64, len: usize) -> Result<Vec<u8>> {
        match self {
            SliceReader::Stored { source, base } => source.read_range(*base + offset, len).await,
            SliceReader::Lzma(reader) => reader.read_slice(offset, len).await,
        }
    }
}

impl<R: ReadAt> ZimParser<R> {
    /// Resolve `(cluster, blob)` to the blob's decompressed bytes.
    ///
    /// A cluster with an unsupported compression tag yields an empty blob
    /// (logged, not an error) so the rest of the archive stays readable.
    /// Short reads anywhere degrade to a short or empty payload — "content
    /// not available" is the caller's interpretation, never a crash.
    pub async fn blob(&self, cluster: u32, blob: u32) -> Result<Vec<u8>> {
        let (start, next) = self.cluster_bounds(cluster).await?;

        let tag = match self.source().read_range(start, 1).await?.first() {
            Some(&tag) => tag,
            None => return Ok(Vec::new()),
        };

        let mut reader = match tag {
            COMP_STORED_LEGACY | COMP_STORED => SliceReader::Stored {
                source: self.source(),
                base: start + 1,
            },
            COMP_LZMA => SliceReader::Lzma(XzSliceReader::new(
                self.source(),
                start + 1,
                next.saturating_sub(start + 1),
            )?),
            other => {
                warn!(cluster, tag = other, "unsupported cluster compression, returning empty blob");
                return Ok(Vec::new());
            }
        };

        // Blob boundary pair, then the payload between the boundaries. The
        // second read's offset is never below the first's end, so the
        // compressed path decodes each byte once.
        let pair = reader.read_slice(blob as u64 * 4, 8).await?;
        if pair.len() < 8 {
            return Ok(Vec::new());
        }
        let mut cursor = Cursor::new(&pair);
        let blob_start = cursor.read_u32::<LittleEndian>()? as u64;
        let blob_end = cursor.read_u32::<LittleEndian>()? as u64;

        let len = blob_end.saturating_sub(blob_start) as usize;
        reader.read_slice(blob_start, len).await
    }
}
