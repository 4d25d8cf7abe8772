//! Low-level ZIM archive parser.
//!
//! This module handles the binary parsing of ZIM structures, reading from
//! any source that implements the [`ReadAt`] trait behind a
//! [`SegmentedSource`].
//!
//! ## Parsing Strategy
//!
//! A ZIM archive is read from the front: the fixed 80-byte header names the
//! positions of four pointer lists (URL order, title order, clusters, mime
//! types). Everything else is decoded lazily — a pointer-list slot is one
//! small read, a directory entry one window read, a blob one cluster
//! resolution. Nothing beyond the header is fetched eagerly, which keeps
//! remote archives cheap to open over HTTP Range requests.
//!
//! Pointer-list reads are pure `(base, stride, index)` arithmetic and are
//! deliberately never validated against the header's declared counts:
//! archives in the wild carry off-by-one metadata, and the bounds are
//! enforced by what the byte source can actually supply.

use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Cursor;

use crate::error::{Result, ZimError};
use crate::io::{ReadAt, SegmentedSource};

use super::dirent::{DirEntry, ENTRY_WINDOW};
use super::header::ZimHeader;

/// Chunk size for scanning the mime-type table
const MIME_CHUNK: usize = 1024;

/// Low-level ZIM parser: header plus pointer-list and entry decoding.
///
/// Typically used through [`ZimArchive`](super::ZimArchive) rather than
/// directly.
pub struct ZimParser<R: ReadAt> {
    source: SegmentedSource<R>,
    header: ZimHeader,
}

impl<R: ReadAt> ZimParser<R> {
    /// Read and decode the header, the only eager read.
    ///
    /// Fails with [`ZimError::MalformedHeader`] if the source cannot supply
    /// 80 plausible header bytes.
    pub async fn open(source: SegmentedSource<R>) -> Result<Self> {
        let buf = source.read_range(0, ZimHeader::SIZE).await?;
        let header = ZimHeader::from_bytes(&buf)?;
        Ok(Self { source, header })
    }

    pub fn header(&self) -> &ZimHeader {
        &self.header
    }

    pub(crate) fn source(&self) -> &SegmentedSource<R> {
        &self.source
    }

    /// Absolute byte offset of the directory entry at URL-order `index`
    /// (8-byte slots at `url_ptr_pos`).
    pub async fn url_pointer(&self, index: u32) -> Result<u64> {
        let pos = self.header.url_ptr_pos + index as u64 * 8;
        let buf = self.source.read_range(pos, 8).await?;
        if buf.len() < 8 {
            return Err(ZimError::Index { index });
        }
        Ok(Cursor::new(&buf).read_u64::<LittleEndian>()?)
    }

    /// URL-order index of the entry at title-order `index`
    /// (4-byte slots at `title_ptr_pos`).
    pub async fn title_pointer(&self, index: u32) -> Result<u32> {
        let pos = self.header.title_ptr_pos + index as u64 * 4;
        let buf = self.source.read_range(pos, 4).await?;
        if buf.len() < 4 {
            return Err(ZimError::Index { index });
        }
        Ok(Cursor::new(&buf).read_u32::<LittleEndian>()?)
    }

    /// Start offset of `cluster` and of the cluster after it. The second
    /// value only bounds decompression; the list carries one sentinel slot
    /// past the last cluster for exactly this purpose.
    pub async fn cluster_bounds(&self, cluster: u32) -> Result<(u64, u64)> {
        let pos = self.header.cluster_ptr_pos + cluster as u64 * 8;
        let buf = self.source.read_range(pos, 16).await?;
        if buf.len() < 16 {
            return Err(ZimError::OutOfRange { offset: pos });
        }
        let mut cursor = Cursor::new(&buf);
        let start = cursor.read_u64::<LittleEndian>()?;
        let next = cursor.read_u64::<LittleEndian>()?;
        Ok((start, next))
    }

    /// Decode the directory entry at an absolute byte offset.
    pub async fn entry_at(&self, offset: u64) -> Result<DirEntry> {
        let window = self.source.read_range(offset, ENTRY_WINDOW).await?;
        DirEntry::from_window(offset, &window)
    }

    /// Parse the mime-type table: null-terminated strings starting at
    /// `mime_list_pos`, ended by an empty string. Read in chunks until the
    /// terminator shows up; not cached.
    pub async fn mime_table(&self) -> Result<Vec<String>> {
        let mut raw: Vec<u8> = Vec::new();
        let mut pos = self.header.mime_list_pos;
        loop {
            let chunk = self.source.read_range(pos, MIME_CHUNK).await?;
            let n = chunk.len();
            raw.extend_from_slice(&chunk);
            if n < MIME_CHUNK || raw.windows(2).any(|w| w == [0, 0]) {
                break;
            }
            pos += n as u64;
        }

        let mut types = Vec::new();
        let mut rest = raw.as_slice();
        while let Some(nul) = rest.iter().position(|&b| b == 0) {
            if nul == 0 {
                break; // empty string terminates the table
            }
            types.push(String::from_utf8_lossy(&rest[..nul]).into_owned());
            rest = &rest[nul + 1..];
        }
        Ok(types)
    }
}
