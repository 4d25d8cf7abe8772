use std::cmp::Ordering;

use crate::error::{Result, ZimError};
use crate::io::{ReadAt, SegmentedSource};

use super::dirent::{DirEntry, EntryKind};
use super::header::ZimHeader;
use super::parser::ZimParser;

/// Redirect chains longer than this are treated as cycles. The format
/// itself never needs more than one hop; the bound exists so a self- or
/// mutually-redirecting archive errors out instead of looping.
const MAX_REDIRECT_HOPS: u32 = 8;

/// High-level read facade over one open ZIM archive.
///
/// Immutable after `open`; every operation takes `&self` and concurrent
/// reads are independently schedulable (decompression state is scoped to
/// each call). Entries returned from lookups hold no reference back to the
/// archive — pass them to [`read_blob`](Self::read_blob) or
/// [`resolve_redirect`](Self::resolve_redirect) to go further.
pub struct ZimArchive<R: ReadAt> {
    parser: ZimParser<R>,
}

impl<R: ReadAt> ZimArchive<R> {
    /// Open an archive over a segmented byte source: reads the 80-byte
    /// header, nothing else.
    pub async fn open(source: SegmentedSource<R>) -> Result<Self> {
        Ok(Self {
            parser: ZimParser::open(source).await?,
        })
    }

    pub fn header(&self) -> &ZimHeader {
        self.parser.header()
    }

    pub fn article_count(&self) -> u32 {
        self.parser.header().article_count
    }

    pub fn cluster_count(&self) -> u32 {
        self.parser.header().cluster_count
    }

    /// URL index of the main page, when the archive declares one
    pub fn main_page(&self) -> Option<u32> {
        self.parser.header().main_page()
    }

    /// URL index of the layout page, when the archive declares one
    pub fn layout_page(&self) -> Option<u32> {
        self.parser.header().layout_page()
    }

    pub fn uuid(&self) -> [u8; 16] {
        self.parser.header().uuid
    }

    /// The archive's mime-type string table; `DirEntry::mimetype` indexes
    /// into it (redirects use the `0xFFFF` sentinel instead).
    pub async fn mime_table(&self) -> Result<Vec<String>> {
        self.parser.mime_table().await
    }

    /// Entry at `index` of the URL-sorted pointer list
    pub async fn entry_by_url_index(&self, index: u32) -> Result<DirEntry> {
        let offset = self.parser.url_pointer(index).await?;
        self.parser.entry_at(offset).await
    }

    /// Entry at `index` of the title-sorted pointer list.
    ///
    /// Iterating `0..article_count` here yields entries in title order,
    /// which is what makes binary search over titles possible for callers
    /// without decoding every entry.
    pub async fn entry_by_title_index(&self, index: u32) -> Result<DirEntry> {
        let url_index = self.parser.title_pointer(index).await?;
        self.entry_by_url_index(url_index).await
    }

    /// Exact-match lookup by namespace and URL: binary search over the
    /// URL-sorted pointer list, `O(log n)` entry decodes.
    pub async fn entry_by_url(&self, namespace: char, url: &str) -> Result<Option<DirEntry>> {
        let mut lo = 0u32;
        let mut hi = self.article_count();
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            let entry = self.entry_by_url_index(mid).await?;
            match (entry.namespace, entry.url.as_str()).cmp(&(namespace, url)) {
                Ordering::Equal => return Ok(Some(entry)),
                Ordering::Less => lo = mid + 1,
                Ordering::Greater => hi = mid,
            }
        }
        Ok(None)
    }

    /// Follow redirects until a content entry is reached. Content entries
    /// pass through unchanged; chains longer than the hop bound (including
    /// self-redirects) fail with [`ZimError::RedirectCycle`].
    pub async fn resolve_redirect(&self, entry: DirEntry) -> Result<DirEntry> {
        let mut current = entry;
        let mut hops = 0u32;
        loop {
            let target = match current.kind {
                EntryKind::Content { .. } => return Ok(current),
                EntryKind::Redirect { target } => target,
            };
            hops += 1;
            if hops > MAX_REDIRECT_HOPS {
                return Err(ZimError::RedirectCycle { hops });
            }
            current = self.entry_by_url_index(target).await?;
        }
    }

    /// Decompressed payload of a content entry.
    ///
    /// Fails with [`ZimError::NotContent`] for redirects; resolve them
    /// first (or use [`read_entry`](Self::read_entry)).
    pub async fn read_blob(&self, entry: &DirEntry) -> Result<Vec<u8>> {
        match entry.kind {
            EntryKind::Content { cluster, blob } => self.parser.blob(cluster, blob).await,
            EntryKind::Redirect { .. } => Err(ZimError::NotContent),
        }
    }

    /// Convenience: resolve redirects, then read the blob.
    pub async fn read_entry(&self, entry: DirEntry) -> Result<Vec<u8>> {
        let entry = self.resolve_redirect(entry).await?;
        self.read_blob(&entry).await
    }

    /// Decode the main-page entry, when the archive declares one
    pub async fn main_page_entry(&self) -> Result<Option<DirEntry>> {
        match self.main_page() {
            Some(index) => Ok(Some(self.entry_by_url_index(index).await?)),
            None => Ok(None),
        }
    }
}
