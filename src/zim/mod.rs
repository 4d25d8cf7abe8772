//! ZIM archive parsing and content access.
//!
//! This module provides random-access reads of ZIM archives — the
//! compressed, indexed container format used for offline encyclopedia
//! snapshots and similar document corpora.
//!
//! ## Architecture
//!
//! The module is organized in layers:
//!
//! - [`header`]: the fixed 80-byte archive header
//! - [`dirent`]: directory entries (content and redirect records)
//! - [`parser`]: low-level pointer-list and entry decoding over a byte source
//! - [`cluster`] / [`decompress`]: blob resolution inside stored or
//!   LZMA-compressed clusters
//! - [`archive`]: the high-level [`ZimArchive`] facade
//!
//! ## ZIM Format Overview
//!
//! A ZIM archive holds a header, a mime-type string table, directory
//! entries indexed twice (sorted by URL and by title), and a series of
//! clusters, each bundling many content blobs behind one compression
//! envelope. Both indices are fixed-stride pointer lists, so any entry is
//! reachable with two small reads — perfect for HTTP Range access where
//! fetching the whole archive is not an option.
//!
//! ## Supported Features
//!
//! - Single-file, split (`.zimaa`, `.zimab`, …) and remote archives
//! - Stored (uncompressed) and LZMA/XZ compressed clusters
//! - URL and title index lookups, redirect resolution, main page access
//!
//! ## Limitations
//!
//! - Read-only (the format is read-only in this system)
//! - Clusters using other compression schemes yield empty content
//! - Directory entries are decoded from a fixed 2048-byte window; an entry
//!   with a pathologically long URL+title is rejected as malformed

mod archive;
mod cluster;
mod decompress;
mod dirent;
mod header;
mod parser;

pub use archive::ZimArchive;
pub use dirent::{DirEntry, EntryKind, REDIRECT_MIMETYPE};
pub use header::ZimHeader;
pub use parser::ZimParser;
