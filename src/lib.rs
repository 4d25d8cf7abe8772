//! # zimcat
//!
//! A random-access ZIM archive reader with HTTP URL support using Range
//! requests.
//!
//! This library reads ZIM archives — compressed, indexed containers of
//! encyclopedia-like corpora — from the local filesystem (including split
//! multi-volume sets), from memory, or from remote HTTP servers. Nothing is
//! fetched eagerly beyond the 80-byte header: entry lookups and blob reads
//! are small targeted reads, which makes browsing a multi-gigabyte remote
//! archive practical without downloading it.
//!
//! ## Features
//!
//! - Local, in-memory and HTTP/HTTPS byte sources behind one trait
//! - Split archives (`.zimaa`, `.zimab`, …) mounted as one logical file
//! - Entry lookup by URL, by URL index and by title index
//! - Stored and LZMA/XZ cluster decompression with streamed random access
//! - Redirect resolution with a cycle guard
//!
//! ## Example
//!
//! ```no_run
//! use zimcat::{HttpVolume, SegmentedSource, ZimArchive};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Open a remote archive; only the header is fetched here.
//!     let volume = HttpVolume::open("https://example.com/wiki.zim".to_string()).await?;
//!     let archive = ZimArchive::open(SegmentedSource::single(volume)).await?;
//!
//!     // Look up an article and read its content.
//!     if let Some(entry) = archive.entry_by_url('A', "Ray_Charles.html").await? {
//!         let entry = archive.resolve_redirect(entry).await?;
//!         let html = archive.read_blob(&entry).await?;
//!         println!("{} bytes", html.len());
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod error;
pub mod io;
pub mod zim;

pub use cli::Cli;
pub use error::{Result, ZimError};
pub use io::{HttpVolume, LocalVolume, MemoryVolume, ReadAt, SegmentedSource};
pub use zim::{DirEntry, EntryKind, ZimArchive, ZimHeader, ZimParser};
