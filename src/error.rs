//! Error types shared across the crate.

use thiserror::Error;

/// Result type for ZIM operations
pub type Result<T> = std::result::Result<T, ZimError>;

/// Errors surfaced by the archive reader and its byte sources.
///
/// Unsupported cluster compression is deliberately NOT represented here:
/// such clusters yield an empty blob (with a diagnostic log line) so that
/// partially supported archives stay browsable.
#[derive(Debug, Error)]
pub enum ZimError {
    /// The 80-byte header could not be read in full, or its magic number
    /// does not identify a ZIM archive.
    #[error("archive header is missing, truncated or not a ZIM file")]
    MalformedHeader,

    /// A directory entry could not be decoded from its window
    /// (short read, or a URL/title without a null terminator).
    #[error("directory entry at offset {offset} is malformed")]
    MalformedEntry { offset: u64 },

    /// An absolute offset fell outside the logical address space.
    #[error("offset {offset} is outside the archive address space")]
    OutOfRange { offset: u64 },

    /// A pointer-list slot could not be read for this index.
    #[error("entry index {index} is out of range")]
    Index { index: u32 },

    /// A redirect chain did not reach a content entry within the hop
    /// bound (covers self-redirects and longer cycles).
    #[error("redirect chain exceeded {hops} hops")]
    RedirectCycle { hops: u32 },

    /// A blob read was attempted on a redirect entry.
    #[error("entry is a redirect, not content")]
    NotContent,

    /// The LZMA stream inside a cluster failed to decode.
    #[error("lzma stream error: {0}")]
    Decompress(#[from] xz2::stream::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("http request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),

    /// The remote server answered the HEAD probe without advertising
    /// byte-range support, so random access is impossible.
    #[error("remote server does not support Range requests")]
    RangeUnsupported,

    /// The remote server did not report a Content-Length, so the segment
    /// size cannot be resolved before reads are issued.
    #[error("remote server did not return Content-Length")]
    UnknownSize,
}
