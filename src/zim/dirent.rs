use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Cursor;

use crate::error::{Result, ZimError};

/// Mimetype code marking a redirect entry
pub const REDIRECT_MIMETYPE: u16 = 0xFFFF;

/// Fixed decode window for one directory entry. Generous enough for
/// mimetype + pointers + URL + title on real archives; an entry whose
/// URL+title overflow it is rejected as malformed rather than silently
/// truncated (known limitation inherited from the format's readers).
pub const ENTRY_WINDOW: usize = 2048;

/// What a directory entry points at: article bytes, or another entry.
///
/// Content and redirect entries share no further behavior, so the two
/// shapes are a plain tagged enum dispatched once at decode time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Content entry: payload lives in `blob` of `cluster`
    Content { cluster: u32, blob: u32 },
    /// Redirect entry: alias for the entry at this URL index
    Redirect { target: u32 },
}

/// One decoded directory entry (article, image, metadata item or redirect).
///
/// Self-contained: holds no reference to the archive it came from. Pass it
/// back to the archive facade for blob reads and redirect resolution.
#[derive(Debug, Clone)]
pub struct DirEntry {
    /// Byte offset this entry was decoded from — its stable identity
    /// within one open archive
    pub offset: u64,
    pub mimetype: u16,
    /// Length of the extra-parameter record following the title (unused by
    /// current archives, carried for completeness)
    pub parameter_len: u8,
    /// Single-character namespace: `A` article, `I` image, `-` metadata, …
    /// Opaque data, not a closed set.
    pub namespace: char,
    pub kind: EntryKind,
    pub url: String,
    /// Entry title; equals `url` when the record carries an empty title
    pub title: String,
}

impl DirEntry {
    pub fn is_redirect(&self) -> bool {
        matches!(self.kind, EntryKind::Redirect { .. })
    }

    /// Decode one entry from its window. Byte layout:
    /// mimetype u16 at 0, parameter length u8 at 2, namespace at 3, then
    /// for redirects the target URL index u32 at 8 with strings from 12,
    /// for content cluster u32 at 8 and blob u32 at 12 with strings from 16.
    /// URL and title are null-terminated, title defaulting to URL.
    pub(crate) fn from_window(offset: u64, data: &[u8]) -> Result<Self> {
        if data.len() < 12 {
            return Err(ZimError::MalformedEntry { offset });
        }

        let mut cursor = Cursor::new(data);
        let mimetype = cursor.read_u16::<LittleEndian>()?;
        let parameter_len = cursor.read_u8()?;
        let namespace = data[3] as char;

        cursor.set_position(8);
        let (kind, strings_at) = if mimetype == REDIRECT_MIMETYPE {
            let target = cursor.read_u32::<LittleEndian>()?;
            (EntryKind::Redirect { target }, 12)
        } else {
            if data.len() < 16 {
                return Err(ZimError::MalformedEntry { offset });
            }
            let cluster = cursor.read_u32::<LittleEndian>()?;
            let blob = cursor.read_u32::<LittleEndian>()?;
            (EntryKind::Content { cluster, blob }, 16)
        };

        let (url, title_at) = read_terminated(data, strings_at, offset)?;
        let (title, _) = read_terminated(data, title_at, offset)?;
        let title = if title.is_empty() { url.clone() } else { title };

        Ok(Self {
            offset,
            mimetype,
            parameter_len,
            namespace,
            kind,
            url,
            title,
        })
    }
}

/// Decode the null-terminated string starting at `start`, returning it and
/// the offset just past its terminator. Non-UTF-8 bytes are replaced
/// rather than failing the whole entry.
fn read_terminated(data: &[u8], start: usize, entry_offset: u64) -> Result<(String, usize)> {
    let rest = data.get(start..).ok_or(ZimError::MalformedEntry {
        offset: entry_offset,
    })?;
    let nul = rest
        .iter()
        .position(|&b| b == 0)
        .ok_or(ZimError::MalformedEntry {
            offset: entry_offset,
        })?;
    let s = String::from_utf8_lossy(&rest[..nul]).into_owned();
    Ok((s, start + nul + 1))
}
