use super::ReadAt;
use crate::error::Result;

/// One physical volume of a (possibly split) archive.
struct Segment<R> {
    start: u64,
    size: u64,
    inner: R,
}

/// Unifies one or more physical volumes into a single logical byte range.
///
/// Split archives ship as `name.zimaa`, `name.zimab`, … whose concatenation
/// in case-insensitive name order is the logical archive. That naming
/// convention is an external contract: construction sorts the provided
/// volumes accordingly before laying out the address space.
pub struct SegmentedSource<R: ReadAt> {
    segments: Vec<Segment<R>>,
    total: u64,
}

impl<R: ReadAt> SegmentedSource<R> {
    /// Build a source from named volumes. Volumes are sorted by
    /// case-insensitive name; the logical address space is their
    /// concatenation in that order.
    pub fn from_volumes(mut volumes: Vec<(String, R)>) -> Self {
        volumes.sort_by_key(|(name, _)| name.to_uppercase());

        let mut segments = Vec::with_capacity(volumes.len());
        let mut start = 0u64;
        for (_, inner) in volumes {
            let size = inner.size();
            segments.push(Segment { start, size, inner });
            start += size;
        }

        Self {
            segments,
            total: start,
        }
    }

    /// Single-volume source (one local file, one buffer, one URL).
    pub fn single(inner: R) -> Self {
        Self::from_volumes(vec![(String::new(), inner)])
    }

    /// Total size of the logical address space
    pub fn size(&self) -> u64 {
        self.total
    }

    /// Read `len` bytes at `offset` from the logical address space.
    ///
    /// A request that extends past the end returns the bytes that exist; a
    /// zero-length or fully-out-of-range request returns an empty vector.
    /// A spanning request is served by partial reads against each
    /// overlapping volume, concatenated in order.
    pub async fn read_range(&self, offset: u64, len: usize) -> Result<Vec<u8>> {
        if len == 0 || offset >= self.total {
            return Ok(Vec::new());
        }

        let end = offset + len as u64;
        let mut out = Vec::with_capacity(len.min((self.total - offset) as usize));

        for segment in &self.segments {
            let seg_end = segment.start + segment.size;
            if seg_end <= offset || segment.start >= end {
                continue;
            }

            let read_start = offset.max(segment.start) - segment.start;
            let read_len = (end.min(seg_end) - segment.start - read_start) as usize;

            let mut buf = vec![0u8; read_len];
            let n = segment.inner.read_at(read_start, &mut buf).await?;
            out.extend_from_slice(&buf[..n]);
            if n < read_len {
                // Short volume read: stop rather than stitch a gap.
                break;
            }
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::MemoryVolume;

    fn three_part_source() -> (SegmentedSource<MemoryVolume>, Vec<u8>) {
        // Sizes 10, 5, 20 — the same bytes as one contiguous 35-byte buffer.
        let whole: Vec<u8> = (0u8..35).collect();
        let source = SegmentedSource::from_volumes(vec![
            ("part.aa".to_string(), MemoryVolume::new(whole[..10].to_vec())),
            ("part.ab".to_string(), MemoryVolume::new(whole[10..15].to_vec())),
            ("part.ac".to_string(), MemoryVolume::new(whole[15..].to_vec())),
        ]);
        (source, whole)
    }

    #[tokio::test]
    async fn spanning_read_matches_contiguous_buffer() {
        let (source, whole) = three_part_source();
        let got = source.read_range(8, 15).await.unwrap();
        assert_eq!(got, &whole[8..23]);
    }

    #[tokio::test]
    async fn read_within_one_segment() {
        let (source, whole) = three_part_source();
        assert_eq!(source.read_range(11, 3).await.unwrap(), &whole[11..14]);
    }

    #[tokio::test]
    async fn read_past_end_is_short() {
        let (source, whole) = three_part_source();
        assert_eq!(source.read_range(30, 100).await.unwrap(), &whole[30..]);
    }

    #[tokio::test]
    async fn zero_length_and_out_of_range_reads_are_empty() {
        let (source, _) = three_part_source();
        assert!(source.read_range(5, 0).await.unwrap().is_empty());
        assert!(source.read_range(35, 4).await.unwrap().is_empty());
        assert!(source.read_range(1000, 4).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn volumes_are_ordered_case_insensitively() {
        let source = SegmentedSource::from_volumes(vec![
            ("w.zimAB".to_string(), MemoryVolume::new(vec![2, 2])),
            ("w.zimaa".to_string(), MemoryVolume::new(vec![1, 1])),
            ("W.ZIMAC".to_string(), MemoryVolume::new(vec![3, 3])),
        ]);
        assert_eq!(
            source.read_range(0, 6).await.unwrap(),
            vec![1, 1, 2, 2, 3, 3]
        );
    }
}
