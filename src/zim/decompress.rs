//! Streaming decompression of one compressed cluster.
//!
//! LZMA-family streams only decode forward, but cluster resolution needs
//! random offsets into the decompressed output. Within one blob resolution
//! the offsets are monotonically increasing (blob boundary table first,
//! payload second), so the reader keeps its decoder state between calls and
//! only restarts from the stream start on a backward seek.

use tracing::trace;
use xz2::stream::{Action, Status, Stream};

use crate::error::Result;
use crate::io::{ReadAt, SegmentedSource};

/// Compressed bytes fetched from the byte source per refill
const INPUT_CHUNK: usize = 4 * 1024;

/// Decoder output scratch size per step
const OUTPUT_CHUNK: usize = 32 * 1024;

/// Random-offset reads over the decompressed output of one XZ/LZMA cluster.
///
/// State is scoped to a single resolution call sequence and never shared:
/// concurrent blob reads each construct their own reader.
pub(crate) struct XzSliceReader<'a, R: ReadAt> {
    source: &'a SegmentedSource<R>,
    /// First compressed byte (just past the cluster's compression tag)
    region_start: u64,
    /// Compressed region length, bounded by the next cluster's start
    region_len: u64,
    stream: Stream,
    /// Compressed bytes fetched so far
    in_pos: u64,
    in_buf: Vec<u8>,
    in_off: usize,
    /// Decompressed bytes produced so far == current position in the
    /// conceptual decompressed stream
    out_pos: u64,
    eof: bool,
}

impl<'a, R: ReadAt> XzSliceReader<'a, R> {
    pub fn new(source: &'a SegmentedSource<R>, region_start: u64, region_len: u64) -> Result<Self> {
        Ok(Self {
            source,
            region_start,
            region_len,
            stream: Stream::new_stream_decoder(u64::MAX, 0)?,
            in_pos: 0,
            in_buf: Vec::new(),
            in_off: 0,
            out_pos: 0,
            eof: false,
        })
    }

    fn restart(&mut self) -> Result<()> {
        trace!(out_pos = self.out_pos, "backward seek, restarting lzma stream");
        self.stream = Stream::new_stream_decoder(u64::MAX, 0)?;
        self.in_pos = 0;
        self.in_buf.clear();
        self.in_off = 0;
        self.out_pos = 0;
        self.eof = false;
        Ok(())
    }

    /// Read `[offset, offset+len)` from the decompressed stream.
    ///
    /// Consecutive reads `[a,b)` then `[b,c)` decode each byte exactly once;
    /// the result is short when the stream ends before `offset+len`.
    pub async fn read_slice(&mut self, offset: u64, len: usize) -> Result<Vec<u8>> {
        if offset < self.out_pos {
            self.restart()?;
        }

        let end = offset + len as u64;
        let mut out = Vec::with_capacity(len);
        let mut scratch = vec![0u8; OUTPUT_CHUNK];

        while self.out_pos < end && !self.eof {
            if self.in_off == self.in_buf.len() {
                let remaining = self.region_len.saturating_sub(self.in_pos);
                let want = INPUT_CHUNK.min(remaining as usize);
                if want == 0 {
                    break;
                }
                self.in_buf = self
                    .source
                    .read_range(self.region_start + self.in_pos, want)
                    .await?;
                self.in_off = 0;
                if self.in_buf.is_empty() {
                    break;
                }
                self.in_pos += self.in_buf.len() as u64;
            }

            // Never decode past `end`: the next monotonic read then resumes
            // exactly where this one stopped instead of restarting.
            let step = ((end - self.out_pos) as usize).min(OUTPUT_CHUNK);
            let before_in = self.stream.total_in();
            let before_out = self.stream.total_out();
            let status = self.stream.process(
                &self.in_buf[self.in_off..],
                &mut scratch[..step],
                Action::Run,
            )?;
            let consumed = (self.stream.total_in() - before_in) as usize;
            let produced = (self.stream.total_out() - before_out) as usize;
            self.in_off += consumed;

            let produced_at = self.out_pos;
            self.out_pos += produced as u64;
            if self.out_pos > offset {
                let from = offset.saturating_sub(produced_at) as usize;
                let to = produced.min((end - produced_at) as usize);
                out.extend_from_slice(&scratch[from..to]);
            }

            if matches!(status, Status::StreamEnd) {
                self.eof = true;
            } else if consumed == 0 && produced == 0 {
                // Decoder made no progress on non-empty input; bail out
                // instead of spinning.
                break;
            }
        }

        Ok(out)
    }
}
