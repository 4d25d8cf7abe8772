mod http;
mod local;
mod memory;
mod segmented;

pub use http::HttpVolume;
pub use local::LocalVolume;
pub use memory::MemoryVolume;
pub use segmented::SegmentedSource;

use crate::error::Result;
use async_trait::async_trait;

/// Trait for random access reading from one physical byte provider
/// (a local file, an in-memory buffer, or a remote object).
///
/// Implementations must resolve their total size before the first read is
/// issued; `size` is therefore synchronous and infallible.
#[async_trait]
pub trait ReadAt: Send + Sync {
    /// Read data at the specified offset into the buffer.
    ///
    /// Returns the number of bytes read, which may be less than the buffer
    /// length near the end of the source. A read entirely past the end
    /// returns 0 rather than failing.
    async fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize>;

    /// Get the total size of the data source
    fn size(&self) -> u64;
}

#[async_trait]
impl<T: ReadAt + ?Sized> ReadAt for std::sync::Arc<T> {
    async fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize> {
        (**self).read_at(offset, buf).await
    }

    fn size(&self) -> u64 {
        (**self).size()
    }
}
