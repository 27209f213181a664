//! Token store backends.
//!
//! A backend owns the storage format. It opens a resource for a path, reports how many
//! tokens the resource holds, reads a token by 1-based position and replaces the whole
//! content. It knows nothing about the transformations built on top of it.
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  TokenStore (open/closed state, errors) │
//! ├─────────────────────────────────────────┤
//! │  Backend                                │
//! │  - TextFileBackend (mmap/buffered file) │
//! │  - MemoryBackend (shared map, tests)    │
//! └─────────────────────────────────────────┘
//! ```

use std::io;
use std::num::NonZeroUsize;
use std::path::Path;

use crate::store::AccessMode;

mod memory;
mod text;

pub use memory::{MemoryBackend, MemoryResource};
pub use text::{TextFileBackend, TextResource};

/// Primitive operations of a token storage engine.
///
/// Implementations are not required to make `close` idempotent or to reject writes on
/// read-only resources; [`TokenStore`](crate::TokenStore) guards both.
pub trait Backend {
    type Resource;

    fn open(&self, path: &Path, mode: AccessMode) -> io::Result<Self::Resource>;

    fn close(&self, resource: Self::Resource) -> io::Result<()>;

    fn count(&self, resource: &Self::Resource) -> io::Result<usize>;

    /// Reads the token at the 1-based `index` into `buf`.
    fn read_token(
        &self,
        resource: &Self::Resource,
        index: NonZeroUsize,
        buf: &mut TokenBuf,
    ) -> io::Result<()>;

    fn write_all(&self, resource: &mut Self::Resource, text: &str) -> io::Result<()>;
}

/// Destination buffer for a single token read, bounded to a character capacity.
#[derive(Debug, Clone)]
pub struct TokenBuf {
    text: String,
    capacity: Option<usize>,
}

impl TokenBuf {
    /// `None` means unbounded.
    pub fn new(capacity: Option<usize>) -> TokenBuf {
        TokenBuf {
            text: String::new(),
            capacity,
        }
    }

    /// Replaces the buffer contents, failing if `token` does not fit.
    pub fn fill(&mut self, token: &str) -> io::Result<()> {
        if let Some(capacity) = self.capacity {
            let len = token.chars().count();
            if len > capacity {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!(
                        "token of {} characters exceeds buffer capacity of {}",
                        len, capacity
                    ),
                ));
            }
        }

        self.text.clear();
        self.text.push_str(token);
        Ok(())
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}
