use std::fmt;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::backend::{Backend, TextFileBackend, TokenBuf};
use crate::error::{Operation, StoreError};
use crate::token::Token;

/// Longest token a 255-byte, NUL-terminated read buffer can hold.
pub const DEFAULT_MAX_TOKEN_LEN: usize = 254;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessMode {
    ReadOnly,
    ReadWrite,
}

impl AccessMode {
    pub fn as_str(&self) -> &str {
        match self {
            AccessMode::ReadOnly => "read-only",
            AccessMode::ReadWrite => "read-write",
        }
    }

    pub fn is_writable(&self) -> bool {
        *self == AccessMode::ReadWrite
    }
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccessMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "r" | "read" | "read-only" => Ok(AccessMode::ReadOnly),
            "w" | "rw" | "write" | "read-write" => Ok(AccessMode::ReadWrite),
            _ => Err(format!(
                "invalid access mode: {:?} (expected \"read\" or \"write\")",
                s
            )),
        }
    }
}

/// Options for opening a token store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreOptions {
    /// Longest token, in characters, a read may return. `None` is unbounded.
    pub max_token_len: Option<usize>,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            max_token_len: Some(DEFAULT_MAX_TOKEN_LEN),
        }
    }
}

impl StoreOptions {
    pub fn with_max_token_len(mut self, max_token_len: Option<usize>) -> Self {
        self.max_token_len = max_token_len;
        self
    }
}

#[derive(Debug)]
struct Opened<R> {
    resource: R,
    mode: AccessMode,
}

/// Owns at most one live backend resource for a single path.
///
/// A store is either open, with every operation available, or closed, where everything
/// except [`reopen`](TokenStore::reopen) and [`close`](TokenStore::close) fails with
/// [`StoreError::Closed`]. Dropping an open store releases its resource.
pub struct TokenStore<B: Backend = TextFileBackend> {
    backend: B,
    path: PathBuf,
    options: StoreOptions,
    opened: Option<Opened<B::Resource>>,
}

impl<B: Backend> fmt::Debug for TokenStore<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenStore")
            .field("path", &self.path)
            .field("options", &self.options)
            .field("mode", &self.mode())
            .finish_non_exhaustive()
    }
}

impl<B: Backend> Drop for TokenStore<B> {
    fn drop(&mut self) {
        if let Some(opened) = self.opened.take() {
            tracing::warn!(
                "TokenStore dropped without calling close(). Releasing {:?} ({}).",
                self.path,
                opened.mode
            );
            if let Err(e) = self.backend.close(opened.resource) {
                tracing::warn!(error = %e, path = %self.path.display(), "release on drop failed");
            }
        }
    }
}

impl TokenStore<TextFileBackend> {
    /// Opens a plain text file as a token store with default options.
    pub fn open<P: AsRef<Path>>(path: P, mode: AccessMode) -> Result<Self, StoreError> {
        Self::open_with(TextFileBackend, path, mode, StoreOptions::default())
    }
}

impl<B: Backend> TokenStore<B> {
    pub fn open_with<P: AsRef<Path>>(
        backend: B,
        path: P,
        mode: AccessMode,
        options: StoreOptions,
    ) -> Result<Self, StoreError> {
        let mut store = TokenStore {
            backend,
            path: path.as_ref().to_path_buf(),
            options,
            opened: None,
        };
        store.open_inner(mode)?;
        Ok(store)
    }

    fn open_inner(&mut self, mode: AccessMode) -> Result<(), StoreError> {
        let resource = self
            .backend
            .open(&self.path, mode)
            .map_err(|source| StoreError::Open {
                path: self.path.clone(),
                mode,
                source,
            })?;

        tracing::debug!(path = %self.path.display(), %mode, "token store opened");
        self.opened = Some(Opened { resource, mode });
        Ok(())
    }

    /// Closes the current resource, if any, and opens the same path in `mode`.
    ///
    /// If opening fails the store is left closed.
    pub fn reopen(&mut self, mode: AccessMode) -> Result<(), StoreError> {
        self.close()?;
        self.open_inner(mode)
    }

    #[inline(always)]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[inline(always)]
    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    /// The access mode of the live resource, or `None` when closed.
    #[inline(always)]
    pub fn mode(&self) -> Option<AccessMode> {
        self.opened.as_ref().map(|o| o.mode)
    }

    #[inline(always)]
    pub fn is_open(&self) -> bool {
        self.opened.is_some()
    }

    fn opened(&self, op: Operation) -> Result<&Opened<B::Resource>, StoreError> {
        self.opened.as_ref().ok_or_else(|| StoreError::Closed {
            op,
            path: self.path.clone(),
        })
    }

    fn backend_error(&self, op: Operation, source: std::io::Error) -> StoreError {
        StoreError::Backend {
            op,
            path: self.path.clone(),
            source,
        }
    }

    pub fn count(&self) -> Result<usize, StoreError> {
        let opened = self.opened(Operation::Count)?;
        self.backend
            .count(&opened.resource)
            .map_err(|e| self.backend_error(Operation::Count, e))
    }

    /// Reads the token at the 1-based `index`.
    pub fn read_at(&self, index: usize) -> Result<Token, StoreError> {
        let count = self.count()?;
        self.read_checked(index, count)
    }

    fn read_checked(&self, index: usize, count: usize) -> Result<Token, StoreError> {
        let position = NonZeroUsize::new(index)
            .filter(|i| i.get() <= count)
            .ok_or_else(|| StoreError::Index {
                index,
                count,
                path: self.path.clone(),
            })?;

        let opened = self.opened(Operation::Read)?;
        let mut buf = TokenBuf::new(self.options.max_token_len);
        self.backend
            .read_token(&opened.resource, position, &mut buf)
            .map_err(|e| self.backend_error(Operation::Read, e))?;

        let token = Token::new(buf.as_str()).map_err(|e| {
            self.backend_error(
                Operation::Read,
                std::io::Error::new(std::io::ErrorKind::InvalidData, e),
            )
        })?;

        tracing::trace!(index, token = %token, "read token");
        Ok(token)
    }

    /// Drains every token in ascending position order.
    pub fn read_all(&self) -> Result<Vec<Token>, StoreError> {
        let count = self.count()?;
        let mut tokens = Vec::with_capacity(count);
        for index in 1..=count {
            tokens.push(self.read_checked(index, count)?);
        }
        tracing::debug!(path = %self.path.display(), count, "drained token store");
        Ok(tokens)
    }

    /// Replaces the whole backing content with `text`.
    ///
    /// Reads through this store are only guaranteed to see `text` after a reopen.
    pub fn write_all(&mut self, text: &str) -> Result<(), StoreError> {
        let path = &self.path;
        let opened = self.opened.as_mut().ok_or_else(|| StoreError::Closed {
            op: Operation::Write,
            path: path.clone(),
        })?;

        if !opened.mode.is_writable() {
            return Err(StoreError::Permission {
                op: Operation::Write,
                path: path.clone(),
            });
        }

        self.backend
            .write_all(&mut opened.resource, text)
            .map_err(|source| StoreError::Backend {
                op: Operation::Write,
                path: path.clone(),
                source,
            })?;

        tracing::debug!(path = %path.display(), bytes = text.len(), "token store rewritten");
        Ok(())
    }

    /// Releases the resource. Calling this on a closed store does nothing.
    pub fn close(&mut self) -> Result<(), StoreError> {
        match self.opened.take() {
            None => Ok(()),
            Some(opened) => {
                tracing::debug!(path = %self.path.display(), mode = %opened.mode, "token store closed");
                self.backend
                    .close(opened.resource)
                    .map_err(|e| self.backend_error(Operation::Close, e))
            }
        }
    }
}
