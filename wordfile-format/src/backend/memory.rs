use std::collections::{HashMap, HashSet};
use std::io;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use super::{Backend, TokenBuf};
use crate::store::AccessMode;

#[derive(Debug, Default)]
struct Shared {
    files: HashMap<PathBuf, String>,
    failing_reads: HashSet<usize>,
    failing_writes: bool,
}

/// In-memory store keyed by path. Clones share the same contents.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    shared: Arc<Mutex<Shared>>,
}

#[derive(Debug)]
pub struct MemoryResource {
    path: PathBuf,
    mode: AccessMode,
    /// Snapshot taken at open; writes go to the shared map only.
    tokens: Vec<String>,
}

impl MemoryBackend {
    pub fn new() -> MemoryBackend {
        MemoryBackend::default()
    }

    #[inline(always)]
    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn insert<P: AsRef<Path>, S: Into<String>>(&self, path: P, text: S) {
        self.lock()
            .files
            .insert(path.as_ref().to_path_buf(), text.into());
    }

    pub fn contents<P: AsRef<Path>>(&self, path: P) -> Option<String> {
        self.lock().files.get(path.as_ref()).cloned()
    }

    /// Makes every read of the 1-based `index` fail, on any path.
    pub fn fail_reads_at(&self, index: usize) {
        self.lock().failing_reads.insert(index);
    }

    /// Makes every subsequent `write_all` fail without touching the contents.
    pub fn fail_writes(&self) {
        self.lock().failing_writes = true;
    }
}

impl Backend for MemoryBackend {
    type Resource = MemoryResource;

    fn open(&self, path: &Path, mode: AccessMode) -> io::Result<MemoryResource> {
        let mut shared = self.lock();

        let text = match shared.files.get(path).cloned() {
            Some(text) => text,
            None if mode == AccessMode::ReadWrite => {
                shared.files.insert(path.to_path_buf(), String::new());
                String::new()
            }
            None => {
                return Err(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("no in-memory store at {}", path.display()),
                ))
            }
        };

        Ok(MemoryResource {
            path: path.to_path_buf(),
            mode,
            tokens: text.split_whitespace().map(str::to_string).collect(),
        })
    }

    fn close(&self, _resource: MemoryResource) -> io::Result<()> {
        Ok(())
    }

    fn count(&self, resource: &MemoryResource) -> io::Result<usize> {
        Ok(resource.tokens.len())
    }

    fn read_token(
        &self,
        resource: &MemoryResource,
        index: NonZeroUsize,
        buf: &mut TokenBuf,
    ) -> io::Result<()> {
        if self.lock().failing_reads.contains(&index.get()) {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!("injected read failure at {}", index),
            ));
        }

        let token = resource.tokens.get(index.get() - 1).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("no token at position {}", index),
            )
        })?;
        buf.fill(token)
    }

    fn write_all(&self, resource: &mut MemoryResource, text: &str) -> io::Result<()> {
        if resource.mode != AccessMode::ReadWrite {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "resource was opened read-only",
            ));
        }

        let mut shared = self.lock();
        if shared.failing_writes {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!("injected write failure at {}", resource.path.display()),
            ));
        }
        shared.files.insert(resource.path.clone(), text.to_string());
        Ok(())
    }
}
