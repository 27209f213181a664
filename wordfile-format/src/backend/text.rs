use std::fs::{File, OpenOptions};
use std::io::{self, prelude::*, BufWriter, SeekFrom};
use std::num::NonZeroUsize;
use std::ops::Range;
use std::path::{Path, PathBuf};

use memmap2::Mmap;

use super::{Backend, TokenBuf};
use crate::store::AccessMode;

/// Plain UTF-8 text files. Tokens are separated by any run of whitespace.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextFileBackend;

#[derive(Debug)]
enum Content {
    Empty,
    Mapped(Mmap),
    Buffered(Vec<u8>),
}

impl Content {
    #[inline(always)]
    fn as_bytes(&self) -> &[u8] {
        match self {
            Content::Empty => &[],
            Content::Mapped(mmap) => &mmap[..],
            Content::Buffered(buf) => buf.as_slice(),
        }
    }
}

#[derive(Debug)]
pub struct TextResource {
    file: File,
    path: PathBuf,
    mode: AccessMode,
    content: Content,
    /// Byte ranges of each token within `content`, in file order.
    spans: Vec<Range<usize>>,
}

impl TextResource {
    /// The token at `span`. Spans sit on char boundaries of content validated at
    /// open, so only the token's own bytes are checked here.
    fn token(&self, span: &Range<usize>) -> io::Result<&str> {
        let bytes = self.content.as_bytes().get(span.clone()).ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidData, "token span outside content")
        })?;
        std::str::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}

fn index_tokens(bytes: &[u8]) -> io::Result<Vec<Range<usize>>> {
    let text =
        std::str::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    let base = text.as_ptr() as usize;

    Ok(text
        .split_whitespace()
        .map(|word| {
            let start = word.as_ptr() as usize - base;
            start..start + word.len()
        })
        .collect())
}

impl Backend for TextFileBackend {
    type Resource = TextResource;

    fn open(&self, path: &Path, mode: AccessMode) -> io::Result<TextResource> {
        let (file, content) = match mode {
            AccessMode::ReadOnly => {
                let file = OpenOptions::new().read(true).open(path)?;
                let content = if file.metadata()?.len() == 0 {
                    Content::Empty
                } else {
                    // SAFETY: single-writer access is assumed; the map is dropped on close.
                    Content::Mapped(unsafe { Mmap::map(&file)? })
                };
                (file, content)
            }
            AccessMode::ReadWrite => {
                // Write mode never maps: truncating a file under a live map is undefined.
                let mut file = OpenOptions::new()
                    .read(true)
                    .write(true)
                    .create(true)
                    .truncate(false)
                    .open(path)?;
                let mut buf = Vec::new();
                file.read_to_end(&mut buf)?;
                (file, Content::Buffered(buf))
            }
        };

        let spans = index_tokens(content.as_bytes())?;

        tracing::debug!(
            path = %path.display(),
            %mode,
            bytes = content.as_bytes().len(),
            tokens = spans.len(),
            "opened text store"
        );

        Ok(TextResource {
            file,
            path: path.to_path_buf(),
            mode,
            content,
            spans,
        })
    }

    fn close(&self, resource: TextResource) -> io::Result<()> {
        if resource.mode == AccessMode::ReadWrite {
            resource.file.sync_all()?;
        }
        tracing::debug!(path = %resource.path.display(), "closed text store");
        Ok(())
    }

    fn count(&self, resource: &TextResource) -> io::Result<usize> {
        Ok(resource.spans.len())
    }

    fn read_token(
        &self,
        resource: &TextResource,
        index: NonZeroUsize,
        buf: &mut TokenBuf,
    ) -> io::Result<()> {
        let span = resource.spans.get(index.get() - 1).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("no token at position {}", index),
            )
        })?;

        buf.fill(resource.token(span)?)
    }

    fn write_all(&self, resource: &mut TextResource, text: &str) -> io::Result<()> {
        if resource.mode != AccessMode::ReadWrite {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "resource was opened read-only",
            ));
        }

        resource.file.set_len(0)?;
        resource.file.seek(SeekFrom::Start(0))?;

        let mut writer = BufWriter::new(&mut resource.file);
        writer.write_all(text.as_bytes())?;
        writer.flush()?;

        tracing::debug!(
            path = %resource.path.display(),
            bytes = text.len(),
            "rewrote text store"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_all(backend: &TextFileBackend, resource: &TextResource) -> Vec<String> {
        let count = backend.count(resource).unwrap();
        let mut buf = TokenBuf::new(None);
        (1..=count)
            .map(|i| {
                backend
                    .read_token(resource, NonZeroUsize::new(i).unwrap(), &mut buf)
                    .unwrap();
                buf.as_str().to_string()
            })
            .collect()
    }

    #[test]
    fn indexes_tokens_across_whitespace_kinds() {
        let spans = index_tokens("  one\ttwo\n\nthree ".as_bytes()).unwrap();
        assert_eq!(spans, vec![2..5, 6..9, 11..16]);
    }

    #[test]
    fn rejects_invalid_utf8() {
        let err = index_tokens(b"ok \xff\xfe").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn read_only_maps_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("words.txt");
        std::fs::write(&path, "cat dog  cat\nant").unwrap();

        let backend = TextFileBackend;
        let resource = backend.open(&path, AccessMode::ReadOnly).unwrap();
        assert!(matches!(resource.content, Content::Mapped(_)));
        assert_eq!(read_all(&backend, &resource), ["cat", "dog", "cat", "ant"]);
        backend.close(resource).unwrap();
    }

    #[test]
    fn empty_file_is_not_mapped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.txt");
        std::fs::write(&path, "").unwrap();

        let backend = TextFileBackend;
        let resource = backend.open(&path, AccessMode::ReadOnly).unwrap();
        assert!(matches!(resource.content, Content::Empty));
        assert_eq!(backend.count(&resource).unwrap(), 0);
    }

    #[test]
    fn drains_large_store_quickly() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("large.txt");
        let text = (0..200_000)
            .map(|i| format!("w{}", i % 977))
            .collect::<Vec<_>>()
            .join(" ");
        std::fs::write(&path, &text).unwrap();

        let backend = TextFileBackend;
        let resource = backend.open(&path, AccessMode::ReadOnly).unwrap();
        let started = std::time::Instant::now();
        let tokens = read_all(&backend, &resource);
        assert_eq!(tokens.len(), 200_000);
        assert_eq!(tokens[199_999], format!("w{}", 199_999 % 977));
        assert!(
            started.elapsed() < std::time::Duration::from_secs(5),
            "draining took {:?}",
            started.elapsed()
        );
        backend.close(resource).unwrap();
    }

    #[test]
    fn multibyte_tokens_read_back_intact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("utf8.txt");
        std::fs::write(&path, "дом  héllo	кот").unwrap();

        let backend = TextFileBackend;
        let resource = backend.open(&path, AccessMode::ReadOnly).unwrap();
        assert_eq!(read_all(&backend, &resource), ["дом", "héllo", "кот"]);
    }

    #[test]
    fn read_only_requires_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = TextFileBackend
            .open(&dir.path().join("missing.txt"), AccessMode::ReadOnly)
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn read_write_creates_and_replaces_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("new.txt");

        let backend = TextFileBackend;
        let mut resource = backend.open(&path, AccessMode::ReadWrite).unwrap();
        assert_eq!(backend.count(&resource).unwrap(), 0);
        backend.write_all(&mut resource, "a much longer text").unwrap();
        backend.write_all(&mut resource, "short").unwrap();
        backend.close(resource).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "short");
    }

    #[test]
    fn write_on_read_only_resource_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("words.txt");
        std::fs::write(&path, "keep me").unwrap();

        let backend = TextFileBackend;
        let mut resource = backend.open(&path, AccessMode::ReadOnly).unwrap();
        let err = backend.write_all(&mut resource, "gone").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
        backend.close(resource).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "keep me");
    }
}
