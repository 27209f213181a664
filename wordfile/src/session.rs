use std::io::Write;
use std::path::Path;

use wordfile_format::{compact_store, sort_store, AccessMode, Backend, StoreOptions, TokenStore};

use crate::cli::{ListArgs, ShellCommand, SortArgs, UniqueArgs};
use crate::error::{Error, Result};
use crate::report;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Holds at most one open store and runs commands against it.
pub struct Session<B: Backend + Clone> {
    backend: B,
    options: StoreOptions,
    current: Option<TokenStore<B>>,
}

impl<B: Backend + Clone> Session<B> {
    pub fn new(backend: B, options: StoreOptions) -> Self {
        Session {
            backend,
            options,
            current: None,
        }
    }

    #[cfg(test)]
    pub fn current(&self) -> Option<&TokenStore<B>> {
        self.current.as_ref()
    }

    fn store(&mut self) -> Result<&mut TokenStore<B>> {
        self.current.as_mut().ok_or(Error::NoStoreOpen)
    }

    /// Opens `path`, closing whatever store was open before.
    pub fn open(&mut self, path: &Path, mode: AccessMode) -> Result<()> {
        self.close()?;

        let store = TokenStore::open_with(self.backend.clone(), path, mode, self.options.clone())
            .map_err(|source| Error::OpenStore {
                path: path.to_path_buf(),
                source,
            })?;
        self.current = Some(store);
        Ok(())
    }

    /// Closes the current store. Returns `false` if none was open.
    pub fn close(&mut self) -> Result<bool> {
        match self.current.take() {
            None => Ok(false),
            Some(mut store) => {
                store.close().map_err(|source| Error::CloseStore {
                    path: store.path().to_path_buf(),
                    source,
                })?;
                Ok(true)
            }
        }
    }

    pub fn count<W: Write>(&mut self, out: &mut W) -> Result<()> {
        let store = self.store()?;
        let count = store.count().map_err(|source| Error::ReadStore {
            path: store.path().to_path_buf(),
            source,
        })?;
        writeln!(out, "Token count: {}", count)?;
        Ok(())
    }

    pub fn list<W: Write>(&mut self, args: &ListArgs, out: &mut W) -> Result<()> {
        let store = self.store()?;
        if args.json {
            report::list_json(store, out)
        } else {
            report::list(store, out)
        }
    }

    pub fn unique<W: Write>(&mut self, args: &UniqueArgs, out: &mut W) -> Result<()> {
        let store = self.store()?;
        let options = args.options();

        tracing::info!(path = %store.path().display(), ?options, "compacting store");
        let stats = compact_store(store, &options).map_err(|source| Error::RewriteStore {
            path: store.path().to_path_buf(),
            source,
        })?;

        report::unique(store, stats, options.rendering, out)
    }

    pub fn sort<W: Write>(&mut self, args: &SortArgs, out: &mut W) -> Result<()> {
        let store = self.store()?;
        let before = store.count().map_err(|source| Error::ReadStore {
            path: store.path().to_path_buf(),
            source,
        })?;
        writeln!(out, "Original token count: {}", before)?;
        report::original_preview(store, out)?;

        let order = args.order();
        tracing::info!(path = %store.path().display(), ?order, "sorting store");
        let stats = sort_store(store, order).map_err(|source| Error::RewriteStore {
            path: store.path().to_path_buf(),
            source,
        })?;

        report::sorted(store, stats, out)
    }

    pub fn execute<W: Write>(&mut self, command: ShellCommand, out: &mut W) -> Result<Flow> {
        match command {
            ShellCommand::Open { path, write } => {
                let mode = if write {
                    AccessMode::ReadWrite
                } else {
                    AccessMode::ReadOnly
                };
                self.open(&path, mode)?;
                writeln!(out, "Opened `{}` ({}).", path.display(), mode)?;
            }
            ShellCommand::Count => self.count(out)?,
            ShellCommand::List(args) => self.list(&args, out)?,
            ShellCommand::Unique(args) => self.unique(&args, out)?,
            ShellCommand::Sort(args) => self.sort(&args, out)?,
            ShellCommand::Close => {
                if self.close()? {
                    writeln!(out, "Store closed.")?;
                } else {
                    writeln!(out, "No store is open.")?;
                }
            }
            ShellCommand::Exit => {
                self.close()?;
                writeln!(out, "Exiting.")?;
                return Ok(Flow::Exit);
            }
        }
        Ok(Flow::Continue)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use wordfile_format::{MemoryBackend, Rendering};

    use super::*;

    fn session_with(path: &str, text: &str) -> (MemoryBackend, Session<MemoryBackend>) {
        let backend = MemoryBackend::new();
        backend.insert(path, text);
        (backend.clone(), Session::new(backend, StoreOptions::default()))
    }

    fn run(session: &mut Session<MemoryBackend>, command: ShellCommand) -> (Result<Flow>, String) {
        let mut out = Vec::new();
        let flow = session.execute(command, &mut out);
        (flow, String::from_utf8(out).unwrap())
    }

    fn open(path: &str, write: bool) -> ShellCommand {
        ShellCommand::Open {
            path: PathBuf::from(path),
            write,
        }
    }

    #[test]
    fn commands_without_a_store_report_it() {
        let (_, mut session) = session_with("s", "a b");
        for command in [
            ShellCommand::Count,
            ShellCommand::List(ListArgs { json: false }),
            ShellCommand::Sort(SortArgs { lexical: false }),
        ] {
            let (result, _) = run(&mut session, command);
            assert!(matches!(result, Err(Error::NoStoreOpen)));
        }

        let (result, out) = run(&mut session, ShellCommand::Close);
        assert_eq!(result.unwrap(), Flow::Continue);
        assert_eq!(out, "No store is open.\n");
    }

    #[test]
    fn open_count_close() {
        let (_, mut session) = session_with("s", "one two three");
        let (result, out) = run(&mut session, open("s", false));
        result.unwrap();
        assert_eq!(out, "Opened `s` (read-only).\n");

        let (_, out) = run(&mut session, ShellCommand::Count);
        assert_eq!(out, "Token count: 3\n");

        let (_, out) = run(&mut session, ShellCommand::Close);
        assert_eq!(out, "Store closed.\n");
        assert!(session.current().is_none());
    }

    #[test]
    fn open_failure_keeps_no_store() {
        let (_, mut session) = session_with("s", "a");
        let (result, _) = run(&mut session, open("missing", false));
        assert!(matches!(result, Err(Error::OpenStore { .. })));
        assert!(session.current().is_none());
    }

    #[test]
    fn opening_replaces_the_current_store() {
        let (backend, mut session) = session_with("first", "a");
        backend.insert("second", "b c");

        run(&mut session, open("first", false)).0.unwrap();
        run(&mut session, open("second", true)).0.unwrap();

        let store = session.current().unwrap();
        assert_eq!(store.path(), Path::new("second"));
        assert_eq!(store.mode(), Some(AccessMode::ReadWrite));
    }

    #[test]
    fn unique_rewrites_and_reports() {
        let (backend, mut session) = session_with("s", "cat dog cat ant");
        run(&mut session, open("s", false)).0.unwrap();

        let args = UniqueArgs {
            format: Default::default(),
            order: Default::default(),
            accumulate: false,
        };
        let (result, out) = run(&mut session, ShellCommand::Unique(args));
        result.unwrap();

        assert_eq!(backend.contents("s").as_deref(), Some("cat(2) dog(1) ant(1)"));
        assert!(out.contains("Original token count: 4"));
        assert!(out.contains("New token count: 3"));
        assert!(out.contains("  1. cat(2)\n  2. dog(1)\n  3. ant(1)\n"));
        assert!(!out.contains("more"));
    }

    #[test]
    fn unique_preview_is_truncated() {
        let text = (1..=12).map(|i| format!("w{}", i)).collect::<Vec<_>>().join(" ");
        let (_, mut session) = session_with("s", &text);
        run(&mut session, open("s", false)).0.unwrap();

        let args = UniqueArgs {
            format: Default::default(),
            order: Default::default(),
            accumulate: false,
        };
        let (_, out) = run(&mut session, ShellCommand::Unique(args));
        assert!(out.contains("  10. w10(1)\n"));
        assert!(!out.contains("w11(1)"));
        assert!(out.contains("  ... and 2 more\n"));
    }

    #[test]
    fn spaced_unique_reports_entries() {
        let text = (1..=12)
            .flat_map(|i| vec![format!("w{}", i); 2])
            .collect::<Vec<_>>()
            .join(" ");
        let (backend, mut session) = session_with("s", &text);
        run(&mut session, open("s", false)).0.unwrap();

        let args = UniqueArgs {
            format: Rendering::Spaced,
            order: Default::default(),
            accumulate: false,
        };
        let (result, out) = run(&mut session, ShellCommand::Unique(args));
        result.unwrap();

        assert!(backend.contents("s").unwrap().starts_with("w1 2 w2 2 "));
        assert!(out.contains("New token count: 24\n"));
        assert!(out.contains("Unique entries: 12\n"));
        assert!(out.contains("  1. w1 2\n  2. w2 2\n"));
        assert!(out.contains("  10. w10 2\n"));
        assert!(!out.contains("w11 2"));
        assert!(out.contains("  ... and 2 more\n"));
    }

    #[test]
    fn sort_rewrites_and_reports() {
        let (backend, mut session) = session_with("s", "bb a ccc d");
        run(&mut session, open("s", false)).0.unwrap();

        let (result, out) = run(&mut session, ShellCommand::Sort(SortArgs { lexical: false }));
        result.unwrap();

        assert_eq!(backend.contents("s").as_deref(), Some("a d bb ccc"));
        assert!(out.starts_with("Original token count: 4\nOriginal first 4 tokens: bb a ccc d\n"));
        assert!(out.contains("  1. 'a' (length: 1)\n"));
        assert!(out.contains("  4. 'ccc' (length: 3)\n"));
        assert!(!out.contains("Last"));
    }

    #[test]
    fn sort_shows_longest_tail() {
        let text = (1..=15).map(|i| "x".repeat(i)).collect::<Vec<_>>().join(" ");
        let (_, mut session) = session_with("s", &text);
        run(&mut session, open("s", false)).0.unwrap();

        let (_, out) = run(&mut session, ShellCommand::Sort(SortArgs { lexical: true }));
        assert!(out.contains("Last 10 longest tokens:\n  6. 'xxxxxx' (length: 6)\n"));
        assert!(out.contains(&format!("  15. '{}' (length: 15)\n", "x".repeat(15))));
    }

    #[test]
    fn list_as_json() {
        let (_, mut session) = session_with("s", "hi there");
        run(&mut session, open("s", false)).0.unwrap();

        let (_, out) = run(&mut session, ShellCommand::List(ListArgs { json: true }));
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value[1]["token"], "there");
        assert_eq!(value[1]["index"], 2);
        assert_eq!(value[1]["length"], 5);
    }

    #[test]
    fn exit_closes_the_store() {
        let (_, mut session) = session_with("s", "a");
        run(&mut session, open("s", false)).0.unwrap();
        let (result, _) = run(&mut session, ShellCommand::Exit);
        assert_eq!(result.unwrap(), Flow::Exit);
        assert!(session.current().is_none());
    }
}
