use std::io::{BufRead, Write};

use structopt::StructOpt;
use wordfile_format::Backend;

use crate::cli::ShellCommand;
use crate::error::Result;
use crate::session::{Flow, Session};

const PROMPT: &str = "> ";

fn print_help<W: Write>(out: &mut W) -> Result<()> {
    writeln!(out, "Commands:")?;
    writeln!(out, "  open <path> [--write]   open a store, read-only unless --write")?;
    writeln!(out, "  count                   print the number of tokens")?;
    writeln!(out, "  list [--json]           list every token")?;
    writeln!(out, "  unique [options]        keep unique tokens with their counts")?;
    writeln!(out, "  sort [--lexical]        sort tokens by length")?;
    writeln!(out, "  close                   close the current store")?;
    writeln!(out, "  exit | quit             close the store and leave")?;
    writeln!(out, "Run `<command> --help` for options.")?;
    Ok(())
}

/// Reads commands line by line until `exit` or end of input.
///
/// Errors from individual commands are printed and the loop carries on; only
/// failures to read input or write output end it early.
pub fn run<B, R, W>(session: &mut Session<B>, input: R, out: &mut W) -> Result<()>
where
    B: Backend + Clone,
    R: BufRead,
    W: Write,
{
    let mut lines = input.lines();
    loop {
        write!(out, "{}", PROMPT)?;
        out.flush()?;

        let line = match lines.next() {
            Some(line) => line?,
            None => {
                writeln!(out)?;
                break;
            }
        };

        let words = match shell_words::split(&line) {
            Ok(words) => words,
            Err(e) => {
                writeln!(out, "Could not parse line: {}", e)?;
                continue;
            }
        };
        if words.is_empty() {
            continue;
        }
        if words[0] == "help" || words[0] == "?" {
            print_help(out)?;
            continue;
        }

        let command = match ShellCommand::from_iter_safe(
            std::iter::once("wordfile".to_string()).chain(words),
        ) {
            Ok(command) => command,
            Err(e) => {
                writeln!(out, "{}", e.message)?;
                continue;
            }
        };

        tracing::trace!(?command, "shell command");
        match session.execute(command, out) {
            Ok(Flow::Continue) => {}
            Ok(Flow::Exit) => return Ok(()),
            Err(e) => writeln!(out, "Error: {:#}", anyhow::Error::from(e))?,
        }
    }

    session.close()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use wordfile_format::{MemoryBackend, StoreOptions};

    use super::*;

    fn drive(backend: &MemoryBackend, script: &str) -> String {
        let mut session = Session::new(backend.clone(), StoreOptions::default());
        let mut out = Vec::new();
        run(&mut session, Cursor::new(script), &mut out).unwrap();
        assert!(session.current().is_none());
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn runs_a_script() {
        let backend = MemoryBackend::new();
        backend.insert("words.txt", "b a b");

        let out = drive(&backend, "open words.txt\n\ncount\nunique\nexit\ncount\n");
        assert!(out.contains("Opened `words.txt` (read-only)."));
        assert!(out.contains("Token count: 3"));
        assert!(out.contains("  1. b(2)\n  2. a(1)\n"));
        assert!(out.ends_with("Exiting.\n"));
        assert_eq!(backend.contents("words.txt").as_deref(), Some("b(2) a(1)"));
    }

    #[test]
    fn errors_do_not_stop_the_loop() {
        let backend = MemoryBackend::new();
        backend.insert("words.txt", "x");

        let out = drive(&backend, "count\nbogus\nopen 'words.txt\nopen words.txt\ncount\n");
        assert!(out.contains("Error: No store is open. Use 'open <path>' first."));
        assert!(out.contains("Could not parse line"));
        assert!(out.contains("Token count: 1"));
    }

    #[test]
    fn quoted_paths_and_help() {
        let backend = MemoryBackend::new();
        backend.insert("my words.txt", "hello");

        let out = drive(&backend, "help\nopen \"my words.txt\"\nlist\n");
        assert!(out.contains("Commands:"));
        assert!(out.contains("     1  hello\n"));
    }

    #[test]
    fn end_of_input_closes_the_store() {
        let backend = MemoryBackend::new();
        backend.insert("w", "a");
        let out = drive(&backend, "open w --write");
        assert!(out.contains("(read-write)"));
    }
}
