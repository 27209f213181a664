use std::io::Write;

use serde::Serialize;
use wordfile_format::{Backend, Rendering, RewriteStats, StoreError, Token, TokenStore};

use crate::error::{Error, Result};

const PREVIEW_LEN: usize = 10;
const ORIGINAL_PREVIEW_LEN: usize = 5;

#[derive(Serialize)]
struct JsonToken<'a> {
    index: usize,
    token: &'a str,
    length: usize,
}

fn read_error<B: Backend>(store: &TokenStore<B>) -> impl FnOnce(StoreError) -> Error + '_ {
    move |source| Error::ReadStore {
        path: store.path().to_path_buf(),
        source,
    }
}

/// Reads tokens `first..=last` (1-based) for display.
pub fn read_range<B: Backend>(
    store: &TokenStore<B>,
    first: usize,
    last: usize,
) -> Result<Vec<(usize, Token)>> {
    (first..=last)
        .map(|i| store.read_at(i).map(|t| (i, t)).map_err(read_error(store)))
        .collect()
}

pub fn list<B: Backend, W: Write>(store: &TokenStore<B>, out: &mut W) -> Result<()> {
    let tokens = store.read_all().map_err(read_error(store))?;
    for (i, token) in tokens.iter().enumerate() {
        writeln!(out, "{:>6}  {}", i + 1, token)?;
    }
    Ok(())
}

pub fn list_json<B: Backend, W: Write>(store: &TokenStore<B>, out: &mut W) -> Result<()> {
    let tokens = store.read_all().map_err(read_error(store))?;
    let entries: Vec<_> = tokens
        .iter()
        .enumerate()
        .map(|(i, token)| JsonToken {
            index: i + 1,
            token: token.as_str(),
            length: token.char_len(),
        })
        .collect();

    let json = serde_json::to_string_pretty(&entries).map_err(Error::Json)?;
    writeln!(out, "{}", json)?;
    Ok(())
}

pub fn original_preview<B: Backend, W: Write>(store: &TokenStore<B>, out: &mut W) -> Result<()> {
    let count = store.count().map_err(read_error(store))?;
    if count == 0 {
        return Ok(());
    }

    let words: Vec<_> = read_range(store, 1, count.min(ORIGINAL_PREVIEW_LEN))?
        .into_iter()
        .map(|(_, t)| t.into_string())
        .collect();
    writeln!(out, "Original first {} tokens: {}", words.len(), words.join(" "))?;
    Ok(())
}

pub fn unique<B: Backend, W: Write>(
    store: &TokenStore<B>,
    stats: RewriteStats,
    rendering: Rendering,
    out: &mut W,
) -> Result<()> {
    writeln!(out, "Original token count: {}", stats.before)?;
    writeln!(out, "Store updated: only unique tokens with their repetition count remain.")?;
    writeln!(out, "New token count: {}", stats.after)?;

    // A spaced entry is two tokens: the word and its count.
    let (format, per_entry) = match rendering {
        Rendering::Parenthesized => ("word(count)", 1),
        Rendering::Spaced => ("word count", 2),
    };
    let entries = stats.after / per_entry;
    if per_entry > 1 {
        writeln!(out, "Unique entries: {}", entries)?;
    }

    if entries == 0 {
        return Ok(());
    }

    writeln!(out, "New content (format: {}):", format)?;
    let shown = entries.min(PREVIEW_LEN);
    let tokens = read_range(store, 1, shown * per_entry)?;
    for (i, entry) in tokens.chunks(per_entry).enumerate() {
        let entry: Vec<_> = entry.iter().map(|(_, t)| t.as_str()).collect();
        writeln!(out, "  {}. {}", i + 1, entry.join(" "))?;
    }
    if entries > PREVIEW_LEN {
        writeln!(out, "  ... and {} more", entries - PREVIEW_LEN)?;
    }
    Ok(())
}

pub fn sorted<B: Backend, W: Write>(
    store: &TokenStore<B>,
    stats: RewriteStats,
    out: &mut W,
) -> Result<()> {
    writeln!(out, "Store updated: tokens sorted by length.")?;
    writeln!(out, "New token count: {}", stats.after)?;

    if stats.after == 0 {
        return Ok(());
    }

    writeln!(out, "First {} shortest tokens:", stats.after.min(PREVIEW_LEN))?;
    for (i, token) in read_range(store, 1, stats.after.min(PREVIEW_LEN))? {
        writeln!(out, "  {}. '{}' (length: {})", i, token, token.char_len())?;
    }

    if stats.after > PREVIEW_LEN {
        writeln!(out)?;
        writeln!(out, "Last {} longest tokens:", PREVIEW_LEN)?;
        let start = stats.after - PREVIEW_LEN + 1;
        for (i, token) in read_range(store, start, stats.after)? {
            writeln!(out, "  {}. '{}' (length: {})", i, token, token.char_len())?;
        }
    }
    Ok(())
}
