//! Read, transform and write back a whole store.

use crate::backend::Backend;
use crate::error::StoreError;
use crate::store::{AccessMode, TokenStore};
use crate::token::{serialize, Token};
use crate::transform::{compact, sort_by_length, CompactOptions, LengthOrder};

/// Token counts around a rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RewriteStats {
    pub before: usize,
    pub after: usize,
}

/// Drains `store`, closes it, applies `transform`, writes the result through a
/// read-write reopen and closes again.
///
/// On success the store is left open read-only on the new content. The read-write
/// resource is closed even when the write fails.
pub fn rewrite<B, F>(store: &mut TokenStore<B>, transform: F) -> Result<RewriteStats, StoreError>
where
    B: Backend,
    F: FnOnce(Vec<Token>) -> String,
{
    let tokens = store.read_all()?;
    let before = tokens.len();
    store.close()?;

    let text = transform(tokens);
    let after = text.split_whitespace().count();

    store.reopen(AccessMode::ReadWrite)?;
    let written = store.write_all(&text);
    let closed = store.close();
    written?;
    closed?;

    store.reopen(AccessMode::ReadOnly)?;

    tracing::debug!(path = %store.path().display(), before, after, "store rewritten");
    Ok(RewriteStats { before, after })
}

pub fn compact_store<B: Backend>(
    store: &mut TokenStore<B>,
    options: &CompactOptions,
) -> Result<RewriteStats, StoreError> {
    rewrite(store, |tokens| {
        compact(&tokens, options).render(options.rendering, options.order)
    })
}

pub fn sort_store<B: Backend>(
    store: &mut TokenStore<B>,
    order: LengthOrder,
) -> Result<RewriteStats, StoreError> {
    rewrite(store, |tokens| serialize(sort_by_length(&tokens, order)))
}
