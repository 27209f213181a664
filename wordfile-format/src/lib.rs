//! Herein lies the core of the `wordfile` token store.
//!
//! Use [TokenStore][TokenStore] to open a store and read or replace its tokens, the
//! [transform] functions to compute new token sequences, and [rewrite] to run a
//! transformation against a store end to end.

pub mod backend;
mod error;
pub mod rewrite;
mod store;
mod token;
pub mod transform;

pub use backend::{Backend, MemoryBackend, TextFileBackend, TokenBuf};
pub use error::{Operation, StoreError};
pub use rewrite::{compact_store, rewrite, sort_store, RewriteStats};
pub use store::{AccessMode, StoreOptions, TokenStore, DEFAULT_MAX_TOKEN_LEN};
pub use token::{deserialize, serialize, InvalidTokenError, Token};
pub use transform::{
    compact, compact_with_frequency, sort_by_length, stable_sort_by_length, CompactOptions,
    Compaction, FrequencyTable, LengthOrder, Rendering, UniqueOrder,
};
