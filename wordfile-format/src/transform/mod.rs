//! Pure whole-store transformations.
//!
//! Everything here works on an in-memory token sequence and performs no I/O. The
//! [`rewrite`](crate::rewrite) module moves tokens between a store and these functions.

mod frequency;
mod length;

pub use frequency::{
    compact, compact_with_frequency, CompactOptions, Compaction, FrequencyTable, Rendering,
    UniqueOrder,
};
pub use length::{sort_by_length, stable_sort_by_length, LengthOrder};
