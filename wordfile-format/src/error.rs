use std::fmt;
use std::path::PathBuf;

use crate::store::AccessMode;

/// The handle operation that failed, used for error context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Open,
    Count,
    Read,
    Write,
    Close,
}

impl Operation {
    pub fn as_str(&self) -> &str {
        match self {
            Operation::Open => "open",
            Operation::Count => "count",
            Operation::Read => "read",
            Operation::Write => "write",
            Operation::Close => "close",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Could not open token store ({mode}). Path: '{}'", .path.display())]
    Open {
        path: PathBuf,
        mode: AccessMode,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot {op} a token store opened read-only. Path: '{}'", .path.display())]
    Permission { op: Operation, path: PathBuf },

    #[error("Token index {index} is out of range; the store holds {count} tokens. Path: '{}'", .path.display())]
    Index {
        index: usize,
        count: usize,
        path: PathBuf,
    },

    #[error("Backend failed to {op}. Path: '{}'", .path.display())]
    Backend {
        op: Operation,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot {op}: the token store is closed. Path: '{}'", .path.display())]
    Closed { op: Operation, path: PathBuf },
}

impl StoreError {
    pub fn operation(&self) -> Operation {
        match self {
            StoreError::Open { .. } => Operation::Open,
            StoreError::Index { .. } => Operation::Read,
            StoreError::Permission { op, .. }
            | StoreError::Backend { op, .. }
            | StoreError::Closed { op, .. } => *op,
        }
    }
}
