use std::path::PathBuf;

use wordfile_format::StoreError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Cannot open store `{}`", .path.display())]
    OpenStore {
        path: PathBuf,
        #[source]
        source: StoreError,
    },

    #[error("Cannot read store `{}`", .path.display())]
    ReadStore {
        path: PathBuf,
        #[source]
        source: StoreError,
    },

    #[error("Cannot rewrite store `{}`", .path.display())]
    RewriteStore {
        path: PathBuf,
        #[source]
        source: StoreError,
    },

    #[error("Cannot close store `{}`", .path.display())]
    CloseStore {
        path: PathBuf,
        #[source]
        source: StoreError,
    },

    #[error("No store is open. Use 'open <path>' first.")]
    NoStoreOpen,

    #[error("Cannot encode JSON output")]
    Json(#[source] serde_json::Error),

    #[error("Cannot write output")]
    Output(#[from] std::io::Error),
}
