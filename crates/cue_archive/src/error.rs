use std::path::PathBuf;

use cue_core::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not encode shots: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    #[error("Could not decode shots: {0}")]
    Decode(#[from] rmp_serde::decode::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Shot payload does not decompress: {0}")]
    Lz4(#[from] lz4_flex::block::DecompressError),

    #[error("Not a shot archive (bad magic)")]
    NotAnArchive,

    #[error("Archive truncated at {len} bytes")]
    Truncated { len: usize },

    #[error("Archive format {found} is newer than supported format {supported}")]
    NewerFormat { found: u16, supported: u16 },

    #[error("Archive digest does not match its contents")]
    DigestMismatch,

    #[error("Header announces {header} shots, payload holds {payload}")]
    ShotCountMismatch { header: u16, payload: usize },

    #[error("{0} shots do not fit in one archive")]
    TooManyShots(usize),

    #[error("No archive at {}", .0.display())]
    NotFound(PathBuf),

    #[error("Archived table is invalid: {0}")]
    Table(#[source] CoreError),

    #[error("Archived shot {index} is invalid: {source}")]
    Shot {
        index: usize,
        #[source]
        source: CoreError,
    },
}

impl ArchiveError {
    /// The bytes were read but are not an intact archive.
    pub fn is_damaged(&self) -> bool {
        matches!(
            self,
            ArchiveError::Truncated { .. }
                | ArchiveError::DigestMismatch
                | ArchiveError::Lz4(_)
                | ArchiveError::Decode(_)
                | ArchiveError::ShotCountMismatch { .. }
        )
    }
}
