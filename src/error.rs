use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures while turning the archive into posts. Any of them aborts the run.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Cannot open archive {}: {source}", .path.display())]
    ArchiveOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid zip archive: {0}")]
    ArchiveFormat(#[from] zip::result::ZipError),

    #[error("Cannot decode entry {name}: {reason}")]
    EntryDecode { name: String, reason: String },
}

impl IngestError {
    pub fn entry_decode(name: &str, reason: impl ToString) -> Self {
        IngestError::EntryDecode {
            name: name.to_string(),
            reason: reason.to_string(),
        }
    }
}
