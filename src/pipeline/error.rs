use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A source file could not be read
    #[error("impossible to read '{path}'")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// The output or backup file could not be written
    #[error("impossible to write '{path}'")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// A source file is not valid JSON
    #[error("invalid JSON in '{path}'")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    /// A source file is valid JSON but not in the expected shape
    #[error("unexpected content in '{path}'")]
    InvalidRecords {
        path: String,
        #[source]
        source: crate::trips::error::Error,
    },
    /// The previous output must exist to be backed up
    #[error("cannot back up '{0}': file does not exist")]
    MissingBackupSource(String),
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
}
