use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid endian {0:?}, expected \"LE\" or \"BE\"")]
    InvalidEndian(String),

    #[error("invalid address {0:?}")]
    InvalidAddress(String),
}
