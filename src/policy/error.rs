use thiserror::Error;

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("Object not found")]
    ObjectNotFound,
    #[error("All upstreams are read-only")]
    ReadOnlyFilesystem,
    #[error("Policy selection cancelled")]
    Cancelled,
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl PolicyError {
    pub fn errno(&self) -> i32 {
        // Standard errno constants compatible with MUSL
        const ENOENT: i32 = 2;
        const EIO: i32 = 5;
        const EROFS: i32 = 30;
        const ECANCELED: i32 = 125;

        match self {
            PolicyError::ObjectNotFound => ENOENT,
            PolicyError::ReadOnlyFilesystem => EROFS,
            PolicyError::Cancelled => ECANCELED,
            PolicyError::IoError(e) => e.raw_os_error().unwrap_or(EIO),
        }
    }
}
