use std::io;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct DiskSpace {
    pub total: u64,
    pub available: u64,
    pub used: u64,
}

impl DiskSpace {
    /// Get disk space information for a given path
    /// Uses statvfs f_bavail so filesystem reservations are respected
    #[cfg(unix)]
    pub fn for_path(path: &Path) -> Result<DiskSpace, io::Error> {
        use nix::sys::statvfs::statvfs;

        let stat = statvfs(path).map_err(io::Error::from)?;

        let block_size = stat.fragment_size() as u64;
        let total = stat.blocks() as u64 * block_size;
        let available = stat.blocks_available() as u64 * block_size; // f_bavail
        let free = stat.blocks_free() as u64 * block_size; // f_bfree
        let used = total.saturating_sub(free);

        tracing::trace!(
            "DiskSpace for {:?}: total={}, available={} (f_bavail), free={} (f_bfree), used={}",
            path, total, available, free, used
        );

        Ok(DiskSpace {
            total,
            available,
            used,
        })
    }

    #[cfg(not(unix))]
    pub fn for_path(path: &Path) -> Result<DiskSpace, io::Error> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            format!("free space query not supported for {}", path.display()),
        ))
    }
}
