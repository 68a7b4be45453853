use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::policy::utils::DiskSpace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamMode {
    ReadWrite,
    ReadOnly,
    NoCreate,
}

impl UpstreamMode {
    /// Parse the mode suffix of an upstream spec (`rw`, `ro`, `nc`)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "rw" => Some(UpstreamMode::ReadWrite),
            "ro" => Some(UpstreamMode::ReadOnly),
            "nc" => Some(UpstreamMode::NoCreate),
            _ => None,
        }
    }
}

/// One backing storage location of the union.
///
/// Policies only borrow upstreams; they never mutate them.
pub trait Upstream: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    fn mode(&self) -> UpstreamMode;

    /// Whether `path` (relative to the union root) is present on this upstream
    fn exists(&self, path: &Path) -> io::Result<bool>;

    /// Bytes available on this upstream, queried live on every call
    fn free_space(&self) -> io::Result<i64>;

    fn is_writable(&self) -> bool {
        !matches!(self.mode(), UpstreamMode::ReadOnly)
    }

    fn allows_create(&self) -> bool {
        matches!(self.mode(), UpstreamMode::ReadWrite)
    }
}

pub type UpstreamRef = Arc<dyn Upstream>;

/// An upstream backed by a local directory
#[derive(Debug)]
pub struct LocalUpstream {
    pub root: PathBuf,
    pub mode: UpstreamMode,
}

impl LocalUpstream {
    pub fn new(root: PathBuf, mode: UpstreamMode) -> Self {
        Self { root, mode }
    }

    pub fn full_path(&self, relative_path: &Path) -> PathBuf {
        self.root.join(relative_path.strip_prefix("/").unwrap_or(relative_path))
    }

    /// Look `path` up on this upstream, producing an entry bound to `this`
    pub fn lookup(this: &Arc<Self>, path: &Path) -> io::Result<Option<Entry>> {
        let full_path = this.full_path(path);
        let metadata = match std::fs::symlink_metadata(&full_path) {
            Ok(m) => m,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };
        let kind = if metadata.is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::File
        };
        let upstream: UpstreamRef = this.clone();
        Ok(Some(Entry::new(path.to_path_buf(), kind, upstream)))
    }
}

impl Upstream for LocalUpstream {
    fn name(&self) -> &str {
        self.root.to_str().unwrap_or("<non-utf8>")
    }

    fn mode(&self) -> UpstreamMode {
        self.mode
    }

    fn exists(&self, path: &Path) -> io::Result<bool> {
        self.full_path(path).try_exists()
    }

    fn free_space(&self) -> io::Result<i64> {
        let space = DiskSpace::for_path(&self.root)?;
        Ok(i64::try_from(space.available).unwrap_or(i64::MAX))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// A listing or lookup result, tied to the upstream it came from
#[derive(Debug, Clone)]
pub struct Entry {
    pub path: PathBuf,
    pub kind: EntryKind,
    upstream: UpstreamRef,
}

impl Entry {
    pub fn new(path: PathBuf, kind: EntryKind, upstream: UpstreamRef) -> Self {
        Self { path, kind, upstream }
    }

    pub fn upstream_of(&self) -> &UpstreamRef {
        &self.upstream
    }
}
