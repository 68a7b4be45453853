/// Test utilities for unionfs-policy
/// Provides scripted upstreams with controllable free space and existence
use crate::upstream::{Entry, EntryKind, Upstream, UpstreamMode, UpstreamRef};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Debug)]
pub struct MockUpstream {
    name: String,
    mode: UpstreamMode,
    free_space: Mutex<io::Result<i64>>,
    existing: HashSet<PathBuf>,
    exists_error: Option<io::ErrorKind>,
    cancel_on_query: Option<CancellationToken>,
    space_queries: AtomicUsize,
    exists_queries: AtomicUsize,
}

impl MockUpstream {
    /// A read-write upstream where `/` and every listed path exist
    pub fn new(name: &str, free_space: i64, existing: &[&str]) -> Self {
        let mut paths: HashSet<PathBuf> =
            existing.iter().map(|p| normalize(Path::new(p))).collect();
        paths.insert(PathBuf::new());
        Self {
            name: name.to_string(),
            mode: UpstreamMode::ReadWrite,
            free_space: Mutex::new(Ok(free_space)),
            existing: paths,
            exists_error: None,
            cancel_on_query: None,
            space_queries: AtomicUsize::new(0),
            exists_queries: AtomicUsize::new(0),
        }
    }

    pub fn with_mode(mut self, mode: UpstreamMode) -> Self {
        self.mode = mode;
        self
    }

    /// Make every free space query fail with `kind`
    pub fn failing(self, kind: io::ErrorKind) -> Self {
        *self.free_space.lock() = Err(io::Error::new(kind, format!("{} unreachable", self.name)));
        self
    }

    /// Make every existence check fail with `kind`
    pub fn failing_exists(mut self, kind: io::ErrorKind) -> Self {
        self.exists_error = Some(kind);
        self
    }

    /// Cancel `token` as a side effect of the first free space query
    pub fn cancelling(mut self, token: CancellationToken) -> Self {
        self.cancel_on_query = Some(token);
        self
    }

    pub fn set_free_space(&self, free_space: i64) {
        *self.free_space.lock() = Ok(free_space);
    }

    pub fn into_ref(self) -> Arc<MockUpstream> {
        Arc::new(self)
    }

    pub fn space_queries(&self) -> usize {
        self.space_queries.load(Ordering::SeqCst)
    }

    pub fn exists_queries(&self) -> usize {
        self.exists_queries.load(Ordering::SeqCst)
    }
}

impl Upstream for MockUpstream {
    fn name(&self) -> &str {
        &self.name
    }

    fn mode(&self) -> UpstreamMode {
        self.mode
    }

    fn exists(&self, path: &Path) -> io::Result<bool> {
        self.exists_queries.fetch_add(1, Ordering::SeqCst);
        if let Some(kind) = self.exists_error {
            return Err(io::Error::new(kind, format!("{} unreachable", self.name)));
        }
        Ok(self.existing.contains(&normalize(path)))
    }

    fn free_space(&self) -> io::Result<i64> {
        self.space_queries.fetch_add(1, Ordering::SeqCst);
        if let Some(token) = &self.cancel_on_query {
            token.cancel();
        }
        match &*self.free_space.lock() {
            Ok(space) => Ok(*space),
            Err(e) => Err(io::Error::new(e.kind(), e.to_string())),
        }
    }
}

fn normalize(path: &Path) -> PathBuf {
    path.strip_prefix("/").unwrap_or(path).to_path_buf()
}

/// Erase concrete mock types so they can be handed to policies
pub fn as_refs(mocks: &[Arc<MockUpstream>]) -> Vec<UpstreamRef> {
    mocks.iter().map(|m| m.clone() as UpstreamRef).collect()
}

/// One file entry per mock, all for `path`
pub fn entries_for(mocks: &[Arc<MockUpstream>], path: &str) -> Vec<Entry> {
    mocks
        .iter()
        .map(|m| Entry::new(PathBuf::from(path), EntryKind::File, m.clone() as UpstreamRef))
        .collect()
}

pub fn total_space_queries(mocks: &[Arc<MockUpstream>]) -> usize {
    mocks.iter().map(|m| m.space_queries()).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_upstream_scripted_values() {
        let mock = MockUpstream::new("a", 42, &["/dir/file.txt"]).into_ref();

        assert!(mock.exists(Path::new("/dir/file.txt")).unwrap());
        assert!(mock.exists(Path::new("dir/file.txt")).unwrap());
        assert!(mock.exists(Path::new("/")).unwrap());
        assert!(!mock.exists(Path::new("/other")).unwrap());
        assert_eq!(mock.exists_queries(), 4);

        assert_eq!(mock.free_space().unwrap(), 42);
        mock.set_free_space(7);
        assert_eq!(mock.free_space().unwrap(), 7);
        assert_eq!(mock.space_queries(), 2);
    }

    #[test]
    fn test_mock_upstream_failure() {
        let mock = MockUpstream::new("b", 1, &[]).failing(io::ErrorKind::TimedOut);
        let err = mock.free_space().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::TimedOut);
    }

    #[test]
    fn test_mock_upstream_exists_failure() {
        let mock =
            MockUpstream::new("c", 1, &["/f"]).failing_exists(io::ErrorKind::PermissionDenied);
        let err = mock.exists(Path::new("/f")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
        assert_eq!(mock.exists_queries(), 1);
    }
}
