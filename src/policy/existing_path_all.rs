use crate::policy::error::PolicyError;
use crate::policy::traits::Policy;
use crate::upstream::{Entry, Upstream, UpstreamRef};
use std::path::Path;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

/// ExistingPath All policy - every candidate on which the path exists
#[derive(Debug, Clone, Default)]
pub struct ExistingPathAllPolicy;

impl ExistingPathAllPolicy {
    pub fn new() -> Self {
        Self
    }

    /// Keep the upstreams where `path` exists, in input order
    pub fn existing(
        &self,
        ctx: &CancellationToken,
        upstreams: &[UpstreamRef],
        path: &Path,
    ) -> Result<Vec<UpstreamRef>, PolicyError> {
        let mut found = Vec::new();

        for upstream in upstreams {
            if ctx.is_cancelled() {
                return Err(PolicyError::Cancelled);
            }
            match upstream.exists(path) {
                Ok(true) => {
                    trace!("Path {:?} exists on upstream {}", path, upstream.name());
                    found.push(upstream.clone());
                }
                Ok(false) => trace!("Path {:?} missing on upstream {}", path, upstream.name()),
                Err(e) => {
                    warn!("Failed to check {:?} on upstream {}: {}", path, upstream.name(), e);
                    return Err(PolicyError::IoError(e));
                }
            }
        }

        if found.is_empty() {
            debug!("Path {:?} exists on none of {} upstreams", path, upstreams.len());
            Err(PolicyError::ObjectNotFound)
        } else {
            Ok(found)
        }
    }
}

fn writable(upstreams: &[UpstreamRef]) -> Result<Vec<UpstreamRef>, PolicyError> {
    if upstreams.is_empty() {
        return Err(PolicyError::ObjectNotFound);
    }
    let kept: Vec<UpstreamRef> = upstreams.iter().filter(|u| u.is_writable()).cloned().collect();
    if kept.is_empty() {
        Err(PolicyError::ReadOnlyFilesystem)
    } else {
        Ok(kept)
    }
}

fn creatable(upstreams: &[UpstreamRef]) -> Result<Vec<UpstreamRef>, PolicyError> {
    if upstreams.is_empty() {
        return Err(PolicyError::ObjectNotFound);
    }
    let kept: Vec<UpstreamRef> = upstreams.iter().filter(|u| u.allows_create()).cloned().collect();
    if kept.is_empty() {
        Err(PolicyError::ReadOnlyFilesystem)
    } else {
        Ok(kept)
    }
}

fn entries_where(
    entries: &[Entry],
    keep: impl Fn(&UpstreamRef) -> bool,
) -> Result<Vec<Entry>, PolicyError> {
    if entries.is_empty() {
        return Err(PolicyError::ObjectNotFound);
    }
    let kept: Vec<Entry> = entries.iter().filter(|e| keep(e.upstream_of())).cloned().collect();
    if kept.is_empty() {
        Err(PolicyError::ReadOnlyFilesystem)
    } else {
        Ok(kept)
    }
}

impl Policy for ExistingPathAllPolicy {
    fn name(&self) -> &'static str {
        "epall"
    }

    fn action(
        &self,
        ctx: &CancellationToken,
        upstreams: &[UpstreamRef],
        path: &Path,
    ) -> Result<Vec<UpstreamRef>, PolicyError> {
        let upstreams = writable(upstreams)?;
        self.existing(ctx, &upstreams, path)
    }

    fn action_entries(&self, entries: &[Entry]) -> Result<Vec<Entry>, PolicyError> {
        entries_where(entries, |u| u.is_writable())
    }

    /// Creation goes where the parent directory already exists
    fn create(
        &self,
        ctx: &CancellationToken,
        upstreams: &[UpstreamRef],
        path: &Path,
    ) -> Result<Vec<UpstreamRef>, PolicyError> {
        let upstreams = creatable(upstreams)?;
        let parent = path.parent().unwrap_or(path);
        self.existing(ctx, &upstreams, parent)
    }

    fn create_entries(&self, entries: &[Entry]) -> Result<Vec<Entry>, PolicyError> {
        entries_where(entries, |u| u.allows_create())
    }

    fn search(
        &self,
        ctx: &CancellationToken,
        upstreams: &[UpstreamRef],
        path: &Path,
    ) -> Result<UpstreamRef, PolicyError> {
        if upstreams.is_empty() {
            return Err(PolicyError::ObjectNotFound);
        }
        let found = self.existing(ctx, upstreams, path)?;
        found.into_iter().next().ok_or(PolicyError::ObjectNotFound)
    }

    fn search_entries(&self, entries: &[Entry]) -> Result<Entry, PolicyError> {
        entries.first().cloned().ok_or(PolicyError::ObjectNotFound)
    }
}
