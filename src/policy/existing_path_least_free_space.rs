use crate::policy::error::PolicyError;
use crate::policy::existing_path_all::ExistingPathAllPolicy;
use crate::policy::least_free_space::least_free_space;
use crate::policy::traits::Policy;
use crate::upstream::{Entry, UpstreamRef};
use std::path::Path;
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// ExistingPath LeastFreeSpace policy - of all candidates on which the path
/// exists, choose the one with the least free space
#[derive(Debug, Clone, Default)]
pub struct ExistingPathLeastFreeSpacePolicy {
    epall: ExistingPathAllPolicy,
}

impl ExistingPathLeastFreeSpacePolicy {
    pub fn new() -> Self {
        Self {
            epall: ExistingPathAllPolicy::new(),
        }
    }
}

impl Policy for ExistingPathLeastFreeSpacePolicy {
    fn name(&self) -> &'static str {
        "eplfs"
    }

    fn action(
        &self,
        ctx: &CancellationToken,
        upstreams: &[UpstreamRef],
        path: &Path,
    ) -> Result<Vec<UpstreamRef>, PolicyError> {
        trace!("eplfs action for path: {:?}", path);
        let upstreams = self.epall.action(ctx, upstreams, path)?;
        Ok(vec![least_free_space(Some(ctx), &upstreams)?])
    }

    fn action_entries(&self, entries: &[Entry]) -> Result<Vec<Entry>, PolicyError> {
        let entries = self.epall.action_entries(entries)?;
        Ok(vec![least_free_space(None, &entries)?])
    }

    fn create(
        &self,
        ctx: &CancellationToken,
        upstreams: &[UpstreamRef],
        path: &Path,
    ) -> Result<Vec<UpstreamRef>, PolicyError> {
        trace!("eplfs create for path: {:?}", path);
        let upstreams = self.epall.create(ctx, upstreams, path)?;
        Ok(vec![least_free_space(Some(ctx), &upstreams)?])
    }

    fn create_entries(&self, entries: &[Entry]) -> Result<Vec<Entry>, PolicyError> {
        let entries = self.epall.create_entries(entries)?;
        Ok(vec![least_free_space(None, &entries)?])
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
        trace!("eplfs search for path: {:?}", path);
        let upstreams = self.epall.existing(ctx, upstreams, path)?;
        least_free_space(Some(ctx), &upstreams)
    }

    fn search_entries(&self, entries: &[Entry]) -> Result<Entry, PolicyError> {
        if entries.is_empty() {
            return Err(PolicyError::ObjectNotFound);
        }
        least_free_space(None, entries)
    }
}
