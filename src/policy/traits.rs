use crate::policy::error::PolicyError;
use crate::upstream::{Entry, UpstreamRef};
use std::path::Path;
use tokio_util::sync::CancellationToken;

/// A selection policy covering the three operation categories.
///
/// Handle-based methods take a cancellation token and the union-relative
/// path; entry-based methods work on entries already resolved by a listing.
pub trait Policy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Upstreams that receive a modification of an existing object
    fn action(
        &self,
        ctx: &CancellationToken,
        upstreams: &[UpstreamRef],
        path: &Path,
    ) -> Result<Vec<UpstreamRef>, PolicyError>;

    fn action_entries(&self, entries: &[Entry]) -> Result<Vec<Entry>, PolicyError>;

    /// Upstreams that receive a newly created object
    fn create(
        &self,
        ctx: &CancellationToken,
        upstreams: &[UpstreamRef],
        path: &Path,
    ) -> Result<Vec<UpstreamRef>, PolicyError>;

    fn create_entries(&self, entries: &[Entry]) -> Result<Vec<Entry>, PolicyError>;

    /// The upstream a read or lookup is served from
    fn search(
        &self,
        ctx: &CancellationToken,
        upstreams: &[UpstreamRef],
        path: &Path,
    ) -> Result<UpstreamRef, PolicyError>;

    fn search_entries(&self, entries: &[Entry]) -> Result<Entry, PolicyError>;
}
