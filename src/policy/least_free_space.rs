use crate::policy::error::PolicyError;
use crate::upstream::{Entry, Upstream, UpstreamRef};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

/// Anything whose free space can be probed through an upstream
pub trait FreeSpaceCandidate: Clone {
    fn upstream(&self) -> &dyn Upstream;
}

impl FreeSpaceCandidate for UpstreamRef {
    fn upstream(&self) -> &dyn Upstream {
        self.as_ref()
    }
}

impl FreeSpaceCandidate for Entry {
    fn upstream(&self) -> &dyn Upstream {
        self.upstream_of().as_ref()
    }
}

/// Pick the candidate with the least free space.
///
/// Candidates are probed once each, in order. The first candidate holding the
/// minimum wins ties. Any probe failure aborts the selection, and an empty
/// input yields `ObjectNotFound`.
pub fn least_free_space<C: FreeSpaceCandidate>(
    ctx: Option<&CancellationToken>,
    candidates: &[C],
) -> Result<C, PolicyError> {
    let mut winner: Option<(i64, &C)> = None;

    for candidate in candidates {
        if ctx.is_some_and(|c| c.is_cancelled()) {
            return Err(PolicyError::Cancelled);
        }

        let upstream = candidate.upstream();
        let space = upstream.free_space().map_err(|e| {
            warn!("Failed to get free space for upstream {}: {}", upstream.name(), e);
            PolicyError::IoError(e)
        })?;
        trace!("Upstream {} has {} bytes free", upstream.name(), space);

        match winner {
            Some((min, _)) if space >= min => {}
            _ => winner = Some((space, candidate)),
        }
    }

    // A cancellation that lands during the last probe still discards the result
    if ctx.is_some_and(|c| c.is_cancelled()) {
        return Err(PolicyError::Cancelled);
    }

    match winner {
        Some((space, candidate)) => {
            debug!(
                "Selected upstream with least free space: {} ({} bytes)",
                candidate.upstream().name(),
                space
            );
            Ok(candidate.clone())
        }
        None => Err(PolicyError::ObjectNotFound),
    }
}
