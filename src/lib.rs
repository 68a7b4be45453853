pub mod config;
pub mod policy;
pub mod upstream;

#[cfg(test)]
mod test_utils;

pub use policy::{Policy, PolicyError};
pub use upstream::{Entry, EntryKind, LocalUpstream, Upstream, UpstreamMode, UpstreamRef};
