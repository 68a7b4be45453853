use crate::policy::existing_path_all::ExistingPathAllPolicy;
use crate::policy::existing_path_least_free_space::ExistingPathLeastFreeSpacePolicy;
use crate::policy::traits::Policy;
use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};
use tracing::debug;

type PolicyMap = BTreeMap<&'static str, Arc<dyn Policy>>;

/// Filled once by `register_builtin_policies`, read-only afterwards
static REGISTRY: OnceLock<PolicyMap> = OnceLock::new();

/// Add `policy` under its name.
///
/// Returns false and keeps the existing policy if the name is already taken.
fn register(map: &mut PolicyMap, policy: Arc<dyn Policy>) -> bool {
    let name = policy.name();
    if map.contains_key(name) {
        return false;
    }
    debug!("Registered policy {}", name);
    map.insert(name, policy);
    true
}

fn builtin_policies() -> PolicyMap {
    let mut map = PolicyMap::new();
    register(&mut map, Arc::new(ExistingPathAllPolicy::new()));
    register(&mut map, Arc::new(ExistingPathLeastFreeSpacePolicy::new()));
    map
}

/// Register every built-in policy; safe to call more than once
pub fn register_builtin_policies() {
    REGISTRY.get_or_init(builtin_policies);
}

/// Look a policy up by name. Nothing is found before registration.
pub fn get_policy(name: &str) -> Option<Arc<dyn Policy>> {
    REGISTRY.get()?.get(name).cloned()
}

pub fn policy_names() -> Vec<&'static str> {
    REGISTRY
        .get()
        .map(|map| map.keys().copied().collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::error::PolicyError;
    use crate::upstream::{Entry, UpstreamRef};
    use serial_test::serial;
    use std::path::Path;
    use tokio_util::sync::CancellationToken;

    struct ShadowPolicy;

    impl Policy for ShadowPolicy {
        fn name(&self) -> &'static str {
            "eplfs"
        }

        fn action(
            &self,
            _: &CancellationToken,
            _: &[UpstreamRef],
            _: &Path,
        ) -> Result<Vec<UpstreamRef>, PolicyError> {
            Err(PolicyError::ReadOnlyFilesystem)
        }

        fn action_entries(&self, _: &[Entry]) -> Result<Vec<Entry>, PolicyError> {
            Err(PolicyError::ReadOnlyFilesystem)
        }

        fn create(
            &self,
            _: &CancellationToken,
            _: &[UpstreamRef],
            _: &Path,
        ) -> Result<Vec<UpstreamRef>, PolicyError> {
            Err(PolicyError::ReadOnlyFilesystem)
        }

        fn create_entries(&self, _: &[Entry]) -> Result<Vec<Entry>, PolicyError> {
            Err(PolicyError::ReadOnlyFilesystem)
        }

        fn search(
            &self,
            _: &CancellationToken,
            _: &[UpstreamRef],
            _: &Path,
        ) -> Result<UpstreamRef, PolicyError> {
            Err(PolicyError::ReadOnlyFilesystem)
        }

        fn search_entries(&self, _: &[Entry]) -> Result<Entry, PolicyError> {
            Err(PolicyError::ReadOnlyFilesystem)
        }
    }

    #[test]
    #[serial]
    fn test_builtin_registration_is_idempotent() {
        register_builtin_policies();
        let first = get_policy("eplfs").unwrap();
        register_builtin_policies();

        let names = policy_names();
        assert_eq!(names, vec!["epall", "eplfs"]);
        // The second call did not rebuild the registry
        assert!(Arc::ptr_eq(&first, &get_policy("eplfs").unwrap()));
        assert!(get_policy("mfs").is_none());
    }

    #[test]
    fn test_duplicate_name_keeps_first() {
        let mut map = builtin_policies();
        assert!(!register(&mut map, Arc::new(ShadowPolicy)));
        assert_eq!(map.len(), 2);

        // The built-in policy is still the one served
        let policy = &map["eplfs"];
        let result = policy.search(&CancellationToken::new(), &[], Path::new("/f"));
        assert!(matches!(result, Err(PolicyError::ObjectNotFound)));
    }
}
