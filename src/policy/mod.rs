pub mod error;
pub mod existing_path_all;
pub mod existing_path_least_free_space;
pub mod least_free_space;
pub mod registry;
pub mod traits;
pub mod utils;

// Re-export commonly used items
pub use error::PolicyError;
pub use traits::Policy;

pub use existing_path_all::ExistingPathAllPolicy;
pub use existing_path_least_free_space::ExistingPathLeastFreeSpacePolicy;
pub use least_free_space::{least_free_space, FreeSpaceCandidate};
pub use registry::{get_policy, policy_names, register_builtin_policies};
