use crate::policy::{get_policy, Policy};
use crate::upstream::{LocalUpstream, UpstreamMode, UpstreamRef};
use parking_lot::RwLock;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

pub type ConfigRef = Arc<RwLock<Config>>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Option not found: {0}")]
    NotFound(String),
    #[error("Invalid value: {0}")]
    InvalidValue(String),
    #[error("Unknown policy: {0}")]
    UnknownPolicy(String),
    #[error("At least one upstream is required")]
    NoUpstreams,
    #[error("Upstream {0} is not a directory")]
    MissingUpstream(PathBuf),
}

impl ConfigError {
    pub fn errno(&self) -> i32 {
        match self {
            ConfigError::NotFound(_) => 61,          // ENOATTR
            ConfigError::InvalidValue(_) => 22,      // EINVAL
            ConfigError::UnknownPolicy(_) => 22,     // EINVAL
            ConfigError::NoUpstreams => 22,          // EINVAL
            ConfigError::MissingUpstream(_) => 2,    // ENOENT
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Action,
    Create,
    Search,
}

impl FromStr for Category {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "action" => Ok(Category::Action),
            "create" => Ok(Category::Create),
            "search" => Ok(Category::Search),
            _ => Err(ConfigError::InvalidValue(s.to_string())),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Category::Action => "action",
            Category::Create => "create",
            Category::Search => "search",
        };
        f.write_str(s)
    }
}

/// An upstream as written on the command line: `path[:ro|:nc|:rw]`.
/// A trailing `:suffix` that is not a mode is part of the path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamSpec {
    pub root: PathBuf,
    pub mode: UpstreamMode,
}

impl FromStr for UpstreamSpec {
    type Err = ConfigError;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        if spec.is_empty() {
            return Err(ConfigError::InvalidValue("empty upstream".to_string()));
        }
        if let Some((root, suffix)) = spec.rsplit_once(':') {
            if let (false, Some(mode)) = (root.is_empty(), UpstreamMode::parse(suffix)) {
                return Ok(UpstreamSpec {
                    root: PathBuf::from(root),
                    mode,
                });
            }
        }
        Ok(UpstreamSpec {
            root: PathBuf::from(spec),
            mode: UpstreamMode::ReadWrite,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub upstreams: Vec<UpstreamSpec>,
    pub action_policy: String,
    pub create_policy: String,
    pub search_policy: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            upstreams: Vec::new(),
            action_policy: "eplfs".to_string(),
            create_policy: "eplfs".to_string(),
            search_policy: "eplfs".to_string(),
        }
    }
}

impl Config {
    /// Apply one `key=value` option such as `func.create=eplfs`
    pub fn set_option(&mut self, option: &str) -> Result<(), ConfigError> {
        let (key, value) = option
            .split_once('=')
            .ok_or_else(|| ConfigError::InvalidValue(option.to_string()))?;

        let slot = match key {
            "func.action" => &mut self.action_policy,
            "func.create" => &mut self.create_policy,
            "func.search" => &mut self.search_policy,
            _ => return Err(ConfigError::NotFound(key.to_string())),
        };
        if get_policy(value).is_none() {
            return Err(ConfigError::UnknownPolicy(value.to_string()));
        }
        *slot = value.to_string();
        Ok(())
    }

    pub fn policy_name(&self, category: Category) -> &str {
        match category {
            Category::Action => &self.action_policy,
            Category::Create => &self.create_policy,
            Category::Search => &self.search_policy,
        }
    }

    /// The registered policy configured for `category`
    pub fn resolve(&self, category: Category) -> Result<Arc<dyn Policy>, ConfigError> {
        let name = self.policy_name(category);
        get_policy(name).ok_or_else(|| ConfigError::UnknownPolicy(name.to_string()))
    }

    /// Open every configured upstream as a local directory
    pub fn build_upstreams(&self) -> Result<Vec<UpstreamRef>, ConfigError> {
        if self.upstreams.is_empty() {
            return Err(ConfigError::NoUpstreams);
        }
        self.upstreams
            .iter()
            .map(|spec| {
                if !spec.root.is_dir() {
                    return Err(ConfigError::MissingUpstream(spec.root.clone()));
                }
                let upstream = LocalUpstream::new(spec.root.clone(), spec.mode);
                Ok(Arc::new(upstream) as UpstreamRef)
            })
            .collect()
    }
}

pub fn create_config() -> ConfigRef {
    Arc::new(RwLock::new(Config::default()))
}
