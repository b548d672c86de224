//! Runtime configuration for a dashboard session.

use clap::ValueEnum;
use std::path::PathBuf;

/// Environment variable consulted when no data directory is given explicitly.
pub const DATA_DIR_ENV: &str = "EC_DASHBOARD_DATA_DIR";
pub const DEFAULT_DATA_DIR: &str = "data";

/// What to do when two environment files resolve to the same school.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum DuplicatePolicy {
    /// Append the later file's rows (file-name order) after the earlier ones.
    #[default]
    Append,
    /// Fail the load with [`crate::error::DashboardError::DuplicateSchool`].
    Reject,
}

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub data_dir: PathBuf,
    pub duplicate_policy: DuplicatePolicy,
}

impl DashboardConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            duplicate_policy: DuplicatePolicy::default(),
        }
    }

    /// Uses `explicit` when given, else `EC_DASHBOARD_DATA_DIR`, else `data`.
    pub fn resolve(explicit: Option<PathBuf>, duplicate_policy: DuplicatePolicy) -> Self {
        let data_dir = explicit
            .or_else(|| std::env::var_os(DATA_DIR_ENV).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
        Self {
            data_dir,
            duplicate_policy,
        }
    }

    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_dir_wins() {
        let cfg = DashboardConfig::resolve(Some(PathBuf::from("/tmp/x")), DuplicatePolicy::Reject);
        assert_eq!(cfg.data_dir, PathBuf::from("/tmp/x"));
        assert_eq!(cfg.duplicate_policy, DuplicatePolicy::Reject);
    }

    #[test]
    fn test_default_policy_is_append() {
        let cfg = DashboardConfig::new("data");
        assert_eq!(cfg.duplicate_policy, DuplicatePolicy::Append);
    }
}
