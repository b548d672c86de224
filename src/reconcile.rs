//! Matching environment schools against growth schools.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::warn;

use crate::error::{DashboardError, Result};
use crate::records::SchoolKey;

/// The working school list plus the schools dropped for lack of environment data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reconciliation {
    /// Schools present in both data sets, ascending.
    pub common_schools: Vec<SchoolKey>,
    /// Growth schools with no environment file. A warning, never an error.
    pub missing_environment: BTreeSet<SchoolKey>,
}

impl Reconciliation {
    pub fn has_warning(&self) -> bool {
        !self.missing_environment.is_empty()
    }

    /// Comma-separated list of the schools lacking environment data.
    pub fn warning_message(&self) -> Option<String> {
        if !self.has_warning() {
            return None;
        }
        let names: Vec<&str> = self.missing_environment.iter().map(SchoolKey::as_str).collect();
        Some(format!("schools without environment data: {}", names.join(", ")))
    }
}

/// Intersects the two key sets.
///
/// # Errors
///
/// Returns [`DashboardError::NoOverlap`] if no school is in both sets.
pub fn reconcile<'a>(
    env_keys: impl IntoIterator<Item = &'a SchoolKey>,
    growth_keys: impl IntoIterator<Item = &'a SchoolKey>,
) -> Result<Reconciliation> {
    let env: BTreeSet<&SchoolKey> = env_keys.into_iter().collect();
    let growth: BTreeSet<&SchoolKey> = growth_keys.into_iter().collect();

    let common_schools: Vec<SchoolKey> = env.intersection(&growth).map(|k| (*k).clone()).collect();
    if common_schools.is_empty() {
        return Err(DashboardError::NoOverlap);
    }

    let missing_environment: BTreeSet<SchoolKey> =
        growth.difference(&env).map(|k| (*k).clone()).collect();

    let reconciliation = Reconciliation {
        common_schools,
        missing_environment,
    };
    if let Some(msg) = reconciliation.warning_message() {
        warn!(missing = reconciliation.missing_environment.len(), "{msg}");
    }

    Ok(reconciliation)
}
