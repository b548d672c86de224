//! A loaded data directory: both record families plus their reconciliation.
//!
//! A [`Session`] is built once per run and handed by reference to the
//! aggregation and view code. Nothing derived from it is cached.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use tracing::info;

use crate::config::DashboardConfig;
use crate::error::{DashboardError, Result};
use crate::loaders::{load_environment, load_growth};
use crate::normalize::normalize;
use crate::reconcile::{Reconciliation, reconcile};
use crate::records::{EnvironmentRecord, GrowthRecord, SchoolKey};

/// Labels that select every common school.
pub const ALL_SCHOOLS_LABELS: &[&str] = &["All", "all", "전체"];

#[derive(Debug, Clone)]
pub struct Session {
    environment: BTreeMap<SchoolKey, Vec<EnvironmentRecord>>,
    growth: BTreeMap<SchoolKey, Vec<GrowthRecord>>,
    reconciliation: Reconciliation,
}

/// Which schools a view covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchoolSelection {
    All,
    School(SchoolKey),
}

impl fmt::Display for SchoolSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchoolSelection::All => f.write_str("All"),
            SchoolSelection::School(s) => write!(f, "{s}"),
        }
    }
}

impl Session {
    /// Loads and reconciles the data directory named by `config`.
    ///
    /// # Errors
    ///
    /// Fails before any aggregation runs if the directory is missing, either
    /// data set is empty, a file is malformed, or no school has both kinds
    /// of data.
    #[tracing::instrument(skip_all, fields(data_dir = %config.data_dir.display()))]
    pub fn open(config: &DashboardConfig) -> Result<Self> {
        if !config.data_dir.is_dir() {
            return Err(DashboardError::MissingDirectory(config.data_dir.clone()));
        }

        let environment = load_environment(&config.data_dir, config.duplicate_policy)?;
        let growth = load_growth(&config.data_dir)?;

        let session = Self::from_records(environment, growth)?;
        info!(
            schools = session.common_schools().len(),
            missing_environment = session.missing_environment().len(),
            "Session ready"
        );
        Ok(session)
    }

    /// Builds a session from records already in memory.
    pub fn from_records(
        environment: BTreeMap<SchoolKey, Vec<EnvironmentRecord>>,
        growth: BTreeMap<SchoolKey, Vec<GrowthRecord>>,
    ) -> Result<Self> {
        if environment.is_empty() || growth.is_empty() {
            return Err(DashboardError::EmptyDataset {
                environment_schools: environment.len(),
                growth_schools: growth.len(),
            });
        }

        let reconciliation = reconcile(environment.keys(), growth.keys())?;
        Ok(Self {
            environment,
            growth,
            reconciliation,
        })
    }

    pub fn reconciliation(&self) -> &Reconciliation {
        &self.reconciliation
    }

    pub fn common_schools(&self) -> &[SchoolKey] {
        &self.reconciliation.common_schools
    }

    pub fn missing_environment(&self) -> &BTreeSet<SchoolKey> {
        &self.reconciliation.missing_environment
    }

    /// Environment records of `school`, empty if the school is unknown.
    pub fn environment_records(&self, school: &SchoolKey) -> &[EnvironmentRecord] {
        self.environment.get(school).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Growth records of `school`, empty if the school is unknown.
    pub fn growth_records(&self, school: &SchoolKey) -> &[GrowthRecord] {
        self.growth.get(school).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Parses a selector value: an "All" label or a common school name.
    pub fn select(&self, raw: &str) -> Result<SchoolSelection> {
        let trimmed = raw.trim();
        if ALL_SCHOOLS_LABELS.contains(&trimmed) {
            return Ok(SchoolSelection::All);
        }
        let key = SchoolKey::new(trimmed);
        if self.common_schools().contains(&key) {
            Ok(SchoolSelection::School(key))
        } else {
            Err(DashboardError::UnknownSchool(normalize(trimmed)))
        }
    }

    /// Selector values in display order: "All" followed by the common schools.
    pub fn selector_options(&self) -> Vec<String> {
        std::iter::once(ALL_SCHOOLS_LABELS[0].to_string())
            .chain(self.common_schools().iter().map(SchoolKey::to_string))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn env(school: &str) -> EnvironmentRecord {
        EnvironmentRecord {
            school: SchoolKey::new(school),
            time: NaiveDateTime::default(),
            temperature: Some(20.0),
            humidity: Some(50.0),
            ph: Some(6.0),
            ec: Some(1.0),
            extra: Vec::new(),
        }
    }

    fn growth(school: &str) -> GrowthRecord {
        GrowthRecord {
            school: SchoolKey::new(school),
            leaf_count: Some(4.0),
            shoot_length_mm: Some(10.0),
            fresh_weight_g: Some(1.0),
            extra: Vec::new(),
        }
    }

    fn session() -> Session {
        let environment = BTreeMap::from([
            (SchoolKey::new("A"), vec![env("A")]),
            (SchoolKey::new("B"), vec![env("B")]),
        ]);
        let growth = BTreeMap::from([
            (SchoolKey::new("A"), vec![growth("A")]),
            (SchoolKey::new("B"), vec![growth("B")]),
            (SchoolKey::new("C"), vec![growth("C")]),
        ]);
        Session::from_records(environment, growth).unwrap()
    }

    #[test]
    fn test_empty_environment_is_empty_dataset() {
        let growth = BTreeMap::from([(SchoolKey::new("A"), vec![growth("A")])]);
        let err = Session::from_records(BTreeMap::new(), growth).unwrap_err();
        assert!(matches!(
            err,
            DashboardError::EmptyDataset {
                environment_schools: 0,
                growth_schools: 1
            }
        ));
    }

    #[test]
    fn test_select_all_and_school() {
        let s = session();
        assert_eq!(s.select("All").unwrap(), SchoolSelection::All);
        assert_eq!(s.select("전체").unwrap(), SchoolSelection::All);
        assert_eq!(
            s.select(" B ").unwrap(),
            SchoolSelection::School(SchoolKey::new("B"))
        );
    }

    #[test]
    fn test_select_growth_only_school_is_unknown() {
        let s = session();
        assert!(matches!(s.select("C"), Err(DashboardError::UnknownSchool(_))));
    }

    #[test]
    fn test_selector_options() {
        assert_eq!(session().selector_options(), vec!["All", "A", "B"]);
    }

    #[test]
    fn test_unknown_school_has_no_records() {
        let s = session();
        assert!(s.environment_records(&SchoolKey::new("Z")).is_empty());
        assert_eq!(s.growth_records(&SchoolKey::new("C")).len(), 1);
    }
}
