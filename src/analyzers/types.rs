//! Tables derived from a session by the aggregation layer.

use serde::Serialize;

use crate::records::{GrowthRecord, SchoolKey};

/// One row of the overview table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedSchoolSummary {
    pub school: SchoolKey,
    pub mean_ec: f64,
    pub individual_count: usize,
}

/// Per-school environment means.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnvironmentAverage {
    pub school: SchoolKey,
    pub mean_temperature: f64,
    pub mean_humidity: f64,
    pub mean_ph: f64,
    pub mean_ec: f64,
}

/// A growth record with its school's mean conductivity attached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JoinedGrowthRow {
    #[serde(flatten)]
    pub record: GrowthRecord,
    #[serde(rename = "EC")]
    pub ec: f64,
}

/// Mean biomass of every individual grown at one EC value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EcGroupMean {
    pub ec: f64,
    /// `None` when no individual in the group has a recorded weight.
    pub mean_fresh_weight_g: Option<f64>,
    pub individual_count: usize,
}

/// Headline numbers for the overview.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverviewMetrics {
    pub total_individuals: usize,
    /// Over every reading of the common schools, not a mean of school means.
    pub mean_temperature: Option<f64>,
    pub mean_humidity: Option<f64>,
    pub optimal_ec: f64,
}
