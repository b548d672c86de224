//! The three dashboard views, assembled from aggregates and chart series.

use serde::Serialize;

use crate::analyzers::aggregate::{
    build_summary_table, environment_averages, group_by_ec, join_growth_with_ec, optimal_ec_from,
    overview_metrics,
};
use crate::analyzers::types::{
    AggregatedSchoolSummary, EcGroupMean, EnvironmentAverage, OverviewMetrics,
};
use crate::charts::{
    BarChart, BoxPlot, ScatterChart, TimeSeriesChart, ec_bar_chart, environment_bar_grid,
    environment_time_series, fresh_weight_box_plot, trait_scatter,
};
use crate::error::Result;
use crate::records::{GrowthTrait, SchoolKey};
use crate::session::{SchoolSelection, Session};

/// Experiment overview: per-school summary and headline metrics.
#[derive(Debug, Clone, Serialize)]
pub struct OverviewView {
    pub summary: Vec<AggregatedSchoolSummary>,
    pub metrics: OverviewMetrics,
    pub missing_environment: Vec<SchoolKey>,
}

/// Environment comparison across schools, plus one school's time series when selected.
#[derive(Debug, Clone, Serialize)]
pub struct EnvironmentView {
    pub selection: String,
    pub averages: Vec<EnvironmentAverage>,
    pub charts: Vec<BarChart>,
    pub time_series: Option<TimeSeriesChart>,
}

/// Growth results by EC.
#[derive(Debug, Clone, Serialize)]
pub struct GrowthView {
    pub ec_groups: Vec<EcGroupMean>,
    pub optimal_ec: f64,
    pub ec_chart: BarChart,
    pub weight_by_school: BoxPlot,
    pub leaf_count_vs_weight: ScatterChart,
    pub shoot_length_vs_weight: ScatterChart,
    pub individual_count: usize,
}

pub fn overview(session: &Session) -> Result<OverviewView> {
    Ok(OverviewView {
        summary: build_summary_table(session)?,
        metrics: overview_metrics(session)?,
        missing_environment: session.missing_environment().iter().cloned().collect(),
    })
}

pub fn environment(session: &Session, selection: &SchoolSelection) -> Result<EnvironmentView> {
    let averages = environment_averages(session)?;
    let time_series = match selection {
        SchoolSelection::All => None,
        SchoolSelection::School(school) => Some(environment_time_series(
            school,
            session.environment_records(school),
        )),
    };

    Ok(EnvironmentView {
        selection: selection.to_string(),
        charts: environment_bar_grid(&averages),
        averages,
        time_series,
    })
}

pub fn growth(session: &Session) -> Result<GrowthView> {
    let joined = join_growth_with_ec(session)?;
    let ec_groups = group_by_ec(&joined);
    let optimal_ec = optimal_ec_from(&ec_groups)?;

    Ok(GrowthView {
        optimal_ec,
        ec_chart: ec_bar_chart(&ec_groups),
        weight_by_school: fresh_weight_box_plot(session.common_schools(), &joined),
        leaf_count_vs_weight: trait_scatter(GrowthTrait::LeafCount, &joined),
        shoot_length_vs_weight: trait_scatter(GrowthTrait::ShootLength, &joined),
        individual_count: joined.len(),
        ec_groups,
    })
}
