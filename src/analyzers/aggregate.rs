//! Per-school means, the growth/EC join and EC grouping behind every view.

use crate::analyzers::types::{
    AggregatedSchoolSummary, EcGroupMean, EnvironmentAverage, JoinedGrowthRow, OverviewMetrics,
};
use crate::analyzers::utility::mean_present;
use crate::error::{DashboardError, Result};
use crate::records::{EnvField, GrowthTrait, SchoolKey};
use crate::session::Session;

/// Mean of `field` over `school`'s environment readings, skipping blanks.
///
/// # Errors
///
/// [`DashboardError::UnknownSchool`] if `school` is not a common school,
/// [`DashboardError::NoReadings`] if it has no reading for `field`.
pub fn school_environment_mean(session: &Session, school: &SchoolKey, field: EnvField) -> Result<f64> {
    if !session.common_schools().contains(school) {
        return Err(DashboardError::UnknownSchool(school.to_string()));
    }
    mean_present(session.environment_records(school).iter().map(|r| field.value(r))).ok_or_else(|| {
        DashboardError::NoReadings {
            scope: format!("school '{school}'"),
            field: field.column(),
        }
    })
}

pub fn environment_averages(session: &Session) -> Result<Vec<EnvironmentAverage>> {
    session
        .common_schools()
        .iter()
        .map(|school| {
            Ok(EnvironmentAverage {
                school: school.clone(),
                mean_temperature: school_environment_mean(session, school, EnvField::Temperature)?,
                mean_humidity: school_environment_mean(session, school, EnvField::Humidity)?,
                mean_ph: school_environment_mean(session, school, EnvField::Ph)?,
                mean_ec: school_environment_mean(session, school, EnvField::Ec)?,
            })
        })
        .collect()
}

/// One row per common school: mean EC and number of measured individuals.
pub fn build_summary_table(session: &Session) -> Result<Vec<AggregatedSchoolSummary>> {
    session
        .common_schools()
        .iter()
        .map(|school| {
            Ok(AggregatedSchoolSummary {
                school: school.clone(),
                mean_ec: school_environment_mean(session, school, EnvField::Ec)?,
                individual_count: session.growth_records(school).len(),
            })
        })
        .collect()
}

/// Every growth record of the common schools with its school's mean EC,
/// in school order then sheet order.
pub fn join_growth_with_ec(session: &Session) -> Result<Vec<JoinedGrowthRow>> {
    let mut joined = Vec::new();
    for school in session.common_schools() {
        let ec = school_environment_mean(session, school, EnvField::Ec)?;
        joined.extend(
            session
                .growth_records(school)
                .iter()
                .map(|record| JoinedGrowthRow {
                    record: record.clone(),
                    ec,
                }),
        );
    }
    Ok(joined)
}

/// Groups joined rows by exact EC value, ascending, with mean fresh weight.
pub fn group_by_ec(rows: &[JoinedGrowthRow]) -> Vec<EcGroupMean> {
    let mut sorted: Vec<&JoinedGrowthRow> = rows.iter().collect();
    sorted.sort_by(|a, b| a.ec.total_cmp(&b.ec));

    sorted
        .chunk_by(|a, b| a.ec == b.ec)
        .map(|group| EcGroupMean {
            ec: group[0].ec,
            mean_fresh_weight_g: mean_present(group.iter().map(|r| r.record.fresh_weight_g)),
            individual_count: group.len(),
        })
        .collect()
}

pub fn ec_grouped_means(session: &Session) -> Result<Vec<EcGroupMean>> {
    Ok(group_by_ec(&join_growth_with_ec(session)?))
}

/// The EC value whose group has the highest mean fresh weight.
///
/// `groups` must be in ascending EC order; on a tie the smallest EC wins.
pub fn optimal_ec_of(groups: &[EcGroupMean]) -> Option<f64> {
    let mut best: Option<(f64, f64)> = None;
    for group in groups {
        let Some(weight) = group.mean_fresh_weight_g else {
            continue;
        };
        match best {
            Some((_, best_weight)) if weight <= best_weight => {}
            _ => best = Some((group.ec, weight)),
        }
    }
    best.map(|(ec, _)| ec)
}

/// [`optimal_ec_of`], failing with [`DashboardError::NoReadings`] when no
/// group has a fresh weight.
pub fn optimal_ec_from(groups: &[EcGroupMean]) -> Result<f64> {
    optimal_ec_of(groups).ok_or_else(|| DashboardError::NoReadings {
        scope: "any EC group".to_string(),
        field: GrowthTrait::FreshWeight.column(),
    })
}

pub fn optimal_ec(session: &Session) -> Result<f64> {
    optimal_ec_from(&ec_grouped_means(session)?)
}

pub fn overview_metrics(session: &Session) -> Result<OverviewMetrics> {
    let schools = session.common_schools();
    let readings = || schools.iter().flat_map(|s| session.environment_records(s));

    Ok(OverviewMetrics {
        total_individuals: schools.iter().map(|s| session.growth_records(s).len()).sum(),
        mean_temperature: mean_present(readings().map(|r| r.temperature)),
        mean_humidity: mean_present(readings().map(|r| r.humidity)),
        optimal_ec: optimal_ec(session)?,
    })
}
