//! Chart-ready data series.
//!
//! Rendering is left to whatever consumes the JSON; these types only carry
//! titles, axis labels and points.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::analyzers::types::{EcGroupMean, EnvironmentAverage, JoinedGrowthRow};
use crate::analyzers::utility::quantile;
use crate::records::{EnvField, EnvironmentRecord, GrowthTrait, SchoolKey};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub bars: Vec<Bar>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimePoint {
    pub time: NaiveDateTime,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    pub points: Vec<TimePoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeriesChart {
    pub title: String,
    pub series: Vec<Series>,
}

/// Five-number summary of one box.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxGroup {
    pub label: String,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxPlot {
    pub title: String,
    pub y_label: String,
    pub groups: Vec<BoxGroup>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub points: Vec<ScatterPoint>,
}

/// The 2x2 grid of per-school environment means: temperature, humidity, pH, EC.
pub fn environment_bar_grid(averages: &[EnvironmentAverage]) -> Vec<BarChart> {
    EnvField::ALL
        .iter()
        .map(|field| {
            let (title, pick): (&str, fn(&EnvironmentAverage) -> f64) = match field {
                EnvField::Temperature => ("Mean temperature", |a| a.mean_temperature),
                EnvField::Humidity => ("Mean humidity", |a| a.mean_humidity),
                EnvField::Ph => ("Mean pH", |a| a.mean_ph),
                EnvField::Ec => ("Mean EC", |a| a.mean_ec),
            };
            BarChart {
                title: title.to_string(),
                x_label: "school".to_string(),
                y_label: field.column().to_string(),
                bars: averages
                    .iter()
                    .map(|a| Bar {
                        label: a.school.to_string(),
                        value: pick(a),
                    })
                    .collect(),
            }
        })
        .collect()
}

/// Temperature, humidity and EC over time for one school. Blank readings are
/// left out of their series.
pub fn environment_time_series(school: &SchoolKey, records: &[EnvironmentRecord]) -> TimeSeriesChart {
    let series = [EnvField::Temperature, EnvField::Humidity, EnvField::Ec]
        .iter()
        .map(|field| Series {
            name: field.column().to_string(),
            points: records
                .iter()
                .filter_map(|r| {
                    field.value(r).map(|value| TimePoint {
                        time: r.time,
                        value,
                    })
                })
                .collect(),
        })
        .collect();

    TimeSeriesChart {
        title: format!("{school} environment"),
        series,
    }
}

/// Mean fresh weight per EC group. Groups without a weight are omitted.
pub fn ec_bar_chart(groups: &[EcGroupMean]) -> BarChart {
    BarChart {
        title: "Mean fresh weight by EC".to_string(),
        x_label: "EC".to_string(),
        y_label: GrowthTrait::FreshWeight.column().to_string(),
        bars: groups
            .iter()
            .filter_map(|g| {
                g.mean_fresh_weight_g.map(|value| Bar {
                    label: format!("{:.2}", g.ec),
                    value,
                })
            })
            .collect(),
    }
}

/// Fresh-weight distribution per school, in `schools` order.
pub fn fresh_weight_box_plot(schools: &[SchoolKey], rows: &[JoinedGrowthRow]) -> BoxPlot {
    let groups = schools
        .iter()
        .filter_map(|school| {
            let mut weights: Vec<f64> = rows
                .iter()
                .filter(|r| &r.record.school == school)
                .filter_map(|r| r.record.fresh_weight_g)
                .collect();
            weights.sort_by(f64::total_cmp);
            Some(BoxGroup {
                label: school.to_string(),
                min: *weights.first()?,
                q1: quantile(&weights, 0.25)?,
                median: quantile(&weights, 0.5)?,
                q3: quantile(&weights, 0.75)?,
                max: *weights.last()?,
                count: weights.len(),
            })
        })
        .collect();

    BoxPlot {
        title: "Fresh weight by school".to_string(),
        y_label: GrowthTrait::FreshWeight.column().to_string(),
        groups,
    }
}

/// `x_trait` against fresh weight, one point per individual with both values.
pub fn trait_scatter(x_trait: GrowthTrait, rows: &[JoinedGrowthRow]) -> ScatterChart {
    let y_trait = GrowthTrait::FreshWeight;
    ScatterChart {
        title: format!("{} vs {}", x_trait.column(), y_trait.column()),
        x_label: x_trait.column().to_string(),
        y_label: y_trait.column().to_string(),
        points: rows
            .iter()
            .filter_map(|r| {
                Some(ScatterPoint {
                    x: x_trait.value(&r.record)?,
                    y: y_trait.value(&r.record)?,
                    label: r.record.school.to_string(),
                })
            })
            .collect(),
    }
}
