//! Output formatting and export of dashboard tables.
//!
//! Supports JSON serialization, CSV export of the environment table and
//! `.xlsx` export of the joined growth table.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use rust_xlsxwriter::{Format, Workbook};
use serde::Serialize;
use tracing::{debug, info};

use crate::analyzers::aggregate::join_growth_with_ec;
use crate::error::{DashboardError, Result};
use crate::loaders::environment::{SCHOOL_COLUMN, TIME_COLUMN};
use crate::loaders::growth::is_reserved_column;
use crate::records::{EnvField, GrowthTrait, TraitValue};
use crate::session::Session;
use crate::views::{EnvironmentView, GrowthView, OverviewView};

pub const GROWTH_SHEET_NAME: &str = "growth";

/// Writes `value` as pretty-printed JSON followed by a newline.
pub fn write_json<W: Write, T: Serialize>(mut out: W, value: &T) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}

/// Writes every environment record of the common schools as CSV, school
/// order then source order. Returns the number of rows written.
///
/// Columns: `school`, `time`, the four readings, then every extra source
/// column in first-seen order. Rows lacking an extra column leave it blank.
pub fn write_environment_csv<W: Write>(session: &Session, out: W) -> Result<usize> {
    let records: Vec<_> = session
        .common_schools()
        .iter()
        .flat_map(|school| session.environment_records(school))
        .collect();

    let mut extra_columns: Vec<&str> = Vec::new();
    for record in &records {
        for (name, _) in &record.extra {
            if !extra_columns.contains(&name.as_str()) {
                extra_columns.push(name);
            }
        }
    }

    let mut writer = csv::Writer::from_writer(out);
    let mut header = vec![SCHOOL_COLUMN, TIME_COLUMN];
    header.extend(EnvField::ALL.iter().map(|f| f.column()));
    header.extend(extra_columns.iter().copied());
    writer.write_record(&header)?;

    for record in &records {
        let mut row = vec![
            record.school.to_string(),
            record.time.format("%Y-%m-%dT%H:%M:%S%.f").to_string(),
        ];
        row.extend(
            EnvField::ALL
                .iter()
                .map(|f| f.value(record).map(|v| v.to_string()).unwrap_or_default()),
        );
        row.extend(extra_columns.iter().map(|column| {
            record
                .extra
                .iter()
                .find(|(name, _)| name.as_str() == *column)
                .map(|(_, v)| v.clone())
                .unwrap_or_default()
        }));
        writer.write_record(&row)?;
    }

    writer
        .flush()
        .map_err(|e| DashboardError::Export(e.to_string()))?;
    Ok(records.len())
}

pub fn export_environment_csv(session: &Session, path: &Path) -> Result<usize> {
    let file = File::create(path).map_err(|e| DashboardError::io(path, e))?;
    let rows = write_environment_csv(session, file)?;
    info!(rows, path = %path.display(), "Environment table exported");
    Ok(rows)
}

/// Builds a workbook holding the joined growth table on a single sheet.
///
/// Columns: `school`, the three measured traits, any extra sheet columns in
/// first-seen order, then `EC`. A stale `EC` or school column carried in
/// the records is left out.
pub fn growth_workbook(session: &Session) -> Result<Workbook> {
    let joined = join_growth_with_ec(session)?;

    let mut extra_columns: Vec<&str> = Vec::new();
    for row in &joined {
        for (name, _) in &row.record.extra {
            if !is_reserved_column(name) && !extra_columns.contains(&name.as_str()) {
                extra_columns.push(name);
            }
        }
    }

    let mut header: Vec<&str> = vec![SCHOOL_COLUMN];
    header.extend(GrowthTrait::ALL.iter().map(|t| t.column()));
    header.extend(extra_columns.iter().copied());
    header.push("EC");

    let date_format = Format::new().set_num_format("yyyy-mm-dd hh:mm:ss");
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(GROWTH_SHEET_NAME)?;
    for (col, name) in header.iter().enumerate() {
        sheet.write_string(0, col as u16, *name)?;
    }

    for (i, row) in joined.iter().enumerate() {
        let r = i as u32 + 1;
        sheet.write_string(r, 0, row.record.school.as_str())?;
        for (offset, t) in GrowthTrait::ALL.iter().enumerate() {
            if let Some(v) = t.value(&row.record) {
                sheet.write_number(r, 1 + offset as u16, v)?;
            }
        }
        for (offset, column) in extra_columns.iter().enumerate() {
            let col = (1 + GrowthTrait::ALL.len() + offset) as u16;
            let value = row
                .record
                .extra
                .iter()
                .find(|(name, _)| name.as_str() == *column)
                .map(|(_, v)| v);
            match value {
                Some(TraitValue::Number(n)) => {
                    sheet.write_number(r, col, *n)?;
                }
                Some(TraitValue::Text(s)) => {
                    sheet.write_string(r, col, s.as_str())?;
                }
                Some(TraitValue::Bool(b)) => {
                    sheet.write_boolean(r, col, *b)?;
                }
                Some(TraitValue::DateTime(dt)) => {
                    sheet.write_datetime_with_format(r, col, dt, &date_format)?;
                }
                Some(TraitValue::Empty) | None => {}
            }
        }
        sheet.write_number(r, (header.len() - 1) as u16, row.ec)?;
    }

    debug!(rows = joined.len(), columns = header.len(), "Growth workbook built");
    Ok(workbook)
}

pub fn export_growth_xlsx(session: &Session, path: &Path) -> Result<()> {
    let mut workbook = growth_workbook(session)?;
    workbook.save(path)?;
    info!(path = %path.display(), "Growth table exported");
    Ok(())
}

fn fmt_opt(v: Option<f64>, precision: usize) -> String {
    v.map(|v| format!("{v:.precision$}"))
        .unwrap_or_else(|| "n/a".to_string())
}

pub fn write_overview_text<W: Write>(mut out: W, view: &OverviewView) -> std::io::Result<()> {
    writeln!(out, "{:<20} {:>8} {:>12}", "school", "EC", "individuals")?;
    for row in &view.summary {
        writeln!(out, "{:<20} {:>8.2} {:>12}", row.school, row.mean_ec, row.individual_count)?;
    }
    writeln!(out)?;
    writeln!(out, "total individuals: {}", view.metrics.total_individuals)?;
    writeln!(out, "mean temperature:  {}", fmt_opt(view.metrics.mean_temperature, 1))?;
    writeln!(out, "mean humidity:     {}", fmt_opt(view.metrics.mean_humidity, 1))?;
    writeln!(out, "optimal EC:        {:.2}", view.metrics.optimal_ec)?;
    Ok(())
}

pub fn write_environment_text<W: Write>(mut out: W, view: &EnvironmentView) -> std::io::Result<()> {
    writeln!(
        out,
        "{:<20} {:>12} {:>10} {:>8} {:>8}",
        "school", "temperature", "humidity", "pH", "EC"
    )?;
    for a in &view.averages {
        writeln!(
            out,
            "{:<20} {:>12.1} {:>10.1} {:>8.2} {:>8.2}",
            a.school, a.mean_temperature, a.mean_humidity, a.mean_ph, a.mean_ec
        )?;
    }
    if let Some(ts) = &view.time_series {
        writeln!(out)?;
        writeln!(out, "{}", ts.title)?;
        for series in &ts.series {
            let first = series.points.first().map(|p| p.time.to_string());
            let last = series.points.last().map(|p| p.time.to_string());
            writeln!(
                out,
                "  {:<12} {:>6} points  {} .. {}",
                series.name,
                series.points.len(),
                first.unwrap_or_default(),
                last.unwrap_or_default()
            )?;
        }
    }
    Ok(())
}

pub fn write_growth_text<W: Write>(mut out: W, view: &GrowthView) -> std::io::Result<()> {
    writeln!(out, "{:>8} {:>16} {:>12}", "EC", "fresh weight (g)", "individuals")?;
    for g in &view.ec_groups {
        writeln!(
            out,
            "{:>8.2} {:>16} {:>12}",
            g.ec,
            fmt_opt(g.mean_fresh_weight_g, 2),
            g.individual_count
        )?;
    }
    writeln!(out)?;
    writeln!(out, "optimal EC: {:.2}", view.optimal_ec)?;
    for b in &view.weight_by_school.groups {
        writeln!(
            out,
            "  {:<20} min {:.2}  q1 {:.2}  median {:.2}  q3 {:.2}  max {:.2}",
            b.label, b.min, b.q1, b.median, b.q3, b.max
        )?;
    }
    Ok(())
}
