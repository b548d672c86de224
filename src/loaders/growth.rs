//! Growth measurements: one workbook, one sheet per school.

use std::collections::BTreeMap;
use std::path::Path;

use calamine::{Data, DataType, Reader, Xlsx, open_workbook};
use tracing::{debug, info, warn};

use super::files_with_extension;
use crate::error::{DashboardError, Result};
use crate::normalize::header_key;
use crate::parser::parse_reading;
use crate::records::{GrowthRecord, GrowthTrait, SchoolKey, TraitValue};

/// Header keys not carried as extra traits: the sheet name is the school,
/// and EC is always the environment mean injected at join time.
const RESERVED_COLUMN_KEYS: &[&str] = &["school", "학교", "학교명", "ec"];

/// Whether a growth column named `name` is replaced rather than passed through.
pub(crate) fn is_reserved_column(name: &str) -> bool {
    RESERVED_COLUMN_KEYS.contains(&header_key(name).as_str())
}

const EMPTY: &Data = &Data::Empty;

/// Loads the growth workbook in `dir`.
///
/// Returns an empty map when the directory holds no `.xlsx` file. When there
/// are several, the first by file name is used.
#[tracing::instrument(skip_all, fields(dir = %dir.display()))]
pub fn load_growth(dir: &Path) -> Result<BTreeMap<SchoolKey, Vec<GrowthRecord>>> {
    let workbooks: Vec<_> = files_with_extension(dir, "xlsx")?
        .into_iter()
        .filter(|p| {
            !p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("~$"))
        })
        .collect();

    let Some(path) = workbooks.first() else {
        info!("No growth workbook found");
        return Ok(BTreeMap::new());
    };
    for ignored in &workbooks[1..] {
        warn!(used = %path.display(), ignored = %ignored.display(), "Ignoring extra growth workbook");
    }

    read_growth_workbook(path)
}

/// Reads every sheet of the workbook at `path` as one school's records.
pub fn read_growth_workbook(path: &Path) -> Result<BTreeMap<SchoolKey, Vec<GrowthRecord>>> {
    let mut workbook: Xlsx<_> = open_workbook(path)
        .map_err(|e| DashboardError::data_format(path, format!("unreadable workbook: {e}")))?;

    let mut data: BTreeMap<SchoolKey, Vec<GrowthRecord>> = BTreeMap::new();
    for sheet in workbook.sheet_names() {
        let school = SchoolKey::new(&sheet);
        let range = workbook.worksheet_range(&sheet).map_err(|e| {
            DashboardError::data_format(path, format!("sheet '{sheet}': {e}"))
        })?;

        let rows: Vec<&[Data]> = range.rows().collect();
        let records = parse_sheet(&rows, &school)
            .map_err(|detail| DashboardError::data_format(path, format!("sheet '{sheet}': {detail}")))?;
        debug!(school = %school, rows = records.len(), "Growth sheet parsed");

        if data.contains_key(&school) {
            warn!(school = %school, sheet = %sheet, "Sheet name normalizes to an existing school; appending");
        }
        data.entry(school).or_default().extend(records);
    }

    info!(schools = data.len(), path = %path.display(), "Growth data loaded");
    Ok(data)
}

/// Turns sheet rows (header first) into records owned by `school`.
fn parse_sheet(rows: &[&[Data]], school: &SchoolKey) -> std::result::Result<Vec<GrowthRecord>, String> {
    let Some((header, body)) = rows.split_first() else {
        return Err("no header row".to_string());
    };

    let keys: Vec<String> = header.iter().map(|c| header_key(&c.to_string())).collect();
    let trait_idx = |t: GrowthTrait| -> std::result::Result<usize, String> {
        keys.iter()
            .position(|k| t.aliases().contains(&k.as_str()))
            .ok_or_else(|| format!("missing column '{}'", t.column()))
    };
    let leaf_idx = trait_idx(GrowthTrait::LeafCount)?;
    let shoot_idx = trait_idx(GrowthTrait::ShootLength)?;
    let weight_idx = trait_idx(GrowthTrait::FreshWeight)?;

    let extra_cols: Vec<(usize, String)> = header
        .iter()
        .enumerate()
        .filter(|(i, _)| ![leaf_idx, shoot_idx, weight_idx].contains(i))
        .filter(|(i, _)| !RESERVED_COLUMN_KEYS.contains(&keys[*i].as_str()))
        .map(|(i, c)| (i, c.to_string().trim().to_string()))
        .filter(|(_, name)| !name.is_empty())
        .collect();

    let mut records = Vec::new();
    for (i, row) in body.iter().enumerate() {
        if row.iter().all(is_blank) {
            continue;
        }
        let row_no = i + 1;
        let cell = |idx: usize| row.get(idx).unwrap_or(EMPTY);
        let number = |idx: usize, t: GrowthTrait| {
            numeric_cell(cell(idx)).map_err(|detail| format!("row {row_no}: column '{}': {detail}", t.column()))
        };

        records.push(GrowthRecord {
            school: school.clone(),
            leaf_count: number(leaf_idx, GrowthTrait::LeafCount)?,
            shoot_length_mm: number(shoot_idx, GrowthTrait::ShootLength)?,
            fresh_weight_g: number(weight_idx, GrowthTrait::FreshWeight)?,
            extra: extra_cols
                .iter()
                .map(|(idx, name)| (name.clone(), trait_value(cell(*idx))))
                .collect(),
        });
    }

    Ok(records)
}

fn is_blank(cell: &Data) -> bool {
    match cell {
        Data::Empty => true,
        Data::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn numeric_cell(cell: &Data) -> std::result::Result<Option<f64>, String> {
    match cell {
        Data::Float(f) => Ok(Some(*f)),
        Data::Int(i) => Ok(Some(*i as f64)),
        Data::Empty | Data::Error(_) => Ok(None),
        Data::String(s) => parse_reading(s),
        other => Err(format!("'{other}' is not a number")),
    }
}

fn trait_value(cell: &Data) -> TraitValue {
    match cell {
        Data::Float(f) => TraitValue::Number(*f),
        Data::Int(i) => TraitValue::Number(*i as f64),
        Data::Bool(b) => TraitValue::Bool(*b),
        Data::DateTime(_) | Data::DateTimeIso(_) => match cell.as_datetime() {
            Some(dt) => TraitValue::DateTime(dt),
            None => TraitValue::Text(cell.to_string()),
        },
        Data::Empty => TraitValue::Empty,
        other => TraitValue::Text(other.to_string()),
    }
}
