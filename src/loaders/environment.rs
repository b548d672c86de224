//! Environment sensor logs: one delimited file per school.

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::files_with_extension;
use crate::config::DuplicatePolicy;
use crate::error::{DashboardError, Result};
use crate::normalize::header_key;
use crate::parser::{parse_reading, parse_timestamp};
use crate::records::{EnvField, EnvironmentRecord, SchoolKey};

pub const TIME_COLUMN: &str = "time";

/// Written in front of exported rows; not carried as an extra column on read.
pub const SCHOOL_COLUMN: &str = "school";

/// Loads every `*.csv` in `dir`, keyed by the school named in the file name.
///
/// The school is the part of the file stem before the first `_`. Files are
/// read in file-name order; two files for the same school are handled
/// according to `policy`.
#[tracing::instrument(skip_all, fields(dir = %dir.display(), policy = ?policy))]
pub fn load_environment(
    dir: &Path,
    policy: DuplicatePolicy,
) -> Result<BTreeMap<SchoolKey, Vec<EnvironmentRecord>>> {
    let mut data: BTreeMap<SchoolKey, Vec<EnvironmentRecord>> = BTreeMap::new();
    let mut sources: HashMap<SchoolKey, PathBuf> = HashMap::new();

    for path in files_with_extension(dir, "csv")? {
        let Some(school) = school_from_file_name(&path) else {
            warn!(path = %path.display(), "Skipping file with no school name");
            continue;
        };

        if let Some(first) = sources.get(&school) {
            match policy {
                DuplicatePolicy::Reject => {
                    return Err(DashboardError::DuplicateSchool {
                        school: school.to_string(),
                        first: first.clone(),
                        second: path,
                    });
                }
                DuplicatePolicy::Append => {
                    warn!(
                        school = %school,
                        first = %first.display(),
                        appended = %path.display(),
                        "Appending second environment file for school"
                    );
                }
            }
        } else {
            sources.insert(school.clone(), path.clone());
        }

        let file = File::open(&path).map_err(|e| DashboardError::io(&path, e))?;
        let records = read_environment_rows(file, &school, &path)?;
        debug!(school = %school, rows = records.len(), path = %path.display(), "Environment file parsed");

        data.entry(school).or_default().extend(records);
    }

    info!(schools = data.len(), "Environment data loaded");
    Ok(data)
}

/// School key for an environment file: the stem up to the first `_`.
pub fn school_from_file_name(path: &Path) -> Option<SchoolKey> {
    let stem = path.file_stem()?.to_str()?;
    let name = stem.split('_').next().unwrap_or(stem).trim();
    if name.is_empty() {
        None
    } else {
        Some(SchoolKey::new(name))
    }
}

/// Parses delimited rows with `time`, `temperature`, `humidity`, `ph` and
/// `ec` columns into records owned by `school`.
///
/// `source` only labels errors. Any other column is kept as raw text in
/// [`EnvironmentRecord::extra`], except a `school` column.
pub fn read_environment_rows<R: Read>(
    reader: R,
    school: &SchoolKey,
    source: &Path,
) -> Result<Vec<EnvironmentRecord>> {
    let mut rdr = csv::Reader::from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| DashboardError::data_format(source, format!("unreadable header: {e}")))?
        .clone();
    let keys: Vec<String> = headers.iter().map(header_key).collect();
    let column = |name: &str| -> Result<usize> {
        keys.iter()
            .position(|k| k == name)
            .ok_or_else(|| DashboardError::data_format(source, format!("missing column '{name}'")))
    };

    let time_idx = column(TIME_COLUMN)?;
    let field_idx = [
        column(EnvField::Temperature.column())?,
        column(EnvField::Humidity.column())?,
        column(EnvField::Ph.column())?,
        column(EnvField::Ec.column())?,
    ];
    let extra_cols: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != time_idx && !field_idx.contains(i))
        .filter(|(i, _)| keys[*i] != SCHOOL_COLUMN)
        .map(|(i, name)| (i, name.trim_start_matches('\u{feff}').trim().to_string()))
        .filter(|(_, name)| !name.is_empty())
        .collect();

    let mut records = Vec::new();
    for (i, row) in rdr.records().enumerate() {
        let row_no = i + 1;
        let row = row.map_err(|e| DashboardError::data_format(source, format!("row {row_no}: {e}")))?;
        let cell = |idx: usize| row.get(idx).unwrap_or("");

        let raw_time = cell(time_idx);
        let time = parse_timestamp(raw_time).ok_or_else(|| {
            DashboardError::data_format(
                source,
                format!("row {row_no}: column '{TIME_COLUMN}': unparseable timestamp '{raw_time}'"),
            )
        })?;

        let mut values = [None; 4];
        for (slot, (field, idx)) in values.iter_mut().zip(EnvField::ALL.iter().zip(field_idx)) {
            *slot = parse_reading(cell(idx)).map_err(|detail| {
                DashboardError::data_format(
                    source,
                    format!("row {row_no}: column '{}': {detail}", field.column()),
                )
            })?;
        }
        let [temperature, humidity, ph, ec] = values;

        records.push(EnvironmentRecord {
            school: school.clone(),
            time,
            temperature,
            humidity,
            ph,
            ec,
            extra: extra_cols
                .iter()
                .map(|(idx, name)| (name.clone(), cell(*idx).to_string()))
                .collect(),
        });
    }

    Ok(records)
}
