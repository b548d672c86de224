use std::fs;
use std::path::Path;

use ec_dashboard::analyzers::aggregate::{
    build_summary_table, ec_grouped_means, join_growth_with_ec, optimal_ec,
    school_environment_mean,
};
use ec_dashboard::config::{DashboardConfig, DuplicatePolicy};
use ec_dashboard::error::DashboardError;
use ec_dashboard::loaders::read_environment_rows;
use ec_dashboard::output::{export_environment_csv, export_growth_xlsx};
use ec_dashboard::records::{EnvField, SchoolKey};
use ec_dashboard::session::Session;
use ec_dashboard::views;
use rust_xlsxwriter::Workbook;
use tempfile::TempDir;

const ENV_HEADER: &str = "time,temperature,humidity,ph,ec\n";

fn write_env(dir: &Path, file_name: &str, ecs: &[f64]) {
    let mut body = String::from(ENV_HEADER);
    for (i, ec) in ecs.iter().enumerate() {
        body.push_str(&format!("2025-05-0{} 09:00:00,20.5,55.0,6.2,{ec}\n", i + 1));
    }
    fs::write(dir.join(file_name), body).unwrap();
}

/// One sheet per school with the Korean column headers used in the field.
fn write_growth(dir: &Path, sheets: &[(&str, Vec<f64>)]) {
    let mut workbook = Workbook::new();
    for (school, weights) in sheets {
        let ws = workbook.add_worksheet();
        ws.set_name(*school).unwrap();
        for (c, h) in ["개체번호", "잎 수(장)", "지상부 길이(mm)", "생중량(g)"].iter().enumerate() {
            ws.write_string(0, c as u16, *h).unwrap();
        }
        for (r, w) in weights.iter().enumerate() {
            let row = r as u32 + 1;
            ws.write_number(row, 0, row as f64).unwrap();
            ws.write_number(row, 1, 5.0 + r as f64).unwrap();
            ws.write_number(row, 2, 30.0 + *w).unwrap();
            ws.write_number(row, 3, *w).unwrap();
        }
    }
    workbook.save(dir.join("생육결과데이터.xlsx")).unwrap();
}

fn scenario_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    write_env(dir.path(), "A_환경데이터.csv", &[1.0, 1.0, 2.0]);
    write_env(dir.path(), "B_환경데이터.csv", &[2.0, 2.0]);
    write_growth(dir.path(), &[("A", vec![10.0, 12.0]), ("B", vec![20.0, 22.0])]);
    dir
}

fn open(dir: &Path) -> Result<Session, DashboardError> {
    Session::open(&DashboardConfig::new(dir))
}

#[test]
fn test_two_school_scenario() {
    let dir = scenario_dir();
    let session = open(dir.path()).unwrap();
    let a = SchoolKey::new("A");

    assert_eq!(session.common_schools(), &[a.clone(), SchoolKey::new("B")]);

    let mean_a = school_environment_mean(&session, &a, EnvField::Ec).unwrap();
    assert!((mean_a - 1.333).abs() < 1e-3);

    let joined = join_growth_with_ec(&session).unwrap();
    assert_eq!(joined.len(), 4);
    assert_eq!(joined[0].ec, mean_a);
    assert_eq!(joined[3].ec, 2.0);

    let groups = ec_grouped_means(&session).unwrap();
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].mean_fresh_weight_g, Some(11.0));
    assert_eq!(groups[1].mean_fresh_weight_g, Some(21.0));

    let best = optimal_ec(&session).unwrap();
    assert_eq!(best, 2.0);
    assert!(groups.iter().any(|g| g.ec == best));
    let best_weight = groups.iter().find(|g| g.ec == best).unwrap().mean_fresh_weight_g;
    assert!(groups.iter().all(|g| g.mean_fresh_weight_g <= best_weight));
}

#[test]
fn test_growth_school_without_environment_is_warning() {
    let dir = TempDir::new().unwrap();
    write_env(dir.path(), "A_env.csv", &[1.0]);
    write_env(dir.path(), "B_env.csv", &[2.0]);
    write_growth(dir.path(), &[("A", vec![1.0]), ("B", vec![2.0]), ("C", vec![3.0])]);

    let session = open(dir.path()).unwrap();
    let missing: Vec<_> = session.missing_environment().iter().cloned().collect();
    assert_eq!(missing, vec![SchoolKey::new("C")]);
    assert!(!session.common_schools().contains(&SchoolKey::new("C")));

    let summary = build_summary_table(&session).unwrap();
    assert!(summary.iter().all(|row| row.school != SchoolKey::new("C")));
    let joined = join_growth_with_ec(&session).unwrap();
    assert_eq!(joined.len(), 2);
}

#[test]
fn test_empty_environment_directory_is_empty_dataset() {
    let dir = TempDir::new().unwrap();
    write_growth(dir.path(), &[("A", vec![1.0])]);

    let err = open(dir.path()).unwrap_err();
    assert!(matches!(
        err,
        DashboardError::EmptyDataset {
            environment_schools: 0,
            ..
        }
    ));
}

#[test]
fn test_missing_workbook_is_empty_dataset() {
    let dir = TempDir::new().unwrap();
    write_env(dir.path(), "A_env.csv", &[1.0]);

    let err = open(dir.path()).unwrap_err();
    assert!(matches!(
        err,
        DashboardError::EmptyDataset {
            growth_schools: 0,
            ..
        }
    ));
}

#[test]
fn test_missing_directory() {
    let dir = TempDir::new().unwrap();
    let err = open(&dir.path().join("data")).unwrap_err();
    assert!(matches!(err, DashboardError::MissingDirectory(_)));
}

#[test]
fn test_no_overlap() {
    let dir = TempDir::new().unwrap();
    write_env(dir.path(), "A_env.csv", &[1.0]);
    write_growth(dir.path(), &[("B", vec![1.0])]);

    assert!(matches!(open(dir.path()), Err(DashboardError::NoOverlap)));
}

#[test]
fn test_decomposed_file_name_matches_composed_sheet() {
    let dir = TempDir::new().unwrap();
    // "송도고" with conjoining jamo, as macOS stores file names
    let nfd = "\u{1109}\u{1169}\u{11bc}\u{1103}\u{1169}\u{1100}\u{1169}";
    write_env(dir.path(), &format!("{nfd}_환경데이터.csv"), &[1.5]);
    write_growth(dir.path(), &[("송도고", vec![4.0])]);

    let session = open(dir.path()).unwrap();
    assert_eq!(session.common_schools(), &[SchoolKey::new("송도고")]);
    assert!(session.missing_environment().is_empty());
}

#[test]
fn test_reject_duplicate_policy() {
    let dir = scenario_dir();
    write_env(dir.path(), "A_extra.csv", &[3.0]);

    let config = DashboardConfig::new(dir.path()).with_duplicate_policy(DuplicatePolicy::Reject);
    assert!(matches!(
        Session::open(&config),
        Err(DashboardError::DuplicateSchool { .. })
    ));

    let appended = open(dir.path()).unwrap();
    assert_eq!(appended.environment_records(&SchoolKey::new("A")).len(), 4);
}

#[test]
fn test_malformed_timestamp_halts_load() {
    let dir = scenario_dir();
    fs::write(
        dir.path().join("B_환경데이터.csv"),
        format!("{ENV_HEADER}someday,20,55,6,2\n"),
    )
    .unwrap();

    assert!(matches!(open(dir.path()), Err(DashboardError::DataFormat { .. })));
}

#[test]
fn test_exports_round_trip() {
    let dir = scenario_dir();
    let session = open(dir.path()).unwrap();
    let out = TempDir::new().unwrap();

    let csv_path = out.path().join("environment_all.csv");
    let rows = export_environment_csv(&session, &csv_path).unwrap();
    assert_eq!(rows, 5);

    let reparsed = read_environment_rows(
        fs::File::open(&csv_path).unwrap(),
        &SchoolKey::new("all"),
        &csv_path,
    )
    .unwrap();
    let ecs: Vec<_> = reparsed.iter().map(|r| r.ec).collect();
    assert_eq!(ecs, vec![Some(1.0), Some(1.0), Some(2.0), Some(2.0), Some(2.0)]);

    let xlsx_path = out.path().join("growth_all.xlsx");
    export_growth_xlsx(&session, &xlsx_path).unwrap();
    assert!(xlsx_path.exists());
}

#[test]
fn test_views_over_loaded_directory() {
    let dir = scenario_dir();
    let session = open(dir.path()).unwrap();

    let overview = views::overview(&session).unwrap();
    assert_eq!(overview.metrics.total_individuals, 4);
    assert_eq!(overview.metrics.mean_temperature, Some(20.5));

    let selection = session.select("B").unwrap();
    let env = views::environment(&session, &selection).unwrap();
    assert_eq!(env.time_series.unwrap().series[2].points.len(), 2);

    let growth = views::growth(&session).unwrap();
    assert_eq!(growth.optimal_ec, 2.0);
    assert_eq!(growth.shoot_length_vs_weight.points.len(), 4);
}
