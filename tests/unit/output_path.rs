//! Unit tests for export file naming

use chrono::NaiveDate;
use skillbridge_extractor::output::{ExportFormat, OutputPathBuilder};
use skillbridge_extractor::Category;
use std::path::PathBuf;
use tempfile::TempDir;

fn timestamp() -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 11, 30)
        .unwrap()
        .and_hms_opt(9, 7, 0)
        .unwrap()
}

#[test]
fn test_label_sanitization_in_file_name() {
    let category = Category::parse("Arts/Design: Media").unwrap();
    let path = OutputPathBuilder::new(PathBuf::from("output"), &category)
        .with_timestamp(timestamp())
        .build();

    assert_eq!(
        path,
        PathBuf::from("output/SkillBridge_Arts_Design__Media_20241130_0907.xlsx")
    );
}

#[test]
fn test_parent_traversal_is_neutralised() {
    let category = Category::parse("../etc").unwrap();
    let name = OutputPathBuilder::new(PathBuf::from("output"), &category)
        .with_timestamp(timestamp())
        .with_format(ExportFormat::Csv)
        .file_name();

    assert!(!name.contains(".."));
    assert!(!name.contains('/'));
    assert!(name.ends_with("_20241130_0907.csv"));
}

#[test]
fn test_default_timestamp_layout() {
    let category = Category::parse("Healthcare").unwrap();
    let name = OutputPathBuilder::new(PathBuf::from("output"), &category).file_name();

    let stamp = name
        .strip_prefix("SkillBridge_Healthcare_")
        .and_then(|rest| rest.strip_suffix(".xlsx"))
        .unwrap();
    assert_eq!(stamp.len(), 13);
    assert_eq!(&stamp[8..9], "_");
    assert!(stamp.chars().filter(|c| *c != '_').all(|c| c.is_ascii_digit()));
}

#[test]
fn test_ensure_directory_creates_missing_root() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("nested").join("output");
    let category = Category::parse("Healthcare").unwrap();

    OutputPathBuilder::new(root.clone(), &category)
        .ensure_directory()
        .unwrap();

    assert!(root.is_dir());
}
