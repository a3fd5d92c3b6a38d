//! Export of converted policies
//!
//! CSV output is split into one file per scope so each can be imported as a
//! separate Intune custom profile. JSON output carries the whole conversion.

use crate::error::Result;
use crate::oma::{PolicyRecord, Scope, partition_by_scope};
use crate::pipeline::Conversion;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Serialize)]
struct CsvRow<'a> {
    #[serde(rename = "Name")]
    name: &'a str,
    #[serde(rename = "Display Name")]
    display_name: &'a str,
    #[serde(rename = "OMA-URI")]
    omauri: &'a str,
    #[serde(rename = "Value")]
    value: &'a str,
    #[serde(rename = "Help")]
    help: &'a str,
}

impl<'a> From<&'a PolicyRecord> for CsvRow<'a> {
    fn from(record: &'a PolicyRecord) -> Self {
        Self {
            name: &record.name,
            display_name: &record.display_name,
            omauri: &record.omauri,
            value: &record.value,
            help: &record.help,
        }
    }
}

/// JSON report for one converted template
#[derive(Serialize, Debug)]
pub struct ConversionReport<'a> {
    pub source_admx: String,
    pub source_adml: String,
    pub app_name: &'a str,
    pub ingestion_uri: String,
    pub generated_at: DateTime<Utc>,
    pub policies: &'a [PolicyRecord],
}

impl<'a> ConversionReport<'a> {
    pub fn new(conversion: &'a Conversion) -> Self {
        Self {
            source_admx: conversion.admx_path.display().to_string(),
            source_adml: conversion.adml_path.display().to_string(),
            app_name: &conversion.app_name,
            ingestion_uri: conversion.ingestion_uri(),
            generated_at: Utc::now(),
            policies: &conversion.records,
        }
    }
}

/// Write `{stem}_user.csv` and `{stem}_device.csv` into `dir`.
///
/// Both files are always written, with only a header row when a scope has
/// no records.
pub fn write_csv(records: &[PolicyRecord], dir: &Path, stem: &str) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;
    let stem = sanitize_filename(stem);
    let (user, device) = partition_by_scope(records);

    let mut written = Vec::new();
    for (scope, rows) in [(Scope::User, user), (Scope::Device, device)] {
        let path = dir.join(format!("{}_{}.csv", stem, scope.as_str()));
        let mut writer = csv::Writer::from_path(&path)?;
        if rows.is_empty() {
            writer.write_record(["Name", "Display Name", "OMA-URI", "Value", "Help"])?;
        }
        for record in rows {
            writer.serialize(CsvRow::from(record))?;
        }
        writer.flush()?;
        written.push(path);
    }

    Ok(written)
}

/// Write `{stem}.json` into `dir`
pub fn write_json(conversion: &Conversion, dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("{}.json", sanitize_filename(&conversion.file_id())));
    let report = ConversionReport::new(conversion);
    fs::write(&path, serde_json::to_string_pretty(&report)?)?;
    Ok(path)
}

fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | ' ' => '_',
            _ => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, scope: Scope, help: &str) -> PolicyRecord {
        PolicyRecord {
            name: name.into(),
            display_name: format!("{} display", name),
            omauri: crate::oma::oma_uri(scope, "App~Policy~Cat", name),
            value: "<enabled/>\n<data id=\"Mode\" value=\"1\"/>".into(),
            help: help.into(),
            scope,
        }
    }

    #[test]
    fn test_write_csv_partitions_by_scope() {
        let dir = tempfile::tempdir().unwrap();
        let records = vec![
            record("A", Scope::User, "first"),
            record("B", Scope::Device, "second"),
            record("C", Scope::User, "third"),
        ];

        let paths = write_csv(&records, dir.path(), "my app").unwrap();
        assert_eq!(paths[0], dir.path().join("my_app_user.csv"));
        assert_eq!(paths[1], dir.path().join("my_app_device.csv"));

        let mut user = csv::Reader::from_path(&paths[0]).unwrap();
        let headers = user.headers().unwrap().clone();
        assert_eq!(
            headers.iter().collect::<Vec<_>>(),
            vec!["Name", "Display Name", "OMA-URI", "Value", "Help"]
        );
        let rows: Vec<csv::StringRecord> = user.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][0], "A");
        assert_eq!(&rows[1][0], "C");
        assert_eq!(&rows[0][3], "<enabled/>\n<data id=\"Mode\" value=\"1\"/>");

        let mut device = csv::Reader::from_path(&paths[1]).unwrap();
        assert_eq!(device.records().count(), 1);
    }

    #[test]
    fn test_write_csv_empty_scope_has_header() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_csv(&[record("A", Scope::Device, "")], dir.path(), "app").unwrap();

        let content = fs::read_to_string(&paths[0]).unwrap();
        assert_eq!(content.trim(), "Name,Display Name,OMA-URI,Value,Help");
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("a b:c"), "a_b_c");
        assert_eq!(sanitize_filename("chrome"), "chrome");
    }
}
