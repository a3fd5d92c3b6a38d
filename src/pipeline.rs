//! File level conversion pipeline
//!
//! Locates and loads an ADMX template and its ADML companion, then runs
//! category resolution followed by policy extraction.

use crate::admx::{self, AdmlDocument, AdmxDocument};
use crate::error::{Admx2OmaError, Result};
use crate::oma::{self, CategoryAreaMap, PolicyRecord};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Result of converting one template
#[derive(Debug, Clone)]
pub struct Conversion {
    pub admx_path: PathBuf,
    pub adml_path: PathBuf,
    pub app_name: String,
    pub areas: CategoryAreaMap,
    pub records: Vec<PolicyRecord>,
}

impl Conversion {
    /// ADMX file stem, used as the ingestion file id and output file name
    pub fn file_id(&self) -> String {
        file_stem(&self.admx_path)
    }

    pub fn ingestion_uri(&self) -> String {
        oma::ingestion_uri(&self.app_name, &self.file_id())
    }
}

/// Run the resolver and extractor over parsed documents
pub fn convert(admx: &AdmxDocument, adml: &AdmlDocument) -> (CategoryAreaMap, Vec<PolicyRecord>) {
    let areas = oma::resolve(admx);
    let records = oma::extract(admx, adml, &areas);
    (areas, records)
}

/// Load, resolve and extract one ADMX/ADML pair
pub fn convert_file(admx_path: &Path, adml_path: &Path) -> Result<Conversion> {
    let admx = load_admx(admx_path)?;
    let adml = load_adml(adml_path)?;
    let (areas, records) = convert(&admx, &adml);

    info!(
        "Converted {}: {} records from {} policies",
        admx_path.display(),
        records.len(),
        admx.policies.len()
    );

    Ok(Conversion {
        admx_path: admx_path.to_path_buf(),
        adml_path: adml_path.to_path_buf(),
        app_name: admx.target_prefix,
        areas,
        records,
    })
}

/// Locate the ADML companion of `admx_path` and convert the pair
pub fn convert_admx(admx_path: &Path, language: &str, adml: Option<&Path>) -> Result<Conversion> {
    let adml_path = locate_adml(admx_path, language, adml)?;
    convert_file(admx_path, &adml_path)
}

/// Outcome of a folder conversion
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub converted: Vec<Conversion>,
    pub failures: Vec<(PathBuf, Admx2OmaError)>,
}

impl BatchOutcome {
    pub fn total(&self) -> usize {
        self.converted.len() + self.failures.len()
    }

    /// `BatchFailed` when any template failed
    pub fn check(&self) -> Result<()> {
        if self.failures.is_empty() {
            return Ok(());
        }
        Err(Admx2OmaError::BatchFailed {
            failed: self.failures.len(),
            total: self.total(),
        })
    }
}

/// Convert every file with `convert_one`. A failing template is logged and
/// recorded, and the remaining files are still converted.
pub fn convert_batch<F>(files: &[PathBuf], mut convert_one: F) -> BatchOutcome
where
    F: FnMut(&Path) -> Result<Conversion>,
{
    let mut outcome = BatchOutcome::default();

    for file in files {
        match convert_one(file) {
            Ok(conversion) => outcome.converted.push(conversion),
            Err(e) => {
                warn!("Failed to convert {}: {}", file.display(), e);
                outcome.failures.push((file.clone(), e));
            }
        }
    }

    outcome
}

pub fn load_admx(path: &Path) -> Result<AdmxDocument> {
    let content = read_document(path)?;
    admx::parse_admx(&content).map_err(|e| with_path(e, path))
}

pub fn load_adml(path: &Path) -> Result<AdmlDocument> {
    let content = read_document(path)?;
    admx::parse_adml(&content).map_err(|e| with_path(e, path))
}

fn read_document(path: &Path) -> Result<String> {
    if !path.is_file() {
        return Err(Admx2OmaError::FileNotFound(path.to_path_buf()));
    }
    let bytes = fs::read(path)?;
    admx::decode_xml_bytes(&bytes)
}

fn with_path(error: Admx2OmaError, path: &Path) -> Admx2OmaError {
    match error {
        Admx2OmaError::XmlError(e) => {
            Admx2OmaError::InvalidDocument(format!("{}: {}", path.display(), e))
        }
        Admx2OmaError::InvalidDocument(msg) => {
            Admx2OmaError::InvalidDocument(format!("{}: {}", path.display(), msg))
        }
        other => other,
    }
}

/// Find the ADML companion of an ADMX file.
///
/// An explicit path wins. Otherwise `{dir}/{language}/{stem}.adml` (language
/// folder matched case-insensitively), then `{dir}/{stem}.adml`.
pub fn locate_adml(admx_path: &Path, language: &str, explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        if path.is_file() {
            return Ok(path.to_path_buf());
        }
        return Err(Admx2OmaError::FileNotFound(path.to_path_buf()));
    }

    let dir = match admx_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let file_name = format!("{}.adml", file_stem(admx_path));

    let language_dir = find_language_dir(&dir, language).unwrap_or_else(|| dir.join(language));
    let candidates = [language_dir.join(&file_name), dir.join(&file_name)];

    for candidate in &candidates {
        debug!("Looking for ADML at {}", candidate.display());
        if candidate.is_file() {
            return Ok(candidate.clone());
        }
    }

    Err(Admx2OmaError::AdmlNotFound {
        admx: admx_path.to_path_buf(),
        tried: candidates.to_vec(),
    })
}

fn find_language_dir(dir: &Path, language: &str) -> Option<PathBuf> {
    let exact = dir.join(language);
    if exact.is_dir() {
        return Some(exact);
    }

    fs::read_dir(dir)
        .ok()?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .find(|path| {
            path.is_dir()
                && path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.eq_ignore_ascii_case(language))
        })
}

/// `*.admx` files directly inside `dir`, sorted by path
pub fn find_admx_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry?;
        let is_admx = entry
            .path()
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("admx"));
        if entry.file_type().is_file() && is_admx {
            files.push(entry.into_path());
        }
    }

    files.sort();
    Ok(files)
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("policy")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_documents() {
        let admx = admx::parse_admx(
            r#"<policyDefinitions>
                 <policyNamespaces><target prefix="App" namespace="App.Policies" /></policyNamespaces>
                 <categories>
                   <category name="Cat1" />
                   <category name="Cat2"><parentCategory ref="Cat1" /></category>
                 </categories>
                 <policies>
                   <policy name="PolicyA" class="Machine"><parentCategory ref="Cat2" /></policy>
                 </policies>
               </policyDefinitions>"#,
        )
        .unwrap();

        let (areas, records) = convert(&admx, &AdmlDocument::default());
        assert_eq!(areas.len(), 2);
        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0].omauri,
            "./Device/Vendor/MSFT/Policy/Config/App~Policy~Cat1~Cat2/PolicyA"
        );
    }

    #[test]
    fn test_batch_continues_after_failure() {
        let files = vec![
            PathBuf::from("a.admx"),
            PathBuf::from("bad.admx"),
            PathBuf::from("c.admx"),
        ];
        let mut seen = Vec::new();

        let outcome = convert_batch(&files, |path| {
            seen.push(path.to_path_buf());
            if path.ends_with("bad.admx") {
                return Err(Admx2OmaError::InvalidDocument("broken".into()));
            }
            Ok(Conversion {
                admx_path: path.to_path_buf(),
                adml_path: path.with_extension("adml"),
                app_name: "App".into(),
                areas: CategoryAreaMap::default(),
                records: Vec::new(),
            })
        });

        assert_eq!(seen, files);
        assert_eq!(outcome.converted.len(), 2);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].0, PathBuf::from("bad.admx"));
        assert_eq!(outcome.total(), 3);
        assert!(matches!(
            outcome.check(),
            Err(Admx2OmaError::BatchFailed { failed: 1, total: 3 })
        ));
    }

    #[test]
    fn test_batch_without_failures_checks_ok() {
        let outcome = convert_batch(&[], |_| unreachable!());
        assert_eq!(outcome.total(), 0);
        assert!(outcome.check().is_ok());
    }

    #[test]
    fn test_ingestion_uri_uses_file_stem() {
        let conversion = Conversion {
            admx_path: PathBuf::from("/defs/contoso.admx"),
            adml_path: PathBuf::from("/defs/en-us/contoso.adml"),
            app_name: "Contoso".into(),
            areas: CategoryAreaMap::default(),
            records: Vec::new(),
        };
        assert_eq!(conversion.file_id(), "contoso");
        assert_eq!(
            conversion.ingestion_uri(),
            "./Device/Vendor/MSFT/Policy/ConfigOperations/ADMXInstall/Contoso/Policy/contoso"
        );
    }
}
