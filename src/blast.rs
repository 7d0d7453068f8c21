//! Aggregation of tabular local-alignment search results (`.out` files).
//!
//! Result files are grouped by the folder they live in, the folder usually
//! being named after the database that was searched. The report is a single
//! delimited file with a labelled header row per folder.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::{AnicompareError, Result};
use crate::export::{self, DEFAULT_DELIMITER};

pub const EXTENSION: &str = "out";

pub const COLUMN_LABELS: [&str; 10] = [
    "Per. Ident",
    "Longitud",
    "Mismatch",
    "Gap Open",
    "Q Start",
    "Q end",
    "Start",
    "S end",
    "E-Value",
    "Bitscore",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultFile {
    pub name: String,
    pub lines: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderResults {
    pub label: String,
    pub files: Vec<ResultFile>,
}

fn folder_label(folder: &Path) -> String {
    folder
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| folder.display().to_string())
        .to_uppercase()
}

fn read_result_file(path: &Path) -> Result<Vec<Vec<String>>> {
    let content = fs::read_to_string(path).map_err(|e| AnicompareError::io(path, e))?;
    Ok(content
        .lines()
        .map(|line| line.split_whitespace().map(str::to_string).collect::<Vec<_>>())
        .filter(|fields| !fields.is_empty())
        .collect())
}

/// Collects every non-empty `.out` file below `root`, grouped by folder.
/// Folders without any non-empty result file are left out. The root is
/// resolved first, so `.` or `..` still label files directly inside it by the
/// folder's real name.
pub fn collect(root: &Path) -> Result<Vec<FolderResults>> {
    let root = fs::canonicalize(root).map_err(|e| AnicompareError::io(root, e))?;
    let root = root.as_path();
    let mut folders: BTreeMap<PathBuf, Vec<ResultFile>> = BTreeMap::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| AnicompareError::io(root, e.into()))?;
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().is_none_or(|ext| ext != EXTENSION) {
            continue;
        }
        let lines = read_result_file(path)?;
        if lines.is_empty() {
            debug!(path = %path.display(), "empty result file");
            continue;
        }
        let folder = path.parent().unwrap_or(root).to_path_buf();
        folders.entry(folder).or_default().push(ResultFile {
            name: entry.file_name().to_string_lossy().to_string(),
            lines,
        });
    }
    Ok(folders
        .into_iter()
        .map(|(folder, files)| FolderResults { label: folder_label(&folder), files })
        .collect())
}

/// Lays the results out row by row, as they appear in the report.
pub fn report_rows(results: &[FolderResults]) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    for folder in results {
        let mut header = vec![folder.label.clone(), String::new()];
        header.extend(COLUMN_LABELS.iter().map(|l| l.to_string()));
        rows.push(header);
        for file in &folder.files {
            rows.push(Vec::new());
            rows.push(vec![file.name.clone()]);
            rows.extend(file.lines.iter().cloned());
        }
        rows.push(Vec::new());
        rows.push(Vec::new());
    }
    rows
}

/// Writes the report to `path`. Returns `None` and writes nothing when there
/// are no results.
pub fn write_report(results: &[FolderResults], path: &Path) -> Result<Option<usize>> {
    if results.is_empty() {
        info!("no search results found");
        return Ok(None);
    }
    let rows = report_rows(results);
    export::write_lines(path, DEFAULT_DELIMITER, &rows)?;
    let files: usize = results.iter().map(|f| f.files.len()).sum();
    info!(path = %path.display(), folders = results.len(), files, "search results written");
    Ok(Some(files))
}
