//! Flat delimited output: two identifier columns, then the record's values.
//!
//! No header row is written. Output files are created fresh; an existing file
//! at the target path is an error and is left untouched.

use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::Path;

use tracing::info;

use crate::error::{AnicompareError, Result};
use crate::metrics::Record;
use crate::pair::{PairKey, RawPair};

pub const DEFAULT_DELIMITER: u8 = b';';

/// The two leading identifier columns of a row.
pub trait KeyColumns {
    fn columns(&self) -> [&str; 2];
}

impl KeyColumns for PairKey {
    fn columns(&self) -> [&str; 2] {
        [self.first().as_str(), self.second().as_str()]
    }
}

impl KeyColumns for RawPair {
    fn columns(&self) -> [&str; 2] {
        [self.0.as_str(), self.1.as_str()]
    }
}

/// Opens `path` for writing, refusing to replace anything already there.
pub(crate) fn create_output(path: &Path) -> Result<File> {
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|e| match e.kind() {
            ErrorKind::AlreadyExists => AnicompareError::OutputExists(path.to_path_buf()),
            _ => AnicompareError::io(path, e),
        })
}

/// Fails with [`AnicompareError::OutputExists`] if something is at `path`.
pub(crate) fn ensure_absent(path: &Path) -> Result<()> {
    match path.try_exists() {
        Ok(false) => Ok(()),
        Ok(true) => Err(AnicompareError::OutputExists(path.to_path_buf())),
        Err(e) => Err(AnicompareError::io(path, e)),
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Exporter {
    delimiter: u8,
}

impl Default for Exporter {
    fn default() -> Self {
        Self { delimiter: DEFAULT_DELIMITER }
    }
}

impl Exporter {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with_delimiter(delimiter: u8) -> Self {
        Self { delimiter }
    }
    /// Writes one row per entry, ordered by key, and returns the row count.
    pub fn write<'m, K, R, I>(&self, path: &Path, rows: I) -> Result<usize>
    where
        K: KeyColumns + Ord + 'm,
        R: Record + 'm,
        I: IntoIterator<Item = (&'m K, &'m R)>,
    {
        let mut rows: Vec<(&K, &R)> = rows.into_iter().collect();
        rows.sort_by(|a, b| a.0.cmp(b.0));

        let file = create_output(path)?;
        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(false)
            .flexible(true)
            .from_writer(file);
        for (key, record) in &rows {
            let mut row: Vec<String> = key.columns().iter().map(|c| c.to_string()).collect();
            row.extend(record.values().iter().map(|v| v.to_string()));
            writer.write_record(&row)?;
        }
        writer.flush().map_err(|e| AnicompareError::io(path, e))?;
        info!(path = %path.display(), rows = rows.len(), "exported");
        Ok(rows.len())
    }
}

/// Writes rows that carry no key, e.g. free-form report lines. An empty row
/// becomes a bare line break.
pub(crate) fn write_lines(path: &Path, delimiter: u8, lines: &[Vec<String>]) -> Result<()> {
    let mut out: Vec<u8> = Vec::new();
    for line in lines {
        if line.is_empty() {
            // csv would write `""` for a record with one empty field
            out.push(b'\n');
            continue;
        }
        let mut writer = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .flexible(true)
            .from_writer(&mut out);
        writer.write_record(line)?;
        writer.flush().map_err(|e| AnicompareError::io(path, e))?;
    }
    let mut file = create_output(path)?;
    file.write_all(&out).map_err(|e| AnicompareError::io(path, e))?;
    Ok(())
}
