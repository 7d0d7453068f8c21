//! The `compare` and `extract` runs, as driven by the binary.
//!
//! A run checks every file it is going to create before it writes the first
//! one, so a refused target or a failing source leaves the output locations
//! as they were.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use crate::error::{AnicompareError, Result};
use crate::export::{self, Exporter};
use crate::identity::ExtractionPolicy;
use crate::metrics::{DnaDiff, FastAni, Mash, MetricTuple, SourceKind};
use crate::reader::{SourceReader, SourceReading, Variant};
use crate::reconcile::{Joinable, Reconciler};
use crate::settings::Settings;

// ------------- Overrides -------------
/// Command line values; whatever is set here replaces the loaded settings.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub sources: Vec<(SourceKind, PathBuf)>,
    pub output: Option<PathBuf>,
    pub unmatched: Option<PathBuf>,
    pub unhandled_dir: Option<PathBuf>,
    pub extract: bool,
    pub policy: Option<ExtractionPolicy>,
}

impl Overrides {
    pub fn apply(self, settings: &mut Settings) {
        for (source, path) in self.sources {
            settings.set_source_path(source, path);
        }
        if self.output.is_some() {
            settings.output_path = self.output;
        }
        if self.unmatched.is_some() {
            settings.unmatched_path = self.unmatched;
        }
        if self.unhandled_dir.is_some() {
            settings.unhandled_dir = self.unhandled_dir;
        }
        if self.extract {
            settings.variant = Variant::Extract;
        }
        if let Some(policy) = self.policy {
            settings.extraction_policy = Some(policy);
        }
    }
}

// ------------- RunSummary -------------
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceSummary {
    pub path: PathBuf,
    pub pairs: usize,
    pub unhandled: usize,
    pub overwritten: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub sources: BTreeMap<SourceKind, SourceSummary>,
    pub merged: usize,
    pub unmatched: usize,
    pub output: PathBuf,
    pub unmatched_path: Option<PathBuf>,
    pub unhandled_files: Vec<PathBuf>,
}

impl RunSummary {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

// ------------- compare -------------
fn read_source<M: MetricTuple>(
    settings: &Settings,
    summary: &mut BTreeMap<SourceKind, SourceSummary>,
) -> Result<Option<SourceReading<M>>> {
    let Some(path) = settings.source_path(M::SOURCE) else {
        return Ok(None);
    };
    let reading = SourceReader::<M>::new(settings.format_for(M::SOURCE)?).read(path)?;
    summary.insert(
        M::SOURCE,
        SourceSummary {
            path: path.clone(),
            pairs: reading.mapping.len(),
            unhandled: reading.unhandled.len(),
            overwritten: reading.mapping.overwritten().len(),
        },
    );
    Ok(Some(reading))
}

// where the source's codeless records go, if anywhere
fn unhandled_target<M: MetricTuple>(
    settings: &Settings,
    reading: &Option<SourceReading<M>>,
) -> Option<PathBuf> {
    let dir = settings.unhandled_dir.as_ref()?;
    match reading {
        Some(reading) if !reading.unhandled.is_empty() => {
            Some(dir.join(format!("{}_unhandled.csv", M::SOURCE)))
        }
        _ => None,
    }
}

fn write_unhandled<M: MetricTuple>(
    target: &Option<PathBuf>,
    reading: &Option<SourceReading<M>>,
) -> Result<()> {
    if let (Some(target), Some(reading)) = (target, reading) {
        Exporter::new().write(target, reading.unhandled.iter())?;
    }
    Ok(())
}

/// Reads the configured sources, joins them on their identity fields and
/// writes the merged rows, plus the unmatched and unhandled reports when
/// asked for.
pub fn compare(settings: &Settings) -> Result<RunSummary> {
    let output = settings
        .output_path
        .clone()
        .ok_or_else(|| AnicompareError::Config("no output path given".into()))?;
    export::ensure_absent(&output)?;
    if let Some(path) = &settings.unmatched_path {
        export::ensure_absent(path)?;
    }

    let mut sources = BTreeMap::new();
    let dnadiff = read_source::<DnaDiff>(settings, &mut sources)?;
    let fastani = read_source::<FastAni>(settings, &mut sources)?;
    let mash = read_source::<Mash>(settings, &mut sources)?;

    let mut reconciler = Reconciler::new();
    if let Some(reading) = &dnadiff {
        reconciler = reconciler.join(&reading.mapping as &dyn Joinable, DnaDiff::IDENTITY);
    }
    if let Some(reading) = &fastani {
        reconciler = reconciler.join(&reading.mapping as &dyn Joinable, FastAni::IDENTITY);
    }
    if let Some(reading) = &mash {
        reconciler = reconciler.join(&reading.mapping as &dyn Joinable, Mash::IDENTITY);
    }
    let reconciliation = reconciler.reconcile()?;
    if reconciliation.merged.is_empty() {
        warn!("sources share no pairs");
    }

    let targets = (
        unhandled_target(settings, &dnadiff),
        unhandled_target(settings, &fastani),
        unhandled_target(settings, &mash),
    );
    let unhandled_files: Vec<PathBuf> =
        [&targets.0, &targets.1, &targets.2].into_iter().flatten().cloned().collect();
    for target in &unhandled_files {
        export::ensure_absent(target)?;
    }

    if let Some(dir) = settings.unhandled_dir.as_ref().filter(|_| !unhandled_files.is_empty()) {
        fs::create_dir_all(dir).map_err(|e| AnicompareError::io(dir, e))?;
    }
    write_unhandled(&targets.0, &dnadiff)?;
    write_unhandled(&targets.1, &fastani)?;
    write_unhandled(&targets.2, &mash)?;
    Exporter::new().write(&output, reconciliation.merged.iter())?;
    if let Some(path) = &settings.unmatched_path {
        Exporter::new().write(path, reconciliation.unmatched.iter().map(|u| (&u.key, u)))?;
    }
    Ok(RunSummary {
        sources,
        merged: reconciliation.merged.len(),
        unmatched: reconciliation.unmatched.len(),
        output,
        unmatched_path: settings.unmatched_path.clone(),
        unhandled_files,
    })
}

// ------------- extract -------------
/// Reads one source as configured and writes its keyed pairs in the
/// semicolon extract format. Returns the number of rows written.
pub fn extract<M: MetricTuple>(settings: &Settings, input: &Path, output: &Path) -> Result<usize> {
    export::ensure_absent(output)?;
    let reading = SourceReader::<M>::new(settings.format_for(M::SOURCE)?).read(input)?;
    let rows = Exporter::new().write(output, reading.mapping.iter())?;
    info!(source = %M::SOURCE, rows, output = %output.display(), "extract written");
    Ok(rows)
}

pub fn extract_source(
    settings: &Settings,
    source: SourceKind,
    input: &Path,
    output: &Path,
) -> Result<usize> {
    match source {
        SourceKind::DnaDiff => extract::<DnaDiff>(settings, input, output),
        SourceKind::FastAni => extract::<FastAni>(settings, input, output),
        SourceKind::Mash => extract::<Mash>(settings, input, output),
    }
}
