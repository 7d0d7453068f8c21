//! Readers turning a tool's delimited output into a [`SourceMapping`].
//!
//! Every record is split on the delimiter configured for its source, never a
//! guessed one. Records whose filename fields both yield an accession code are
//! keyed by the canonical [`PairKey`]; the others land in the unhandled bucket
//! under their raw field values. Duplicate keys follow last-write-wins: the
//! later record replaces the earlier one and the replaced key is remembered in
//! [`SourceMapping::overwritten`].

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fs::{self, File};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use crate::error::{AnicompareError, Result};
use crate::identity::ExtractionPolicy;
use crate::metrics::{MetricTuple, SourceKind};
use crate::pair::{PairHasher, PairKey, RawPair};

/// Header lines of the aligner summary carry this label.
pub const HEADER_MARKER: &str = "AvgIdentity";

// ------------- SourceFormat -------------
/// Which flavour of a tool's output is being read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// As written by the tool itself.
    #[default]
    Raw,
    /// Semicolon separated, headerless, single file; what the exporter writes.
    Extract,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Layout {
    File,
    /// Every file with the given extension directly inside a directory,
    /// processed in file name order.
    Directory { extension: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFormat {
    pub delimiter: u8,
    /// Raw tool output is split literally; only extract files, which the
    /// exporter may quote, honour `"`.
    pub quoting: bool,
    pub header_marker: Option<String>,
    pub layout: Layout,
    pub policy: ExtractionPolicy,
}

impl SourceFormat {
    pub fn for_source(source: SourceKind, variant: Variant) -> Self {
        match (source, variant) {
            (SourceKind::DnaDiff, Variant::Raw) => Self {
                delimiter: b',',
                quoting: false,
                header_marker: Some(HEADER_MARKER.to_string()),
                layout: Layout::File,
                policy: ExtractionPolicy::Start,
            },
            (SourceKind::DnaDiff, Variant::Extract) => Self {
                delimiter: b';',
                quoting: true,
                header_marker: None,
                layout: Layout::File,
                policy: ExtractionPolicy::Start,
            },
            (SourceKind::FastAni, Variant::Raw) => Self {
                delimiter: b'\t',
                quoting: false,
                header_marker: None,
                layout: Layout::Directory { extension: "txt".to_string() },
                policy: ExtractionPolicy::Anywhere,
            },
            (SourceKind::FastAni, Variant::Extract) => Self {
                delimiter: b';',
                quoting: true,
                header_marker: None,
                layout: Layout::File,
                policy: ExtractionPolicy::Anywhere,
            },
            (SourceKind::Mash, Variant::Raw) => Self {
                delimiter: b'\t',
                quoting: false,
                header_marker: None,
                layout: Layout::File,
                policy: ExtractionPolicy::Anywhere,
            },
            (SourceKind::Mash, Variant::Extract) => Self {
                delimiter: b';',
                quoting: true,
                header_marker: None,
                layout: Layout::File,
                policy: ExtractionPolicy::Anywhere,
            },
        }
    }
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }
    pub fn with_policy(mut self, policy: ExtractionPolicy) -> Self {
        self.policy = policy;
        self
    }
    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }
}

// ------------- SourceMapping -------------
#[derive(Debug, Clone)]
pub struct SourceMapping<M> {
    source: SourceKind,
    entries: HashMap<PairKey, M, PairHasher>,
    overwritten: Vec<PairKey>,
}

impl<M: MetricTuple> SourceMapping<M> {
    pub fn new() -> Self {
        Self {
            source: M::SOURCE,
            entries: HashMap::default(),
            overwritten: Vec::new(),
        }
    }
    /// Inserts with last-write-wins semantics, returning the replaced tuple.
    pub fn insert(&mut self, key: PairKey, metrics: M) -> Option<M> {
        match self.entries.entry(key) {
            Entry::Occupied(mut e) => {
                self.overwritten.push(e.key().clone());
                Some(e.insert(metrics))
            }
            Entry::Vacant(e) => {
                e.insert(metrics);
                None
            }
        }
    }
    pub fn source(&self) -> SourceKind {
        self.source
    }
    pub fn get(&self, key: &PairKey) -> Option<&M> {
        self.entries.get(key)
    }
    pub fn contains_key(&self, key: &PairKey) -> bool {
        self.entries.contains_key(key)
    }
    pub fn keys(&self) -> impl Iterator<Item = &PairKey> {
        self.entries.keys()
    }
    pub fn iter(&self) -> impl Iterator<Item = (&PairKey, &M)> {
        self.entries.iter()
    }
    pub fn len(&self) -> usize {
        self.entries.len()
    }
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
    /// Keys that were seen more than once, once per replacement.
    pub fn overwritten(&self) -> &[PairKey] {
        &self.overwritten
    }
}

impl<M: MetricTuple> Default for SourceMapping<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: MetricTuple> FromIterator<(PairKey, M)> for SourceMapping<M> {
    fn from_iter<I: IntoIterator<Item = (PairKey, M)>>(iter: I) -> Self {
        let mut mapping = Self::new();
        for (key, metrics) in iter {
            mapping.insert(key, metrics);
        }
        mapping
    }
}

pub type UnhandledBucket<M> = HashMap<RawPair, M, PairHasher>;

/// Everything one reader produced.
#[derive(Debug, Clone)]
pub struct SourceReading<M> {
    pub mapping: SourceMapping<M>,
    pub unhandled: UnhandledBucket<M>,
}

// ------------- SourceReader -------------
pub struct SourceReader<M> {
    format: SourceFormat,
    metrics: PhantomData<M>,
}

impl<M: MetricTuple> SourceReader<M> {
    pub fn new(format: SourceFormat) -> Self {
        Self { format, metrics: PhantomData }
    }
    pub fn for_variant(variant: Variant) -> Self {
        Self::new(SourceFormat::for_source(M::SOURCE, variant))
    }
    pub fn format(&self) -> &SourceFormat {
        &self.format
    }
    pub fn read(&self, path: &Path) -> Result<SourceReading<M>> {
        let mut reading = SourceReading {
            mapping: SourceMapping::new(),
            unhandled: UnhandledBucket::default(),
        };
        match &self.format.layout {
            Layout::File => self.read_file(path, &mut reading)?,
            Layout::Directory { extension } => {
                for file in files_with_extension(path, extension)? {
                    self.read_file(&file, &mut reading)?;
                }
            }
        }
        info!(
            source = %M::SOURCE,
            path = %path.display(),
            pairs = reading.mapping.len(),
            unhandled = reading.unhandled.len(),
            overwritten = reading.mapping.overwritten().len(),
            "source read"
        );
        Ok(reading)
    }

    fn read_file(&self, path: &Path, reading: &mut SourceReading<M>) -> Result<()> {
        let file = File::open(path).map_err(|e| AnicompareError::io(path, e))?;
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.format.delimiter)
            .quoting(self.format.quoting)
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(file);
        let overwritten_before = reading.mapping.overwritten().len();
        let unhandled_before = reading.unhandled.len();
        let mut record = csv::StringRecord::new();
        let mut records = 0usize;
        while reader.read_record(&mut record)? {
            let line = record.position().map_or(0, |p| p.line());
            if record.iter().all(str::is_empty) {
                continue;
            }
            if let Some(marker) = &self.format.header_marker {
                if record.iter().any(|field| field.contains(marker.as_str())) {
                    continue;
                }
            }
            let fields: Vec<&str> = record.iter().collect();
            if fields.len() != 2 + M::ARITY {
                return Err(AnicompareError::Parse {
                    path: path.to_path_buf(),
                    line,
                    message: format!("expected {} fields, found {}", 2 + M::ARITY, fields.len()),
                });
            }
            let metrics = M::parse(&fields[2..]).map_err(|message| AnicompareError::Parse {
                path: path.to_path_buf(),
                line,
                message,
            })?;
            match (self.format.policy.extract(fields[0]), self.format.policy.extract(fields[1])) {
                (Some(a), Some(b)) => {
                    reading.mapping.insert(PairKey::new(a, b), metrics);
                }
                _ => {
                    reading
                        .unhandled
                        .insert(RawPair(fields[0].to_owned(), fields[1].to_owned()), metrics);
                }
            }
            records += 1;
        }
        let overwritten = reading.mapping.overwritten().len() - overwritten_before;
        if overwritten > 0 {
            warn!(path = %path.display(), overwritten, "duplicate pairs replaced by later records");
        }
        let unhandled = reading.unhandled.len() - unhandled_before;
        if unhandled > 0 {
            warn!(path = %path.display(), unhandled, "records without accession codes");
        }
        debug!(path = %path.display(), records, "file read");
        Ok(())
    }
}

/// Files directly inside `dir` with the given extension, sorted by file name.
fn files_with_extension(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| AnicompareError::io(dir, e))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| AnicompareError::io(dir, e))?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == extension) {
            files.push(path);
        } else {
            trace!(path = %path.display(), "skipped");
        }
    }
    files.sort();
    Ok(files)
}
