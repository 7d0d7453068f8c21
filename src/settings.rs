//! Run configuration, layered from an optional TOML file and `ANICOMPARE_*`
//! environment variables. The binary applies its command line flags on top.
//!
//! ```toml
//! output_path = "merged.csv"
//! variant = "raw"
//!
//! [source_paths]
//! dnadiff = "dnadiff_summary.csv"
//! fastani = "fastani_batches/"
//!
//! [delimiter_overrides]
//! mash = ";"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::{AnicompareError, Result};
use crate::identity::ExtractionPolicy;
use crate::metrics::SourceKind;
use crate::reader::{SourceFormat, Variant};

/// Looked up as `anicompare.toml` (or any other format `config` knows) in the
/// working directory when no file is given explicitly.
pub const DEFAULT_CONFIG: &str = "anicompare";
pub const ENV_PREFIX: &str = "ANICOMPARE";

// Maps are keyed by source name rather than `SourceKind`, since `config` hands
// map keys to serde as plain strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub source_paths: BTreeMap<String, PathBuf>,
    pub output_path: Option<PathBuf>,
    /// Keys present in some but not all sources.
    pub unmatched_path: Option<PathBuf>,
    /// Directory receiving one file per source with the records lacking codes.
    pub unhandled_dir: Option<PathBuf>,
    pub delimiter_overrides: BTreeMap<String, String>,
    pub variant: Variant,
    pub extraction_policy: Option<ExtractionPolicy>,
}

impl Settings {
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let builder = match file {
            Some(path) => Config::builder().add_source(File::from(path).required(true)),
            None => Config::builder().add_source(File::with_name(DEFAULT_CONFIG).required(false)),
        };
        let mut settings = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize::<Settings>()?;
        // fail early on unknown sources and bad delimiters, rather than when reading
        settings.source_paths = canonical_keys(std::mem::take(&mut settings.source_paths))?;
        settings.delimiter_overrides =
            canonical_keys(std::mem::take(&mut settings.delimiter_overrides))?;
        for name in settings.delimiter_overrides.keys() {
            settings.delimiter_for(parse_source(name)?)?;
        }
        Ok(settings)
    }

    pub fn source_path(&self, source: SourceKind) -> Option<&PathBuf> {
        self.source_paths.get(source.name())
    }

    pub fn set_source_path(&mut self, source: SourceKind, path: PathBuf) {
        self.source_paths.insert(source.name().to_string(), path);
    }

    pub fn delimiter_for(&self, source: SourceKind) -> Result<Option<u8>> {
        match self.delimiter_overrides.get(source.name()) {
            None => Ok(None),
            Some(text) => {
                let mut chars = text.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) if c.is_ascii() => Ok(Some(c as u8)),
                    _ => Err(AnicompareError::Config(format!(
                        "delimiter for {source} must be a single ASCII character, got '{text}'"
                    ))),
                }
            }
        }
    }

    /// The source's default format for the configured variant, with overrides applied.
    pub fn format_for(&self, source: SourceKind) -> Result<SourceFormat> {
        let mut format = SourceFormat::for_source(source, self.variant);
        if let Some(delimiter) = self.delimiter_for(source)? {
            format = format.with_delimiter(delimiter);
        }
        if let Some(policy) = self.extraction_policy {
            format = format.with_policy(policy);
        }
        Ok(format)
    }
}

fn parse_source(name: &str) -> Result<SourceKind> {
    name.parse().map_err(AnicompareError::Config)
}

fn canonical_keys<V>(map: BTreeMap<String, V>) -> Result<BTreeMap<String, V>> {
    map.into_iter()
        .map(|(name, value)| Ok((parse_source(&name)?.name().to_string(), value)))
        .collect()
}
