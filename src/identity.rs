//! Extraction of assembly accession codes from free-text filename fields.
//!
//! Tool outputs name genomes by the file they were computed from, e.g.
//! `GCA_000009765_Streptomyces_avermitilis_MA-4680.fna`. The comparable part is
//! the accession prefix: the marker `GC` plus the following characters, at most
//! [`CODE_LEN`] characters in total.

use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub const MARKER: &str = "GC";
pub const CODE_LEN: usize = 13;

lazy_static! {
    static ref ANYWHERE: Regex = Regex::new(&code_pattern()).unwrap();
    static ref AT_START: Regex = Regex::new(&format!("^{}", code_pattern())).unwrap();
}

// marker plus up to CODE_LEN - 2 further characters, e.g. `GC.{0,11}`
fn code_pattern() -> String {
    format!("{}.{{0,{}}}", regex::escape(MARKER), CODE_LEN - MARKER.len())
}

/// Where the marker is allowed to appear in a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionPolicy {
    /// The field must begin with the marker.
    #[default]
    Start,
    /// The first occurrence of the marker anywhere in the field is used.
    Anywhere,
}

impl ExtractionPolicy {
    fn pattern(&self) -> &'static Regex {
        match self {
            ExtractionPolicy::Start => &*AT_START,
            ExtractionPolicy::Anywhere => &*ANYWHERE,
        }
    }
    pub fn extract(&self, field: &str) -> Option<IdentityCode> {
        self.pattern()
            .find(field)
            .map(|m| IdentityCode(m.as_str().to_owned()))
    }
}

/// A genome assembly accession as found in a tool's filename field.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IdentityCode(String);

impl IdentityCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdentityCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Convenience for the common case of the marker at the start of the field.
pub fn extract_code(field: &str) -> Option<IdentityCode> {
    ExtractionPolicy::Start.extract(field)
}
