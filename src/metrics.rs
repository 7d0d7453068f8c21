//! Metric tuples: the numeric payload each tool reports for one genome pair.
//!
//! Each tool has its own fixed-arity tuple type implementing [`MetricTuple`].
//! Columns are kept in the order the tool writes them, which is also the order
//! the exporter writes them back out, so an exported mapping re-reads unchanged
//! with the semicolon variant of the same source format.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ------------- SourceKind -------------
/// The external tools whose results can be reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Whole-genome aligner summary after delta filtering.
    DnaDiff,
    /// Fast average nucleotide identity estimator.
    FastAni,
    /// Sketch based distance estimator, reported as identity.
    Mash,
}

impl SourceKind {
    pub fn name(&self) -> &'static str {
        match self {
            SourceKind::DnaDiff => "dnadiff",
            SourceKind::FastAni => "fastani",
            SourceKind::Mash => "mash",
        }
    }
}

impl FromStr for SourceKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dnadiff" => Ok(SourceKind::DnaDiff),
            "fastani" => Ok(SourceKind::FastAni),
            "mash" => Ok(SourceKind::Mash),
            other => Err(format!("unknown source '{other}'")),
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ------------- Value -------------
/// A single output cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Float(f64),
    Count(u64),
    Label(String),
}

impl Value {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Count(v) => Some(*v as f64),
            Value::Label(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        // f64 Display is the shortest representation that parses back exactly
        match self {
            Value::Float(v) => write!(f, "{}", v),
            Value::Count(v) => write!(f, "{}", v),
            Value::Label(v) => f.write_str(v),
        }
    }
}

/// Anything that can be written as the value columns of an output row.
pub trait Record {
    fn values(&self) -> Vec<Value>;
}

pub trait MetricTuple: Record + Clone + fmt::Debug + PartialEq {
    const SOURCE: SourceKind;
    const ARITY: usize;
    /// Tuple position of the identity percentage, the field compared across tools.
    const IDENTITY: usize;
    /// Parses the metric columns of a record, i.e. everything after the two
    /// filename fields. The caller guarantees `fields.len() == ARITY`.
    fn parse(fields: &[&str]) -> Result<Self, String>;
    fn field(&self, position: usize) -> Option<Value> {
        self.values().into_iter().nth(position)
    }
}

fn parse_float(field: &str, column: &str) -> Result<f64, String> {
    field
        .parse::<f64>()
        .map_err(|e| format!("{column} is not a number ('{field}'): {e}"))
}

fn parse_count(field: &str, column: &str) -> Result<u64, String> {
    field
        .parse::<u64>()
        .map_err(|e| format!("{column} is not a count ('{field}'): {e}"))
}

// ------------- DnaDiff -------------
/// `aligned_bases, AvgIdentity, SNPs`
#[derive(Debug, Clone, PartialEq)]
pub struct DnaDiff {
    pub aligned_bases: u64,
    pub avg_identity: f64,
    pub snps: u64,
}

impl Record for DnaDiff {
    fn values(&self) -> Vec<Value> {
        vec![
            Value::Count(self.aligned_bases),
            Value::Float(self.avg_identity),
            Value::Count(self.snps),
        ]
    }
}

impl MetricTuple for DnaDiff {
    const SOURCE: SourceKind = SourceKind::DnaDiff;
    const ARITY: usize = 3;
    const IDENTITY: usize = 1;
    fn parse(fields: &[&str]) -> Result<Self, String> {
        Ok(Self {
            aligned_bases: parse_count(fields[0], "aligned_bases")?,
            avg_identity: parse_float(fields[1], "AvgIdentity")?,
            snps: parse_count(fields[2], "SNPs")?,
        })
    }
}

// ------------- FastAni -------------
/// `ANI, mapped fragments, total fragments`
#[derive(Debug, Clone, PartialEq)]
pub struct FastAni {
    pub ani: f64,
    pub mappings: u64,
    pub total_fragments: u64,
}

impl Record for FastAni {
    fn values(&self) -> Vec<Value> {
        vec![
            Value::Float(self.ani),
            Value::Count(self.mappings),
            Value::Count(self.total_fragments),
        ]
    }
}

impl MetricTuple for FastAni {
    const SOURCE: SourceKind = SourceKind::FastAni;
    const ARITY: usize = 3;
    const IDENTITY: usize = 0;
    fn parse(fields: &[&str]) -> Result<Self, String> {
        Ok(Self {
            ani: parse_float(fields[0], "ANI")?,
            mappings: parse_count(fields[1], "mappings")?,
            total_fragments: parse_count(fields[2], "total_fragments")?,
        })
    }
}

// ------------- Mash -------------
#[derive(Debug, Clone, PartialEq)]
pub struct Mash {
    pub ani: f64,
}

impl Record for Mash {
    fn values(&self) -> Vec<Value> {
        vec![Value::Float(self.ani)]
    }
}

impl MetricTuple for Mash {
    const SOURCE: SourceKind = SourceKind::Mash;
    const ARITY: usize = 1;
    const IDENTITY: usize = 0;
    fn parse(fields: &[&str]) -> Result<Self, String> {
        Ok(Self { ani: parse_float(fields[0], "ANI")? })
    }
}
