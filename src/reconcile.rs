//! Inner join of two or more source mappings on [`PairKey`].
//!
//! Every input contributes one metric, chosen by its position in the source's
//! tuple. A merged record holds the chosen metrics in input order followed by
//! one difference per pair of inputs: `m0 - m1`, `m0 - m2`, ..., `m1 - m2`, ...
//! Keys missing from any input are left out of the merge and listed in the
//! unmatched report instead.

use std::collections::{BTreeSet, HashMap};

use tracing::info;

use crate::error::{AnicompareError, Result};
use crate::metrics::{MetricTuple, Record, SourceKind, Value};
use crate::pair::{PairHasher, PairKey};
use crate::reader::SourceMapping;

/// Type erased view of a [`SourceMapping`] so tuples of different shapes can
/// be joined together.
pub trait Joinable {
    fn source(&self) -> SourceKind;
    fn arity(&self) -> usize;
    fn len(&self) -> usize;
    fn keys(&self) -> Box<dyn Iterator<Item = &PairKey> + '_>;
    fn contains(&self, key: &PairKey) -> bool;
    fn field(&self, key: &PairKey, position: usize) -> Option<Value>;
}

impl<M: MetricTuple> Joinable for SourceMapping<M> {
    fn source(&self) -> SourceKind {
        SourceMapping::source(self)
    }
    fn arity(&self) -> usize {
        M::ARITY
    }
    fn len(&self) -> usize {
        SourceMapping::len(self)
    }
    fn keys(&self) -> Box<dyn Iterator<Item = &PairKey> + '_> {
        Box::new(SourceMapping::keys(self))
    }
    fn contains(&self, key: &PairKey) -> bool {
        self.contains_key(key)
    }
    fn field(&self, key: &PairKey, position: usize) -> Option<Value> {
        self.get(key).and_then(|m| m.field(position))
    }
}

// ------------- MergedRecord -------------
#[derive(Debug, Clone, PartialEq)]
pub struct MergedRecord {
    selected: Vec<f64>,
    differences: Vec<f64>,
}

impl MergedRecord {
    fn new(selected: Vec<f64>) -> Self {
        let mut differences = Vec::new();
        for i in 0..selected.len() {
            for j in (i + 1)..selected.len() {
                differences.push(selected[i] - selected[j]);
            }
        }
        Self { selected, differences }
    }
    pub fn selected(&self) -> &[f64] {
        &self.selected
    }
    pub fn differences(&self) -> &[f64] {
        &self.differences
    }
}

impl Record for MergedRecord {
    fn values(&self) -> Vec<Value> {
        self.selected
            .iter()
            .chain(self.differences.iter())
            .map(|v| Value::Float(*v))
            .collect()
    }
}

// ------------- Unmatched -------------
/// A key that some, but not all, inputs know about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unmatched {
    pub key: PairKey,
    pub present_in: Vec<SourceKind>,
}

impl Record for Unmatched {
    fn values(&self) -> Vec<Value> {
        self.present_in
            .iter()
            .map(|s| Value::Label(s.name().to_string()))
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct Reconciliation {
    pub merged: HashMap<PairKey, MergedRecord, PairHasher>,
    /// Sorted by key.
    pub unmatched: Vec<Unmatched>,
}

// ------------- Reconciler -------------
struct Selection<'a> {
    mapping: &'a dyn Joinable,
    position: usize,
}

#[derive(Default)]
pub struct Reconciler<'a> {
    inputs: Vec<Selection<'a>>,
}

impl<'a> Reconciler<'a> {
    pub fn new() -> Self {
        Self { inputs: Vec::new() }
    }
    /// Adds an input, comparing the tuple field at `position`.
    pub fn join(mut self, mapping: &'a dyn Joinable, position: usize) -> Self {
        self.inputs.push(Selection { mapping, position });
        self
    }
    pub fn reconcile(&self) -> Result<Reconciliation> {
        if self.inputs.len() < 2 {
            return Err(AnicompareError::Reconcile(format!(
                "at least two sources are needed, got {}",
                self.inputs.len()
            )));
        }
        for input in &self.inputs {
            if input.position >= input.mapping.arity() {
                return Err(AnicompareError::Reconcile(format!(
                    "{} tuples have {} fields, position {} selected",
                    input.mapping.source(),
                    input.mapping.arity(),
                    input.position
                )));
            }
        }

        // drive the join from the smallest input
        let driver = self
            .inputs
            .iter()
            .min_by_key(|input| input.mapping.len())
            .map(|input| input.mapping)
            .ok_or_else(|| AnicompareError::Reconcile("no sources".into()))?;

        let mut merged: HashMap<PairKey, MergedRecord, PairHasher> = HashMap::default();
        for key in driver.keys() {
            if !self.inputs.iter().all(|input| input.mapping.contains(key)) {
                continue;
            }
            let mut selected = Vec::with_capacity(self.inputs.len());
            for input in &self.inputs {
                let value = input
                    .mapping
                    .field(key, input.position)
                    .and_then(|v| v.as_f64())
                    .ok_or_else(|| {
                        AnicompareError::Reconcile(format!(
                            "{} field {} of {} is not numeric",
                            input.mapping.source(),
                            input.position,
                            key
                        ))
                    })?;
                selected.push(value);
            }
            merged.insert(key.clone(), MergedRecord::new(selected));
        }

        let mut all_keys = BTreeSet::new();
        for input in &self.inputs {
            all_keys.extend(input.mapping.keys());
        }
        let unmatched: Vec<Unmatched> = all_keys
            .into_iter()
            .filter(|key| !merged.contains_key(*key))
            .map(|key| Unmatched {
                key: key.clone(),
                present_in: self
                    .inputs
                    .iter()
                    .filter(|input| input.mapping.contains(key))
                    .map(|input| input.mapping.source())
                    .collect(),
            })
            .collect();

        info!(
            sources = self.inputs.len(),
            merged = merged.len(),
            unmatched = unmatched.len(),
            "reconciled"
        );
        Ok(Reconciliation { merged, unmatched })
    }
}
