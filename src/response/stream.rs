//! The value stream fed to the block generator.
//!
//! Fixed-size variables come first, each drained element by element in
//! registration order. Record variables follow, interleaved one element at a
//! time so that record `n` of every variable precedes record `n + 1`.

use super::normalize::normalize;
use crate::error::{NcError, Result};
use crate::model::{ArrayData, Dataset, Value};
use crate::nc3::{Blocks, Schema};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::iter::{Chain, Map};
use std::sync::Arc;

/// Registered variable name → dataset identifier.
#[derive(Debug, Clone, Default)]
pub struct VariableIndex {
    ids: HashMap<String, String>,
}

impl VariableIndex {
    /// Match every registered variable against the dataset's leaves.
    ///
    /// Leaves are visited in traversal order and the first leaf with a given
    /// name wins; later leaves with the same name are ignored.
    pub fn build(schema: &Schema, dataset: &Dataset) -> Result<Self> {
        let mut ids: HashMap<String, String> = HashMap::new();
        for leaf in dataset.base_types() {
            if schema.variable(&leaf.name).is_none() {
                continue;
            }
            match ids.entry(leaf.name.clone()) {
                Entry::Vacant(e) => {
                    e.insert(leaf.id.clone());
                }
                Entry::Occupied(e) => {
                    tracing::debug!(
                        "Ignoring {} for variable {}, already bound to {}",
                        leaf.id,
                        leaf.name,
                        e.get()
                    );
                }
            }
        }

        if let Some(missing) = schema.variables().iter().find(|v| !ids.contains_key(&v.name)) {
            return Err(NcError::variable_not_found(&missing.name));
        }
        Ok(Self { ids })
    }

    /// Identifier bound to a variable name.
    pub fn id(&self, name: &str) -> Option<&str> {
        self.ids.get(name).map(String::as_str)
    }

    /// The data behind a variable name.
    pub fn source(&self, dataset: &Dataset, name: &str) -> Result<Arc<ArrayData>> {
        self.id(name)
            .and_then(|id| dataset.get(id))
            .map(|leaf| Arc::clone(&leaf.data))
            .ok_or_else(|| NcError::variable_not_found(name))
    }
}

/// Elements of every fixed-size variable, one variable after the other.
#[derive(Debug)]
pub struct NonRecordValues {
    sources: std::vec::IntoIter<(String, Arc<ArrayData>)>,
    current: Option<Arc<ArrayData>>,
    next: usize,
}

impl NonRecordValues {
    /// Walk `sources` in order; 0-d sources contribute nothing.
    pub fn new(sources: Vec<(String, Arc<ArrayData>)>) -> Self {
        Self {
            sources: sources.into_iter(),
            current: None,
            next: 0,
        }
    }
}

impl Iterator for NonRecordValues {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        loop {
            if let Some(source) = &self.current {
                if let Some(value) = source.element(self.next) {
                    self.next += 1;
                    return Some(value);
                }
                self.current = None;
            }

            let (name, source) = self.sources.next()?;
            if source.ndim() == 0 {
                tracing::debug!("Skipping 0-d variable {}", name);
                continue;
            }
            tracing::debug!("Iterator for {}", name);
            self.current = Some(source);
            self.next = 0;
        }
    }
}

/// Record elements, round-robin across every record variable.
///
/// Stops after as many rounds as the shortest source has elements.
#[derive(Debug)]
pub struct RecordValues {
    sources: Vec<Arc<ArrayData>>,
    rounds: usize,
    round: usize,
    column: usize,
}

impl RecordValues {
    /// Interleave `sources`.
    pub fn new(sources: Vec<Arc<ArrayData>>) -> Self {
        let rounds = sources.iter().map(|s| s.len()).min().unwrap_or(0);
        if sources.iter().any(|s| s.len() != rounds) {
            tracing::warn!(
                "Record variables have uneven lengths, truncating to {} records",
                rounds
            );
        }
        Self {
            sources,
            rounds,
            round: 0,
            column: 0,
        }
    }

    /// Number of complete rounds this iterator will produce.
    pub fn rounds(&self) -> usize {
        self.rounds
    }
}

impl Iterator for RecordValues {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        if self.round >= self.rounds {
            return None;
        }
        let value = self.sources[self.column].element(self.round)?;
        self.column += 1;
        if self.column == self.sources.len() {
            self.column = 0;
            self.round += 1;
        }
        Some(value)
    }
}

/// The full normalized value stream.
pub type ValueStream = Map<Chain<NonRecordValues, RecordValues>, fn(Value) -> ArrayData>;

/// Build the value stream for every variable registered in `schema`.
pub fn value_stream(schema: &Schema, dataset: &Dataset, index: &VariableIndex) -> Result<ValueStream> {
    let fixed = schema
        .non_record_variables()
        .map(|var| -> Result<(String, Arc<ArrayData>)> {
            Ok((var.name.clone(), index.source(dataset, &var.name)?))
        })
        .collect::<Result<Vec<_>>>()?;
    let records = schema
        .record_variables()
        .map(|var| index.source(dataset, &var.name))
        .collect::<Result<Vec<_>>>()?;

    let normalize: fn(Value) -> ArrayData = normalize;
    Ok(NonRecordValues::new(fixed)
        .chain(RecordValues::new(records))
        .map(normalize))
}

/// The response body: every encoded block, in order.
#[derive(Debug)]
pub struct NcBody {
    blocks: Blocks<ValueStream>,
}

impl NcBody {
    pub(super) fn new(blocks: Blocks<ValueStream>) -> Self {
        Self { blocks }
    }
}

impl Iterator for NcBody {
    type Item = Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.blocks.next()
    }
}
