//! Dimension and variable registry.

use super::{header, pad4, Blocks, FormatVersion, NcType};
use crate::error::{NcError, Result};
use crate::model::{ArrayData, Attributes};
use std::collections::HashMap;

/// A registered dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dimension {
    /// Dimension name.
    pub name: String,
    /// Length, or `None` for the unlimited (record) dimension.
    pub len: Option<usize>,
}

impl Dimension {
    /// Whether this is the record dimension.
    pub fn is_unlimited(&self) -> bool {
        self.len.is_none()
    }
}

/// A registered variable.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    /// Variable name.
    pub name: String,
    /// External type.
    pub nc_type: NcType,
    /// Dimension names, outermost first.
    pub dimensions: Vec<String>,
    /// Variable attributes.
    pub attributes: Attributes,
    /// Whether the first dimension is the record dimension.
    pub is_record: bool,
}

/// Byte layout of one variable in the data section.
#[derive(Debug, Clone)]
pub(crate) struct Placement {
    /// Elements per variable, or per record for record variables.
    pub(crate) count: usize,
    /// `vsize` as written in the header.
    pub(crate) vsize: usize,
    /// Offset of the first byte.
    pub(crate) begin: u64,
}

/// Computed file layout.
#[derive(Debug, Clone)]
pub(crate) struct Layout {
    pub(crate) placements: Vec<Placement>,
    pub(crate) header_len: usize,
    pub(crate) begin_rec: u64,
    pub(crate) recsize: u64,
}

/// Insertion-ordered registry of everything a NetCDF3 header describes.
#[derive(Debug, Clone)]
pub struct Schema {
    format: FormatVersion,
    dimensions: Vec<Dimension>,
    dimension_index: HashMap<String, usize>,
    variables: Vec<Variable>,
    variable_index: HashMap<String, usize>,
    attributes: Attributes,
    numrecs: usize,
}

impl Schema {
    /// Create an empty registry.
    pub fn new(format: FormatVersion) -> Self {
        Self {
            format,
            dimensions: Vec::new(),
            dimension_index: HashMap::new(),
            variables: Vec::new(),
            variable_index: HashMap::new(),
            attributes: Attributes::new(),
            numrecs: 0,
        }
    }

    /// Format version used when encoding.
    pub fn format(&self) -> FormatVersion {
        self.format
    }

    /// Register a dimension unless one with the same name already exists.
    ///
    /// Returns `true` when the dimension was added and `false` when the name
    /// was already taken, in which case the existing entry is left untouched.
    /// Only one unlimited dimension may exist, and fixed dimensions may not
    /// have length 0.
    pub fn create_dimension(&mut self, name: &str, len: Option<usize>) -> Result<bool> {
        if self.dimension_index.contains_key(name) {
            tracing::debug!("Dimension {} already registered", name);
            return Ok(false);
        }
        if len == Some(0) {
            return Err(NcError::ZeroLengthDimension {
                name: name.to_string(),
            });
        }
        if len.is_none() {
            if let Some(existing) = self.unlimited_dimension() {
                return Err(NcError::SecondUnlimitedDimension {
                    existing: existing.name.clone(),
                    requested: name.to_string(),
                });
            }
        }

        tracing::debug!("Creating dimension {} ({:?})", name, len);
        self.dimension_index
            .insert(name.to_string(), self.dimensions.len());
        self.dimensions.push(Dimension {
            name: name.to_string(),
            len,
        });
        Ok(true)
    }

    /// Whether a dimension is registered.
    pub fn has_dimension(&self, name: &str) -> bool {
        self.dimension_index.contains_key(name)
    }

    /// Look up a dimension.
    pub fn dimension(&self, name: &str) -> Option<&Dimension> {
        self.dimension_index.get(name).map(|&i| &self.dimensions[i])
    }

    /// All dimensions in registration order.
    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    /// The record dimension, if one is registered.
    pub fn unlimited_dimension(&self) -> Option<&Dimension> {
        self.dimensions.iter().find(|d| d.is_unlimited())
    }

    /// Register a variable over already-registered dimensions.
    pub fn create_variable<S: AsRef<str>>(
        &mut self,
        name: &str,
        nc_type: NcType,
        dimensions: &[S],
        attributes: &Attributes,
    ) -> Result<()> {
        if self.variable_index.contains_key(name) {
            return Err(NcError::DuplicateVariable {
                name: name.to_string(),
            });
        }

        let mut dims = Vec::with_capacity(dimensions.len());
        for (axis, dim) in dimensions.iter().enumerate() {
            let dim = dim.as_ref();
            let registered = self
                .dimension(dim)
                .ok_or_else(|| NcError::unknown_dimension(name, dim))?;
            if axis > 0 && registered.is_unlimited() {
                return Err(NcError::RecordDimensionNotFirst {
                    variable: name.to_string(),
                    dimension: dim.to_string(),
                });
            }
            dims.push(dim.to_string());
        }
        let is_record = dims
            .first()
            .and_then(|d| self.dimension(d))
            .is_some_and(Dimension::is_unlimited);

        tracing::debug!(
            "Creating variable {} {} {:?} (record: {})",
            name,
            nc_type,
            dims,
            is_record
        );
        self.variable_index
            .insert(name.to_string(), self.variables.len());
        self.variables.push(Variable {
            name: name.to_string(),
            nc_type,
            dimensions: dims,
            attributes: attributes.clone(),
            is_record,
        });
        Ok(())
    }

    /// Look up a variable.
    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variable_index.get(name).map(|&i| &self.variables[i])
    }

    /// All variables in registration order.
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    /// Variables without the record dimension, in registration order.
    pub fn non_record_variables(&self) -> impl Iterator<Item = &Variable> {
        self.variables.iter().filter(|v| !v.is_record)
    }

    /// Variables along the record dimension, in registration order.
    pub fn record_variables(&self) -> impl Iterator<Item = &Variable> {
        self.variables.iter().filter(|v| v.is_record)
    }

    /// Set the number of records written along the unlimited dimension.
    pub fn set_numrecs(&mut self, numrecs: usize) {
        tracing::debug!("Setting numrecs to {}", numrecs);
        self.numrecs = numrecs;
    }

    /// Number of records.
    pub fn numrecs(&self) -> usize {
        self.numrecs
    }

    /// Merge global attributes.
    pub fn set_global_attributes(&mut self, attributes: &Attributes) {
        self.attributes.update(attributes);
    }

    /// Global attributes.
    pub fn global_attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Total size of the encoded file.
    ///
    /// Fails whenever a record dimension is registered: the record count of a
    /// streamed response is only final once the data has been produced.
    pub fn filesize(&self) -> Result<u64> {
        if let Some(dim) = self.unlimited_dimension() {
            return Err(NcError::IndeterminateSize(dim.name.clone()));
        }
        let layout = self.layout()?;
        Ok(layout.begin_rec + self.numrecs as u64 * layout.recsize)
    }

    /// The encoded header.
    pub fn header_bytes(&self) -> Result<Vec<u8>> {
        let layout = self.layout()?;
        header::encode(self, &layout.placements)
    }

    /// Lazily encode `values` into byte blocks: the header first, then one
    /// block per fixed-size variable, then the records `records_per_block`
    /// at a time.
    pub fn generate<I>(&self, values: I, records_per_block: usize) -> Result<Blocks<I>>
    where
        I: Iterator<Item = ArrayData>,
    {
        let layout = self.layout()?;
        let header = header::encode(self, &layout.placements)?;
        tracing::debug!(
            "Header is {} bytes, records start at {} ({} bytes each)",
            layout.header_len,
            layout.begin_rec,
            layout.recsize
        );
        Ok(Blocks::new(self, &layout, header, values, records_per_block))
    }

    /// Elements per variable (per record for record variables).
    fn element_count(&self, var: &Variable) -> usize {
        let skip = usize::from(var.is_record);
        var.dimensions
            .iter()
            .skip(skip)
            .filter_map(|d| self.dimension(d))
            .map(|d| d.len.unwrap_or(0))
            .product()
    }

    pub(crate) fn layout(&self) -> Result<Layout> {
        // Offsets only change the header's content, not its length.
        let mut placements: Vec<Placement> = self
            .variables
            .iter()
            .map(|var| {
                let count = self.element_count(var);
                Placement {
                    count,
                    vsize: pad4(count * var.nc_type.size()),
                    begin: 0,
                }
            })
            .collect();
        let header_len = header::encode(self, &placements)?.len();

        let mut offset = header_len as u64;
        for (var, placement) in self.variables.iter().zip(placements.iter_mut()) {
            if !var.is_record {
                placement.begin = offset;
                offset += placement.vsize as u64;
            }
        }
        let begin_rec = offset;

        let mut recsize = 0u64;
        let mut record_count = 0usize;
        for (var, placement) in self.variables.iter().zip(placements.iter_mut()) {
            if var.is_record {
                placement.begin = offset;
                offset += placement.vsize as u64;
                recsize += placement.vsize as u64;
                record_count += 1;
            }
        }
        if record_count == 1 {
            // A lone record variable is not padded between records.
            if let Some((var, placement)) = self
                .variables
                .iter()
                .zip(placements.iter())
                .find(|(v, _)| v.is_record)
            {
                recsize = (placement.count * var.nc_type.size()) as u64;
            }
        }

        if self.format == FormatVersion::Classic {
            if let Some(last) = placements.iter().map(|p| p.begin).max() {
                if last > i32::MAX as u64 {
                    return Err(NcError::OffsetOverflow { offset: last });
                }
            }
        }

        Ok(Layout {
            placements,
            header_len,
            begin_rec,
            recsize,
        })
    }
}
