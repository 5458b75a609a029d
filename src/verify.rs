//! Reading produced files back through libnetcdf.

use crate::error::{NcError, Result};
use netcdf::types::{FloatType, IntType, NcVariableType};
use netcdf::AttributeValue;
use std::path::Path;

/// A dimension as seen by the reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimensionSummary {
    /// Dimension name.
    pub name: String,
    /// Current length (the record count for the unlimited dimension).
    pub len: usize,
    /// Whether the dimension is unlimited.
    pub unlimited: bool,
}

/// A variable as seen by the reader.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableSummary {
    /// Variable name.
    pub name: String,
    /// Type name as reported by libnetcdf, lowercased.
    pub dtype: String,
    /// Dimension names.
    pub dimensions: Vec<String>,
    /// Attributes, rendered as text.
    pub attributes: Vec<(String, String)>,
    /// Values widened to `f64`; `None` for character data.
    pub values: Option<Vec<f64>>,
}

/// Everything the reader reports about a file.
#[derive(Debug, Clone, PartialEq)]
pub struct FileSummary {
    /// Global attributes, rendered as text.
    pub attributes: Vec<(String, String)>,
    /// Dimensions in definition order.
    pub dimensions: Vec<DimensionSummary>,
    /// Variables in definition order.
    pub variables: Vec<VariableSummary>,
}

impl FileSummary {
    /// Look up a variable by name.
    pub fn variable(&self, name: &str) -> Option<&VariableSummary> {
        self.variables.iter().find(|v| v.name == name)
    }

    /// Look up a dimension by name.
    pub fn dimension(&self, name: &str) -> Option<&DimensionSummary> {
        self.dimensions.iter().find(|d| d.name == name)
    }
}

/// Open `path` and summarize its contents.
pub fn summarize(path: &Path) -> Result<FileSummary> {
    let file = netcdf::open(path)?;
    tracing::debug!("Verifying {}", path.display());

    let attributes = file
        .attributes()
        .map(|attr| Ok((attr.name().to_string(), render(attr.value()?))))
        .collect::<Result<Vec<_>>>()?;

    let dimensions = file
        .dimensions()
        .map(|dim| DimensionSummary {
            name: dim.name().to_string(),
            len: dim.len(),
            unlimited: dim.is_unlimited(),
        })
        .collect();

    let mut variables = Vec::new();
    for var in file.variables() {
        let attributes = var
            .attributes()
            .map(|attr| Ok((attr.name().to_string(), render(attr.value()?))))
            .collect::<Result<Vec<_>>>()?;
        variables.push(VariableSummary {
            name: var.name().to_string(),
            dtype: format!("{:?}", var.vartype()).to_lowercase(),
            dimensions: var.dimensions().iter().map(|d| d.name().to_string()).collect(),
            attributes,
            values: read_values(&var)?,
        });
    }

    Ok(FileSummary {
        attributes,
        dimensions,
        variables,
    })
}

fn read_values(var: &netcdf::Variable<'_>) -> Result<Option<Vec<f64>>> {
    let values = match var.vartype() {
        NcVariableType::Float(FloatType::F64) => var.get_values::<f64, _>(..)?,
        NcVariableType::Float(FloatType::F32) => widen(var.get_values::<f32, _>(..)?),
        NcVariableType::Int(IntType::I32) => widen(var.get_values::<i32, _>(..)?),
        NcVariableType::Int(IntType::I16) => widen(var.get_values::<i16, _>(..)?),
        NcVariableType::Int(IntType::I8) => widen(var.get_values::<i8, _>(..)?),
        NcVariableType::Char => return Ok(None),
        other => {
            return Err(NcError::NetCDF(format!(
                "{}: {:?} is not a NetCDF3 type",
                var.name(),
                other
            )))
        }
    };
    Ok(Some(values))
}

fn widen<T: Into<f64>>(values: Vec<T>) -> Vec<f64> {
    values.into_iter().map(Into::into).collect()
}

fn render(value: AttributeValue) -> String {
    match value {
        AttributeValue::Str(s) => s,
        other => format!("{:?}", other),
    }
}
