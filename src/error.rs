//! Error types for ncresponse.
//!
//! This module provides a unified error handling approach using `thiserror`.

use thiserror::Error;

/// Result type alias for ncresponse operations.
pub type Result<T> = std::result::Result<T, NcError>;

/// Errors that can occur while building or streaming a NetCDF response.
#[derive(Debug, Error)]
pub enum NcError {
    /// A dtype has no NetCDF3 representation.
    #[error("Don't know how to handle type {dtype}")]
    UnsupportedType { dtype: String },

    /// A variable refers to a dimension that was never registered.
    #[error("Variable {variable} uses unknown dimension {dimension}")]
    UnknownDimension { variable: String, dimension: String },

    /// A second unlimited dimension was requested.
    #[error("Cannot add unlimited dimension {requested}: {existing} is already unlimited")]
    SecondUnlimitedDimension { existing: String, requested: String },

    /// A fixed dimension was given length 0, which NetCDF3 reserves for the
    /// record dimension.
    #[error("Dimension {name} has length 0; only the unlimited dimension may be empty")]
    ZeroLengthDimension { name: String },

    /// The unlimited dimension appears in a position other than the first.
    #[error("Variable {variable}: unlimited dimension {dimension} must come first")]
    RecordDimensionNotFirst { variable: String, dimension: String },

    /// A variable name was registered twice.
    #[error("Variable already defined: {name}")]
    DuplicateVariable { name: String },

    /// The file size depends on data not known yet.
    #[error("File size is indeterminate: {0} is unlimited")]
    IndeterminateSize(String),

    /// Data offsets do not fit the selected format version.
    #[error("Offset {offset} does not fit in the classic format, use 64-bit offsets")]
    OffsetOverflow { offset: u64 },

    /// A registered variable has no counterpart in the dataset.
    #[error("Variable not found in dataset: {name}")]
    VariableNotFound { name: String },

    /// The value stream ended before a fixed-size variable was complete.
    #[error("Value stream exhausted while writing {variable}")]
    StreamExhausted { variable: String },

    /// The dataset description could not be turned into a dataset.
    #[error("Invalid dataset description: {0}")]
    Description(String),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to read a NetCDF file back.
    #[error("NetCDF error: {0}")]
    NetCDF(String),
}

impl NcError {
    /// Create an UnsupportedType error.
    pub fn unsupported_type(dtype: impl std::fmt::Display) -> Self {
        Self::UnsupportedType {
            dtype: dtype.to_string(),
        }
    }

    /// Create an UnknownDimension error.
    pub fn unknown_dimension(variable: impl Into<String>, dimension: impl Into<String>) -> Self {
        Self::UnknownDimension {
            variable: variable.into(),
            dimension: dimension.into(),
        }
    }

    /// Create a VariableNotFound error.
    pub fn variable_not_found(name: impl Into<String>) -> Self {
        Self::VariableNotFound { name: name.into() }
    }

    /// Create a Description error.
    pub fn description(msg: impl Into<String>) -> Self {
        Self::Description(msg.into())
    }
}

#[cfg(feature = "verify")]
impl From<netcdf::Error> for NcError {
    fn from(err: netcdf::Error) -> Self {
        Self::NetCDF(err.to_string())
    }
}
