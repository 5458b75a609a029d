//! Response configuration.

pub use crate::nc3::FormatVersion;

/// Options for building a NetCDF response.
#[derive(Debug, Clone)]
pub struct ResponseConfig {
    /// On-disk format version.
    pub format: FormatVersion,
    /// Number of records emitted per body block (at least 1).
    pub records_per_block: usize,
    /// Unlimited dimension to use instead of the dataset's `DODS_EXTRA` hint.
    pub unlimited_dimension: Option<String>,
}

impl Default for ResponseConfig {
    fn default() -> Self {
        Self {
            format: FormatVersion::Classic,
            records_per_block: 1,
            unlimited_dimension: None,
        }
    }
}

impl ResponseConfig {
    /// Use the given format version.
    pub fn with_format(mut self, format: FormatVersion) -> Self {
        self.format = format;
        self
    }

    /// Emit `n` records per block; 0 is treated as 1.
    pub fn with_records_per_block(mut self, n: usize) -> Self {
        self.records_per_block = n.max(1);
        self
    }

    /// Override the unlimited dimension hint.
    pub fn with_unlimited_dimension(mut self, name: impl Into<String>) -> Self {
        self.unlimited_dimension = Some(name.into());
        self
    }
}
