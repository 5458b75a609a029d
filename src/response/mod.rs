//! NetCDF3 responses for datasets.
//!
//! Building an [`NcResponse`] maps the dataset onto a NetCDF3 schema and
//! fixes the response headers. The body is produced lazily, once, by
//! consuming the response with [`NcResponse::into_body`].

mod headers;
mod normalize;
mod schema;
mod stream;

pub use headers::Headers;
pub use normalize::{days_since_epoch, normalize};
pub use schema::build_schema;
pub use stream::{value_stream, NcBody, NonRecordValues, RecordValues, ValueStream, VariableIndex};

use crate::config::ResponseConfig;
use crate::error::Result;
use crate::model::Dataset;
use crate::nc3::Schema;
use std::io::Write;

/// MIME type of the response body.
pub const CONTENT_TYPE: &str = "application/x-netcdf";

/// A dataset rendered as a NetCDF3 stream.
#[derive(Debug)]
pub struct NcResponse {
    dataset: Dataset,
    schema: Schema,
    headers: Headers,
    config: ResponseConfig,
}

impl NcResponse {
    /// Map `dataset` onto a NetCDF3 schema and prepare the headers.
    ///
    /// Fails if any variable has a type NetCDF3 cannot represent.
    pub fn new(dataset: Dataset, config: ResponseConfig) -> Result<Self> {
        let schema = build_schema(&dataset, &config)?;

        let mut headers = Headers::new();
        headers.push("Content-type", CONTENT_TYPE);
        // Optionally set the size if it is known up front
        match schema.filesize() {
            Ok(size) => headers.push("Content-length", size.to_string()),
            Err(e) => tracing::debug!("Omitting Content-length: {}", e),
        }

        tracing::info!(
            "Prepared NetCDF response for {} ({} dimensions, {} variables)",
            dataset.name,
            schema.dimensions().len(),
            schema.variables().len()
        );

        Ok(Self {
            dataset,
            schema,
            headers,
            config,
        })
    }

    /// Response headers.
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// The NetCDF3 schema.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// The source dataset.
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Consume the response and return the lazily encoded body.
    pub fn into_body(self) -> Result<NcBody> {
        let index = VariableIndex::build(&self.schema, &self.dataset)?;
        let values = value_stream(&self.schema, &self.dataset, &index)?;
        let blocks = self
            .schema
            .generate(values, self.config.records_per_block)?;
        Ok(NcBody::new(blocks))
    }

    /// Stream the whole body into `writer`, returning the number of bytes.
    pub fn write_to<W: Write>(self, mut writer: W) -> Result<u64> {
        let mut written = 0u64;
        for block in self.into_body()? {
            let block = block?;
            writer.write_all(&block)?;
            written += block.len() as u64;
        }
        writer.flush()?;
        Ok(written)
    }
}
