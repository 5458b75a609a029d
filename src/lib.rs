//! ncresponse - Stream scientific datasets as NetCDF3 files.
//!
//! A dataset tree of grids, sequences and structures is mapped onto a
//! NetCDF3 classic schema and encoded lazily, block by block, so a response
//! can be served without materializing the file.
//!
//! # Features
//!
//! - Grids become coordinate variables plus a gridded variable
//! - Sequences become record variables over an unlimited dimension
//! - Datetimes are stored as float days since 1970-01-01
//! - `Content-length` is announced whenever the size is known up front
//! - Classic and 64-bit offset formats
//!
//! # Example
//!
//! ```ignore
//! use ncresponse::model::{BaseType, Dataset, Grid};
//! use ncresponse::{NcResponse, ResponseConfig};
//!
//! let dataset = Dataset::new("sst").with_child(Grid::new(
//!     BaseType::new("sst", vec![280.5f32, 281.0]),
//!     vec![BaseType::new("lat", vec![10.0f64, 20.0])],
//! ));
//! let response = NcResponse::new(dataset, ResponseConfig::default())?;
//! for (name, value) in response.headers().iter() {
//!     println!("{}: {}", name, value);
//! }
//! response.write_to(std::io::stdout())?;
//! ```

#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]
#![deny(unsafe_code)]

pub mod config;
pub mod description;
pub mod error;
pub mod model;
pub mod nc3;
pub mod response;
#[cfg(feature = "verify")]
pub mod verify;

pub use config::ResponseConfig;
pub use error::{NcError, Result};
pub use response::{NcResponse, CONTENT_TYPE};
