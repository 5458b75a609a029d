//! Dataset object model.
//!
//! A dataset is a tree of leaf arrays ([`BaseType`]), grids (an array plus
//! coordinate maps), sequences (row-oriented records) and plain structures,
//! each carrying attributes.

mod attribute;
mod dataset;
mod dtype;
mod node;
mod value;

pub use attribute::{Attribute, Attributes};
pub use dataset::{Dataset, DODS_EXTRA, NC_GLOBAL, UNLIMITED_DIMENSION};
pub use dtype::DType;
pub use node::{BaseType, Grid, Node, NodeRef, Sequence, Structure};
pub use value::{ArrayData, Value};
