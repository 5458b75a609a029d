//! JSON dataset descriptions.
//!
//! A description mirrors the dataset tree:
//!
//! ```json
//! {
//!   "name": "obs",
//!   "attributes": {"NC_GLOBAL": {"title": "Buoy"}},
//!   "children": [
//!     {"type": "sequence", "name": "obs", "fields": [
//!       {"name": "ts", "dtype": "time", "data": ["2020-01-01T00:00:00"]},
//!       {"name": "val", "dtype": "double", "data": [1.5]}
//!     ]}
//!   ]
//! }
//! ```
//!
//! Base variables carry a `dtype`, an optional `shape` (defaults to the
//! length of `data`), optional `dimensions` and flat `data` in row-major
//! order.

use crate::error::{NcError, Result};
use crate::model::{
    ArrayData, Attribute, Attributes, BaseType, DType, Dataset, Grid, Node, Sequence, Structure,
    Value,
};
use chrono::{NaiveDate, NaiveDateTime};
use ndarray::{ArrayD, IxDyn};
use serde::Deserialize;
use serde_json::{Map, Value as Json};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Top level of a description.
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetDescription {
    /// Dataset name.
    pub name: String,
    /// Dataset attributes, including `NC_GLOBAL` and `DODS_EXTRA` groups.
    #[serde(default)]
    pub attributes: Map<String, Json>,
    /// Top-level nodes.
    #[serde(default)]
    pub children: Vec<NodeDescription>,
}

/// A node of the tree, tagged by `type`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NodeDescription {
    /// A bare array variable.
    Base(BaseDescription),
    /// An array with coordinate maps.
    Grid {
        /// Grid attributes.
        #[serde(default)]
        attributes: Map<String, Json>,
        /// The gridded array; its name is the grid's name.
        array: BaseDescription,
        /// Coordinate maps, one per array axis.
        maps: Vec<BaseDescription>,
    },
    /// A table of records.
    Sequence {
        /// Sequence name, which becomes the record dimension.
        name: String,
        /// Sequence attributes.
        #[serde(default)]
        attributes: Map<String, Json>,
        /// One column per field.
        fields: Vec<BaseDescription>,
    },
    /// A container of other nodes.
    Structure {
        /// Structure name.
        name: String,
        /// Structure attributes.
        #[serde(default)]
        attributes: Map<String, Json>,
        /// Nested nodes.
        children: Vec<NodeDescription>,
    },
}

/// A leaf array variable.
#[derive(Debug, Clone, Deserialize)]
pub struct BaseDescription {
    /// Variable name.
    pub name: String,
    /// Element type name (`int`, `float64`, `time`, ...).
    pub dtype: String,
    /// Array shape; `[]` is a 0-d scalar.
    #[serde(default)]
    pub shape: Option<Vec<usize>>,
    /// Dimension names.
    #[serde(default)]
    pub dimensions: Vec<String>,
    /// Variable attributes.
    #[serde(default)]
    pub attributes: Map<String, Json>,
    /// Flat row-major data.
    #[serde(default)]
    pub data: Vec<Json>,
}

/// Parse a description from a JSON string.
pub fn parse(json: &str) -> Result<Dataset> {
    let description: DatasetDescription = serde_json::from_str(json)?;
    description.into_dataset()
}

/// Parse a description from any reader.
pub fn from_reader<R: Read>(reader: R) -> Result<Dataset> {
    let description: DatasetDescription = serde_json::from_reader(reader)?;
    description.into_dataset()
}

/// Read a description file.
pub fn read_file(path: &Path) -> Result<Dataset> {
    tracing::info!("Reading dataset description {}", path.display());
    from_reader(BufReader::new(File::open(path)?))
}

impl DatasetDescription {
    /// Build the dataset tree.
    pub fn into_dataset(self) -> Result<Dataset> {
        let mut dataset = Dataset::new(self.name).with_attributes(attributes(&self.attributes)?);
        for child in self.children {
            dataset.add_child(child.into_node()?);
        }
        Ok(dataset)
    }
}

impl NodeDescription {
    fn into_node(self) -> Result<Node> {
        Ok(match self {
            NodeDescription::Base(base) => base.into_base_type()?.into(),
            NodeDescription::Grid {
                attributes: attrs,
                array,
                maps,
            } => {
                let maps = maps
                    .into_iter()
                    .map(BaseDescription::into_base_type)
                    .collect::<Result<Vec<_>>>()?;
                Grid::new(array.into_base_type()?, maps)
                    .with_attributes(attributes(&attrs)?)
                    .into()
            }
            NodeDescription::Sequence {
                name,
                attributes: attrs,
                fields,
            } => {
                let fields = fields
                    .into_iter()
                    .map(BaseDescription::into_base_type)
                    .collect::<Result<Vec<_>>>()?;
                Sequence::new(name, fields)
                    .with_attributes(attributes(&attrs)?)
                    .into()
            }
            NodeDescription::Structure {
                name,
                attributes: attrs,
                children,
            } => {
                let children = children
                    .into_iter()
                    .map(NodeDescription::into_node)
                    .collect::<Result<Vec<_>>>()?;
                let mut structure = Structure::new(name, children);
                structure.attributes = attributes(&attrs)?;
                structure.into()
            }
        })
    }
}

impl BaseDescription {
    fn into_base_type(self) -> Result<BaseType> {
        let dtype = DType::from_name(&self.dtype).ok_or_else(|| {
            NcError::description(format!("{}: unknown dtype {}", self.name, self.dtype))
        })?;
        let shape = self.shape.unwrap_or_else(|| vec![self.data.len()]);
        let data = array_data(&self.name, dtype, &shape, &self.data)?;
        Ok(BaseType::new(self.name, data)
            .with_dimensions(self.dimensions)
            .with_attributes(attributes(&self.attributes)?))
    }
}

fn array_data(name: &str, dtype: DType, shape: &[usize], data: &[Json]) -> Result<ArrayData> {
    let expected: usize = shape.iter().product();
    if expected != data.len() {
        return Err(NcError::description(format!(
            "{}: shape {:?} needs {} values, got {}",
            name,
            shape,
            expected,
            data.len()
        )));
    }

    Ok(match dtype {
        DType::Byte => shaped(name, shape, elements(name, dtype, data, narrow::<i8>)?)?.into(),
        DType::Char => shaped(name, shape, elements(name, dtype, data, char_byte)?)?.into(),
        DType::Short => shaped(name, shape, elements(name, dtype, data, narrow::<i16>)?)?.into(),
        DType::Int => shaped(name, shape, elements(name, dtype, data, narrow::<i32>)?)?.into(),
        DType::Long => shaped(name, shape, elements(name, dtype, data, Json::as_i64)?)?.into(),
        DType::Float => {
            let values = elements(name, dtype, data, |v| float(v).map(|f| f as f32))?;
            shaped(name, shape, values)?.into()
        }
        DType::Double => shaped(name, shape, elements(name, dtype, data, float)?)?.into(),
        DType::Bool => shaped(name, shape, elements(name, dtype, data, Json::as_bool)?)?.into(),
        DType::Text => {
            let values = elements(name, dtype, data, |v| v.as_str().map(String::from))?;
            shaped(name, shape, values)?.into()
        }
        DType::Time => {
            let values = elements(name, dtype, data, |v| v.as_str().and_then(datetime))?;
            shaped(name, shape, values)?.into()
        }
        DType::Object => {
            let values = elements(name, dtype, data, |v| Some(opaque(v)))?;
            shaped(name, shape, values)?.into()
        }
    })
}

fn shaped<T>(name: &str, shape: &[usize], values: Vec<T>) -> Result<ArrayD<T>> {
    ArrayD::from_shape_vec(IxDyn(shape), values)
        .map_err(|e| NcError::description(format!("{}: {}", name, e)))
}

fn elements<T>(
    name: &str,
    dtype: DType,
    data: &[Json],
    convert: impl Fn(&Json) -> Option<T>,
) -> Result<Vec<T>> {
    data.iter()
        .enumerate()
        .map(|(i, v)| {
            convert(v).ok_or_else(|| {
                NcError::description(format!("{}[{}]: {} is not a valid {}", name, i, v, dtype))
            })
        })
        .collect()
}

fn narrow<T: TryFrom<i64>>(v: &Json) -> Option<T> {
    v.as_i64().and_then(|i| T::try_from(i).ok())
}

/// Numbers, with `null` read as NaN.
fn float(v: &Json) -> Option<f64> {
    match v {
        Json::Null => Some(f64::NAN),
        other => other.as_f64(),
    }
}

fn char_byte(v: &Json) -> Option<u8> {
    match v {
        Json::String(s) if s.len() == 1 => s.bytes().next(),
        Json::String(s) if s.is_empty() => Some(0),
        other => other.as_u64().and_then(|n| u8::try_from(n).ok()),
    }
}

/// ISO-8601 datetime, or a bare date at midnight.
fn datetime(s: &str) -> Option<NaiveDateTime> {
    s.parse::<NaiveDateTime>()
        .ok()
        .or_else(|| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f").ok())
        .or_else(|| {
            s.parse::<NaiveDate>()
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn opaque(v: &Json) -> Value {
    match v {
        Json::Null => Value::Absent,
        Json::Bool(b) => Value::Bool(*b),
        Json::Number(n) => n
            .as_i64()
            .map(Value::Int)
            .or_else(|| n.as_f64().map(Value::Float))
            .unwrap_or(Value::Absent),
        Json::String(s) => Value::Text(s.clone()),
        other => Value::Text(other.to_string()),
    }
}

/// Convert a JSON object into attributes.
pub fn attributes(map: &Map<String, Json>) -> Result<Attributes> {
    let mut attrs = Attributes::new();
    for (name, value) in map {
        attrs.insert(name.clone(), attribute(name, value)?);
    }
    Ok(attrs)
}

fn attribute(name: &str, value: &Json) -> Result<Attribute> {
    let invalid = || NcError::description(format!("attribute {}: unsupported value {}", name, value));
    match value {
        Json::String(s) => Ok(Attribute::Text(s.clone())),
        Json::Number(_) => numbers(std::slice::from_ref(value)).ok_or_else(invalid),
        Json::Array(items) if !items.is_empty() => numbers(items).ok_or_else(invalid),
        Json::Object(group) => Ok(Attribute::Group(attributes(group)?)),
        _ => Err(invalid()),
    }
}

/// Integers that all fit in 32 bits become `Int`, other numbers `Double`.
fn numbers(items: &[Json]) -> Option<Attribute> {
    let ints: Option<Vec<i32>> = items
        .iter()
        .map(|v| v.as_i64().and_then(|i| i32::try_from(i).ok()))
        .collect();
    if let Some(ints) = ints {
        return Some(Attribute::Int(ints));
    }
    items
        .iter()
        .map(Json::as_f64)
        .collect::<Option<Vec<f64>>>()
        .map(Attribute::Double)
}
