//! Dataset tree nodes.

use super::{ArrayData, Attributes, DType};
use std::sync::Arc;

/// A leaf array variable.
#[derive(Debug, Clone)]
pub struct BaseType {
    /// Variable name.
    pub name: String,
    /// Dotted identifier from the dataset root.
    pub id: String,
    /// Variable attributes.
    pub attributes: Attributes,
    /// Dimension names, one per axis.
    pub dimensions: Vec<String>,
    /// The array data.
    pub data: Arc<ArrayData>,
}

impl BaseType {
    /// Create a leaf with no dimensions or attributes.
    pub fn new(name: impl Into<String>, data: impl Into<ArrayData>) -> Self {
        let name = name.into();
        Self {
            id: name.clone(),
            name,
            attributes: Attributes::new(),
            dimensions: Vec::new(),
            data: Arc::new(data.into()),
        }
    }

    /// Set the dimension names.
    pub fn with_dimensions<S: Into<String>>(mut self, dims: impl IntoIterator<Item = S>) -> Self {
        self.dimensions = dims.into_iter().map(Into::into).collect();
        self
    }

    /// Set the attributes.
    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Element type of the data.
    pub fn dtype(&self) -> DType {
        self.data.dtype()
    }

    /// Shape of the data.
    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    /// Length along the first axis.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the first axis is empty (or the data is 0-d).
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn assign_ids(&mut self, prefix: Option<&str>) {
        self.id = child_id(prefix, &self.name);
    }
}

/// An array bundled with its coordinate maps.
#[derive(Debug, Clone)]
pub struct Grid {
    /// Grid name, shared with its base array.
    pub name: String,
    /// Dotted identifier from the dataset root.
    pub id: String,
    /// Grid attributes.
    pub attributes: Attributes,
    /// The base array.
    pub array: BaseType,
    /// Coordinate maps, one per dimension of the array, in axis order.
    pub maps: Vec<BaseType>,
}

impl Grid {
    /// Create a grid named after its base array.
    ///
    /// Each map is a 1-D coordinate variable named after the dimension it
    /// indexes. An array without explicit dimensions takes the map names.
    pub fn new(mut array: BaseType, maps: Vec<BaseType>) -> Self {
        if array.dimensions.is_empty() {
            array.dimensions = maps.iter().map(|m| m.name.clone()).collect();
        }
        let maps = maps
            .into_iter()
            .map(|m| {
                let dim = m.name.clone();
                m.with_dimensions([dim])
            })
            .collect();
        let mut grid = Self {
            name: array.name.clone(),
            id: array.name.clone(),
            attributes: Attributes::new(),
            array,
            maps,
        };
        grid.assign_ids(None);
        grid
    }

    /// Set the grid attributes.
    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// `(dimension name, coordinate variable)` pairs in axis order.
    pub fn maps(&self) -> impl Iterator<Item = (&str, &BaseType)> {
        self.maps.iter().map(|m| (m.name.as_str(), m))
    }

    /// The base array or a map, by name.
    pub fn get(&self, name: &str) -> Option<&BaseType> {
        if self.array.name == name {
            return Some(&self.array);
        }
        self.maps.iter().find(|m| m.name == name)
    }

    fn assign_ids(&mut self, prefix: Option<&str>) {
        self.id = child_id(prefix, &self.name);
        self.array.assign_ids(Some(&self.id));
        for map in &mut self.maps {
            map.assign_ids(Some(&self.id));
        }
    }
}

/// A record-oriented collection of 1-D fields.
#[derive(Debug, Clone)]
pub struct Sequence {
    /// Sequence name.
    pub name: String,
    /// Dotted identifier from the dataset root.
    pub id: String,
    /// Sequence attributes.
    pub attributes: Attributes,
    /// Column variables.
    pub fields: Vec<BaseType>,
}

impl Sequence {
    /// Create a sequence; every field is dimensioned by the sequence itself.
    pub fn new(name: impl Into<String>, fields: Vec<BaseType>) -> Self {
        let name = name.into();
        let fields = fields
            .into_iter()
            .map(|f| f.with_dimensions([name.clone()]))
            .collect();
        let mut seq = Self {
            id: name.clone(),
            name,
            attributes: Attributes::new(),
            fields,
        };
        seq.assign_ids(None);
        seq
    }

    /// Set the sequence attributes.
    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Number of records: the length of the shortest field.
    pub fn len(&self) -> usize {
        self.fields.iter().map(BaseType::len).min().unwrap_or(0)
    }

    /// Whether the sequence holds no records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn assign_ids(&mut self, prefix: Option<&str>) {
        self.id = child_id(prefix, &self.name);
        for field in &mut self.fields {
            field.assign_ids(Some(&self.id));
        }
    }
}

/// A plain grouping node.
#[derive(Debug, Clone)]
pub struct Structure {
    /// Structure name.
    pub name: String,
    /// Dotted identifier from the dataset root.
    pub id: String,
    /// Structure attributes.
    pub attributes: Attributes,
    /// Child nodes.
    pub children: Vec<Node>,
}

impl Structure {
    /// Create a structure around `children`.
    pub fn new(name: impl Into<String>, children: Vec<Node>) -> Self {
        let name = name.into();
        let mut structure = Self {
            id: name.clone(),
            name,
            attributes: Attributes::new(),
            children,
        };
        structure.assign_ids(None);
        structure
    }

    fn assign_ids(&mut self, prefix: Option<&str>) {
        self.id = child_id(prefix, &self.name);
        for child in &mut self.children {
            child.assign_ids(Some(&self.id));
        }
    }
}

/// Any node of the dataset tree.
#[derive(Debug, Clone)]
pub enum Node {
    /// Leaf array.
    Base(BaseType),
    /// Array with coordinate maps.
    Grid(Grid),
    /// Record collection.
    Sequence(Sequence),
    /// Grouping.
    Structure(Structure),
}

impl Node {
    /// Node name.
    pub fn name(&self) -> &str {
        match self {
            Node::Base(b) => &b.name,
            Node::Grid(g) => &g.name,
            Node::Sequence(s) => &s.name,
            Node::Structure(s) => &s.name,
        }
    }

    /// Node identifier.
    pub fn id(&self) -> &str {
        match self {
            Node::Base(b) => &b.id,
            Node::Grid(g) => &g.id,
            Node::Sequence(s) => &s.id,
            Node::Structure(s) => &s.id,
        }
    }

    pub(crate) fn assign_ids(&mut self, prefix: Option<&str>) {
        match self {
            Node::Base(b) => b.assign_ids(prefix),
            Node::Grid(g) => g.assign_ids(prefix),
            Node::Sequence(s) => s.assign_ids(prefix),
            Node::Structure(s) => s.assign_ids(prefix),
        }
    }
}

impl From<BaseType> for Node {
    fn from(b: BaseType) -> Self {
        Node::Base(b)
    }
}

impl From<Grid> for Node {
    fn from(g: Grid) -> Self {
        Node::Grid(g)
    }
}

impl From<Sequence> for Node {
    fn from(s: Sequence) -> Self {
        Node::Sequence(s)
    }
}

impl From<Structure> for Node {
    fn from(s: Structure) -> Self {
        Node::Structure(s)
    }
}

/// A borrowed view of any node, as produced by a tree walk.
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    /// Leaf array.
    Base(&'a BaseType),
    /// Array with coordinate maps.
    Grid(&'a Grid),
    /// Record collection.
    Sequence(&'a Sequence),
    /// Grouping.
    Structure(&'a Structure),
}

impl<'a> NodeRef<'a> {
    /// Push this node and all of its descendants, pre-order.
    pub(crate) fn collect_into(self, out: &mut Vec<NodeRef<'a>>) {
        out.push(self);
        match self {
            NodeRef::Base(_) => {}
            NodeRef::Grid(g) => {
                out.push(NodeRef::Base(&g.array));
                out.extend(g.maps.iter().map(NodeRef::Base));
            }
            NodeRef::Sequence(s) => out.extend(s.fields.iter().map(NodeRef::Base)),
            NodeRef::Structure(s) => {
                for child in &s.children {
                    NodeRef::from(child).collect_into(out);
                }
            }
        }
    }
}

impl<'a> From<&'a Node> for NodeRef<'a> {
    fn from(node: &'a Node) -> Self {
        match node {
            Node::Base(b) => NodeRef::Base(b),
            Node::Grid(g) => NodeRef::Grid(g),
            Node::Sequence(s) => NodeRef::Sequence(s),
            Node::Structure(s) => NodeRef::Structure(s),
        }
    }
}

fn child_id(prefix: Option<&str>, name: &str) -> String {
    match prefix {
        Some(p) => format!("{}.{}", p, name),
        None => name.to_string(),
    }
}
