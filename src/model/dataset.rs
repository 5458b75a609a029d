//! The dataset root.

use super::{Attribute, Attributes, BaseType, Grid, Node, NodeRef, Sequence};

/// Attribute group carrying DAP server hints.
pub const DODS_EXTRA: &str = "DODS_EXTRA";
/// Key of the unlimited dimension hint inside [`DODS_EXTRA`].
pub const UNLIMITED_DIMENSION: &str = "Unlimited_Dimension";
/// Attribute group holding the file's global attributes.
pub const NC_GLOBAL: &str = "NC_GLOBAL";

/// Root of a dataset tree.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Dataset name.
    pub name: String,
    /// Global attributes, including attribute groups.
    pub attributes: Attributes,
    /// Top-level nodes.
    pub children: Vec<Node>,
}

impl Dataset {
    /// Create an empty dataset.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Attributes::new(),
            children: Vec::new(),
        }
    }

    /// Set the attributes.
    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Add a top-level node. Identifiers below it are rebased on its name.
    pub fn add_child(&mut self, child: impl Into<Node>) {
        let mut child = child.into();
        child.assign_ids(None);
        self.children.push(child);
    }

    /// Builder-style [`Dataset::add_child`].
    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.add_child(child);
        self
    }

    /// Every node, depth-first pre-order.
    ///
    /// A grid is followed by its array and maps, a sequence by its fields.
    pub fn walk(&self) -> impl Iterator<Item = NodeRef<'_>> {
        let mut nodes = Vec::new();
        for child in &self.children {
            NodeRef::from(child).collect_into(&mut nodes);
        }
        nodes.into_iter()
    }

    /// Every grid in traversal order.
    pub fn grids(&self) -> impl Iterator<Item = &Grid> {
        self.walk().filter_map(|n| match n {
            NodeRef::Grid(g) => Some(g),
            _ => None,
        })
    }

    /// Every sequence in traversal order.
    pub fn sequences(&self) -> impl Iterator<Item = &Sequence> {
        self.walk().filter_map(|n| match n {
            NodeRef::Sequence(s) => Some(s),
            _ => None,
        })
    }

    /// Every leaf array in traversal order.
    pub fn base_types(&self) -> impl Iterator<Item = &BaseType> {
        self.walk().filter_map(|n| match n {
            NodeRef::Base(b) => Some(b),
            _ => None,
        })
    }

    /// Resolve a leaf by identifier.
    pub fn get(&self, id: &str) -> Option<&BaseType> {
        self.base_types().find(|b| b.id == id)
    }

    /// Union of the dimension names used by every leaf, in first-seen order.
    pub fn dimension_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for leaf in self.base_types() {
            for dim in &leaf.dimensions {
                if !names.contains(&dim.as_str()) {
                    names.push(dim.as_str());
                }
            }
        }
        names
    }

    /// The unlimited dimension hint from `DODS_EXTRA`, if any.
    pub fn unlimited_dimension(&self) -> Option<&str> {
        self.attributes
            .group(DODS_EXTRA)
            .and_then(|extra| extra.get(UNLIMITED_DIMENSION))
            .and_then(Attribute::as_text)
    }

    /// The `NC_GLOBAL` attribute group, if any.
    pub fn global_attributes(&self) -> Option<&Attributes> {
        self.attributes.group(NC_GLOBAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Structure;

    fn sample() -> Dataset {
        Dataset::new("sample")
            .with_attributes(
                Attributes::new()
                    .with(NC_GLOBAL, Attributes::new().with("title", "test"))
                    .with(
                        DODS_EXTRA,
                        Attributes::new().with(UNLIMITED_DIMENSION, "time"),
                    ),
            )
            .with_child(Grid::new(
                BaseType::new("sst", vec![1.0f32, 2.0]),
                vec![BaseType::new("time", vec![0i32, 1])],
            ))
            .with_child(Structure::new(
                "station",
                vec![Sequence::new("obs", vec![BaseType::new("val", vec![5i16])]).into()],
            ))
    }

    #[test]
    fn walks_pre_order() {
        let ds = sample();
        let ids: Vec<String> = ds
            .walk()
            .map(|n| match n {
                NodeRef::Base(b) => b.id.clone(),
                NodeRef::Grid(g) => g.id.clone(),
                NodeRef::Sequence(s) => s.id.clone(),
                NodeRef::Structure(s) => s.id.clone(),
            })
            .collect();
        assert_eq!(
            ids,
            vec![
                "sst",
                "sst.sst",
                "sst.time",
                "station",
                "station.obs",
                "station.obs.val"
            ]
        );
    }

    #[test]
    fn resolves_hints_and_leaves() {
        let ds = sample();
        assert_eq!(ds.unlimited_dimension(), Some("time"));
        assert!(ds.global_attributes().is_some());
        assert_eq!(ds.get("station.obs.val").map(|b| b.name.as_str()), Some("val"));
        assert_eq!(ds.dimension_names(), vec!["time", "obs"]);
        assert_eq!(ds.grids().count(), 1);
        assert_eq!(ds.sequences().count(), 1);
    }

    #[test]
    fn missing_hint_is_not_an_error() {
        let ds = Dataset::new("bare");
        assert_eq!(ds.unlimited_dimension(), None);
        let ds = Dataset::new("no-key")
            .with_attributes(Attributes::new().with(DODS_EXTRA, Attributes::new()));
        assert_eq!(ds.unlimited_dimension(), None);
    }
}
