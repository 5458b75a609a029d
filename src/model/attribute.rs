//! Attribute values and insertion-ordered attribute mappings.

/// A single attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum Attribute {
    /// Text.
    Text(String),
    /// Signed bytes.
    Byte(Vec<i8>),
    /// 16-bit integers.
    Short(Vec<i16>),
    /// 32-bit integers.
    Int(Vec<i32>),
    /// 32-bit floats.
    Float(Vec<f32>),
    /// 64-bit floats.
    Double(Vec<f64>),
    /// Nested mapping (for example `DODS_EXTRA` or `NC_GLOBAL`).
    Group(Attributes),
}

impl Attribute {
    /// The text content, if this is a text attribute.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Attribute::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The nested mapping, if this is a group.
    pub fn as_group(&self) -> Option<&Attributes> {
        match self {
            Attribute::Group(g) => Some(g),
            _ => None,
        }
    }
}

impl From<&str> for Attribute {
    fn from(s: &str) -> Self {
        Attribute::Text(s.to_string())
    }
}

impl From<String> for Attribute {
    fn from(s: String) -> Self {
        Attribute::Text(s)
    }
}

impl From<i32> for Attribute {
    fn from(v: i32) -> Self {
        Attribute::Int(vec![v])
    }
}

impl From<f32> for Attribute {
    fn from(v: f32) -> Self {
        Attribute::Float(vec![v])
    }
}

impl From<f64> for Attribute {
    fn from(v: f64) -> Self {
        Attribute::Double(vec![v])
    }
}

impl From<Attributes> for Attribute {
    fn from(g: Attributes) -> Self {
        Attribute::Group(g)
    }
}

/// Attribute mapping that keeps insertion order.
///
/// Inserting an existing key replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes {
    entries: Vec<(String, Attribute)>,
}

impl Attributes {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an attribute.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Attribute>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Attribute>) -> Self {
        self.insert(name, value);
        self
    }

    /// Look up an attribute.
    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.entries.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// Look up a nested group.
    pub fn group(&self, name: &str) -> Option<&Attributes> {
        self.get(name).and_then(Attribute::as_group)
    }

    /// Iterate in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Attribute)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of attributes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the mapping is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copy every entry of `other` into this mapping.
    pub fn update(&mut self, other: &Attributes) {
        for (name, value) in other.iter() {
            self.insert(name, value.clone());
        }
    }
}
