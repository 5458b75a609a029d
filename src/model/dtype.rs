//! Element type tags.

use std::fmt;

/// Element type of an array in the dataset model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DType {
    /// Signed 8-bit integer.
    Byte,
    /// Unsigned 8-bit character.
    Char,
    /// Signed 16-bit integer.
    Short,
    /// Signed 32-bit integer.
    Int,
    /// 32-bit float.
    Float,
    /// 64-bit float.
    Double,
    /// Signed 64-bit integer.
    Long,
    /// Boolean.
    Bool,
    /// Variable-length text.
    Text,
    /// Wall-clock datetime without a time zone.
    Time,
    /// Opaque values.
    Object,
}

impl DType {
    /// Single-character type code.
    pub fn char_code(self) -> char {
        match self {
            DType::Byte => 'b',
            DType::Char => 'c',
            DType::Short => 'h',
            DType::Int => 'i',
            DType::Float => 'f',
            DType::Double => 'd',
            DType::Long => 'l',
            DType::Bool => '?',
            DType::Text => 'S',
            DType::Time => 'M',
            DType::Object => 'O',
        }
    }

    /// Lower-case type name, as used in dataset descriptions.
    pub fn name(self) -> &'static str {
        match self {
            DType::Byte => "byte",
            DType::Char => "char",
            DType::Short => "short",
            DType::Int => "int",
            DType::Float => "float",
            DType::Double => "double",
            DType::Long => "long",
            DType::Bool => "bool",
            DType::Text => "text",
            DType::Time => "time",
            DType::Object => "object",
        }
    }

    /// Parse a type name.
    pub fn from_name(name: &str) -> Option<Self> {
        let dtype = match name.to_lowercase().as_str() {
            "byte" | "int8" => DType::Byte,
            "char" | "uint8" => DType::Char,
            "short" | "int16" => DType::Short,
            "int" | "int32" => DType::Int,
            "float" | "float32" => DType::Float,
            "double" | "float64" => DType::Double,
            "long" | "int64" => DType::Long,
            "bool" => DType::Bool,
            "text" | "string" => DType::Text,
            "time" | "datetime" => DType::Time,
            "object" => DType::Object,
            _ => return None,
        };
        Some(dtype)
    }

    /// Whether values of this type are datetimes.
    pub fn is_temporal(self) -> bool {
        self == DType::Time
    }

    /// Whether values of this type are opaque objects.
    pub fn is_opaque(self) -> bool {
        self == DType::Object
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_parse_back() {
        for dtype in [
            DType::Byte,
            DType::Char,
            DType::Short,
            DType::Int,
            DType::Float,
            DType::Double,
            DType::Long,
            DType::Bool,
            DType::Text,
            DType::Time,
            DType::Object,
        ] {
            assert_eq!(DType::from_name(dtype.name()), Some(dtype));
        }
        assert_eq!(DType::from_name("FLOAT64"), Some(DType::Double));
        assert_eq!(DType::from_name("complex"), None);
    }

    #[test]
    fn classifies_temporal_and_opaque() {
        assert!(DType::Time.is_temporal());
        assert!(!DType::Double.is_temporal());
        assert!(DType::Object.is_opaque());
        assert_eq!(DType::Time.char_code(), 'M');
    }
}
