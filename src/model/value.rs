//! Typed array data and the tagged values pulled out of it.

use super::DType;
use chrono::NaiveDateTime;
use ndarray::{Array1, ArrayD, Axis, IxDyn};

/// A single value pulled from a data source.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Missing value.
    Absent,
    /// Text.
    Text(String),
    /// Any integer.
    Int(i64),
    /// Any floating point number.
    Float(f64),
    /// Boolean.
    Bool(bool),
    /// Wall-clock datetime.
    Time(NaiveDateTime),
    /// Already array-like.
    Array(ArrayData),
}

/// Typed N-dimensional array data.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayData {
    /// Signed bytes.
    Byte(ArrayD<i8>),
    /// Characters.
    Char(ArrayD<u8>),
    /// 16-bit integers.
    Short(ArrayD<i16>),
    /// 32-bit integers.
    Int(ArrayD<i32>),
    /// 32-bit floats.
    Float(ArrayD<f32>),
    /// 64-bit floats.
    Double(ArrayD<f64>),
    /// 64-bit integers.
    Long(ArrayD<i64>),
    /// Booleans.
    Bool(ArrayD<bool>),
    /// Strings.
    Text(ArrayD<String>),
    /// Datetimes.
    Time(ArrayD<NaiveDateTime>),
    /// Opaque values.
    Object(ArrayD<Value>),
}

/// Evaluate `$body` with `$arr` bound to the inner array, whatever the variant.
macro_rules! with_array {
    ($data:expr, $arr:ident => $body:expr) => {
        match $data {
            ArrayData::Byte($arr) => $body,
            ArrayData::Char($arr) => $body,
            ArrayData::Short($arr) => $body,
            ArrayData::Int($arr) => $body,
            ArrayData::Float($arr) => $body,
            ArrayData::Double($arr) => $body,
            ArrayData::Long($arr) => $body,
            ArrayData::Bool($arr) => $body,
            ArrayData::Text($arr) => $body,
            ArrayData::Time($arr) => $body,
            ArrayData::Object($arr) => $body,
        }
    };
}

/// Like `with_array!`, but wraps the result back into the same variant.
macro_rules! map_array {
    ($data:expr, $arr:ident => $body:expr) => {
        match $data {
            ArrayData::Byte($arr) => ArrayData::Byte($body),
            ArrayData::Char($arr) => ArrayData::Char($body),
            ArrayData::Short($arr) => ArrayData::Short($body),
            ArrayData::Int($arr) => ArrayData::Int($body),
            ArrayData::Float($arr) => ArrayData::Float($body),
            ArrayData::Double($arr) => ArrayData::Double($body),
            ArrayData::Long($arr) => ArrayData::Long($body),
            ArrayData::Bool($arr) => ArrayData::Bool($body),
            ArrayData::Text($arr) => ArrayData::Text($body),
            ArrayData::Time($arr) => ArrayData::Time($body),
            ArrayData::Object($arr) => ArrayData::Object($body),
        }
    };
}

impl ArrayData {
    /// Element type of this array.
    pub fn dtype(&self) -> DType {
        match self {
            ArrayData::Byte(_) => DType::Byte,
            ArrayData::Char(_) => DType::Char,
            ArrayData::Short(_) => DType::Short,
            ArrayData::Int(_) => DType::Int,
            ArrayData::Float(_) => DType::Float,
            ArrayData::Double(_) => DType::Double,
            ArrayData::Long(_) => DType::Long,
            ArrayData::Bool(_) => DType::Bool,
            ArrayData::Text(_) => DType::Text,
            ArrayData::Time(_) => DType::Time,
            ArrayData::Object(_) => DType::Object,
        }
    }

    /// Shape of the array.
    pub fn shape(&self) -> &[usize] {
        with_array!(self, a => a.shape())
    }

    /// Number of dimensions.
    pub fn ndim(&self) -> usize {
        with_array!(self, a => a.ndim())
    }

    /// Length along the first axis, or 0 for a 0-d array.
    pub fn len(&self) -> usize {
        self.shape().first().copied().unwrap_or(0)
    }

    /// Whether there is nothing to iterate along the first axis.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total number of elements.
    pub fn size(&self) -> usize {
        with_array!(self, a => a.len())
    }

    /// Row `index` along the first axis.
    ///
    /// 1-D data yields a scalar [`Value`], higher-dimensional data yields the
    /// sub-array as [`Value::Array`]. Returns `None` for 0-d data or an
    /// out-of-range index.
    pub fn element(&self, index: usize) -> Option<Value> {
        if self.ndim() == 0 || index >= self.len() {
            return None;
        }
        if self.ndim() > 1 {
            let row = map_array!(self, a => a.index_axis(Axis(0), index).to_owned());
            return Some(Value::Array(row));
        }

        let at: &[usize] = &[index];
        let value = match self {
            ArrayData::Byte(a) => Value::Int(i64::from(a[at])),
            ArrayData::Char(a) => Value::Int(i64::from(a[at])),
            ArrayData::Short(a) => Value::Int(i64::from(a[at])),
            ArrayData::Int(a) => Value::Int(i64::from(a[at])),
            ArrayData::Long(a) => Value::Int(a[at]),
            ArrayData::Float(a) => Value::Float(f64::from(a[at])),
            ArrayData::Double(a) => Value::Float(a[at]),
            ArrayData::Bool(a) => Value::Bool(a[at]),
            ArrayData::Text(a) => Value::Text(a[at].clone()),
            ArrayData::Time(a) => Value::Time(a[at]),
            ArrayData::Object(a) => a[at].clone(),
        };
        Some(value)
    }

    /// A 0-d array holding one element.
    pub fn scalar<T>(value: T) -> Self
    where
        T: Clone,
        ArrayD<T>: Into<ArrayData>,
    {
        ArrayD::from_elem(IxDyn(&[]), value).into()
    }
}

macro_rules! impl_from_array {
    ($($elem:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<ArrayD<$elem>> for ArrayData {
                fn from(array: ArrayD<$elem>) -> Self {
                    ArrayData::$variant(array)
                }
            }

            impl From<Vec<$elem>> for ArrayData {
                fn from(values: Vec<$elem>) -> Self {
                    ArrayData::$variant(Array1::from(values).into_dyn())
                }
            }
        )*
    };
}

impl_from_array! {
    i8 => Byte,
    u8 => Char,
    i16 => Short,
    i32 => Int,
    f32 => Float,
    f64 => Double,
    i64 => Long,
    bool => Bool,
    String => Text,
    NaiveDateTime => Time,
}

impl From<ArrayD<Value>> for ArrayData {
    fn from(array: ArrayD<Value>) -> Self {
        ArrayData::Object(array)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_dimensional_elements_are_scalars() {
        let data = ArrayData::from(vec![10i32, 20, 30]);
        assert_eq!(data.len(), 3);
        assert_eq!(data.element(1), Some(Value::Int(20)));
        assert_eq!(data.element(3), None);
    }

    #[test]
    fn two_dimensional_elements_are_rows() {
        let array = ArrayD::from_shape_vec(IxDyn(&[2, 3]), vec![1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0])
            .unwrap();
        let data = ArrayData::from(array);
        let row = data.element(1).unwrap();
        match row {
            Value::Array(ArrayData::Float(a)) => {
                assert_eq!(a.shape(), &[3]);
                assert_eq!(a.iter().copied().collect::<Vec<_>>(), vec![4.0, 5.0, 6.0]);
            }
            other => panic!("expected a float row, got {:?}", other),
        }
    }

    #[test]
    fn zero_dimensional_data_has_no_elements() {
        let data = ArrayData::scalar(4.5f64);
        assert_eq!(data.ndim(), 0);
        assert_eq!(data.size(), 1);
        assert!(data.is_empty());
        assert_eq!(data.element(0), None);
    }

    #[test]
    fn reports_dtype() {
        assert_eq!(ArrayData::from(vec![true]).dtype(), DType::Bool);
        assert_eq!(ArrayData::from(vec!["a".to_string()]).dtype(), DType::Text);
    }
}
