//! Lazy data-section generation.

use super::schema::Layout;
use super::{NcType, Schema};
use crate::error::{NcError, Result};
use crate::model::ArrayData;
use std::collections::VecDeque;
use std::iter::Fuse;

/// One element on its way to the wire, before the cast to the variable type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    /// Integer-valued element.
    Int(i64),
    /// Float-valued element.
    Float(f64),
}

impl Scalar {
    fn as_i64(self) -> i64 {
        match self {
            Scalar::Int(v) => v,
            Scalar::Float(v) => v as i64,
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            Scalar::Int(v) => v as f64,
            Scalar::Float(v) => v,
        }
    }

    /// Append the big-endian encoding of this element as `nc_type`.
    pub fn encode(self, nc_type: NcType, buf: &mut Vec<u8>) {
        match nc_type {
            NcType::Byte => buf.push(self.as_i64() as i8 as u8),
            NcType::Char => buf.push(self.as_i64() as u8),
            NcType::Short => buf.extend_from_slice(&(self.as_i64() as i16).to_be_bytes()),
            NcType::Int => buf.extend_from_slice(&(self.as_i64() as i32).to_be_bytes()),
            NcType::Float => buf.extend_from_slice(&(self.as_f64() as f32).to_be_bytes()),
            NcType::Double => buf.extend_from_slice(&self.as_f64().to_be_bytes()),
        }
    }
}

/// Flatten an array into scalars, in logical (row-major) order.
fn scalars(data: &ArrayData) -> Result<Vec<Scalar>> {
    let out = match data {
        ArrayData::Byte(a) => a.iter().map(|&v| Scalar::Int(v.into())).collect(),
        ArrayData::Char(a) => a.iter().map(|&v| Scalar::Int(v.into())).collect(),
        ArrayData::Short(a) => a.iter().map(|&v| Scalar::Int(v.into())).collect(),
        ArrayData::Int(a) => a.iter().map(|&v| Scalar::Int(v.into())).collect(),
        ArrayData::Long(a) => a.iter().map(|&v| Scalar::Int(v)).collect(),
        ArrayData::Bool(a) => a.iter().map(|&v| Scalar::Int(v.into())).collect(),
        ArrayData::Float(a) => a.iter().map(|&v| Scalar::Float(v.into())).collect(),
        ArrayData::Double(a) => a.iter().map(|&v| Scalar::Float(v)).collect(),
        ArrayData::Text(a) => a
            .iter()
            .flat_map(|s| s.bytes())
            .map(|b| Scalar::Int(b.into()))
            .collect(),
        ArrayData::Time(_) | ArrayData::Object(_) => {
            return Err(NcError::unsupported_type(data.dtype()))
        }
    };
    Ok(out)
}

/// Pulls one element at a time out of a stream of arrays.
#[derive(Debug)]
struct Elements<I: Iterator> {
    source: Fuse<I>,
    pending: VecDeque<Scalar>,
}

impl<I> Elements<I>
where
    I: Iterator<Item = ArrayData>,
{
    fn next_scalar(&mut self) -> Option<Result<Scalar>> {
        while self.pending.is_empty() {
            let chunk = self.source.next()?;
            match scalars(&chunk) {
                Ok(values) => self.pending.extend(values),
                Err(e) => return Some(Err(e)),
            }
        }
        self.pending.pop_front().map(Ok)
    }

    /// Encode up to `count` elements, returning how many were available.
    fn write(&mut self, nc_type: NcType, count: usize, buf: &mut Vec<u8>) -> Result<usize> {
        for written in 0..count {
            match self.next_scalar() {
                Some(scalar) => scalar?.encode(nc_type, buf),
                None => return Ok(written),
            }
        }
        Ok(count)
    }
}

#[derive(Debug, Clone)]
struct Slot {
    name: String,
    nc_type: NcType,
    count: usize,
    /// Bytes occupied, padding included.
    stride: usize,
    /// 0-d variable; it never draws from the value stream.
    scalar: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Header,
    Fixed(usize),
    Records(usize),
    Done,
}

/// Iterator over the encoded file: the header, one block per fixed-size
/// variable, then groups of records.
///
/// The value stream must supply every fixed-size variable's elements in
/// registration order (0-d variables excepted: they hold the fill value), then each record's elements variable by variable.
/// Records the stream cannot fill are written as fill values so the output
/// always matches the header.
#[derive(Debug)]
pub struct Blocks<I: Iterator> {
    header: Option<Vec<u8>>,
    fixed: Vec<Slot>,
    records: Vec<Slot>,
    numrecs: usize,
    records_per_block: usize,
    elements: Elements<I>,
    stage: Stage,
    exhausted: bool,
}

impl<I> Blocks<I>
where
    I: Iterator<Item = ArrayData>,
{
    pub(super) fn new(
        schema: &Schema,
        layout: &Layout,
        header: Vec<u8>,
        values: I,
        records_per_block: usize,
    ) -> Self {
        let mut fixed = Vec::new();
        let mut records = Vec::new();
        for (var, placement) in schema.variables().iter().zip(&layout.placements) {
            let slot = Slot {
                name: var.name.clone(),
                nc_type: var.nc_type,
                count: placement.count,
                stride: placement.vsize,
                scalar: var.dimensions.is_empty(),
            };
            if var.is_record {
                records.push(slot);
            } else {
                fixed.push(slot);
            }
        }
        if let [lone] = records.as_mut_slice() {
            lone.stride = lone.count * lone.nc_type.size();
        }

        Self {
            header: Some(header),
            fixed,
            records,
            numrecs: schema.numrecs(),
            records_per_block: records_per_block.max(1),
            elements: Elements {
                source: values.fuse(),
                pending: VecDeque::new(),
            },
            stage: Stage::Header,
            exhausted: false,
        }
    }

    fn fixed_block(&mut self, index: usize) -> Result<Vec<u8>> {
        let slot = &self.fixed[index];
        let mut buf = Vec::with_capacity(slot.stride);
        if slot.scalar {
            tracing::debug!("Filling 0-d variable {}", slot.name);
            slot.nc_type.fill().encode(slot.nc_type, &mut buf);
            buf.resize(slot.stride, 0);
            return Ok(buf);
        }
        let written = self.elements.write(slot.nc_type, slot.count, &mut buf)?;
        if written < slot.count {
            return Err(NcError::StreamExhausted {
                variable: slot.name.clone(),
            });
        }
        buf.resize(slot.stride, 0);
        tracing::debug!("Wrote {} ({} bytes)", slot.name, buf.len());
        Ok(buf)
    }

    fn record_block(&mut self, first: usize, last: usize) -> Result<Vec<u8>> {
        let record_len: usize = self.records.iter().map(|s| s.stride).sum();
        let mut buf = Vec::with_capacity(record_len * (last - first));
        for record in first..last {
            for slot in &self.records {
                let start = buf.len();
                let written = self.elements.write(slot.nc_type, slot.count, &mut buf)?;
                if written < slot.count {
                    if !self.exhausted {
                        tracing::warn!(
                            "Value stream ended at record {} of {}, filling the rest",
                            record,
                            self.numrecs
                        );
                        self.exhausted = true;
                    }
                    for _ in written..slot.count {
                        slot.nc_type.fill().encode(slot.nc_type, &mut buf);
                    }
                }
                buf.resize(start + slot.stride, 0);
            }
        }
        Ok(buf)
    }

    fn advance(&mut self) -> Option<Result<Vec<u8>>> {
        loop {
            match self.stage {
                Stage::Header => {
                    self.stage = Stage::Fixed(0);
                    if let Some(header) = self.header.take() {
                        return Some(Ok(header));
                    }
                }
                Stage::Fixed(i) if i < self.fixed.len() => {
                    self.stage = Stage::Fixed(i + 1);
                    return Some(self.fixed_block(i));
                }
                Stage::Fixed(_) => {
                    tracing::debug!("Done with non-record data");
                    self.stage = Stage::Records(0);
                }
                Stage::Records(r) if r < self.numrecs && !self.records.is_empty() => {
                    let last = (r + self.records_per_block).min(self.numrecs);
                    self.stage = Stage::Records(last);
                    return Some(self.record_block(r, last));
                }
                Stage::Records(_) => {
                    self.stage = Stage::Done;
                }
                Stage::Done => return None,
            }
        }
    }
}

impl<I> Iterator for Blocks<I>
where
    I: Iterator<Item = ArrayData>,
{
    type Item = Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        let block = self.advance()?;
        if block.is_err() {
            self.stage = Stage::Done;
        }
        Some(block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Attributes;
    use crate::nc3::FormatVersion;

    fn collect<I: Iterator<Item = ArrayData>>(blocks: Blocks<I>) -> Vec<Vec<u8>> {
        blocks.collect::<Result<Vec<_>>>().unwrap()
    }

    #[test]
    fn casts_and_pads_fixed_variables() {
        let mut schema = Schema::new(FormatVersion::Classic);
        schema.create_dimension("x", Some(3)).unwrap();
        schema
            .create_variable("v", NcType::Short, &["x"], &Attributes::new())
            .unwrap();
        let values = vec![ArrayData::from(vec![1.0f64, 2.0]), ArrayData::from(vec![3i64])];
        let blocks = collect(schema.generate(values.into_iter(), 1).unwrap());

        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[1], vec![0, 1, 0, 2, 0, 3, 0, 0]);
        let total: usize = blocks.iter().map(Vec::len).sum();
        assert_eq!(total as u64, schema.filesize().unwrap());
    }

    #[test]
    fn scalar_fixed_variable_holds_fill_and_draws_nothing() {
        let mut schema = Schema::new(FormatVersion::Classic);
        schema.create_dimension("x", Some(2)).unwrap();
        let attrs = Attributes::new();
        let no_dims: [&str; 0] = [];
        schema
            .create_variable("s", NcType::Int, &no_dims, &attrs)
            .unwrap();
        schema.create_variable("v", NcType::Short, &["x"], &attrs).unwrap();
        let values = vec![ArrayData::from(vec![5i16, 6])];
        let blocks = collect(schema.generate(values.into_iter(), 1).unwrap());

        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[1], (-2147483647i32).to_be_bytes().to_vec());
        assert_eq!(blocks[2], vec![0, 5, 0, 6]);
    }

    #[test]
    fn short_fixed_stream_is_an_error() {
        let mut schema = Schema::new(FormatVersion::Classic);
        schema.create_dimension("x", Some(2)).unwrap();
        schema
            .create_variable("v", NcType::Int, &["x"], &Attributes::new())
            .unwrap();
        let mut blocks = schema
            .generate(vec![ArrayData::from(vec![1i32])].into_iter(), 1)
            .unwrap();
        assert!(blocks.next().unwrap().is_ok());
        assert!(matches!(
            blocks.next(),
            Some(Err(NcError::StreamExhausted { .. }))
        ));
        assert!(blocks.next().is_none());
    }

    #[test]
    fn interleaves_records_with_padding() {
        let mut schema = Schema::new(FormatVersion::Classic);
        schema.create_dimension("t", None).unwrap();
        schema.set_numrecs(2);
        let attrs = Attributes::new();
        schema
            .create_variable("a", NcType::Byte, &["t"], &attrs)
            .unwrap();
        schema
            .create_variable("b", NcType::Int, &["t"], &attrs)
            .unwrap();
        let values = [1i64, 10, 2, 20].map(|v| ArrayData::scalar(v));
        let blocks = collect(schema.generate(values.into_iter(), 2).unwrap());

        assert_eq!(blocks.len(), 2);
        assert_eq!(
            blocks[1],
            vec![1, 0, 0, 0, 0, 0, 0, 10, 2, 0, 0, 0, 0, 0, 0, 20]
        );
    }

    #[test]
    fn lone_record_variable_packs_records() {
        let mut schema = Schema::new(FormatVersion::Classic);
        schema.create_dimension("t", None).unwrap();
        schema.set_numrecs(3);
        schema
            .create_variable("c", NcType::Char, &["t"], &Attributes::new())
            .unwrap();
        let values = vec![ArrayData::from(vec!["abc".to_string()])];
        let blocks = collect(schema.generate(values.into_iter(), 10).unwrap());
        assert_eq!(blocks[1], b"abc".to_vec());
    }

    #[test]
    fn missing_records_are_filled() {
        let mut schema = Schema::new(FormatVersion::Classic);
        schema.create_dimension("t", None).unwrap();
        schema.set_numrecs(2);
        schema
            .create_variable("s", NcType::Short, &["t"], &Attributes::new())
            .unwrap();
        let blocks = collect(
            schema
                .generate(vec![ArrayData::scalar(7i64)].into_iter(), 1)
                .unwrap(),
        );
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[1], vec![0, 7]);
        assert_eq!(blocks[2], (-32767i16).to_be_bytes().to_vec());
    }

    #[test]
    fn temporal_arrays_are_rejected() {
        let mut schema = Schema::new(FormatVersion::Classic);
        schema.create_dimension("x", Some(1)).unwrap();
        schema
            .create_variable("v", NcType::Float, &["x"], &Attributes::new())
            .unwrap();
        let when = chrono::NaiveDate::from_ymd_opt(2020, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let mut blocks = schema
            .generate(vec![ArrayData::from(vec![when])].into_iter(), 1)
            .unwrap();
        blocks.next();
        assert!(matches!(
            blocks.next(),
            Some(Err(NcError::UnsupportedType { .. }))
        ));
    }
}
