//! Header encoding.

use super::schema::Placement;
use super::{pad4, FormatVersion, Schema, NC_ATTRIBUTE, NC_DIMENSION, NC_VARIABLE};
use crate::error::{NcError, Result};
use crate::model::{Attribute, Attributes};

/// Encode the header of `schema` with the given variable placements.
pub(super) fn encode(schema: &Schema, placements: &[Placement]) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(256);
    buf.extend_from_slice(b"CDF");
    buf.push(schema.format().version_byte());
    put_u32(&mut buf, checked_u32(schema.numrecs() as u64)?);

    let dims = schema.dimensions();
    if dims.is_empty() {
        put_absent(&mut buf);
    } else {
        put_u32(&mut buf, NC_DIMENSION);
        put_u32(&mut buf, checked_u32(dims.len() as u64)?);
        for dim in dims {
            put_name(&mut buf, &dim.name)?;
            put_u32(&mut buf, checked_u32(dim.len.unwrap_or(0) as u64)?);
        }
    }

    put_attributes(&mut buf, schema.global_attributes())?;

    let vars = schema.variables();
    if vars.is_empty() {
        put_absent(&mut buf);
    } else {
        put_u32(&mut buf, NC_VARIABLE);
        put_u32(&mut buf, checked_u32(vars.len() as u64)?);
        for (var, placement) in vars.iter().zip(placements) {
            put_name(&mut buf, &var.name)?;
            put_u32(&mut buf, checked_u32(var.dimensions.len() as u64)?);
            for dim in &var.dimensions {
                let id = schema
                    .dimensions()
                    .iter()
                    .position(|d| &d.name == dim)
                    .ok_or_else(|| NcError::unknown_dimension(&var.name, dim))?;
                put_u32(&mut buf, id as u32);
            }
            put_attributes(&mut buf, &var.attributes)?;
            put_u32(&mut buf, var.nc_type.code());
            // vsize saturates; readers recompute it for huge variables.
            put_u32(
                &mut buf,
                u32::try_from(placement.vsize).unwrap_or(u32::MAX),
            );
            match schema.format() {
                FormatVersion::Classic => put_u32(&mut buf, checked_u32(placement.begin)?),
                FormatVersion::Offset64 => buf.extend_from_slice(&placement.begin.to_be_bytes()),
            }
        }
    }

    Ok(buf)
}

fn put_u32(buf: &mut Vec<u8>, v: u32) {
    buf.extend_from_slice(&v.to_be_bytes());
}

fn put_absent(buf: &mut Vec<u8>) {
    put_u32(buf, 0);
    put_u32(buf, 0);
}

fn put_padding(buf: &mut Vec<u8>, written: usize) {
    buf.resize(buf.len() + pad4(written) - written, 0);
}

fn put_name(buf: &mut Vec<u8>, name: &str) -> Result<()> {
    let bytes = name.as_bytes();
    put_u32(buf, checked_u32(bytes.len() as u64)?);
    buf.extend_from_slice(bytes);
    put_padding(buf, bytes.len());
    Ok(())
}

fn put_attributes(buf: &mut Vec<u8>, attributes: &Attributes) -> Result<()> {
    let encodable: Vec<(&str, &Attribute)> = attributes
        .iter()
        .filter(|(name, value)| {
            let keep = !matches!(value, Attribute::Group(_));
            if !keep {
                tracing::debug!("Skipping nested attribute group {}", name);
            }
            keep
        })
        .collect();

    if encodable.is_empty() {
        put_absent(buf);
        return Ok(());
    }

    put_u32(buf, NC_ATTRIBUTE);
    put_u32(buf, checked_u32(encodable.len() as u64)?);
    for (name, value) in encodable {
        put_name(buf, name)?;
        put_attribute_value(buf, value)?;
    }
    Ok(())
}

fn put_attribute_value(buf: &mut Vec<u8>, value: &Attribute) -> Result<()> {
    // (type code, element count, big-endian payload)
    let (code, count, payload): (u32, usize, Vec<u8>) = match value {
        Attribute::Text(s) => (2, s.len(), s.as_bytes().to_vec()),
        Attribute::Byte(v) => (1, v.len(), v.iter().map(|x| *x as u8).collect()),
        Attribute::Short(v) => (3, v.len(), v.iter().flat_map(|x| x.to_be_bytes()).collect()),
        Attribute::Int(v) => (4, v.len(), v.iter().flat_map(|x| x.to_be_bytes()).collect()),
        Attribute::Float(v) => (5, v.len(), v.iter().flat_map(|x| x.to_be_bytes()).collect()),
        Attribute::Double(v) => (6, v.len(), v.iter().flat_map(|x| x.to_be_bytes()).collect()),
        Attribute::Group(_) => return Ok(()),
    };
    put_u32(buf, code);
    put_u32(buf, checked_u32(count as u64)?);
    buf.extend_from_slice(&payload);
    put_padding(buf, payload.len());
    Ok(())
}

fn checked_u32(v: u64) -> Result<u32> {
    u32::try_from(v).map_err(|_| NcError::OffsetOverflow { offset: v })
}
