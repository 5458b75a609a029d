//! Mapping a dataset tree onto a NetCDF3 schema.

use crate::config::ResponseConfig;
use crate::error::{NcError, Result};
use crate::model::{BaseType, DType, Dataset, Grid, Sequence};
use crate::nc3::{NcType, Schema};

/// Register every dimension and variable of `dataset`.
///
/// Grids are registered first, then sequences, each in traversal order. Any
/// dtype without a NetCDF3 equivalent fails here, before a single byte is
/// produced.
pub fn build_schema(dataset: &Dataset, config: &ResponseConfig) -> Result<Schema> {
    let mut schema = Schema::new(config.format);

    if let Some(globals) = dataset.global_attributes() {
        schema.set_global_attributes(globals);
    }

    tracing::debug!("Dimensions in use: {:?}", dataset.dimension_names());

    let unlimited = config
        .unlimited_dimension
        .as_deref()
        .or_else(|| dataset.unlimited_dimension());
    tracing::debug!("Unlimited dimension hint: {:?}", unlimited);

    for grid in dataset.grids() {
        add_grid(&mut schema, grid, unlimited)?;
    }
    for seq in dataset.sequences() {
        add_sequence(&mut schema, seq)?;
    }

    Ok(schema)
}

fn add_grid(schema: &mut Schema, grid: &Grid, unlimited: Option<&str>) -> Result<()> {
    for (dim, map) in grid.maps() {
        if schema.has_dimension(dim) {
            continue;
        }

        let n = map.len();
        // An empty map can only be the record dimension.
        if unlimited == Some(dim) || n == 0 {
            schema.create_dimension(dim, None)?;
            schema.set_numrecs(n);
        } else {
            schema.create_dimension(dim, Some(n))?;
        }

        // and the coordinate variable
        schema.create_variable(dim, nc_type(map.dtype())?, &[dim], &map.attributes)?;
    }

    add_variable(schema, &grid.array)
}

fn add_sequence(schema: &mut Schema, seq: &Sequence) -> Result<()> {
    schema.create_dimension(&seq.name, None)?;
    schema.set_numrecs(seq.len());

    let dims = [seq.name.as_str()];
    for field in &seq.fields {
        let dtype = match field.dtype() {
            // NetCDF3 has no date type
            DType::Time => DType::Float,
            DType::Object => return Err(NcError::unsupported_type(DType::Object)),
            other => other,
        };
        schema.create_variable(&field.name, nc_type(dtype)?, &dims, &field.attributes)?;
    }
    Ok(())
}

fn add_variable(schema: &mut Schema, var: &BaseType) -> Result<()> {
    schema.create_variable(
        &var.name,
        nc_type(var.dtype())?,
        &var.dimensions,
        &var.attributes,
    )
}

fn nc_type(dtype: DType) -> Result<NcType> {
    NcType::from_char(dtype.char_code()).map_err(|_| NcError::unsupported_type(dtype))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Attribute, Attributes, Value, DODS_EXTRA, NC_GLOBAL, UNLIMITED_DIMENSION};
    use chrono::NaiveDate;
    use ndarray::{ArrayD, IxDyn};

    fn unlimited(name: &str) -> Attributes {
        Attributes::new().with(
            DODS_EXTRA,
            Attributes::new().with(UNLIMITED_DIMENSION, name),
        )
    }

    fn temperature_grid() -> Grid {
        Grid::new(
            BaseType::new("temperature", vec![10i32, 20, 30])
                .with_attributes(Attributes::new().with("units", "K")),
            vec![BaseType::new("time", vec![0.0f64, 1.0, 2.0])],
        )
    }

    #[test]
    fn grid_over_unlimited_time() {
        let ds = Dataset::new("ds")
            .with_attributes(unlimited("time"))
            .with_child(temperature_grid());
        let schema = build_schema(&ds, &ResponseConfig::default()).unwrap();

        assert_eq!(schema.dimension("time").unwrap().len, None);
        assert_eq!(schema.numrecs(), 3);
        let records: Vec<_> = schema.record_variables().map(|v| v.name.as_str()).collect();
        assert_eq!(records, vec!["time", "temperature"]);
        assert_eq!(schema.variable("temperature").unwrap().nc_type, NcType::Int);
        assert_eq!(
            schema.variable("temperature").unwrap().attributes.get("units"),
            Some(&Attribute::from("K"))
        );
        assert!(schema.filesize().is_err());
    }

    #[test]
    fn fixed_grids_register_deterministically() {
        let build = || {
            let ds = Dataset::new("ds")
                .with_child(temperature_grid())
                .with_child(Grid::new(
                    BaseType::new("salinity", vec![1.0f32, 2.0, 3.0]),
                    vec![BaseType::new("time", vec![0.0f64, 1.0, 2.0])],
                ));
            build_schema(&ds, &ResponseConfig::default()).unwrap()
        };
        let a = build();
        let b = build();
        assert_eq!(a.dimensions(), b.dimensions());
        assert_eq!(a.variables(), b.variables());
        let names: Vec<_> = a.variables().iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["time", "temperature", "salinity"]);
        assert!(a.record_variables().next().is_none());
    }

    #[test]
    fn shared_coordinate_keeps_first_size() {
        let ds = Dataset::new("ds")
            .with_child(temperature_grid())
            .with_child(Grid::new(
                BaseType::new("other", vec![1i16; 5]),
                vec![BaseType::new("time", vec![0.0f64; 5])],
            ));
        // "other" declares 5 steps over a 3-step dimension; registration
        // keeps the first size and does not re-register the coordinate.
        let schema = build_schema(&ds, &ResponseConfig::default()).unwrap();
        assert_eq!(schema.dimension("time").unwrap().len, Some(3));
        assert_eq!(schema.dimensions().len(), 1);
        assert_eq!(schema.variables().len(), 3);
    }

    #[test]
    fn temporal_sequence_fields_become_float() {
        let when = NaiveDate::from_ymd_opt(2000, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let ds = Dataset::new("ds").with_child(Sequence::new(
            "obs",
            vec![
                BaseType::new("ts", vec![when; 5]),
                BaseType::new("val", vec![1.0f64; 5]),
            ],
        ));
        let schema = build_schema(&ds, &ResponseConfig::default()).unwrap();
        assert_eq!(schema.dimension("obs").unwrap().len, None);
        assert_eq!(schema.numrecs(), 5);
        assert_eq!(schema.variable("ts").unwrap().nc_type, NcType::Float);
        assert_eq!(schema.variable("val").unwrap().dimensions, vec!["obs"]);
    }

    #[test]
    fn opaque_sequence_field_fails() {
        let opaque = ArrayD::from_elem(IxDyn(&[2]), Value::Absent);
        let ds = Dataset::new("ds").with_child(Sequence::new(
            "obs",
            vec![
                BaseType::new("blob", opaque),
                BaseType::new("val", vec![1.0f64, 2.0]),
            ],
        ));
        let err = build_schema(&ds, &ResponseConfig::default()).unwrap_err();
        match err {
            NcError::UnsupportedType { dtype } => assert_eq!(dtype, "object"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn unmappable_grid_dtype_fails() {
        let ds = Dataset::new("ds").with_child(Grid::new(
            BaseType::new("counts", vec![1i64, 2]),
            vec![BaseType::new("x", vec![0i32, 1])],
        ));
        assert!(matches!(
            build_schema(&ds, &ResponseConfig::default()),
            Err(NcError::UnsupportedType { dtype }) if dtype == "long"
        ));
    }

    #[test]
    fn copies_global_attributes_and_honours_override() {
        let ds = Dataset::new("ds")
            .with_attributes(
                unlimited("nothing").with(NC_GLOBAL, Attributes::new().with("title", "t")),
            )
            .with_child(temperature_grid());
        let config = ResponseConfig::default().with_unlimited_dimension("time");
        let schema = build_schema(&ds, &config).unwrap();
        assert_eq!(schema.global_attributes().len(), 1);
        assert!(schema.dimension("time").unwrap().is_unlimited());
    }

    #[test]
    fn empty_map_becomes_the_record_dimension() {
        let ds = Dataset::new("ds").with_child(Grid::new(
            BaseType::new("counts", Vec::<i32>::new()),
            vec![BaseType::new("x", Vec::<i32>::new())],
        ));
        let schema = build_schema(&ds, &ResponseConfig::default()).unwrap();
        assert!(schema.dimension("x").unwrap().is_unlimited());
        assert_eq!(schema.numrecs(), 0);
        let records: Vec<_> = schema.record_variables().map(|v| v.name.as_str()).collect();
        assert_eq!(records, vec!["x", "counts"]);

        // a sequence alongside would need a second record dimension
        let ds = ds.with_child(Sequence::new("obs", vec![BaseType::new("v", vec![1i32])]));
        assert!(matches!(
            build_schema(&ds, &ResponseConfig::default()),
            Err(NcError::SecondUnlimitedDimension { existing, requested })
                if existing == "x" && requested == "obs"
        ));
    }

    #[test]
    fn second_record_dimension_is_rejected() {
        let ds = Dataset::new("ds")
            .with_child(Sequence::new("a", vec![BaseType::new("x", vec![1i32])]))
            .with_child(Sequence::new("b", vec![BaseType::new("y", vec![1i32])]));
        assert!(matches!(
            build_schema(&ds, &ResponseConfig::default()),
            Err(NcError::SecondUnlimitedDimension { .. })
        ));
    }
}
