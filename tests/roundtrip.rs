#![cfg(feature = "verify")]

use ncresponse::model::{
    Attributes, BaseType, Dataset, Grid, Sequence, DODS_EXTRA, NC_GLOBAL, UNLIMITED_DIMENSION,
};
use ncresponse::response::days_since_epoch;
use ncresponse::verify::summarize;
use ncresponse::{NcResponse, ResponseConfig};
use ndarray::{ArrayD, IxDyn};
use std::fs::File;
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, dataset: Dataset, config: ResponseConfig) -> std::path::PathBuf {
    let path = dir.path().join(name);
    NcResponse::new(dataset, config)
        .unwrap()
        .write_to(File::create(&path).unwrap())
        .unwrap();
    path
}

#[test]
fn fixed_grid_reads_back() {
    let dir = TempDir::new().unwrap();
    let sst = ArrayD::from_shape_vec(IxDyn(&[2, 3]), vec![1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
    let ds = Dataset::new("fixed")
        .with_attributes(
            Attributes::new().with(NC_GLOBAL, Attributes::new().with("title", "Surface")),
        )
        .with_child(Grid::new(
            BaseType::new("sst", sst).with_attributes(Attributes::new().with("units", "degC")),
            vec![
                BaseType::new("lat", vec![-5i16, 5]),
                BaseType::new("lon", vec![0.0f64, 1.0, 2.0]),
            ],
        ));
    let path = write(&dir, "fixed.nc", ds, ResponseConfig::default());

    let summary = summarize(&path).unwrap();
    assert_eq!(summary.attributes, vec![("title".to_string(), "Surface".to_string())]);
    assert_eq!(summary.dimension("lat").unwrap().len, 2);
    assert!(!summary.dimension("lon").unwrap().unlimited);

    let sst = summary.variable("sst").unwrap();
    assert_eq!(sst.dimensions, vec!["lat", "lon"]);
    assert_eq!(sst.values.as_deref(), Some(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0][..]));
    assert_eq!(sst.attributes, vec![("units".to_string(), "degC".to_string())]);
    assert_eq!(summary.variable("lat").unwrap().values, Some(vec![-5.0, 5.0]));
}

#[test]
fn unlimited_grid_reads_back() {
    let dir = TempDir::new().unwrap();
    let ds = Dataset::new("ds")
        .with_attributes(Attributes::new().with(
            DODS_EXTRA,
            Attributes::new().with(UNLIMITED_DIMENSION, "time"),
        ))
        .with_child(Grid::new(
            BaseType::new("temperature", vec![10i32, 20, 30]),
            vec![BaseType::new("time", vec![0.0f64, 1.0, 2.0])],
        ));
    let path = write(&dir, "grid.nc", ds, ResponseConfig::default().with_records_per_block(2));

    let summary = summarize(&path).unwrap();
    let time = summary.dimension("time").unwrap();
    assert!(time.unlimited);
    assert_eq!(time.len, 3);
    assert_eq!(
        summary.variable("temperature").unwrap().values,
        Some(vec![10.0, 20.0, 30.0])
    );
    assert_eq!(summary.variable("time").unwrap().values, Some(vec![0.0, 1.0, 2.0]));
}

#[test]
fn sequence_reads_back_in_both_formats() {
    let start = chrono::NaiveDate::from_ymd_opt(2015, 7, 1)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap();
    let times: Vec<_> = (0..4).map(|d| start + chrono::Duration::days(d)).collect();
    let dataset = || {
        Dataset::new("ds").with_child(Sequence::new(
            "obs",
            vec![
                BaseType::new("ts", times.clone()),
                BaseType::new("depth", vec![1.5f64, 2.5, 3.5, 4.5]),
                BaseType::new("flag", vec![1i8, 0, 1, 0]),
            ],
        ))
    };

    let dir = TempDir::new().unwrap();
    for (name, config) in [
        ("classic.nc", ResponseConfig::default()),
        (
            "offset64.nc",
            ResponseConfig::default().with_format(ncresponse::config::FormatVersion::Offset64),
        ),
    ] {
        let summary = summarize(&write(&dir, name, dataset(), config)).unwrap();
        assert_eq!(summary.dimension("obs").unwrap().len, 4);
        let ts = summary.variable("ts").unwrap().values.clone().unwrap();
        let expected: Vec<f64> = times.iter().map(|t| days_since_epoch(t) as f64).collect();
        assert_eq!(ts, expected);
        assert_eq!(
            summary.variable("depth").unwrap().values,
            Some(vec![1.5, 2.5, 3.5, 4.5])
        );
        assert_eq!(
            summary.variable("flag").unwrap().values,
            Some(vec![1.0, 0.0, 1.0, 0.0])
        );
    }
}
