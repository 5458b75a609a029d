//! Turning values pulled from sources into arrays the writer can encode.

use crate::model::{ArrayData, Value};
use chrono::{Local, NaiveDateTime, TimeZone};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Normalize one value into array form.
///
/// Scalars become single-element arrays; datetimes become 32-bit day counts
/// since 1970-01-01 because NetCDF3 has no temporal type. Arrays pass
/// through untouched.
pub fn normalize(value: Value) -> ArrayData {
    match value {
        Value::Absent => ArrayData::scalar(f64::NAN),
        Value::Text(s) => ArrayData::from(s.into_bytes()),
        Value::Int(i) => ArrayData::scalar(i),
        Value::Float(f) => ArrayData::scalar(f),
        Value::Bool(b) => ArrayData::scalar(b),
        Value::Time(t) => ArrayData::scalar(days_since_epoch(&t)),
        Value::Array(a) => a,
    }
}

/// Days between the Unix epoch and `t`, reading `t` as local wall-clock time.
///
/// Sub-second precision is dropped. A wall-clock time that does not exist
/// locally (skipped by a DST change) is read as UTC.
pub fn days_since_epoch(t: &NaiveDateTime) -> f32 {
    let seconds = Local
        .from_local_datetime(t)
        .earliest()
        .map(|local| local.timestamp())
        .unwrap_or_else(|| t.and_utc().timestamp());
    (seconds as f64 / SECONDS_PER_DAY) as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn scalars_become_single_element_arrays() {
        assert_eq!(normalize(Value::Int(4)), ArrayData::scalar(4i64));
        assert_eq!(normalize(Value::Float(1.5)), ArrayData::scalar(1.5f64));
        assert_eq!(normalize(Value::Bool(true)), ArrayData::scalar(true));
        assert_eq!(normalize(Value::Text("ab".into())), ArrayData::from(vec![b'a', b'b']));
        match normalize(Value::Absent) {
            ArrayData::Double(a) => {
                assert_eq!(a.len(), 1);
                assert!(a.iter().all(|v| v.is_nan()));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn arrays_pass_through() {
        let data = ArrayData::from(vec![1i16, 2, 3]);
        assert_eq!(normalize(Value::Array(data.clone())), data);
    }

    #[test]
    fn datetimes_become_float_days() {
        let t = at(2001, 1, 2, 12);
        match normalize(Value::Time(t)) {
            ArrayData::Float(a) => {
                assert_eq!(a.ndim(), 0);
                assert_eq!(a.iter().next().copied(), Some(days_since_epoch(&t)));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn day_counts_are_ordered_and_scaled() {
        let a = days_since_epoch(&at(2020, 6, 1, 0));
        let b = days_since_epoch(&at(2020, 6, 2, 0));
        assert!((b - a - 1.0).abs() < 1e-2);
        // Local offsets are at most 14 hours from UTC.
        let epoch = days_since_epoch(&at(1970, 1, 1, 0));
        assert!(epoch.abs() <= 14.0 / 24.0 + 1e-6);
    }
}
