//memory narrowing, one column at a time
//text -> categorical, f64 -> i32 / f32, i64 -> i32
//logical values stay the same, except for missing floats under the sentinel policy:
//a filled-in missing value cannot be told apart from a real 999999 afterwards

use tracing::{debug, warn};

use crate::{Column, Frame};

pub const CATEGORY_RATIO: f64 = 0.5;
pub const MISSING_SENTINEL: f64 = 999999.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MissingPolicy {
    Sentinel(f64),
    KeepNull,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptimizeOptions {
    pub missing: MissingPolicy,
}

impl Default for OptimizeOptions {
    fn default() -> Self {
        Self {
            missing: MissingPolicy::Sentinel(MISSING_SENTINEL),
        }
    }
}

pub fn optimize(column: Column, options: &OptimizeOptions) -> Column {
    match column {
        Column::Text(values) => categorize(values),
        Column::Float64(values) => narrow_float(values, options.missing),
        Column::Int64(values) => narrow_int(values),
        other => other,
    }
}

pub fn optimize_frame(frame: Frame, options: &OptimizeOptions) -> Frame {
    let before = frame.estimated_bytes();
    let out = frame.map_columns(|name, column| {
        let from = column.kind();
        let narrowed = optimize(column, options);
        if narrowed.kind() != from {
            debug!("column {}: {:?} -> {:?}", name, from, narrowed.kind());
        }
        narrowed
    });
    debug!(
        "optimized frame from ~{} to ~{} bytes",
        before,
        out.estimated_bytes()
    );
    out
}

fn categorize(values: Vec<Option<String>>) -> Column {
    if values.is_empty() {
        return Column::Text(values);
    }
    let plain = Column::Text(values);
    let ratio = plain.distinct_count() as f64 / plain.len() as f64;
    match plain {
        Column::Text(values) if ratio < CATEGORY_RATIO => Column::categorical_from(values),
        other => other,
    }
}

fn narrow_float(values: Vec<Option<f64>>, missing: MissingPolicy) -> Column {
    let mut filled = 0;
    let values: Vec<Option<f64>> = values
        .into_iter()
        .map(|v| {
            let present = v.filter(|x| !x.is_nan());
            match (present, missing) {
                (None, MissingPolicy::Sentinel(s)) => {
                    filled += 1;
                    Some(s)
                }
                _ => present,
            }
        })
        .collect();
    if filled > 0 {
        warn!(
            "replaced {} missing float values with a sentinel, they are no longer distinguishable from real values",
            filled
        );
    }

    let integral = values.iter().flatten().all(|x| {
        x.fract() == 0.0 && *x >= f64::from(i32::MIN) && *x <= f64::from(i32::MAX)
    });
    if integral {
        Column::Int32(values.into_iter().map(|v| v.map(|x| x as i32)).collect())
    } else {
        Column::Float32(values.into_iter().map(|v| v.map(|x| x as f32)).collect())
    }
}

fn narrow_int(values: Vec<Option<i64>>) -> Column {
    let narrowed: Option<Vec<Option<i32>>> = values
        .iter()
        .map(|v| match v {
            Some(x) => i32::try_from(*x).ok().map(Some),
            None => Some(None),
        })
        .collect();
    match narrowed {
        Some(v) => Column::Int32(v),
        None => Column::Int64(values),
    }
}
