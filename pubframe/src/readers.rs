use std::{
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

use arrow::{
    array::{Array, AsArray},
    compute::{cast, concat_batches},
    datatypes::{DataType, Float64Type, Int64Type},
};
use csv::ReaderBuilder;
use flate2::read::GzDecoder;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use crate::{Column, Frame, FrameError};

const PARQUET_EXT: &str = ".parquet";
const CSV_GZ_EXT: &str = ".csv.gz";
const CSV_EXT: &str = ".csv";

pub fn read_frame(path: &Path) -> Result<Frame, FrameError> {
    let name = path.to_string_lossy();
    if name.ends_with(PARQUET_EXT) {
        read_parquet(path)
    } else if name.ends_with(CSV_GZ_EXT) {
        read_csv(GzDecoder::new(File::open(path)?))
    } else if name.ends_with(CSV_EXT) {
        read_csv(File::open(path)?)
    } else {
        Err(FrameError::UnsupportedFormat(name.to_string()))
    }
}

pub fn read_parquet(path: &Path) -> Result<Frame, FrameError> {
    let file = File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let schema = builder.schema().clone();
    let batches = builder.build()?.collect::<Result<Vec<_>, _>>()?;
    let batch = concat_batches(&schema, &batches)?;

    let mut pairs = Vec::new();
    for (field, array) in schema.fields().iter().zip(batch.columns()) {
        pairs.push((
            field.name().to_string(),
            column_from_array(field.name(), array.as_ref())?,
        ));
    }
    Frame::new(pairs)
}

fn column_from_array(name: &str, array: &dyn Array) -> Result<Column, FrameError> {
    match array.data_type() {
        DataType::Boolean => Ok(Column::Boolean(array.as_boolean().iter().collect())),
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32 => {
            let wide = cast(array, &DataType::Int64)?;
            Ok(Column::Int64(
                wide.as_primitive::<Int64Type>().iter().collect(),
            ))
        }
        DataType::Float16 | DataType::Float32 | DataType::Float64 => {
            let wide = cast(array, &DataType::Float64)?;
            Ok(Column::Float64(
                wide.as_primitive::<Float64Type>().iter().collect(),
            ))
        }
        DataType::Utf8 | DataType::LargeUtf8 => text_column(array),
        DataType::Dictionary(_, values)
            if matches!(values.as_ref(), DataType::Utf8 | DataType::LargeUtf8) =>
        {
            text_column(array)
        }
        other => Err(FrameError::UnsupportedType {
            name: name.to_string(),
            data_type: other.to_string(),
        }),
    }
}

fn text_column(array: &dyn Array) -> Result<Column, FrameError> {
    let text = cast(array, &DataType::Utf8)?;
    Ok(Column::Text(
        text.as_string::<i32>()
            .iter()
            .map(|v| v.map(str::to_owned))
            .collect(),
    ))
}

//untyped exports: every column is inferred from its non-empty fields
pub fn read_csv<R: Read>(reader: R) -> Result<Frame, FrameError> {
    let mut reader = ReaderBuilder::new().from_reader(BufReader::new(reader));
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_owned).collect();
    let mut raw: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
    for record in reader.records() {
        let record = record?;
        for (field, values) in record.iter().zip(raw.iter_mut()) {
            values.push(if field.is_empty() {
                None
            } else {
                Some(field.to_string())
            });
        }
    }
    Frame::new(
        headers
            .into_iter()
            .zip(raw.into_iter().map(infer_column))
            .collect(),
    )
}

fn infer_column(values: Vec<Option<String>>) -> Column {
    if values.iter().all(Option::is_none) {
        return Column::Text(values);
    }
    if let Some(v) = parse_all(&values, parse_bool) {
        return Column::Boolean(v);
    }
    if let Some(v) = parse_all(&values, |s| s.parse::<i64>().ok()) {
        return Column::Int64(v);
    }
    if let Some(v) = parse_all(&values, |s| s.parse::<f64>().ok()) {
        return Column::Float64(v);
    }
    Column::Text(values)
}

fn parse_all<T, F>(values: &[Option<String>], f: F) -> Option<Vec<Option<T>>>
where
    F: Fn(&str) -> Option<T>,
{
    values
        .iter()
        .map(|v| match v {
            Some(s) => f(s.trim()).map(Some),
            None => Some(None),
        })
        .collect()
}

fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "true" | "True" | "TRUE" => Some(true),
        "false" | "False" | "FALSE" => Some(false),
        _ => None,
    }
}
