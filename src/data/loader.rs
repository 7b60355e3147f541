use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{
    DataType, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type, Int8Type, UInt16Type,
    UInt32Type, UInt8Type,
};
use arrow::util::display::array_value_to_string;
use csv::StringRecord;
use log::debug;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::model::{CellValue, Column, ColumnType, Table};
use crate::error::{Error, IoContext, Result};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Read the named columns from a tabular file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row first, cell types inferred per cell
/// * `.parquet` – scalar columns, typed by the Arrow schema
pub fn read_table(path: &Path, headers: &[&str]) -> Result<Table> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "parquet" | "pq" => read_parquet_columns(path, headers),
        "csv" => {
            let types = vec![ColumnType::Infer; headers.len()];
            read_csv_columns_by_headers(path, headers, &types, 0)
        }
        other => Err(Error::UnsupportedFormat(other.to_string())),
    }
}

fn require_document(path: &Path) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(Error::DocumentNotFound {
            path: path.to_path_buf(),
        })
    }
}

fn check_shape(what: &str, expected: usize, got: usize) -> Result<()> {
    if expected == got {
        Ok(())
    } else {
        Err(Error::ShapeMismatch(format!(
            "{got} {what} given for {expected} column(s)"
        )))
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Open a CSV file as raw records, dropping the first `skip` rows.
///
/// Leading rows often hold free-form metadata with a different field count,
/// so the reader is flexible about record length.
fn csv_records(path: &Path, skip: usize) -> Result<impl Iterator<Item = csv::Result<StringRecord>>> {
    require_document(path)?;
    let reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;
    Ok(reader.into_records().skip(skip))
}

/// Fill `columns` from `records`, taking cell `indices[i]` into column `i`.
///
/// `first_line` is the 1-based file line of the first record, used when the
/// reader did not record a position.
fn collect_columns<I>(
    records: I,
    indices: &[usize],
    types: &[ColumnType],
    mut columns: Vec<Column>,
    first_line: usize,
) -> Result<Table>
where
    I: Iterator<Item = csv::Result<StringRecord>>,
{
    for (row_no, result) in records.enumerate() {
        let record = result?;
        let line = record
            .position()
            .map_or(first_line + row_no, |pos| pos.line() as usize);
        for ((column, &idx), &ty) in columns.iter_mut().zip(indices).zip(types) {
            let raw = record.get(idx).unwrap_or("");
            let value = ty.parse(raw).ok_or_else(|| Error::CellConversion {
                line,
                column: column.name.clone(),
                value: raw.to_string(),
                target: ty.name(),
            })?;
            column.values.push(value);
        }
    }
    Table::from_columns(columns)
}

/// Read selected columns of a CSV file by header name.
///
/// The first `skip` rows are discarded and the next row is taken as the
/// header. Columns come back in the order of `headers`, each converted with
/// the matching entry of `types`.
pub fn read_csv_columns_by_headers(
    path: &Path,
    headers: &[&str],
    types: &[ColumnType],
    skip: usize,
) -> Result<Table> {
    check_shape("types", headers.len(), types.len())?;
    let mut records = csv_records(path, skip)?;

    let header_row = match records.next() {
        Some(row) => row?,
        None => StringRecord::new(),
    };
    let indices = headers
        .iter()
        .map(|&name| {
            header_row
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| Error::ColumnNotFound {
                    column: name.to_string(),
                    path: path.to_path_buf(),
                })
        })
        .collect::<Result<Vec<_>>>()?;

    debug!("{}: header row maps {:?} to {:?}", path.display(), headers, indices);
    let columns = headers.iter().map(|&name| Column::new(name)).collect();
    collect_columns(records, &indices, types, columns, skip + 2)
}

/// Read selected columns of a headerless CSV file by position.
///
/// `names[i]` labels the column taken from position `indices[i]`. An index
/// beyond the widest data row is reported as a missing column.
pub fn read_csv_columns_by_index(
    path: &Path,
    indices: &[usize],
    types: &[ColumnType],
    names: &[&str],
    skip: usize,
) -> Result<Table> {
    check_shape("types", indices.len(), types.len())?;
    check_shape("names", indices.len(), names.len())?;

    let records: Vec<StringRecord> = csv_records(path, skip)?.collect::<csv::Result<_>>()?;
    let width = records.iter().map(|r| r.len()).max().unwrap_or(0);
    if let Some(&idx) = indices.iter().find(|&&idx| idx >= width) {
        return Err(Error::ColumnNotFound {
            column: idx.to_string(),
            path: path.to_path_buf(),
        });
    }

    let columns = names.iter().map(|&name| Column::new(name)).collect();
    collect_columns(records.into_iter().map(Ok), indices, types, columns, skip + 1)
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Read the named columns from a Parquet file.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`). Headers are checked against the file
/// schema, so a missing column is reported even when the file has no rows.
pub fn read_parquet_columns(path: &Path, headers: &[&str]) -> Result<Table> {
    require_document(path)?;
    let file = std::fs::File::open(path).with_path(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;

    let indices = headers
        .iter()
        .map(|&name| {
            builder
                .schema()
                .index_of(name)
                .map_err(|_| Error::ColumnNotFound {
                    column: name.to_string(),
                    path: path.to_path_buf(),
                })
        })
        .collect::<Result<Vec<_>>>()?;
    debug!("{}: schema maps {:?} to {:?}", path.display(), headers, indices);

    let reader = builder.build()?;
    let mut columns: Vec<Column> = headers.iter().map(|&name| Column::new(name)).collect();

    for batch_result in reader {
        let batch = batch_result?;
        for (column, &idx) in columns.iter_mut().zip(&indices) {
            let array = batch.column(idx);
            for row in 0..batch.num_rows() {
                column.values.push(extract_cell(array, row)?);
            }
        }
    }

    Table::from_columns(columns)
}

// -- Arrow helpers --

/// Extract a single cell from an Arrow column at a given row.
///
/// Numeric, string and boolean columns keep their type. Anything else
/// (dates, timestamps, decimals, ...) becomes its Arrow display text.
fn extract_cell(col: &ArrayRef, row: usize) -> Result<CellValue> {
    if col.is_null(row) {
        return Ok(CellValue::Null);
    }
    let cell = match col.data_type() {
        DataType::Utf8 => CellValue::Text(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => CellValue::Text(col.as_string::<i64>().value(row).to_string()),
        DataType::Int8 => CellValue::Integer(col.as_primitive::<Int8Type>().value(row) as i64),
        DataType::Int16 => CellValue::Integer(col.as_primitive::<Int16Type>().value(row) as i64),
        DataType::Int32 => CellValue::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => CellValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::UInt8 => CellValue::Integer(col.as_primitive::<UInt8Type>().value(row) as i64),
        DataType::UInt16 => CellValue::Integer(col.as_primitive::<UInt16Type>().value(row) as i64),
        DataType::UInt32 => CellValue::Integer(col.as_primitive::<UInt32Type>().value(row) as i64),
        DataType::Float32 => CellValue::Float(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => CellValue::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => CellValue::Bool(col.as_boolean().value(row)),
        _ => CellValue::Text(array_value_to_string(col, row)?),
    };
    Ok(cell)
}
