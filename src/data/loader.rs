use std::path::Path;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{
    DataType, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type, Int8Type, UInt16Type,
    UInt32Type, UInt64Type, UInt8Type,
};
use arrow::util::display::{ArrayFormatter, FormatOptions};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{Cell, Dataset, Record};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a survey dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with column names, one respondent per line
/// * `.json`    – `[{ "a": 1, "b": 4, ... }, ...]`
/// * `.parquet` – flat columns of integers / floats / strings / bools
pub fn load_file(path: &Path) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
    .with_context(|| format!("loading {}", path.display()))?;

    log::info!(
        "Loaded {} rows x {} columns from {}",
        dataset.len(),
        dataset.columns.len(),
        path.display()
    );
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, every following line is a row.
/// Headers are kept verbatim so the cleaned table writes them back unchanged.
/// Cell types are guessed per field (integer, float, bool, text, empty).
fn load_csv(path: &Path) -> Result<Dataset> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let columns: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut records = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {}", row_no + 1))?;
        let cells = record.iter().map(guess_cell_type).collect();
        records.push(Record { cells });
    }

    Ok(Dataset::new(columns, records))
}

fn guess_cell_type(s: &str) -> Cell {
    let s = s.trim();
    if s.is_empty() {
        return Cell::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return Cell::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return Cell::Float(f);
    }
    if s == "true" || s == "false" {
        return Cell::Bool(s == "true");
    }
    Cell::Text(s.to_string())
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "id": "r1", "a": 1, "b": 1, "c": 7 },
///   { "id": "r2", "a": 3, "b": 4, "c": 5 }
/// ]
/// ```
///
/// The column order is the key order of the first record. Later records may
/// omit a column (read as null) but may not introduce new ones.
fn load_json(path: &Path) -> Result<Dataset> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let rows = root.as_array().context("Expected top-level JSON array")?;

    let mut columns: Vec<String> = Vec::new();
    let mut records = Vec::with_capacity(rows.len());

    for (i, rec) in rows.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {} is not a JSON object", i + 1))?;

        if i == 0 {
            columns = obj.keys().cloned().collect();
        } else if let Some(extra) = obj.keys().find(|k| !columns.contains(k)) {
            bail!("Row {}: unexpected column '{extra}'", i + 1);
        }

        let cells = columns
            .iter()
            .map(|col| obj.get(col).map(json_to_cell).unwrap_or(Cell::Null))
            .collect();
        records.push(Record { cells });
    }

    Ok(Dataset::new(columns, records))
}

fn json_to_cell(val: &JsonValue) -> Cell {
    match val {
        JsonValue::String(s) => Cell::Text(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Cell::Integer(i)
            } else if let Some(f) = n.as_f64() {
                Cell::Float(f)
            } else {
                Cell::Text(n.to_string())
            }
        }
        JsonValue::Bool(b) => Cell::Bool(*b),
        JsonValue::Null => Cell::Null,
        other => Cell::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file of survey responses.
///
/// Every column becomes a dataset column; signed and unsigned integer
/// columns of any width map to [`Cell::Integer`]. Columns of other types
/// (timestamps, dates, dictionaries, ...) are carried as their rendered
/// text. Works with files written by both **Pandas** (`df.to_parquet()`)
/// and **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<Dataset> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let options = FormatOptions::default();
    let mut records = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let formatters = batch
            .columns()
            .iter()
            .zip(&columns)
            .map(|(col, name)| {
                ArrayFormatter::try_new(col.as_ref(), &options)
                    .with_context(|| format!("column '{name}' has unsupported type {}", col.data_type()))
            })
            .collect::<Result<Vec<_>>>()?;

        for row in 0..batch.num_rows() {
            let cells = batch
                .columns()
                .iter()
                .zip(&formatters)
                .map(|(col, fmt)| extract_cell(col, fmt, row))
                .collect();
            records.push(Record { cells });
        }
    }

    Ok(Dataset::new(columns, records))
}

// -- Parquet / Arrow helpers --

/// Extract a single cell from an Arrow column at a given row. Types without
/// a native [`Cell`] variant fall back to `fmt`'s rendering of the value.
fn extract_cell(col: &ArrayRef, fmt: &ArrayFormatter<'_>, row: usize) -> Cell {
    if col.is_null(row) {
        return Cell::Null;
    }
    let cell = match col.data_type() {
        DataType::Int8 => col
            .as_primitive_opt::<Int8Type>()
            .map(|a| Cell::Integer(a.value(row) as i64)),
        DataType::Int16 => col
            .as_primitive_opt::<Int16Type>()
            .map(|a| Cell::Integer(a.value(row) as i64)),
        DataType::Int32 => col
            .as_primitive_opt::<Int32Type>()
            .map(|a| Cell::Integer(a.value(row) as i64)),
        DataType::Int64 => col
            .as_primitive_opt::<Int64Type>()
            .map(|a| Cell::Integer(a.value(row))),
        DataType::UInt8 => col
            .as_primitive_opt::<UInt8Type>()
            .map(|a| Cell::Integer(a.value(row) as i64)),
        DataType::UInt16 => col
            .as_primitive_opt::<UInt16Type>()
            .map(|a| Cell::Integer(a.value(row) as i64)),
        DataType::UInt32 => col
            .as_primitive_opt::<UInt32Type>()
            .map(|a| Cell::Integer(a.value(row) as i64)),
        DataType::UInt64 => col.as_primitive_opt::<UInt64Type>().map(|a| {
            let v = a.value(row);
            i64::try_from(v)
                .map(Cell::Integer)
                .unwrap_or_else(|_| Cell::Text(v.to_string()))
        }),
        DataType::Float32 => col
            .as_primitive_opt::<Float32Type>()
            .map(|a| Cell::Float(a.value(row) as f64)),
        DataType::Float64 => col
            .as_primitive_opt::<Float64Type>()
            .map(|a| Cell::Float(a.value(row))),
        DataType::Boolean => col.as_boolean_opt().map(|a| Cell::Bool(a.value(row))),
        DataType::Utf8 => col
            .as_string_opt::<i32>()
            .map(|a| Cell::Text(a.value(row).to_string())),
        DataType::LargeUtf8 => col
            .as_string_opt::<i64>()
            .map(|a| Cell::Text(a.value(row).to_string())),
        _ => None,
    };
    cell.unwrap_or_else(|| Cell::Text(fmt.value(row).to_string()))
}
