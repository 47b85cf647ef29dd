//! Cleaned-table sink: destination naming and CSV output.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::data::filter::TargetPair;
use crate::data::model::Dataset;
use crate::error::{FilterError, Result};

/// Render a factor the way it appears in output names: always with a
/// fractional part (`1.0`, `0.5`, `2.25`). Very small or large factors use
/// a signed two-digit exponent (`1e-05`, `1e+16`).
pub fn factor_label(factor: f64) -> String {
    let repr = format!("{factor:?}");
    match repr.split_once('e') {
        Some((mantissa, exp)) => match exp.parse::<i32>() {
            Ok(exp) => {
                let sign = if exp < 0 { '-' } else { '+' };
                format!("{mantissa}e{sign}{:02}", exp.unsigned_abs())
            }
            Err(_) => repr,
        },
        None => repr,
    }
}

fn input_stem(input: &Path) -> String {
    input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "data".to_string())
}

/// `<stem>_<factor>_cleaned.csv`
pub fn mean_threshold_file_name(input: &Path, factor: f64) -> String {
    format!("{}_{}_cleaned.csv", input_stem(input), factor_label(factor))
}

/// `<stem>_<targets>_<factor>_overlap_cleaned.csv`, with the targets as
/// the operator typed them.
pub fn overlap_file_name(input: &Path, pair: &TargetPair, threshold: f64) -> String {
    format!(
        "{}_{}_{}_overlap_cleaned.csv",
        input_stem(input),
        pair.raw(),
        factor_label(threshold)
    )
}

/// Write `dataset` as CSV at `destination`, header first, columns in
/// dataset order.
///
/// The table is written to a temporary file next to `destination` and moved
/// into place only once complete, so a failure leaves no partial file.
pub fn export_cleaned(dataset: &Dataset, destination: &Path) -> Result<()> {
    write_atomic(dataset, destination).map_err(|source| FilterError::Write {
        path: destination.to_path_buf(),
        source,
    })?;
    log::info!(
        "Wrote {} rows to {}",
        dataset.len(),
        destination.display()
    );
    Ok(())
}

fn write_atomic(dataset: &Dataset, destination: &Path) -> io::Result<()> {
    let dir = match destination.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let mut tmp = NamedTempFile::new_in(&dir)?;
    {
        let mut writer = csv::Writer::from_writer(tmp.as_file_mut());
        writer.write_record(&dataset.columns)?;
        for record in &dataset.records {
            writer.write_record(record.cells.iter().map(|c| c.to_field()))?;
        }
        writer.flush()?;
    }
    tmp.as_file_mut().flush()?;
    tmp.persist(destination).map_err(|e| e.error)?;
    Ok(())
}
