//! File export backend for the `write` check.
//!
//! The format is inferred from the destination suffix unless given
//! explicitly. Data is first written to a temporary file next to the
//! destination and then moved into place, so a failed write never leaves a
//! half-written file under the requested name.

use crate::error::{CheckError, Result, ResultExt as _};
use polars::prelude::*;
use rust_xlsxwriter::Workbook;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Tsv,
    Parquet,
    Json,
    NdJson,
    Xlsx,
}

impl ExportFormat {
    pub const ALL: [Self; 6] = [
        Self::Csv,
        Self::Tsv,
        Self::Parquet,
        Self::Json,
        Self::NdJson,
        Self::Xlsx,
    ];

    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Tsv => "tsv",
            Self::Parquet => "parquet",
            Self::Json => "json",
            Self::NdJson => "ndjson",
            Self::Xlsx => "xlsx",
        }
    }

    /// Infers the format from the path's suffix.
    ///
    /// # Errors
    ///
    /// Returns [`CheckError::Export`] when the suffix is missing or unsupported.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_lowercase();

        ext.parse().map_err(|_| {
            CheckError::Export(format!(
                "Can't write data to file. Unknown file extension in: {}",
                path.display()
            ))
        })
    }
}

impl FromStr for ExportFormat {
    type Err = CheckError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "tsv" | "tab" => Ok(Self::Tsv),
            "parquet" | "pq" => Ok(Self::Parquet),
            "json" => Ok(Self::Json),
            "ndjson" | "jsonl" => Ok(Self::NdJson),
            "xlsx" | "xls" => Ok(Self::Xlsx),
            other => Err(CheckError::Export(format!(
                "Unsupported export format '{other}'. Supported: {}",
                Self::ALL
                    .iter()
                    .map(|f| f.extension())
                    .collect::<Vec<_>>()
                    .join(", ")
            ))),
        }
    }
}

/// Lowercase, underscore separated file stem derived from a check label.
pub fn slugify(label: &str) -> String {
    let mut slug = String::with_capacity(label.len());
    for c in label.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('_') {
            slug.push('_');
        }
    }
    let slug = slug.trim_matches('_');
    if slug.is_empty() {
        "check".to_owned()
    } else {
        slug.to_owned()
    }
}

/// Decides the file a `write` check produces.
///
/// An existing directory gets a file named after `label`; that needs an
/// explicit format since there is no suffix to infer it from.
///
/// # Errors
///
/// Returns [`CheckError::Export`] for an unsupported suffix or a directory
/// target without a format.
pub fn resolve_target(
    path: &Path,
    label: &str,
    format: Option<ExportFormat>,
) -> Result<(PathBuf, ExportFormat)> {
    if path.is_dir() {
        let format = format.ok_or_else(|| {
            CheckError::Export(format!(
                "{} is a directory; an explicit export format is required",
                path.display()
            ))
        })?;
        let file = path.join(format!("{}.{}", slugify(label), format.extension()));
        return Ok((file, format));
    }

    match format {
        Some(format) => Ok((path.to_path_buf(), format)),
        None => Ok((path.to_path_buf(), ExportFormat::from_path(path)?)),
    }
}

// Worksheet limits of the Office Open XML format.
const MAX_SHEET_ROWS: usize = 1_048_576;
const MAX_SHEET_COLUMNS: usize = 16_384;

/// Writes one worksheet: a header row with the column names, then the values.
/// Numbers and booleans keep their cell type, everything else is written as
/// text and nulls stay empty.
fn write_xlsx(frame: &DataFrame, path: &Path) -> Result<()> {
    if frame.height() >= MAX_SHEET_ROWS || frame.width() > MAX_SHEET_COLUMNS {
        return Err(CheckError::Export(format!(
            "{} rows × {} columns does not fit in a worksheet",
            frame.height(),
            frame.width()
        )));
    }

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("data")?;

    for (idx, col) in frame.get_columns().iter().enumerate() {
        let c = u16::try_from(idx).map_err(|_| CheckError::Export("Too many columns".to_owned()))?;
        sheet.write_string(0, c, col.name().as_str())?;

        let series = col.as_materialized_series();
        let mut row: u32 = 1;
        if series.dtype().is_primitive_numeric() {
            for value in series.cast(&DataType::Float64)?.f64()? {
                if let Some(v) = value {
                    sheet.write_number(row, c, v)?;
                }
                row += 1;
            }
        } else if series.dtype() == &DataType::Boolean {
            for value in series.bool()? {
                if let Some(v) = value {
                    sheet.write_boolean(row, c, v)?;
                }
                row += 1;
            }
        } else {
            for value in series.cast(&DataType::String)?.str()? {
                if let Some(v) = value {
                    sheet.write_string(row, c, v)?;
                }
                row += 1;
            }
        }
    }

    workbook.save(path)?;
    Ok(())
}

fn write_to(frame: &DataFrame, path: &Path, format: ExportFormat) -> Result<()> {
    let mut df = frame.clone();
    let create = || {
        std::fs::File::create(path).with_context(|| format!("Failed to create {}", path.display()))
    };

    match format {
        ExportFormat::Csv => CsvWriter::new(create()?)
            .include_header(true)
            .finish(&mut df)?,
        ExportFormat::Tsv => CsvWriter::new(create()?)
            .include_header(true)
            .with_separator(b'\t')
            .finish(&mut df)?,
        ExportFormat::Parquet => {
            ParquetWriter::new(create()?).finish(&mut df)?;
        }
        ExportFormat::Json => JsonWriter::new(create()?)
            .with_json_format(JsonFormat::Json)
            .finish(&mut df)?,
        ExportFormat::NdJson => JsonWriter::new(create()?)
            .with_json_format(JsonFormat::JsonLines)
            .finish(&mut df)?,
        ExportFormat::Xlsx => write_xlsx(frame, path)?,
    }
    Ok(())
}

/// Writes `frame` to `path` in `format`.
///
/// # Errors
///
/// I/O failures creating or moving the file, and polars writer errors.
pub fn write_frame(frame: &DataFrame, path: &Path, format: ExportFormat) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&parent)
        .with_context(|| format!("Failed to create directory {}", parent.display()))?;

    let temp_path = parent.join(format!(
        ".framecheck_{}.{}",
        Uuid::new_v4(),
        format.extension()
    ));

    if let Err(e) = write_to(frame, &temp_path, format) {
        let _ = std::fs::remove_file(&temp_path);
        return Err(e);
    }

    // Move temp file to final destination
    if let Err(e) = std::fs::rename(&temp_path, path) {
        std::fs::copy(&temp_path, path)
            .with_context(|| format!("Failed to move file (Rename error: {e})"))?;
        let _ = std::fs::remove_file(&temp_path);
    }

    tracing::info!(
        "Wrote {} rows × {} columns to {}",
        frame.height(),
        frame.width(),
        path.display()
    );
    Ok(())
}
