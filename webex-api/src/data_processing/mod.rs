use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Failure to read an input file or write a report.
#[derive(Debug, thiserror::Error)]
pub enum FileError {
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("column `{column}` not found in CSV header (available: {})", .available.join(", "))]
    MissingColumn {
        column: String,
        available: Vec<String>,
    },

    #[error("rows must serialize to objects to be written as CSV")]
    NotARecord,

    #[error("invalid or missing filename extension in {0:?}")]
    UnsupportedExtension(PathBuf),
}

fn normalize_header(name: &str) -> String {
    name.trim_start_matches('\u{feff}').trim().to_lowercase()
}

/// Reads one column of a CSV file with a header row, one value per data row, in file order.
/// Header names are compared case-insensitively and ignoring surrounding whitespace.
/// Rows too short to contain the column yield an empty value.
pub fn read_csv_column(path: impl AsRef<Path>, column: &str) -> Result<Vec<String>, FileError> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|source| FileError::Io {
        path: path.to_owned(),
        source,
    })?;
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(file);

    let headers = reader.headers()?.clone();
    let wanted = normalize_header(column);
    let index = headers
        .iter()
        .position(|name| normalize_header(name) == wanted)
        .ok_or_else(|| FileError::MissingColumn {
            column: column.to_owned(),
            available: headers.iter().map(|name| name.trim().to_owned()).collect(),
        })?;

    reader
        .records()
        .map(|record| -> Result<String, FileError> {
            Ok(record?.get(index).unwrap_or_default().trim().to_owned())
        })
        .collect()
}

pub fn read_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, FileError> {
    let path = path.as_ref();
    let json_str = std::fs::read_to_string(path).map_err(|source| FileError::Io {
        path: path.to_owned(),
        source,
    })?;
    Ok(serde_json::from_str(&json_str)?)
}

fn write_to_json<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<(), FileError> {
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json).map_err(|source| FileError::Io {
        path: path.to_owned(),
        source,
    })
}

/// Converts serializable rows into JSON objects, keeping field order.
pub fn records_from<T: Serialize>(values: &[T]) -> Result<Vec<Map<String, Value>>, FileError> {
    values
        .iter()
        .map(|value| match serde_json::to_value(value)? {
            Value::Object(record) => Ok(record),
            _ => Err(FileError::NotARecord),
        })
        .collect()
}

fn csv_cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Writes JSON objects as CSV. The header is the union of all keys in first-seen order,
/// so rows with heterogeneous fields line up; missing cells are left empty.
pub fn write_records_csv<W: Write>(
    records: &[Map<String, Value>],
    sink: W,
) -> Result<(), FileError> {
    let mut header: Vec<&str> = vec![];
    for record in records {
        for key in record.keys() {
            if !header.contains(&key.as_str()) {
                header.push(key.as_str());
            }
        }
    }

    let mut writer = csv::Writer::from_writer(sink);
    writer.write_record(&header)?;
    for record in records {
        writer.write_record(header.iter().map(|key| csv_cell(record.get(*key))))?;
    }
    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

fn write_to_csv<T: Serialize>(values: &[T], path: &Path) -> Result<(), FileError> {
    let records = records_from(values)?;
    let file = std::fs::File::create(path).map_err(|source| FileError::Io {
        path: path.to_owned(),
        source,
    })?;
    write_records_csv(&records, file)
}

/// Writes `values` to `path` as JSON or CSV, depending on the file extension.
pub fn write_slice_to_file<T: Serialize>(values: &[T], path: impl AsRef<Path>) -> Result<(), FileError> {
    let path = path.as_ref();
    match path.extension().and_then(|s| s.to_str()) {
        Some("json") => write_to_json(values, path)?,
        Some("csv") => write_to_csv(values, path)?,
        _ => return Err(FileError::UnsupportedExtension(path.to_owned())),
    };
    tracing::info!("Successfully wrote {} rows to {:?}", values.len(), path);
    Ok(())
}
