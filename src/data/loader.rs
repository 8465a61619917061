use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use super::model::Dataset;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`  – header row with column names, one record per row
/// * `.json` – `{ "columns": [...], "rows": [[...], ...] }`
///
/// Rows whose cell count differs from the header are rejected here so the
/// playback engine only ever sees rectangular data.
pub fn load_file(path: &Path) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("opening CSV {}", path.display()))?;
            load_csv_reader(file)
        }
        "json" => {
            let text = std::fs::read_to_string(path).context("reading JSON file")?;
            load_json_str(&text)
        }
        other => bail!("Unsupported file extension: .{other}"),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, then data rows.
/// Cells are kept as raw text; typing happens when the engine pulls a row.
pub fn load_csv_reader<R: Read>(source: R) -> Result<Dataset> {
    let mut reader = csv::Reader::from_reader(source);
    let columns: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    if columns.is_empty() {
        bail!("CSV has no header row");
    }

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        // The csv reader is not `flexible`, so ragged rows surface here.
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        rows.push(record.iter().map(|cell| cell.to_string()).collect());
    }

    Ok(Dataset::new(columns, rows)?)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct JsonTable {
    columns: Vec<String>,
    #[serde(default)]
    rows: Vec<Vec<JsonCell>>,
}

/// JSON rows may hold numbers or strings; both are kept as raw text.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonCell {
    Number(serde_json::Number),
    Text(String),
    Null(()),
}

impl JsonCell {
    fn into_raw(self) -> String {
        match self {
            JsonCell::Number(n) => n.to_string(),
            JsonCell::Text(s) => s,
            JsonCell::Null(()) => String::new(),
        }
    }
}

/// Expected JSON schema:
///
/// ```json
/// {
///   "columns": ["x", "label"],
///   "rows": [[0, "start"], ["10", "end"]]
/// }
/// ```
pub fn load_json_str(text: &str) -> Result<Dataset> {
    let table: JsonTable = serde_json::from_str(text).context("parsing JSON table")?;
    let rows = table
        .rows
        .into_iter()
        .map(|row| row.into_iter().map(JsonCell::into_raw).collect())
        .collect();
    Ok(Dataset::new(table.columns, rows)?)
}
