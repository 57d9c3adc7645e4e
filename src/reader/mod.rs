//! Spreadsheet reader with encoding and delimiter auto-detection.
//!
//! Converts delimited tabular files into an in-memory matrix of typed cells.
//! No pharmacology-specific logic here.

use std::path::Path;

use crate::error::{ReaderError, ReaderResult};

/// A single typed spreadsheet cell.
///
/// Numeric-looking and boolean-looking tokens are coerced to their typed
/// form during parsing; blank cells become [`Cell::Empty`].
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Bool(bool),
    Empty,
}

impl Cell {
    /// Parse a raw token into a typed cell.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Cell::Empty;
        }
        if trimmed.eq_ignore_ascii_case("true") {
            return Cell::Bool(true);
        }
        if trimmed.eq_ignore_ascii_case("false") {
            return Cell::Bool(false);
        }
        if let Ok(n) = trimmed.parse::<f64>() {
            return Cell::Number(n);
        }
        Cell::Text(trimmed.to_string())
    }

    /// Whether this cell carries no value.
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// The cell's textual content, used for name lookups.
    ///
    /// Numbers render without a trailing `.0` when integral so that cell
    /// text is stable regardless of numeric coercion.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Cell::Text(s) => Some(s.clone()),
            Cell::Number(n) if n.fract() == 0.0 => Some(format!("{}", *n as i64)),
            Cell::Number(n) => Some(n.to_string()),
            Cell::Bool(b) => Some(b.to_string()),
            Cell::Empty => None,
        }
    }

    /// JSON rendition of the cell value (blank becomes `null`).
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Cell::Text(s) => serde_json::Value::String(s.clone()),
            Cell::Number(n) => serde_json::json!(n),
            Cell::Bool(b) => serde_json::Value::Bool(*b),
            Cell::Empty => serde_json::Value::Null,
        }
    }
}

/// Row-major matrix of typed cells; row 0 is the header.
pub type Matrix = Vec<Vec<Cell>>;

/// Result of reading a spreadsheet, with detection metadata.
#[derive(Debug, Clone)]
pub struct ReadResult {
    /// All rows, header included, in original order.
    pub matrix: Matrix,
    /// Detected or used encoding.
    pub encoding: String,
    /// Detected or used delimiter.
    pub delimiter: char,
}

impl ReadResult {
    /// Header row as plain strings (empty cells become empty strings).
    pub fn header(&self) -> Vec<String> {
        self.matrix
            .first()
            .map(|row| {
                row.iter()
                    .map(|c| c.as_text().unwrap_or_default())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Data rows (everything after the header).
    pub fn rows(&self) -> &[Vec<Cell>] {
        if self.matrix.is_empty() {
            &[]
        } else {
            &self.matrix[1..]
        }
    }
}

/// Detect the encoding of raw bytes using chardet.
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding.
pub fn decode_content(bytes: &[u8], encoding: &str) -> ReaderResult<String> {
    match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => Ok(String::from_utf8(bytes.to_vec())
            .unwrap_or_else(|_| String::from_utf8_lossy(bytes).to_string())),
        "iso-8859-1" | "latin-1" | "latin1" => {
            Ok(encoding_rs::ISO_8859_15.decode(bytes).0.to_string())
        }
        "windows-1252" | "cp1252" => Ok(encoding_rs::WINDOWS_1252.decode(bytes).0.to_string()),
        other => {
            // Fallback: lossy UTF-8 keeps the import running on odd charsets
            log::debug!("unknown charset '{}', decoding as lossy utf-8", other);
            Ok(String::from_utf8_lossy(bytes).to_string())
        }
    }
}

/// Detect the delimiter by counting occurrences in the first line.
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [';', ',', '\t', '|'];
    let mut best_sep = ';';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Parse delimited content into a typed cell matrix.
///
/// Rows keep their original order. Fully blank lines are skipped.
pub fn parse_matrix(content: &str, delimiter: char) -> ReaderResult<Matrix> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut matrix = Matrix::new();
    for record in reader.records() {
        let record = record.map_err(|e| ReaderError::Parse(e.to_string()))?;
        let row: Vec<Cell> = record.iter().map(Cell::parse).collect();
        if row.iter().all(Cell::is_blank) {
            continue;
        }
        matrix.push(row);
    }

    if matrix.is_empty() {
        return Err(ReaderError::EmptyFile);
    }

    Ok(matrix)
}

/// Parse raw bytes with auto-detection of encoding and delimiter.
pub fn read_bytes_auto(bytes: &[u8]) -> ReaderResult<ReadResult> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding)?;
    let delimiter = detect_delimiter(&content);
    let matrix = parse_matrix(&content, delimiter)?;

    Ok(ReadResult {
        matrix,
        encoding,
        delimiter,
    })
}

/// Read a spreadsheet file with auto-detection of encoding and delimiter.
///
/// The file read is the only suspension point; parsing is synchronous.
pub async fn read_file_auto<P: AsRef<Path>>(path: P) -> ReaderResult<ReadResult> {
    let bytes = tokio::fs::read(path.as_ref()).await?;
    read_bytes_auto(&bytes)
}
