//! Raw dataset loading with encoding and delimiter auto-detection.
//!
//! Reads the delimited input file into untyped rows (column name -> raw
//! text). No sales-specific validation happens here; that is the cleaner's
//! job. The file is not assumed to be UTF-8 or comma-delimited: encoding is
//! detected with chardet and the delimiter by counting candidates in the
//! header line.

use std::collections::HashMap;
use std::path::Path;

use crate::error::{LoadError, LoadResult};
use crate::models::COLUMNS;

/// One raw row: column name mapped to the trimmed cell text.
pub type RawRow = HashMap<String, String>;

/// Result of loading a raw dataset, with detection metadata.
#[derive(Debug, Clone)]
pub struct RawTable {
    /// Column headers, in file order.
    pub headers: Vec<String>,
    /// Data rows.
    pub rows: Vec<RawRow>,
    /// Detected encoding.
    pub encoding: String,
    /// Detected delimiter.
    pub delimiter: char,
}

/// Detect the encoding of raw bytes using chardet.
pub fn detect_encoding(bytes: &[u8]) -> String {
    let (charset, _, _) = chardet::detect(bytes);

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        other => other.to_string(),
    }
}

/// Decode bytes to a string using the detected encoding.
///
/// Unknown encodings fall back to lossy UTF-8.
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    match encoding.to_lowercase().as_str() {
        "iso-8859-1" | "latin-1" | "latin1" => {
            encoding_rs::ISO_8859_15.decode(bytes).0.into_owned()
        }
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        _ => String::from_utf8_lossy(bytes).into_owned(),
    }
}

/// Detect the delimiter by counting occurrences in the header line.
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let candidates = [',', ';', '\t', '|'];
    let mut best = ',';
    let mut best_count = 0;

    for &sep in &candidates {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best = sep;
        }
    }

    best
}

/// Load a raw dataset from a file, auto-detecting encoding and delimiter.
///
/// # Errors
///
/// - [`LoadError::MissingFile`] if the path does not exist
/// - [`LoadError::EmptyFile`] if the file holds no content
/// - [`LoadError::NoHeaders`] if the header row is unusable
/// - [`LoadError::MissingColumn`] if a required sales column is absent
pub fn load(path: &Path) -> LoadResult<RawTable> {
    if !path.exists() {
        return Err(LoadError::MissingFile(path.to_path_buf()));
    }

    let bytes = std::fs::read(path)?;
    load_bytes(&bytes)
}

/// Load a raw dataset from bytes, auto-detecting encoding and delimiter.
pub fn load_bytes(bytes: &[u8]) -> LoadResult<RawTable> {
    if bytes.is_empty() {
        return Err(LoadError::EmptyFile);
    }

    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding);

    if content.trim().is_empty() {
        return Err(LoadError::EmptyFile);
    }

    let delimiter = detect_delimiter(&content);
    parse_table(&content, delimiter, encoding)
}

/// Parse decoded content with an explicit delimiter.
fn parse_table(content: &str, delimiter: char, encoding: String) -> LoadResult<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
        return Err(LoadError::NoHeaders);
    }

    // Region is optional in the schema; every other column must be present.
    for required in COLUMNS.iter().filter(|c| **c != "region") {
        if !headers.iter().any(|h| h == required) {
            return Err(LoadError::MissingColumn((*required).to_string()));
        }
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }

        let mut row = RawRow::with_capacity(headers.len());
        for (i, header) in headers.iter().enumerate() {
            let cell = record.get(i).unwrap_or("").trim();
            row.insert(header.clone(), cell.to_string());
        }
        rows.push(row);
    }

    Ok(RawTable {
        headers,
        rows,
        encoding,
        delimiter,
    })
}
