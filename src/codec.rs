//! CSV decode/encode built on the `csv` crate
//!
//! Decoding always treats the first record as the header row and never
//! yields records for blank lines. Structural problems are collected rather
//! than aborting the parse, so callers see every error at once.

use std::collections::HashSet;
use std::io;

use crate::error::{ExportError, ParseError, ParseErrorKind};
use crate::table::{Row, Table};

/// Options for [`decode`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecodeOptions {
    pub delimiter: u8,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

/// Result of decoding CSV text
///
/// `table` is populated even when `errors` is non-empty; it is up to the
/// caller to reject the data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Decoded {
    pub table: Table,
    pub errors: Vec<ParseError>,
}

impl Decoded {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Decode CSV text with a header row
///
/// # Arguments
/// * `text` - CSV content; a leading byte order mark is ignored
/// * `options` - Delimiter to split fields on
///
/// # Returns
/// * `Decoded` - Rows in input order, column names from the header row
///   (even when there are no data rows) and any structural errors
///
/// # Examples
/// ```
/// use csv_editor::codec::{decode, DecodeOptions};
///
/// let decoded = decode("id,first_name\n1,Alice\n", &DecodeOptions::default());
/// assert!(decoded.is_ok());
/// assert_eq!(decoded.table.columns, vec!["id", "first_name"]);
/// assert_eq!(decoded.table.cell(0, "first_name"), Some("Alice"));
/// ```
pub fn decode(text: &str, options: &DecodeOptions) -> Decoded {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut columns: Option<Vec<String>> = None;
    let mut rows = Vec::new();
    let mut errors = Vec::new();

    for result in reader.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                errors.push(ParseError {
                    kind: ParseErrorKind::Malformed,
                    row: rows.len(),
                    message: e.to_string(),
                });
                continue;
            }
        };

        if columns.is_none() {
            columns = Some(unique_headers(record.iter()));
            continue;
        }

        let expected = columns.as_ref().map_or(0, Vec::len);
        let found = record.len();
        if found != expected {
            let kind = if found < expected {
                ParseErrorKind::TooFewFields
            } else {
                ParseErrorKind::TooManyFields
            };
            errors.push(ParseError {
                kind,
                row: rows.len(),
                message: format!("expected {} fields, found {}", expected, found),
            });
        }

        rows.push(record.iter().collect::<Row>());
    }

    errors.extend(quote_errors(text, options.delimiter));

    Decoded {
        table: Table::new(columns.unwrap_or_default(), rows),
        errors,
    }
}

/// Decode raw file bytes, replacing invalid UTF-8 the way a browser text read does
pub fn decode_bytes(bytes: &[u8], options: &DecodeOptions) -> Decoded {
    decode(&String::from_utf8_lossy(bytes), options)
}

/// Encode a table as CSV text
///
/// Writes the header line followed by one line per row, `\n` terminated.
/// Fields are quoted only when they contain the delimiter, a quote or a line
/// break. A table without columns encodes to the empty string.
pub fn encode(table: &Table) -> Result<String, ExportError> {
    if table.columns.is_empty() {
        return Ok(String::new());
    }

    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(Vec::new());

    writer.write_record(&table.columns)?;
    for row in &table.rows {
        writer.write_record(&row.values)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(io::Error::new(e.error().kind(), e.error().to_string())))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

// Later duplicates get a numeric suffix so every column can be addressed by name
fn unique_headers<'a>(fields: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut headers = Vec::new();

    for field in fields {
        let mut name = field.to_string();
        let mut n = 0;
        while seen.contains(&name) {
            n += 1;
            name = format!("{}_{}", field, n);
        }
        seen.insert(name.clone());
        headers.push(name);
    }

    headers
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum QuoteState {
    FieldStart,
    Unquoted,
    Quoted,
    QuoteInQuoted,
}

// A quote opens a quoted field only at the start of a field, and a closing
// quote must be followed by a delimiter or a line break. Records are counted
// the way the reader counts them: blank lines are skipped and record 0 is
// the header row.
fn quote_errors(text: &str, delimiter: u8) -> Vec<ParseError> {
    let mut errors = Vec::new();
    let mut state = QuoteState::FieldStart;
    let mut record = 0usize;
    let mut in_record = false;

    for &b in text.as_bytes() {
        let line_break = b == b'\n' || b == b'\r';
        if line_break && state != QuoteState::Quoted {
            if in_record {
                record += 1;
                in_record = false;
            }
            state = QuoteState::FieldStart;
            continue;
        }
        in_record = true;

        state = match (state, b) {
            (QuoteState::FieldStart, b'"') => QuoteState::Quoted,
            (QuoteState::Quoted, b'"') => QuoteState::QuoteInQuoted,
            (QuoteState::Quoted, _) => QuoteState::Quoted,
            (QuoteState::QuoteInQuoted, b'"') => QuoteState::Quoted,
            (_, b) if b == delimiter => QuoteState::FieldStart,
            (QuoteState::QuoteInQuoted, _) => {
                errors.push(ParseError {
                    kind: ParseErrorKind::InvalidQuotes,
                    row: record.saturating_sub(1),
                    message: "trailing characters after closing quote".to_string(),
                });
                QuoteState::Unquoted
            }
            _ => QuoteState::Unquoted,
        };
    }

    if state == QuoteState::Quoted {
        errors.push(ParseError {
            kind: ParseErrorKind::MissingQuotes,
            row: record.saturating_sub(1),
            message: "quoted field is never closed".to_string(),
        });
    }

    errors
}
