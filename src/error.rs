use std::fmt;

use thiserror::Error;

/// Kind of structural problem reported by the CSV codec
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// A data record has fewer fields than the header
    TooFewFields,
    /// A data record has more fields than the header
    TooManyFields,
    /// The input ends inside a quoted field
    MissingQuotes,
    /// A closing quote is followed by something other than a delimiter or line break
    InvalidQuotes,
    /// Any other reader failure
    Malformed,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParseErrorKind::TooFewFields => "TooFewFields",
            ParseErrorKind::TooManyFields => "TooManyFields",
            ParseErrorKind::MissingQuotes => "MissingQuotes",
            ParseErrorKind::InvalidQuotes => "InvalidQuotes",
            ParseErrorKind::Malformed => "Malformed",
        };
        f.write_str(name)
    }
}

/// One structural error found while decoding CSV text
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} at row {row}: {message}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    /// 0-based data row index the error refers to
    pub row: usize,
    pub message: String,
}

/// Why a file upload was rejected
///
/// The `Display` text is the fixed banner shown to the user; the parse
/// errors are kept for logging only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("Only CSV files are allowed.")]
    InvalidFileType { content_type: Option<String> },

    #[error("Error parsing CSV file.")]
    ParseFailure { errors: Vec<ParseError> },
}

/// Why a cell edit could not be applied
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("row {row} is out of range (table has {len} rows)")]
    IndexOutOfRange { row: usize, len: usize },

    #[error("unknown column: {0}")]
    UnknownColumn(String),

    #[error("row {row} has no value for column {column}")]
    MissingCell { row: usize, column: String },
}

/// Why the current table could not be turned into CSV text
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to encode CSV: {0}")]
    Encode(#[from] csv::Error),
}

/// Why a bundled asset lookup failed; every variant is answered with `404 Not found`
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("method not allowed: {0}")]
    MethodNotAllowed(String),

    #[error("asset not found: {0}")]
    NotFound(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_errors_display_fixed_banners() {
        let wrong_type = LoadError::InvalidFileType {
            content_type: Some("application/vnd.ms-excel".to_string()),
        };
        assert_eq!(wrong_type.to_string(), "Only CSV files are allowed.");

        let parse = LoadError::ParseFailure {
            errors: vec![ParseError {
                kind: ParseErrorKind::TooFewFields,
                row: 3,
                message: "expected 2 fields, found 1".to_string(),
            }],
        };
        assert_eq!(parse.to_string(), "Error parsing CSV file.");
    }

    #[test]
    fn parse_error_mentions_kind_and_row() {
        let err = ParseError {
            kind: ParseErrorKind::MissingQuotes,
            row: 0,
            message: "quoted field never closed".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "MissingQuotes at row 0: quoted field never closed"
        );
    }
}
