#![cfg(not(tarpaulin_include))]

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::Parser;
use csv_editor::downloader;
use csv_editor::session::{CSV_CONTENT_TYPE, Session, Upload};
use csv_editor::{DecodeOptions, logging};

/// Edit a CSV file from the command line: load, overwrite cells, export
#[derive(Parser, Debug)]
#[command(name = "csv-editor-cli", version)]
struct Args {
    /// CSV file to load
    input: PathBuf,

    /// Content type to report for the input (defaults from the extension)
    #[arg(long)]
    content_type: Option<String>,

    /// Cell edit as ROW:COLUMN=VALUE (ROW is 0-based); may be repeated
    #[arg(long = "set", value_name = "ROW:COLUMN=VALUE")]
    edits: Vec<String>,

    /// Where to write the export; `-` writes to stdout
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Field delimiter of the input
    #[arg(long, default_value_t = ',')]
    delimiter: char,

    /// Log filter directive (overrides RUST_LOG)
    #[arg(long)]
    log: Option<String>,
}

#[derive(Debug, PartialEq, Eq)]
struct CellEdit {
    row: usize,
    column: String,
    value: String,
}

fn parse_edit(spec: &str) -> anyhow::Result<CellEdit> {
    let (target, value) = spec
        .split_once('=')
        .with_context(|| format!("edit `{}` is missing `=VALUE`", spec))?;
    let (row, column) = target
        .split_once(':')
        .with_context(|| format!("edit `{}` is missing `ROW:COLUMN`", spec))?;
    let row = row
        .trim()
        .parse()
        .with_context(|| format!("edit `{}` has an invalid row index", spec))?;

    Ok(CellEdit {
        row,
        column: column.to_string(),
        value: value.to_string(),
    })
}

fn guess_content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("csv") => CSV_CONTENT_TYPE,
        _ => "application/octet-stream",
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logging::init(args.log.as_deref(), "warn")?;

    if !args.delimiter.is_ascii() {
        bail!("delimiter must be a single ASCII character");
    }
    let edits = args
        .edits
        .iter()
        .map(|spec| parse_edit(spec))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let bytes = fs::read(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let content_type = args
        .content_type
        .clone()
        .unwrap_or_else(|| guess_content_type(&args.input).to_string());
    let file_name = args
        .input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut session = Session::with_options(DecodeOptions {
        delimiter: args.delimiter as u8,
    });
    if let Err(e) = session.load_file(Upload::new(file_name, Some(content_type), bytes)) {
        bail!("{}", e);
    }

    for edit in edits {
        session
            .edit_cell(edit.row, &edit.column, edit.value)
            .with_context(|| format!("cannot edit row {} column `{}`", edit.row, edit.column))?;
    }

    let export = session.export_csv()?;
    match args.output.as_deref() {
        Some(path) if path == Path::new("-") => {
            io::stdout().write_all(export.body.as_bytes())?;
        }
        path => {
            let written = downloader::save_to(&export, path)?;
            eprintln!("Wrote {}", written.display());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_edit_spec() {
        assert_eq!(
            parse_edit("0:first_name=Alicia").unwrap(),
            CellEdit {
                row: 0,
                column: "first_name".to_string(),
                value: "Alicia".to_string(),
            }
        );
    }

    #[test]
    fn value_may_contain_separators() {
        let edit = parse_edit("2:note=a=b:c").unwrap();
        assert_eq!(edit.column, "note");
        assert_eq!(edit.value, "a=b:c");
    }

    #[test]
    fn rejects_bad_edit_specs() {
        assert!(parse_edit("first_name=Alicia").is_err());
        assert!(parse_edit("x:first_name=Alicia").is_err());
        assert!(parse_edit("0:first_name").is_err());
    }

    #[test]
    fn content_type_from_extension() {
        assert_eq!(guess_content_type(Path::new("people.CSV")), "text/csv");
        assert_eq!(
            guess_content_type(Path::new("people.xlsx")),
            "application/octet-stream"
        );
    }
}
