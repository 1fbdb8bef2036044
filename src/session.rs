use serde::Serialize;
use tracing::{debug, info, warn};

use crate::codec::{self, DecodeOptions};
use crate::error::{EditError, ExportError, LoadError};
use crate::table::{Row, Table};

/// The only content type accepted for uploads
pub const CSV_CONTENT_TYPE: &str = "text/csv";

/// Name offered to the browser for the exported file
pub const EXPORT_FILE_NAME: &str = "edited_data.csv";

/// Content type of the exported file
pub const EXPORT_CONTENT_TYPE: &str = "text/csv;charset=utf-8;";

/// Acknowledgement returned by the CRM sync placeholder
pub const SYNC_ACKNOWLEDGEMENT: &str = "Ready for CRM sync!";

/// A file handed over by the file picker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub file_name: String,
    /// Content type as reported by the client, if any
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(
        file_name: impl Into<String>,
        content_type: Option<impl Into<String>>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Upload {
            file_name: file_name.into(),
            content_type: content_type.map(Into::into),
            bytes: bytes.into(),
        }
    }

    /// True only for the exact `text/csv` content type
    pub fn is_csv(&self) -> bool {
        self.content_type.as_deref() == Some(CSV_CONTENT_TYPE)
    }
}

/// Where a session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Nothing loaded yet
    Empty,
    /// Loaded, no edits since the load
    Clean,
    /// Loaded and edited at least once since the load
    Dirty,
}

/// Immutable snapshot of the editor state
///
/// Every transition produces a new snapshot; nothing mutates one in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    table: Option<Table>,
    error: Option<LoadError>,
    dirty: bool,
}

impl SessionState {
    pub fn table(&self) -> Option<&Table> {
        self.table.as_ref()
    }

    pub fn columns(&self) -> &[String] {
        self.table.as_ref().map(|t| t.columns.as_slice()).unwrap_or(&[])
    }

    pub fn rows(&self) -> &[Row] {
        self.table.as_ref().map(|t| t.rows.as_slice()).unwrap_or(&[])
    }

    pub fn error(&self) -> Option<&LoadError> {
        self.error.as_ref()
    }

    /// The banner text for the last failed load, if it has not been cleared
    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(ToString::to_string)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn phase(&self) -> Phase {
        match (&self.table, self.dirty) {
            (None, _) => Phase::Empty,
            (Some(_), false) => Phase::Clean,
            (Some(_), true) => Phase::Dirty,
        }
    }
}

/// User actions that change the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Load(Upload),
    EditCell {
        row: usize,
        column: String,
        value: String,
    },
}

/// Compute the next snapshot for an event
///
/// Load failures are not errors here: they produce a snapshot that keeps the
/// previous table and records the failure for the banner. Edits that address
/// a missing row or column are rejected and leave the caller's state as is.
///
/// # Arguments
/// * `state` - The current snapshot
/// * `event` - What the user did
/// * `options` - Codec options used for loads
pub fn transition(
    state: &SessionState,
    event: Event,
    options: &DecodeOptions,
) -> Result<SessionState, EditError> {
    match event {
        Event::Load(upload) => Ok(load(state, &upload, options)),
        Event::EditCell { row, column, value } => edit(state, row, &column, value),
    }
}

/// Validate and decode an upload without touching any session
///
/// This is the expensive half of a load; callers holding a session behind a
/// lock can run it first and apply the result with [`Session::apply_load`].
pub fn prepare_load(upload: &Upload, options: &DecodeOptions) -> Result<Table, LoadError> {
    if !upload.is_csv() {
        return Err(LoadError::InvalidFileType {
            content_type: upload.content_type.clone(),
        });
    }

    let decoded = codec::decode_bytes(&upload.bytes, options);
    if !decoded.is_ok() {
        return Err(LoadError::ParseFailure {
            errors: decoded.errors,
        });
    }
    Ok(decoded.table)
}

fn apply(state: &SessionState, prepared: Result<Table, LoadError>) -> SessionState {
    match prepared {
        Ok(table) => SessionState {
            table: Some(table),
            error: None,
            dirty: false,
        },
        Err(error) => SessionState {
            error: Some(error),
            ..state.clone()
        },
    }
}

fn load(state: &SessionState, upload: &Upload, options: &DecodeOptions) -> SessionState {
    apply(state, prepare_load(upload, options))
}

fn edit(
    state: &SessionState,
    row: usize,
    column: &str,
    value: String,
) -> Result<SessionState, EditError> {
    let Some(current) = state.table.as_ref() else {
        return Err(EditError::IndexOutOfRange { row, len: 0 });
    };

    let mut table = current.clone();
    table.set_cell(row, column, value)?;

    Ok(SessionState {
        table: Some(table),
        error: state.error.clone(),
        dirty: true,
    })
}

/// CSV text ready to be handed to the downloader
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Export {
    pub file_name: &'static str,
    pub content_type: &'static str,
    pub body: String,
}

/// The live editor session: owns the current snapshot and swaps it on every event
#[derive(Debug, Default)]
pub struct Session {
    state: SessionState,
    options: DecodeOptions,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: DecodeOptions) -> Self {
        Session {
            state: SessionState::default(),
            options,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Replace the table with the contents of an uploaded file
    ///
    /// On failure the previous table is kept and the error is recorded in the
    /// state as well as returned.
    pub fn load_file(&mut self, upload: Upload) -> Result<(), LoadError> {
        let prepared = prepare_load(&upload, &self.options);
        self.apply_load(&upload.file_name, prepared)
    }

    /// Codec options used for loads
    pub fn decode_options(&self) -> DecodeOptions {
        self.options
    }

    /// Apply the outcome of [`prepare_load`] for the file `file_name`
    ///
    /// Same state change as [`Session::load_file`].
    pub fn apply_load(
        &mut self,
        file_name: &str,
        prepared: Result<Table, LoadError>,
    ) -> Result<(), LoadError> {
        self.state = apply(&self.state, prepared);

        match self.state.error() {
            Some(error) => {
                match error {
                    LoadError::InvalidFileType { content_type } => {
                        warn!(file = %file_name, ?content_type, "rejected upload: not a CSV file");
                    }
                    LoadError::ParseFailure { errors } => {
                        warn!(file = %file_name, count = errors.len(), "rejected upload: CSV parse errors");
                        for e in errors {
                            debug!(file = %file_name, "{}", e);
                        }
                    }
                }
                Err(error.clone())
            }
            None => {
                info!(
                    file = %file_name,
                    rows = self.state.rows().len(),
                    columns = self.state.columns().len(),
                    "loaded CSV"
                );
                Ok(())
            }
        }
    }

    /// Overwrite one cell of the loaded table
    pub fn edit_cell(
        &mut self,
        row: usize,
        column: &str,
        value: impl Into<String>,
    ) -> Result<(), EditError> {
        let event = Event::EditCell {
            row,
            column: column.to_string(),
            value: value.into(),
        };
        self.state = transition(&self.state, event, &self.options)?;
        debug!(row, column, "edited cell");
        Ok(())
    }

    /// Encode the current table for download; does not change the state
    pub fn export_csv(&self) -> Result<Export, ExportError> {
        let body = match self.state.table() {
            Some(table) => codec::encode(table)?,
            None => String::new(),
        };
        info!(rows = self.state.rows().len(), bytes = body.len(), "exported CSV");

        Ok(Export {
            file_name: EXPORT_FILE_NAME,
            content_type: EXPORT_CONTENT_TYPE,
            body,
        })
    }

    /// Placeholder for CRM sync: acknowledges and does nothing else
    pub fn prepare_sync(&self) -> &'static str {
        info!(rows = self.state.rows().len(), "CRM sync requested (not implemented)");
        SYNC_ACKNOWLEDGEMENT
    }
}
