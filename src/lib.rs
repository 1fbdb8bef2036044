/*!
# CSV Editor

A browser-based tool for uploading a CSV file, editing its cells in a table
and downloading the edited result, served by a small Rust web application.

## Architecture

### Frontend Layer
- **Technologies**: HTML, CSS, JavaScript (bundled into the binary)
- **Key Components**:
  - File picker - Accepts `.csv` files and posts them to the server
  - Table renderer - One input per cell, edits are sent as they happen
  - Download button - Fetches the export and saves it as `edited_data.csv`

### Backend Layer
- **Technologies**: Rust, axum, tower-http
- **Core Components**:
  - CSV Codec - Header-aware decoding with structural error reporting, RFC 4180 encoding
  - Editor Session - Immutable state snapshots driven by load and edit events
  - Downloader - Turns an export into a file download response
  - Asset server - Serves the page from an asset store, `404 Not found` otherwise

## Session lifecycle

`Empty --load ok--> Clean --edit--> Dirty`; any successful load returns to
`Clean`, a failed load keeps the current table and only sets the error banner.

## REST API Endpoints

- `GET /api/session` - Current snapshot (columns, rows, error, dirty flag)
- `POST /api/upload` - Multipart upload of a CSV file (field `file`)
- `POST /api/cell` - Overwrite one cell
- `GET /api/export` - Download the edited CSV
- `POST /api/sync` - CRM sync placeholder
*/

pub mod codec;
pub mod config;
pub mod downloader;
pub mod error;
pub mod logging;
pub mod session;
pub mod table;

#[cfg(feature = "web")]
pub mod app;
#[cfg(feature = "web")]
pub mod assets;

pub use codec::{DecodeOptions, Decoded, decode, encode};
pub use error::{AssetError, EditError, ExportError, LoadError, ParseError, ParseErrorKind};
pub use session::{
    Event, Export, Phase, Session, SessionState, Upload, prepare_load, transition,
};
pub use table::{Row, Table};
