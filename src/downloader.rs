use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::session::Export;

/// Build a `Content-Disposition` value that makes the browser save the body
///
/// Quotes and control characters are dropped from the file name so the
/// header value stays well formed.
///
/// # Examples
/// ```
/// use csv_editor::downloader::content_disposition;
///
/// assert_eq!(
///     content_disposition("edited_data.csv"),
///     "attachment; filename=\"edited_data.csv\""
/// );
/// ```
pub fn content_disposition(file_name: &str) -> String {
    let safe: String = file_name
        .chars()
        .filter(|c| *c != '"' && *c != '\\' && !c.is_control())
        .collect();
    format!("attachment; filename=\"{}\"", safe)
}

#[cfg(feature = "web")]
mod response {
    use axum::http::header;
    use axum::response::{IntoResponse, Response};

    use super::content_disposition;
    use crate::session::Export;

    impl IntoResponse for Export {
        /// The export as a file download; the body is owned by the response
        /// and released once it has been written out
        fn into_response(self) -> Response {
            (
                [
                    (header::CONTENT_TYPE, self.content_type.to_string()),
                    (header::CONTENT_DISPOSITION, content_disposition(self.file_name)),
                    (header::CACHE_CONTROL, "no-store".to_string()),
                ],
                self.body,
            )
                .into_response()
        }
    }
}

/// Write an export to disk, using `path` or the export's own file name
pub fn save_to(export: &Export, path: Option<&Path>) -> io::Result<PathBuf> {
    let target = path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(export.file_name));
    fs::write(&target, export.body.as_bytes())?;
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{EXPORT_CONTENT_TYPE, EXPORT_FILE_NAME};

    fn export(body: &str) -> Export {
        Export {
            file_name: EXPORT_FILE_NAME,
            content_type: EXPORT_CONTENT_TYPE,
            body: body.to_string(),
        }
    }

    #[test]
    fn test_content_disposition_strips_quotes() {
        assert_eq!(
            content_disposition("a\"b\\c\n.csv"),
            "attachment; filename=\"abc.csv\""
        );
    }

    #[test]
    fn test_save_to_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        let written = save_to(&export("id\n1\n"), Some(path.as_path())).unwrap();

        assert_eq!(written, path);
        assert_eq!(fs::read_to_string(&path).unwrap(), "id\n1\n");
    }

    #[cfg(feature = "web")]
    #[test]
    fn test_export_response_headers() {
        use axum::http::{StatusCode, header};
        use axum::response::IntoResponse;

        let response = export("id\n1\n").into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers[header::CONTENT_TYPE], "text/csv;charset=utf-8;");
        assert_eq!(
            headers[header::CONTENT_DISPOSITION],
            "attachment; filename=\"edited_data.csv\""
        );
    }
}
