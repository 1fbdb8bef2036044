use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::assets::{self, AssetStore};
use crate::config::Config;
use crate::error::{EditError, ExportError};
use crate::session::{self, Phase, Session, SessionState, Upload};
use crate::table::Row;

/// Multipart field carrying the uploaded file
pub const UPLOAD_FIELD: &str = "file";

pub struct AppState {
    session: Mutex<Session>,
    assets: AssetStore,
}

impl AppState {
    pub fn new(assets: AssetStore) -> Self {
        AppState {
            session: Mutex::new(Session::new()),
            assets,
        }
    }

    // Snapshots are swapped whole, so a poisoned lock still holds a consistent session
    fn session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// JSON view of a session snapshot
#[derive(Serialize, Debug)]
pub struct SessionView {
    phase: Phase,
    columns: Vec<String>,
    rows: Vec<Row>,
    error: Option<String>,
    dirty: bool,
}

impl From<&SessionState> for SessionView {
    fn from(state: &SessionState) -> Self {
        SessionView {
            phase: state.phase(),
            columns: state.columns().to_vec(),
            rows: state.rows().to_vec(),
            error: state.error_message(),
            dirty: state.is_dirty(),
        }
    }
}

#[derive(Deserialize)]
struct CellEdit {
    row: usize,
    column: String,
    value: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(Serialize)]
struct SyncResponse {
    message: &'static str,
}

/// Errors surfaced by the API handlers
#[derive(Debug)]
enum ApiError {
    BadUpload(String),
    Edit(EditError),
    Export(ExportError),
    Task(tokio::task::JoinError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            ApiError::BadUpload(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Edit(e) => (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
            ApiError::Export(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            ApiError::Task(e) => {
                error!("upload decode task failed: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "upload could not be processed".to_string())
            }
        };
        (status, Json(ErrorBody { error })).into_response()
    }
}

/// Build the application router around shared state
///
/// # Arguments
/// * `state` - Session and asset store shared by all handlers
/// * `max_upload_bytes` - Request body limit for uploads
pub fn router(state: Arc<AppState>, max_upload_bytes: usize) -> Router {
    let api = Router::new()
        .route("/api/session", get(get_session))
        .route(
            "/api/upload",
            post(upload_file).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/api/cell", post(edit_cell))
        .route("/api/export", get(export_csv))
        .route("/api/sync", post(prepare_sync));

    let app = match &state.assets {
        AssetStore::Embedded => api.fallback(assets::serve_embedded),
        AssetStore::Directory(root) => api.fallback_service(assets::serve_dir(root)),
    };

    app.layer(TraceLayer::new_for_http()).with_state(state)
}

/// Start the web server and serve until the process is stopped
pub async fn run(config: Config) -> anyhow::Result<()> {
    let assets = match &config.assets_dir {
        Some(dir) => {
            info!(dir = %dir.display(), "serving assets from directory");
            AssetStore::Directory(dir.clone())
        }
        None => AssetStore::Embedded,
    };

    let state = Arc::new(AppState::new(assets));
    let app = router(state, config.max_upload_bytes);

    let address = config.address();
    let listener = TcpListener::bind(&address).await?;
    info!("Listening on http://{}", address);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn get_session(State(state): State<Arc<AppState>>) -> Json<SessionView> {
    let session = state.session();
    Json(SessionView::from(session.state()))
}

async fn upload_file(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadUpload(e.body_text()))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadUpload(e.body_text()))?;

        upload = Some(Upload {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
    }

    let Some(upload) = upload else {
        warn!("upload request without a file part");
        return Err(ApiError::BadUpload("no file selected".to_string()));
    };

    // decoding runs on a blocking thread; the lock is held only for the swap
    let options = state.session().decode_options();
    let file_name = upload.file_name.clone();
    let prepared = tokio::task::spawn_blocking(move || session::prepare_load(&upload, &options))
        .await
        .map_err(ApiError::Task)?;

    let mut session = state.session();
    let status = match session.apply_load(&file_name, prepared) {
        Ok(()) => StatusCode::OK,
        Err(_) => StatusCode::UNPROCESSABLE_ENTITY,
    };
    Ok((status, Json(SessionView::from(session.state()))).into_response())
}

async fn edit_cell(
    State(state): State<Arc<AppState>>,
    Json(edit): Json<CellEdit>,
) -> Result<Json<SessionView>, ApiError> {
    let mut session = state.session();
    session
        .edit_cell(edit.row, &edit.column, edit.value)
        .map_err(ApiError::Edit)?;
    Ok(Json(SessionView::from(session.state())))
}

async fn export_csv(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let export = state.session().export_csv().map_err(ApiError::Export)?;
    Ok(export.into_response())
}

async fn prepare_sync(State(state): State<Arc<AppState>>) -> Json<SyncResponse> {
    let message = state.session().prepare_sync();
    Json(SyncResponse { message })
}
