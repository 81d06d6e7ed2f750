//! In-process analysis server
//!
//! Minimal axum stand-in for the real server's HTTP contract, bound to an
//! ephemeral port on 127.0.0.1. Records every request path and Oracc body.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

/// Signs analysis body: DI first, then A; keys deliberately unsorted
pub const SIGNS_FIXTURE: &str = r#"{
    "analysis": {
        "DI": {"preserved": 2, "partial": 0, "reconstructed": 1, "in <>": 0, "in ()": 0, "in <<>>": 0},
        "A": {"preserved": 5, "partial": 1, "reconstructed": 0, "in <>": 0, "in ()": 2, "in <<>>": 0}
    },
    "syntax_errors": ["o 3: unbalanced bracket"]
}"#;

#[derive(Default)]
struct MockState {
    hits: Mutex<Vec<String>>,
    uploads: Mutex<HashMap<String, String>>,
    upload_layouts: Mutex<Vec<(String, Option<String>)>>,
    oracc_bodies: Mutex<Vec<Value>>,
    failing_uploads: AtomicUsize,
    next_upload_id: Mutex<Option<String>>,
}

impl MockState {
    fn hit(&self, path: String) {
        self.hits.lock().unwrap().push(path);
    }

    fn knows(&self, upload_id: &str) -> bool {
        self.uploads.lock().unwrap().contains_key(upload_id)
    }
}

pub struct MockServer {
    addr: SocketAddr,
    state: Arc<MockState>,
}

impl MockServer {
    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());

        let app = Router::new()
            .route("/upload/:layout", post(upload))
            .route("/analyzeSignsAction/:id", post(analyze_signs))
            .route("/analyzeWordsAction/:id", post(analyze_words))
            .route("/analyzeGlossaryAction/:id", post(analyze_glossary))
            .route("/analyzeORACCAction/:id", post(analyze_oracc))
            .route("/download_csv/:name", get(download))
            .route("/download_xlsx/:name", get(download))
            .route("/download_atf/:name", get(download))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    pub fn origin(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Answer the next `count` uploads with HTTP 500
    pub fn fail_next_uploads(&self, count: usize) {
        self.state.failing_uploads.store(count, Ordering::SeqCst);
    }

    /// Assign this id to the next accepted upload instead of a fresh uuid
    pub fn set_next_upload_id(&self, upload_id: &str) {
        *self.state.next_upload_id.lock().unwrap() = Some(upload_id.to_string());
    }

    /// Request paths in arrival order
    ///
    /// Upload and analysis routes record the decoded id; download routes
    /// record the raw (still percent-encoded) request path.
    pub fn hits(&self) -> Vec<String> {
        self.state.hits.lock().unwrap().clone()
    }

    /// `(path layout, multipart layout field)` per upload request
    pub fn upload_layouts(&self) -> Vec<(String, Option<String>)> {
        self.state.upload_layouts.lock().unwrap().clone()
    }

    pub fn oracc_bodies(&self) -> Vec<Value> {
        self.state.oracc_bodies.lock().unwrap().clone()
    }
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

async fn upload(
    State(state): State<Arc<MockState>>,
    Path(layout): Path<String>,
    mut multipart: Multipart,
) -> Response {
    state.hit(format!("/upload/{}", layout));

    let mut filename = None;
    let mut layout_field = None;
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                filename = field.file_name().map(str::to_string);
                let _ = field.bytes().await;
            }
            Some("layout") => layout_field = field.text().await.ok(),
            _ => {}
        }
    }
    state
        .upload_layouts
        .lock()
        .unwrap()
        .push((layout, layout_field));

    let failing = state.failing_uploads.load(Ordering::SeqCst);
    if failing > 0 {
        state.failing_uploads.store(failing - 1, Ordering::SeqCst);
        return error(StatusCode::INTERNAL_SERVER_ERROR, "Storage unavailable");
    }

    let Some(filename) = filename else {
        return error(StatusCode::BAD_REQUEST, "No file part");
    };

    let upload_id = state
        .next_upload_id
        .lock()
        .unwrap()
        .take()
        .unwrap_or_else(|| uuid::Uuid::new_v4().simple().to_string());
    state
        .uploads
        .lock()
        .unwrap()
        .insert(upload_id.clone(), filename.clone());

    Json(json!({
        "message": "File uploaded successfully",
        "upload_id": upload_id,
        "filename": filename,
    }))
    .into_response()
}

async fn analyze_signs(State(state): State<Arc<MockState>>, Path(id): Path<String>) -> Response {
    state.hit(format!("/analyzeSignsAction/{}", id));
    if !state.knows(&id) {
        return error(StatusCode::NOT_FOUND, "File not found");
    }
    // Sent verbatim: re-serializing a serde_json::Value would sort the keys
    (
        [(header::CONTENT_TYPE, "application/json")],
        SIGNS_FIXTURE,
    )
        .into_response()
}

async fn analyze_words(State(state): State<Arc<MockState>>, Path(id): Path<String>) -> Response {
    state.hit(format!("/analyzeWordsAction/{}", id));
    if !state.knows(&id) {
        return error(StatusCode::NOT_FOUND, "File not found");
    }
    Json(json!({
        "analysis": {
            "lugal": {"preserved": 3, "partially preserved": 1, "reconstructed": 0}
        },
        "syntax_errors": []
    }))
    .into_response()
}

async fn analyze_glossary(
    State(state): State<Arc<MockState>>,
    Path(id): Path<String>,
) -> Response {
    state.hit(format!("/analyzeGlossaryAction/{}", id));
    if !state.knows(&id) {
        return error(StatusCode::NOT_FOUND, "File not found");
    }
    // Malformed on purpose: counts must be integers
    Json(json!({ "analysis": { "e2": { "attestation": "many" } } })).into_response()
}

async fn analyze_oracc(
    State(state): State<Arc<MockState>>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    state.hit(format!("/analyzeORACCAction/{}", id));
    state.oracc_bodies.lock().unwrap().push(body);
    if !state.knows(&id) {
        return error(StatusCode::NOT_FOUND, "File not found");
    }
    Json(json!({
        "success": true,
        "analysis": "&X001 = tablet\n1. a-na",
        "as_html_data": "<pre class=\"atf\">&amp;X001 = tablet<br>1. a-na</pre>",
        "syntax_errors": "o 2: unknown sign"
    }))
    .into_response()
}

async fn download(State(state): State<Arc<MockState>>, uri: axum::http::Uri) -> Response {
    let path = uri.path().to_string();
    state.hit(path.clone());
    (StatusCode::OK, format!("export of {}", path)).into_response()
}
