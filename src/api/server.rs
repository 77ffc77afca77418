//! HTTP server for the bulk import API.
//!
//! Provides REST endpoints for CSV upload and validation. Account creation
//! against the identity backend is the caller's responsibility; this server
//! only parses and partitions.
//!
//! # API Endpoints
//!
//! | Method | Path              | Description                          |
//! |--------|-------------------|--------------------------------------|
//! | GET    | `/health`         | Health check                         |
//! | POST   | `/api/import`     | Upload CSV of prospective users      |
//! | GET    | `/api/logs`       | SSE stream for real-time logs        |

use axum::{
    extract::Multipart,
    http::{header, Method, StatusCode},
    response::{sse::Event, Json, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{convert::Infallible, net::SocketAddr, time::Duration};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::logs::{log_error, log_info, log_success, log_warning, LOG_BROADCASTER};
use super::types::{error_response, ImportResponse};
use crate::import::parse_bytes_auto;

/// Start the HTTP server
pub async fn start_server(port: u16) -> Result<(), Box<dyn std::error::Error>> {
    // Permissive CORS: the admin frontend runs on its own origin in dev
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE]);

    let app = Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/import", post(import_csv))
        .route("/api/logs", get(sse_logs))
        .layer(cors);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    println!("🚀 Altamasiva server running on http://localhost:{}", port);
    println!("   POST /api/import - Upload user CSV");
    println!("   GET  /api/logs   - SSE log stream");
    println!("   GET  /health     - Health check");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "altamasiva",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "import": "POST /api/import",
            "logs": "GET /api/logs (SSE)"
        }
    }))
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(entry) => {
            let json = serde_json::to_string(&entry).ok()?;
            Some(Ok(Event::default().data(json)))
        }
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Upload CSV endpoint
async fn import_csv(
    mut multipart: Multipart,
) -> Result<Json<ImportResponse>, (StatusCode, Json<Value>)> {
    let mut file_data: Option<Vec<u8>> = None;
    let mut file_name: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(error_response(&format!("Multipart error: {}", e))),
        )
    })? {
        let name = field.name().unwrap_or("").to_string();

        if name == "file" {
            file_name = field.file_name().map(|s| s.to_string());
            file_data = Some(
                field
                    .bytes()
                    .await
                    .map_err(|e| {
                        (
                            StatusCode::BAD_REQUEST,
                            Json(error_response(&format!("Read error: {}", e))),
                        )
                    })?
                    .to_vec(),
            );
        }
    }

    let bytes = file_data.ok_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            Json(error_response("No file provided")),
        )
    })?;

    log_info(format!(
        "Nuevo archivo: {} ({} bytes)",
        file_name.as_deref().unwrap_or("sin nombre"),
        bytes.len()
    ));

    // Fatal tier (bad header, undecodable stream) is the file's fault: 400
    let outcome = parse_bytes_auto(&bytes).map_err(|e| {
        log_error(format!("Importación rechazada: {}", e));
        (StatusCode::BAD_REQUEST, Json(error_response(&e.to_string())))
    })?;

    let summary = outcome.report.summary();
    log_success(format!(
        "{} de {} filas aceptadas",
        summary.valid, summary.total
    ));
    for error in &outcome.report.errors {
        log_warning(error.message.clone());
    }

    Ok(Json(ImportResponse::from(outcome)))
}
