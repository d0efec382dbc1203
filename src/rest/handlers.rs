use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::resolver::{RegisterError, ResolveError};

use super::{
    models::{ErrorResponse, MessageResponse, RepositoryResponse},
    AppState,
};

pub async fn health() -> impl IntoResponse {
    StatusCode::OK
}

pub async fn register(State(state): State<AppState>, body: Bytes) -> Response {
    match state.resolver.register(&body) {
        Ok(entry) => {
            log::info!(
                "Registered {} -> {} (filter {:?})",
                entry.short_name,
                entry.repository_url,
                entry.filter
            );
            (
                StatusCode::OK,
                Json(MessageResponse {
                    message: "Data inserted successfully".to_string(),
                }),
            )
                .into_response()
        }
        Err(RegisterError::BadRequest(err)) => {
            log::warn!("Invalid registration body: {}", err);
            error_response(StatusCode::BAD_REQUEST, "Invalid request body")
        }
        Err(RegisterError::Store(err)) => {
            log::error!("Failed to register repository: {:#}", err);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to insert data into the database",
            )
        }
    }
}

pub async fn version(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    match state.resolver.resolve_version(&name).await {
        Ok(tag) => (StatusCode::OK, tag).into_response(),
        Err(err) => resolve_error_response(&name, err),
    }
}

pub async fn download(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    match state.resolver.resolve_download(&name).await {
        Ok(url) => redirect_response(&name, &url),
        Err(err) => resolve_error_response(&name, err),
    }
}

/// 303 to `url`. The URL comes from the remote feed, so it may not be a
/// valid header value.
fn redirect_response(name: &str, url: &str) -> Response {
    match HeaderValue::from_str(url) {
        Ok(location) => (StatusCode::SEE_OTHER, [(header::LOCATION, location)]).into_response(),
        Err(err) => {
            log::error!("Resolving {}: unusable download URL {:?}: {}", name, url, err);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Invalid download URL")
        }
    }
}

pub async fn list(State(state): State<AppState>) -> Response {
    match state.resolver.list_all() {
        Ok(entries) => {
            let body: Vec<RepositoryResponse> =
                entries.into_iter().map(RepositoryResponse::from).collect();
            Json(body).into_response()
        }
        Err(err) => {
            log::error!("Failed to list repositories: {}", err);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to query the database",
            )
        }
    }
}

pub async fn not_found() -> impl IntoResponse {
    error_response(StatusCode::NOT_FOUND, "endpoint not found")
}

fn resolve_error_response(name: &str, err: ResolveError) -> Response {
    if err.is_not_found() {
        log::info!("Resolving {}: {}", name, err);
    } else {
        log::error!("Resolving {}: {}", name, err);
    }

    let (status, message) = match err {
        ResolveError::NotFound(_) => (StatusCode::NOT_FOUND, "Repository not found"),
        ResolveError::NoVersions(_) => (StatusCode::NOT_FOUND, "No versions found"),
        ResolveError::NoMatchingAsset { .. } => {
            (StatusCode::NOT_FOUND, "No asset found matching the filter")
        }
        ResolveError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Database query error"),
        ResolveError::Fetch(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to fetch data from GitHub",
        ),
    };
    error_response(status, message)
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
        .into_response()
}
