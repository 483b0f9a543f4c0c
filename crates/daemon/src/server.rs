// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP routes over the measurement store

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::extract::{DefaultBodyLimit, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use meteo_core::{Clock, IngestError};
use meteo_engine::{
    parse_limit, ExportError, ExportRequest, MeasurementStore, QueryError, StoreError,
};
use serde_json::Value;
use tower_http::trace::{DefaultOnResponse, TraceLayer};
use tracing::{error, warn, Level};

use crate::protocol::{ErrorBody, ExportParams, IngestResponse, RecentParams, StatusResponse};

/// Router options taken from the daemon config
#[derive(Debug, Clone, Copy)]
pub struct RouterOptions {
    pub log_requests: bool,
    pub body_limit: usize,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            log_requests: true,
            body_limit: crate::lifecycle::DEFAULT_BODY_LIMIT,
        }
    }
}

struct AppState<C: Clock> {
    store: Arc<MeasurementStore<C>>,
    data_file: PathBuf,
}

impl<C: Clock> Clone for AppState<C> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            data_file: self.data_file.clone(),
        }
    }
}

/// Build the API router
pub fn router<C: Clock + 'static>(store: Arc<MeasurementStore<C>>, options: RouterOptions) -> Router {
    let state = AppState {
        data_file: store.log().path().to_path_buf(),
        store,
    };

    let router = Router::new()
        .route("/api/status", get(status::<C>))
        .route("/api/mediciones", get(recent::<C>).post(ingest::<C>))
        .route("/api/mediciones/ultimo", get(latest::<C>))
        .route("/api/mediciones/export", get(export::<C>))
        .layer(DefaultBodyLimit::max(options.body_limit))
        .with_state(state);

    if options.log_requests {
        router.layer(
            TraceLayer::new_for_http().on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
    } else {
        router
    }
}

async fn status<C: Clock + 'static>(State(state): State<AppState<C>>) -> Json<StatusResponse> {
    Json(StatusResponse::new(state.store.status(), &state.data_file))
}

async fn ingest<C: Clock + 'static>(
    State(state): State<AppState<C>>,
    body: Bytes,
) -> Result<(StatusCode, Json<IngestResponse>), ApiError> {
    let payload: Value = serde_json::from_slice(&body).map_err(|e| {
        warn!(error = %e, "rejected malformed measurement body");
        ApiError::bad_request(format!("body is not valid JSON: {}", e))
    })?;
    let record = state.store.ingest(payload).await?;
    Ok((StatusCode::CREATED, Json(IngestResponse::stored(record))))
}

async fn recent<C: Clock + 'static>(
    State(state): State<AppState<C>>,
    Query(params): Query<RecentParams>,
) -> Result<Response, ApiError> {
    let limit = params.limit.as_deref().map(parse_limit).transpose()?;
    let records = state.store.recent(limit)?;
    Ok(Json(records).into_response())
}

async fn latest<C: Clock + 'static>(State(state): State<AppState<C>>) -> Result<Response, ApiError> {
    let record = state.store.latest()?;
    Ok(Json(record).into_response())
}

async fn export<C: Clock + 'static>(
    State(state): State<AppState<C>>,
    Query(params): Query<ExportParams>,
) -> Result<Response, ApiError> {
    let request = ExportRequest::parse(
        params.format.as_deref(),
        params.from.as_deref(),
        params.to.as_deref(),
    )?;
    let stream = state.store.export(&request).await?;

    let headers = [
        (header::CONTENT_TYPE, request.format.content_type().to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", request.format.file_name()),
        ),
    ];
    Ok((headers, Body::from_stream(stream)).into_response())
}

/// Error response with the status it maps to
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    fn new(status: StatusCode, body: ErrorBody) -> Self {
        Self { status, body }
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, ErrorBody::new(message))
    }

    fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, ErrorBody::new(message))
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Ingest(IngestError::MissingFields { fields }) => Self::new(
                StatusCode::BAD_REQUEST,
                ErrorBody::new("missing required fields").with_missing_fields(&fields),
            ),
            StoreError::Ingest(e) => Self::bad_request(e.to_string()),
            StoreError::Log(e) => {
                error!(error = %e, "measurement could not be written to the log");
                Self::internal("measurement could not be persisted")
            }
        }
    }
}

impl From<QueryError> for ApiError {
    fn from(e: QueryError) -> Self {
        match e {
            QueryError::InvalidLimit => Self::bad_request(e.to_string()),
            QueryError::NotFound => Self::new(StatusCode::NOT_FOUND, ErrorBody::new(e.to_string())),
        }
    }
}

impl From<ExportError> for ApiError {
    fn from(e: ExportError) -> Self {
        match e {
            ExportError::UnsupportedFormat(_) | ExportError::InvalidDate(_) => {
                Self::bad_request(e.to_string())
            }
            ExportError::NoData => Self::new(StatusCode::NOT_FOUND, ErrorBody::new(e.to_string())),
            ExportError::Io(_) | ExportError::Log(_) => {
                error!(error = %e, "export could not start");
                Self::internal("export failed")
            }
        }
    }
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
