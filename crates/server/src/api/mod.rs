use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use server_api::{
    apply_selection, apply_toggle_background, end_session, get_current_grid, parse_selection,
    start_session,
};
use shared::{
    domain::SessionId,
    error::{ApiError, ErrorCode},
    protocol::{SelectRequest, SessionCreated, ViewModel},
};
use tracing::warn;

use crate::app_state::AppState;

pub(crate) type ApiResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

pub(crate) async fn create_session(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<SessionCreated>) {
    (StatusCode::CREATED, Json(start_session(&state.api)))
}

pub(crate) async fn show_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<ViewModel>> {
    let session_id = parse_session_id(&session_id)?;
    get_current_grid(&state.api, session_id)
        .map(Json)
        .map_err(reject)
}

pub(crate) async fn select(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Json(req): Json<SelectRequest>,
) -> ApiResult<Json<ViewModel>> {
    let session_id = parse_session_id(&session_id)?;
    let selection = parse_selection(&req).map_err(reject)?;
    apply_selection(&state.api, session_id, selection)
        .map(Json)
        .map_err(|e| {
            if e.code == ErrorCode::InvalidSelection {
                warn!(%session_id, message = %e.message, "rejected selection");
            }
            reject(e)
        })
}

pub(crate) async fn toggle_background(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<ViewModel>> {
    let session_id = parse_session_id(&session_id)?;
    apply_toggle_background(&state.api, session_id)
        .map(Json)
        .map_err(reject)
}

pub(crate) async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> ApiResult<StatusCode> {
    let session_id = parse_session_id(&session_id)?;
    end_session(&state.api, session_id).map_err(reject)?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::UnknownSession => StatusCode::NOT_FOUND,
        ErrorCode::InvalidSelection | ErrorCode::Validation => StatusCode::BAD_REQUEST,
        ErrorCode::InvalidRound => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn reject(err: ApiError) -> (StatusCode, Json<ApiError>) {
    (status_for(err.code), Json(err))
}

fn parse_session_id(raw: &str) -> ApiResult<SessionId> {
    raw.parse::<SessionId>().map_err(|_| {
        (
            StatusCode::NOT_FOUND,
            Json(ApiError::new(
                ErrorCode::UnknownSession,
                format!("'{raw}' is not a session id; start a new session"),
            )),
        )
    })
}

#[cfg(test)]
#[path = "tests/mod_tests.rs"]
mod tests;
