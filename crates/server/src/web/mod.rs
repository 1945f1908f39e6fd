use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
};
use picker::{Color, Round, Selection};
use server_api::{apply_selection, apply_toggle_background, get_current_grid, start_session};
use shared::{
    domain::SessionId,
    error::{ApiError, ErrorCode},
    protocol::ViewModel,
};
use tracing::{info, warn};

use crate::{api::status_for, app_state::AppState};

mod page;

pub(crate) use page::render_page;

pub(crate) const SESSION_COOKIE: &str = "picker_session";

const STALE_PICK_NOTICE: &str = "That colour is not on this grid; pick again.";

pub(crate) async fn index(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    if let Some(session_id) = session_from_cookies(&headers) {
        if let Ok(view) = get_current_grid(&state.api, session_id) {
            return page_response(StatusCode::OK, None, &view, None);
        }
    }
    let created = start_session(&state.api);
    info!(session_id = %created.session_id, "new browser session");
    page_response(StatusCode::OK, Some(created.session_id), &created.view, None)
}

/// `/pick/{round}/{RRGGBB}`: the colour clicked and the round of the grid it
/// was shown in, so picks from a page another tab has moved past are refused.
pub(crate) async fn pick(
    State(state): State<Arc<AppState>>,
    Path((round, hex)): Path<(usize, String)>,
    headers: HeaderMap,
) -> Response {
    let Some(session_id) = session_from_cookies(&headers) else {
        return restart(&state);
    };
    let selection = match shown_selection(round, &hex) {
        Ok(selection) => selection,
        Err(err) => return on_rejected(&state, session_id, err),
    };
    match apply_selection(&state.api, session_id, selection) {
        Ok(_) => Redirect::to("/").into_response(),
        Err(err) => on_rejected(&state, session_id, err),
    }
}

pub(crate) async fn reverse(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let Some(session_id) = session_from_cookies(&headers) else {
        return restart(&state);
    };
    match apply_toggle_background(&state.api, session_id) {
        Ok(_) => Redirect::to("/").into_response(),
        Err(err) => on_rejected(&state, session_id, err),
    }
}

fn shown_selection(round: usize, hex: &str) -> Result<Selection, ApiError> {
    let round = Round::from_index(round).ok_or_else(|| {
        ApiError::new(
            ErrorCode::InvalidSelection,
            format!("round {round} is not a narrowing round"),
        )
    })?;
    let color = hex
        .parse::<Color>()
        .map_err(|e| ApiError::new(ErrorCode::InvalidSelection, e.to_string()))?;
    Ok(Selection::Shown { round, color })
}

pub(crate) async fn healthz() -> &'static str {
    "ok"
}

/// Unknown sessions start over; stale picks re-show the current grid unchanged.
fn on_rejected(state: &AppState, session_id: SessionId, err: ApiError) -> Response {
    match err.code {
        ErrorCode::UnknownSession => restart(state),
        ErrorCode::InvalidSelection => {
            warn!(%session_id, message = %err.message, "rejected selection");
            match get_current_grid(&state.api, session_id) {
                Ok(view) => page_response(StatusCode::BAD_REQUEST, None, &view, Some(STALE_PICK_NOTICE)),
                Err(_) => restart(state),
            }
        }
        code => (status_for(code), err.message).into_response(),
    }
}

fn restart(state: &AppState) -> Response {
    let created = start_session(&state.api);
    info!(session_id = %created.session_id, "restarting browser session");
    let mut headers = HeaderMap::new();
    insert_session_cookie(&mut headers, created.session_id);
    (headers, Redirect::to("/")).into_response()
}

fn page_response(
    status: StatusCode,
    new_session: Option<SessionId>,
    view: &ViewModel,
    notice: Option<&str>,
) -> Response {
    let mut headers = HeaderMap::new();
    if let Some(session_id) = new_session {
        insert_session_cookie(&mut headers, session_id);
    }
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    (status, headers, Html(render_page(view, notice))).into_response()
}

fn insert_session_cookie(headers: &mut HeaderMap, session_id: SessionId) {
    let cookie = format!("{SESSION_COOKIE}={session_id}; Path=/; HttpOnly; SameSite=Lax");
    if let Ok(value) = HeaderValue::from_str(&cookie) {
        headers.insert(header::SET_COOKIE, value);
    }
}

pub(crate) fn session_from_cookies(headers: &HeaderMap) -> Option<SessionId> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| value.parse().ok())
}

#[cfg(test)]
#[path = "tests/mod_tests.rs"]
mod tests;
