use std::sync::Arc;

use picker::{Color, GridConfig, GridGenerator, NarrowingSession, PickerError, Selection, SelectionOutcome};
use session_store::{lock_session, InMemorySessionStore, SessionHandle, SessionStore};
use shared::{
    domain::SessionId,
    error::{ApiError, ErrorCode},
    protocol::{SelectRequest, SessionCreated, ViewModel},
};
use tracing::debug;

#[derive(Clone)]
pub struct ApiContext {
    pub store: Arc<dyn SessionStore>,
    pub generator: GridGenerator,
}

impl ApiContext {
    pub fn new(store: Arc<dyn SessionStore>, config: GridConfig) -> Result<Self, ApiError> {
        let generator = GridGenerator::new(config)?;
        Ok(Self { store, generator })
    }

    pub fn in_memory(config: GridConfig) -> Result<Self, ApiError> {
        Self::new(Arc::new(InMemorySessionStore::new()), config)
    }
}

pub fn start_session(ctx: &ApiContext) -> SessionCreated {
    let session_id = SessionId::new();
    let session = NarrowingSession::new(&ctx.generator);
    let view = session.render();
    ctx.store.put(session_id, session);
    debug!(%session_id, "session started");
    SessionCreated { session_id, view }
}

pub fn get_current_grid(ctx: &ApiContext, session_id: SessionId) -> Result<ViewModel, ApiError> {
    let handle = find_session(ctx, session_id)?;
    let view = lock_session(&handle).render();
    Ok(view)
}

pub fn apply_selection(
    ctx: &ApiContext,
    session_id: SessionId,
    selection: Selection,
) -> Result<ViewModel, ApiError> {
    let handle = find_session(ctx, session_id)?;
    let mut session = lock_session(&handle);
    match session.select(&ctx.generator, selection)? {
        SelectionOutcome::Narrowed { round, center } => {
            debug!(%session_id, ?round, %center, "narrowed");
        }
        SelectionOutcome::Finalized(color) => {
            debug!(%session_id, %color, "colour selected");
        }
    }
    Ok(session.render())
}

pub fn apply_toggle_background(ctx: &ApiContext, session_id: SessionId) -> Result<ViewModel, ApiError> {
    let handle = find_session(ctx, session_id)?;
    let mut session = lock_session(&handle);
    session.toggle_background();
    Ok(session.render())
}

pub fn end_session(ctx: &ApiContext, session_id: SessionId) -> Result<(), ApiError> {
    if ctx.store.delete(session_id) {
        debug!(%session_id, "session ended");
        Ok(())
    } else {
        Err(unknown_session(session_id))
    }
}

pub fn parse_selection(request: &SelectRequest) -> Result<Selection, ApiError> {
    match request {
        SelectRequest::Index { index } => Ok(Selection::Index(*index)),
        SelectRequest::Hex { hex, round } => {
            let color = hex
                .parse::<Color>()
                .map_err(|e| ApiError::from(PickerError::from(e)))?;
            Ok(match *round {
                Some(round) => Selection::Shown { round, color },
                None => Selection::Color(color),
            })
        }
    }
}

pub fn unknown_session(session_id: SessionId) -> ApiError {
    ApiError::new(
        ErrorCode::UnknownSession,
        format!("session {session_id} not found; start a new session"),
    )
}

fn find_session(ctx: &ApiContext, session_id: SessionId) -> Result<SessionHandle, ApiError> {
    ctx.store
        .get(session_id)
        .ok_or_else(|| unknown_session(session_id))
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
