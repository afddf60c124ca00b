use axum::{
    extract::{Path, State},
    Json,
};

use wabridge_api::{db, SessionRecord, SessionStatusResponse, UpdateSessionRequest};
use wabridge_core::validate_transition;

use crate::error::ApiErr;
use crate::routes::parse_body;
use crate::storage::{
    self, session_from_row, session_status_from_row, sq_execute, sq_query_opt, sq_query_row, Db,
};

/// GET /api/session/:session_id — full session record (for the bot to
/// retrieve its session data).
pub async fn get_session(
    State(db): State<Db>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionRecord>, ApiErr> {
    let conn = db.conn();
    sq_query_opt(&conn, db::sessions::get_by_session_id(&session_id), session_from_row)
        .map_err(ApiErr::from_db("get session"))?
        .map(Json)
        .ok_or_else(|| ApiErr::not_found("Session not found"))
}

/// GET /api/session-status/:session_id — minimal payload for the poller.
pub async fn get_session_status(
    State(db): State<Db>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionStatusResponse>, ApiErr> {
    let conn = db.conn();
    sq_query_opt(&conn, db::sessions::get_status(&session_id), session_status_from_row)
        .map_err(ApiErr::from_db("get session status"))?
        .map(Json)
        .ok_or_else(|| ApiErr::not_found("Session not found"))
}

/// PUT /api/session/:session_id — merge updates into a session (for the bot
/// updating its own state).
///
/// The requested status must be a legal lifecycle edge from the current one;
/// identity writes are allowed and only refresh timestamps. Every accepted
/// update refreshes `last_active`.
pub async fn update_session(
    State(db): State<Db>,
    Path(session_id): Path<String>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<SessionRecord>, ApiErr> {
    let req: UpdateSessionRequest = parse_body(body)?;

    let conn = db.conn();
    let current = sq_query_opt(&conn, db::sessions::get_by_session_id(&session_id), session_from_row)
        .map_err(ApiErr::from_db("get session"))?
        .ok_or_else(|| ApiErr::not_found("Session not found"))?;

    validate_transition(current.status, req.status)?;

    let session_data = match &req.session_data {
        Some(v) => Some(serde_json::to_string(v).map_err(|e| {
            tracing::error!("serialize session data: {e}");
            ApiErr::bad_request("invalid session data")
        })?),
        None => None,
    };

    let ts = storage::now();
    sq_execute(
        &conn,
        db::sessions::update(
            &session_id,
            &db::sessions::UpdateParams {
                status: Some(req.status.as_str()),
                phone_number: req.phone_number.as_deref(),
                whatsapp_name: req.whatsapp_name.as_deref(),
                session_data: session_data.as_deref(),
                last_active: Some(&ts),
            },
            &ts,
        ),
    )
    .map_err(ApiErr::from_db("update session"))?;

    let updated = sq_query_row(&conn, db::sessions::get_by_session_id(&session_id), session_from_row)
        .map_err(ApiErr::from_db("reread session"))?;
    Ok(Json(updated))
}
