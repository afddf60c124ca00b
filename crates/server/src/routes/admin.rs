use axum::{
    extract::{Path, State},
    Json,
};

use wabridge_api::{
    db, AdminLoginRequest, AdminLoginResponse, AdminSessionsResponse, AdminSettingsView,
    MessageResponse, SessionRecord, SessionStats, UpdateAdminSettingsRequest,
};
use wabridge_core::SessionStatus;

use crate::error::ApiErr;
use crate::routes::parse_body;
use crate::storage::{
    self, admin_settings_from_row, session_from_row, sq_execute, sq_query_map, sq_query_opt, Db,
};

/// POST /api/admin/login — plaintext password compare against the
/// singleton. No server-side session is issued; the dashboard is a toy
/// surface and is documented as such.
pub async fn login(
    State(db): State<Db>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<AdminLoginResponse>, ApiErr> {
    let req: AdminLoginRequest = parse_body(body)?;
    if req.password.is_empty() {
        return Err(ApiErr::bad_request("password is required"));
    }

    let conn = db.conn();
    let settings = sq_query_opt(
        &conn,
        db::admin_settings::get_singleton(),
        admin_settings_from_row,
    )
    .map_err(ApiErr::from_db("get admin settings"))?;

    match settings {
        Some(s) if s.admin_password == req.password => Ok(Json(AdminLoginResponse {
            success: true,
            message: "Login successful".to_string(),
        })),
        _ => Err(ApiErr::unauthorized("Invalid password")),
    }
}

/// Aggregate per-status counts. `total` covers every session, so connecting
/// sessions are exactly the remainder over the three named buckets.
fn compute_stats(sessions: &[SessionRecord]) -> SessionStats {
    let mut stats = SessionStats {
        total: sessions.len() as u64,
        ..Default::default()
    };
    for s in sessions {
        match s.status {
            SessionStatus::Active => stats.active += 1,
            SessionStatus::Inactive => stats.inactive += 1,
            SessionStatus::Failed => stats.failed += 1,
            SessionStatus::Connecting => {}
        }
    }
    stats
}

/// GET /api/admin/sessions — all sessions, newest first, with stats.
pub async fn list_sessions(
    State(db): State<Db>,
) -> Result<Json<AdminSessionsResponse>, ApiErr> {
    let conn = db.conn();
    let sessions = sq_query_map(&conn, db::sessions::list_newest_first(), session_from_row)
        .map_err(ApiErr::from_db("list sessions"))?;
    let stats = compute_stats(&sessions);
    Ok(Json(AdminSessionsResponse { sessions, stats }))
}

/// DELETE /api/admin/sessions/:session_id — remove a session (any state).
/// Bot settings cascade at the store level.
pub async fn delete_session(
    State(db): State<Db>,
    Path(session_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiErr> {
    let conn = db.conn();
    let removed = sq_execute(&conn, db::sessions::delete(&session_id))
        .map_err(ApiErr::from_db("delete session"))?;
    if removed == 0 {
        return Err(ApiErr::not_found("Session not found"));
    }
    tracing::info!("deleted session {session_id}");
    Ok(Json(MessageResponse {
        message: "Session deleted successfully".to_string(),
    }))
}

/// GET /api/admin/settings — the singleton, minus the password column.
pub async fn get_settings(State(db): State<Db>) -> Result<Json<AdminSettingsView>, ApiErr> {
    let conn = db.conn();
    let row = sq_query_opt(
        &conn,
        db::admin_settings::get_singleton(),
        admin_settings_from_row,
    )
    .map_err(ApiErr::from_db("get admin settings"))?
    .ok_or_else(|| ApiErr::not_found("Admin settings not found"))?;

    Ok(Json(settings_view(row)))
}

/// PUT /api/admin/settings — update contact/default-jid fields. Requires
/// the bootstrap to have created the singleton already.
pub async fn update_settings(
    State(db): State<Db>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<AdminSettingsView>, ApiErr> {
    let req: UpdateAdminSettingsRequest = parse_body(body)?;

    let conn = db.conn();
    let existing = sq_query_opt(
        &conn,
        db::admin_settings::get_singleton(),
        admin_settings_from_row,
    )
    .map_err(ApiErr::from_db("get admin settings"))?
    .ok_or_else(|| ApiErr::not_found("Admin settings not found"))?;

    sq_execute(
        &conn,
        db::admin_settings::update_by_id(
            &existing.id,
            &db::admin_settings::UpdateParams {
                default_anti_delete_jid: req.default_anti_delete_jid.as_deref(),
                admin_contact: req.admin_contact.as_deref(),
            },
            &storage::now(),
        ),
    )
    .map_err(ApiErr::from_db("update admin settings"))?;

    let updated = sq_query_opt(
        &conn,
        db::admin_settings::get_singleton(),
        admin_settings_from_row,
    )
    .map_err(ApiErr::from_db("reread admin settings"))?
    .ok_or_else(|| ApiErr::not_found("Admin settings not found"))?;

    Ok(Json(settings_view(updated)))
}

fn settings_view(row: storage::AdminSettingsRow) -> AdminSettingsView {
    AdminSettingsView {
        id: row.id,
        default_anti_delete_jid: row.default_anti_delete_jid,
        admin_contact: row.admin_contact,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}
