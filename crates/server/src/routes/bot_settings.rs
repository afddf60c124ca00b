use axum::{
    extract::{Path, State},
    Json,
};

use wabridge_api::{db, BotSettingsRecord, UpdateBotSettingsRequest};

use crate::error::ApiErr;
use crate::routes::parse_body;
use crate::storage::{self, bot_settings_from_row, sq_execute, sq_query_opt, Db};

/// GET /api/bot-settings/:session_id — the settings row paired with a
/// session. Exists iff the session was ever created (cascades with it).
pub async fn get_settings(
    State(db): State<Db>,
    Path(session_id): Path<String>,
) -> Result<Json<BotSettingsRecord>, ApiErr> {
    let conn = db.conn();
    sq_query_opt(&conn, db::bot_settings::get_by_session_id(&session_id), bot_settings_from_row)
        .map_err(ApiErr::from_db("get bot settings"))?
        .map(Json)
        .ok_or_else(|| ApiErr::not_found("Bot settings not found"))
}

/// PUT /api/bot-settings/:session_id — merge updates into the settings row.
pub async fn update_settings(
    State(db): State<Db>,
    Path(session_id): Path<String>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<BotSettingsRecord>, ApiErr> {
    let req: UpdateBotSettingsRequest = parse_body(body)?;

    let conn = db.conn();
    let changed = sq_execute(
        &conn,
        db::bot_settings::update(
            &session_id,
            &db::bot_settings::UpdateParams {
                anti_delete_jid: req.anti_delete_jid.as_deref(),
                is_anti_delete_enabled: req.is_anti_delete_enabled,
            },
            &storage::now(),
        ),
    )
    .map_err(ApiErr::from_db("update bot settings"))?;

    if changed == 0 {
        return Err(ApiErr::not_found("Bot settings not found"));
    }

    let updated = sq_query_opt(
        &conn,
        db::bot_settings::get_by_session_id(&session_id),
        bot_settings_from_row,
    )
    .map_err(ApiErr::from_db("reread bot settings"))?
    .ok_or_else(|| ApiErr::not_found("Bot settings not found"))?;

    Ok(Json(updated))
}
