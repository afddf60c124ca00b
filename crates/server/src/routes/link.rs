use axum::{extract::State, Json};
use uuid::Uuid;

use wabridge_api::{db, LinkMethod, LinkSessionRequest, LinkSessionResponse};
use wabridge_core::{generate_pairing_code, SessionStatus};

use crate::error::ApiErr;
use crate::routes::parse_body;
use crate::storage::{self, is_constraint_violation, Db};

/// POST /api/link — create a new linking session.
///
/// Pairing requests get a one-shot `WABridge-<8 digits>` code; QR requests
/// get none (the client renders a placeholder image). The session and its
/// default bot settings land in one transaction, and every new session
/// starts out `connecting`.
pub async fn link_session(
    State(db): State<Db>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<LinkSessionResponse>, ApiErr> {
    let req: LinkSessionRequest = parse_body(body)?;

    let session_id = Uuid::new_v4().to_string();
    let pairing_code = match req.method {
        LinkMethod::Pairing => Some(generate_pairing_code().map_err(|e| {
            tracing::error!("pairing code generation: {e}");
            ApiErr::internal("internal server error")
        })?),
        LinkMethod::Qr => None,
    };

    let ts = storage::now();
    db.insert_session_with_settings(
        &db::sessions::InsertParams {
            id: &Uuid::new_v4().to_string(),
            session_id: &session_id,
            phone_number: req.phone_number.as_deref(),
            status: SessionStatus::Connecting.as_str(),
            pairing_code: pairing_code.as_deref(),
            created_at: &ts,
            updated_at: &ts,
        },
        &db::bot_settings::InsertParams {
            id: &Uuid::new_v4().to_string(),
            session_id: &session_id,
            anti_delete_jid: None,
            is_anti_delete_enabled: true,
            created_at: &ts,
            updated_at: &ts,
        },
    )
    .map_err(|e| {
        if is_constraint_violation(&e) {
            ApiErr::conflict("session already exists")
        } else {
            tracing::error!("create session: {e}");
            ApiErr::internal("failed to create session")
        }
    })?;

    tracing::info!("created session {session_id} via {}", req.method);

    Ok(Json(LinkSessionResponse {
        session_id,
        pairing_code,
        status: SessionStatus::Connecting,
    }))
}
