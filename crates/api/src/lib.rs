//! Shared API types and SQL builders for wabridge.
//!
//! This crate is the single source of truth for all API request/response
//! types. The wire format is camelCase JSON, matching what the browser
//! client and bot consumers already speak.

use serde::{Deserialize, Serialize};

#[cfg(feature = "backend")]
pub mod db;

// Re-export the lifecycle types for convenience
pub use wabridge_core::{SessionStatus, TransitionError};

// ─── Linking ─────────────────────────────────────────────────────────────────

/// How a client wants to link its account.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LinkMethod {
    Qr,
    Pairing,
}

impl LinkMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Qr => "qr",
            Self::Pairing => "pairing",
        }
    }
}

impl std::fmt::Display for LinkMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkSessionRequest {
    pub method: LinkMethod,
    #[serde(default)]
    pub phone_number: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkSessionResponse {
    pub session_id: String,
    pub pairing_code: Option<String>,
    pub status: SessionStatus,
}

// ─── Sessions ────────────────────────────────────────────────────────────────

/// A full session row as stored and as returned by the session endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub id: String,
    pub session_id: String,
    pub phone_number: Option<String>,
    pub whatsapp_name: Option<String>,
    pub status: SessionStatus,
    /// Opaque payload written by the linking bot; never interpreted here.
    pub session_data: Option<serde_json::Value>,
    pub pairing_code: Option<String>,
    pub last_active: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSessionRequest {
    pub status: SessionStatus,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub whatsapp_name: Option<String>,
    #[serde(default)]
    pub session_data: Option<serde_json::Value>,
}

/// Minimal payload for the poller — same semantics as a full GET but cheap.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatusResponse {
    pub session_id: String,
    pub status: SessionStatus,
    pub updated_at: String,
}

// ─── Admin ───────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminLoginRequest {
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminLoginResponse {
    pub success: bool,
    pub message: String,
}

/// Per-status counts over all sessions. `total` always equals the sum of
/// the four statuses (connecting sessions are the remainder).
#[derive(Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    pub total: u64,
    pub active: u64,
    pub inactive: u64,
    pub failed: u64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminSessionsResponse {
    pub sessions: Vec<SessionRecord>,
    pub stats: SessionStats,
}

/// Admin settings as exposed over the API — the password column never
/// leaves the server.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminSettingsView {
    pub id: String,
    pub default_anti_delete_jid: Option<String>,
    pub admin_contact: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAdminSettingsRequest {
    #[serde(default)]
    pub default_anti_delete_jid: Option<String>,
    #[serde(default)]
    pub admin_contact: Option<String>,
}

// ─── Bot settings ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotSettingsRecord {
    pub id: String,
    pub session_id: String,
    pub anti_delete_jid: Option<String>,
    pub is_anti_delete_enabled: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBotSettingsRequest {
    #[serde(default)]
    pub anti_delete_jid: Option<String>,
    #[serde(default)]
    pub is_anti_delete_enabled: Option<bool>,
}

// ─── Misc ────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_request_accepts_camel_case_payload() {
        let req: LinkSessionRequest =
            serde_json::from_str(r#"{"method":"pairing","phoneNumber":"+15551234567"}"#).unwrap();
        assert_eq!(req.method, LinkMethod::Pairing);
        assert_eq!(req.phone_number.as_deref(), Some("+15551234567"));

        let req: LinkSessionRequest = serde_json::from_str(r#"{"method":"qr"}"#).unwrap();
        assert_eq!(req.method, LinkMethod::Qr);
        assert!(req.phone_number.is_none());
    }

    #[test]
    fn link_request_rejects_unknown_method() {
        assert!(serde_json::from_str::<LinkSessionRequest>(r#"{"method":"sms"}"#).is_err());
    }

    #[test]
    fn session_record_serializes_camel_case() {
        let rec = SessionRecord {
            id: "row".into(),
            session_id: "sess".into(),
            phone_number: None,
            whatsapp_name: Some("Alice".into()),
            status: SessionStatus::Active,
            session_data: None,
            pairing_code: None,
            last_active: None,
            created_at: "2025-01-01T00:00:00.000000Z".into(),
            updated_at: "2025-01-01T00:00:00.000000Z".into(),
        };
        let v = serde_json::to_value(&rec).unwrap();
        assert_eq!(v["sessionId"], "sess");
        assert_eq!(v["whatsappName"], "Alice");
        assert_eq!(v["status"], "active");
        assert!(v.get("session_id").is_none());
    }

    #[test]
    fn admin_settings_view_has_no_password_field() {
        let view = AdminSettingsView {
            id: "row".into(),
            default_anti_delete_jid: None,
            admin_contact: None,
            created_at: "2025-01-01T00:00:00.000000Z".into(),
            updated_at: "2025-01-01T00:00:00.000000Z".into(),
        };
        let v = serde_json::to_value(&view).unwrap();
        assert!(v.get("adminPassword").is_none());
    }
}
