use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque handle returned by the identity provider for an in-flight
/// phone verification. For the REST provider this wraps the session
/// string; confirmation must be made against this handle, not a bare id.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct VerificationHandle {
    pub verification_id: String,
    pub session_info: String,
}

impl VerificationHandle {
    pub fn new(verification_id: impl Into<String>, session_info: impl Into<String>) -> Self {
        Self {
            verification_id: verification_id.into(),
            session_info: session_info.into(),
        }
    }
}

/// An in-flight phone-verification attempt. Never persisted; lives only
/// in the confirmation store until the attempt settles or the process exits.
#[derive(Debug, Clone)]
pub struct PendingVerification {
    pub handle: VerificationHandle,
    pub phone: String, // E.164
    pub created_at: DateTime<Utc>,
}

impl PendingVerification {
    pub fn new(handle: VerificationHandle, phone: impl Into<String>) -> Self {
        Self {
            handle,
            phone: phone.into(),
            created_at: Utc::now(),
        }
    }
}

/// Short-lived proof of phone ownership issued by the identity provider,
/// exchanged with the backend for session credentials.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct IdentityToken {
    pub id_token: String,
    pub refresh_token: Option<String>,
}

/// Backend-issued tokens for the authenticated driver. Only ever persisted
/// after the backend confirmed the exchange and returned a non-empty
/// access token.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SessionCredentials {
    pub access_token: String,
    pub refresh_token: String,
    pub role: String,
}

/// The canonical role this client exchanges as.
pub const ROLE_DRIVER: &str = "driver";
