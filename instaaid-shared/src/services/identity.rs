use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::RwLock;
use crate::models::auth::{IdentityToken, VerificationHandle};
use crate::models::errors::{DispatchError, VerifyError};

/// Single-shot view of the identity provider's phone-verification
/// capability. The REST adapter below flattens the provider's
/// session/listener model into these three calls so the login flow never
/// sees an event subscription.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Asks the provider to SMS a code to `e164_phone`. The provider
    /// delivers the SMS out of band; the returned handle is what the
    /// confirm step must be made against.
    async fn send_verification_code(
        &self,
        e164_phone: &str,
    ) -> Result<VerificationHandle, DispatchError>;

    /// Exchanges the six digits the driver entered for an identity token.
    async fn confirm_code(
        &self,
        handle: &VerificationHandle,
        code: &str,
    ) -> Result<IdentityToken, VerifyError>;

    /// Identity token of the currently confirmed user. `force_refresh`
    /// trades the refresh token for a fresh one; the backend rejects
    /// stale cached tokens, so the bootstrap flow always forces.
    async fn fresh_id_token(&self, force_refresh: bool) -> Result<String, VerifyError>;
}

/// Firebase identity-toolkit REST adapter.
pub struct FirebasePhoneAuth {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    secure_token_url: String,
    current: RwLock<Option<IdentityToken>>,
}

impl FirebasePhoneAuth {
    pub fn new(api_key: String, base_url: String, secure_token_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url,
            secure_token_url,
            current: RwLock::new(None),
        }
    }

    fn endpoint(&self, action: &str) -> String {
        format!("{}/accounts:{}?key={}", self.base_url, action, self.api_key)
    }
}

#[async_trait]
impl IdentityProvider for FirebasePhoneAuth {
    async fn send_verification_code(
        &self,
        e164_phone: &str,
    ) -> Result<VerificationHandle, DispatchError> {
        let res = self
            .client
            .post(self.endpoint("sendVerificationCode"))
            .json(&json!({ "phoneNumber": e164_phone }))
            .send()
            .await?;

        if !res.status().is_success() {
            let body: Value = res.json().await.unwrap_or_default();
            let message = provider_error_message(&body);
            log::warn!("OTP dispatch rejected: {}", message);
            return Err(map_dispatch_error(&message));
        }

        let body: Value = res.json().await?;
        let session = body
            .get("sessionInfo")
            .and_then(|v| v.as_str())
            .ok_or_else(|| DispatchError::Provider("Missing sessionInfo".to_string()))?;

        Ok(VerificationHandle::new(session, session))
    }

    async fn confirm_code(
        &self,
        handle: &VerificationHandle,
        code: &str,
    ) -> Result<IdentityToken, VerifyError> {
        let res = self
            .client
            .post(self.endpoint("signInWithPhoneNumber"))
            .json(&json!({ "sessionInfo": handle.session_info, "code": code }))
            .send()
            .await?;

        if !res.status().is_success() {
            let body: Value = res.json().await.unwrap_or_default();
            let message = provider_error_message(&body);
            log::warn!("Code confirmation rejected: {}", message);
            return Err(map_verify_error(&message));
        }

        let body: Value = res.json().await?;
        let id_token = body
            .get("idToken")
            .and_then(|v| v.as_str())
            .ok_or_else(|| VerifyError::Provider("Missing idToken".to_string()))?;
        let refresh_token = body
            .get("refreshToken")
            .and_then(|v| v.as_str())
            .map(String::from);

        let token = IdentityToken {
            id_token: id_token.to_string(),
            refresh_token,
        };
        *self.current.write().await = Some(token.clone());
        Ok(token)
    }

    async fn fresh_id_token(&self, force_refresh: bool) -> Result<String, VerifyError> {
        let mut guard = self.current.write().await;
        let current = guard.as_mut().ok_or(VerifyError::MissingSession)?;

        if !force_refresh {
            return Ok(current.id_token.clone());
        }

        let Some(refresh_token) = current.refresh_token.clone() else {
            // No refresh token to trade; the confirm-time token is the
            // freshest we have.
            log::warn!("Forced refresh requested without a refresh token");
            return Ok(current.id_token.clone());
        };

        let res = self
            .client
            .post(format!("{}?key={}", self.secure_token_url, self.api_key))
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token.as_str()),
            ])
            .send()
            .await?;

        if !res.status().is_success() {
            let body: Value = res.json().await.unwrap_or_default();
            let message = provider_error_message(&body);
            return Err(map_verify_error(&message));
        }

        let body: Value = res.json().await?;
        let id_token = body
            .get("id_token")
            .and_then(|v| v.as_str())
            .ok_or_else(|| VerifyError::Provider("Missing id_token in refresh".to_string()))?;

        current.id_token = id_token.to_string();
        if let Some(rt) = body.get("refresh_token").and_then(|v| v.as_str()) {
            current.refresh_token = Some(rt.to_string());
        }
        Ok(current.id_token.clone())
    }
}

fn provider_error_message(body: &Value) -> String {
    body.get("error")
        .and_then(|e| e.get("message"))
        .and_then(|m| m.as_str())
        .unwrap_or("UNKNOWN")
        .to_string()
}

fn map_dispatch_error(message: &str) -> DispatchError {
    if message.starts_with("TOO_MANY_ATTEMPTS") || message.starts_with("QUOTA_EXCEEDED") {
        DispatchError::RateLimited
    } else if message.starts_with("INVALID_PHONE_NUMBER") || message.starts_with("MISSING_PHONE_NUMBER") {
        DispatchError::MalformedNumber
    } else if message.starts_with("CAPTCHA_CHECK_FAILED") || message.starts_with("MISSING_RECAPTCHA") {
        DispatchError::ChallengeFailed
    } else {
        DispatchError::Provider(message.to_string())
    }
}

fn map_verify_error(message: &str) -> VerifyError {
    if message.starts_with("INVALID_CODE") || message.starts_with("MISSING_CODE") {
        VerifyError::InvalidCode
    } else if message.starts_with("SESSION_EXPIRED") || message.starts_with("CODE_EXPIRED") || message.starts_with("TOKEN_EXPIRED") {
        VerifyError::CodeExpired
    } else if message.starts_with("INVALID_SESSION_INFO") || message.starts_with("MISSING_SESSION_INFO") {
        VerifyError::InvalidSession
    } else {
        VerifyError::Provider(message.to_string())
    }
}
