use async_trait::async_trait;
use http::StatusCode;
use serde_json::{json, Value};
use crate::models::auth::SessionCredentials;
use crate::models::device::PushTokenRegistration;
use crate::models::errors::{BackendError, ExchangeError, ProfileError};
use crate::models::profile::{DriverProfile, ProfileProbe};

/// The backend REST surface the client consumes.
#[async_trait]
pub trait DriverApi: Send + Sync {
    async fn verify_firebase_token(
        &self,
        id_token: &str,
        role: &str,
    ) -> Result<SessionCredentials, ExchangeError>;

    async fn fetch_driver_profile(&self, access_token: &str) -> Result<ProfileProbe, ProfileError>;

    async fn register_push_token(
        &self,
        registration: &PushTokenRegistration,
    ) -> Result<(), BackendError>;
}

pub struct BackendClient {
    client: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl DriverApi for BackendClient {
    async fn verify_firebase_token(
        &self,
        id_token: &str,
        role: &str,
    ) -> Result<SessionCredentials, ExchangeError> {
        let url = format!("{}/firebase/verify-firebase-token", self.base_url);
        let res = self
            .client
            .post(&url)
            .json(&json!({ "idToken": id_token, "role": role }))
            .send()
            .await?;

        if !res.status().is_success() {
            let text = res.text().await.unwrap_or_default();
            // The distinguished backend rejection: the identity token went
            // stale between confirm and exchange.
            if text.to_lowercase().contains("expired") {
                return Err(ExchangeError::SessionExpired);
            }
            return Err(ExchangeError::Rejected(text));
        }

        let body: Value = res.json().await?;
        extract_session_credentials(&body, role)
    }

    async fn fetch_driver_profile(&self, access_token: &str) -> Result<ProfileProbe, ProfileError> {
        let url = format!("{}/driver/profile", self.base_url);
        let res = self
            .client
            .get(&url)
            .bearer_auth(access_token)
            .send()
            .await?;

        if res.status() == StatusCode::NOT_FOUND {
            return Ok(ProfileProbe::NotRegistered);
        }
        if !res.status().is_success() {
            return Err(ProfileError::Status(res.status().as_u16()));
        }

        let body: Value = res.json().await?;
        let record = unwrap_profile_record(&body);
        let profile: DriverProfile = serde_json::from_value(record.clone())
            .map_err(|e| ProfileError::Decode(e.to_string()))?;
        Ok(ProfileProbe::Found(profile))
    }

    async fn register_push_token(
        &self,
        registration: &PushTokenRegistration,
    ) -> Result<(), BackendError> {
        let url = format!("{}/driver/register-push-token", self.base_url);
        let res = self.client.post(&url).json(registration).send().await?;

        if !res.status().is_success() {
            let status = res.status().as_u16();
            let message = res.text().await.unwrap_or_default();
            return Err(BackendError::Status { status, message });
        }
        Ok(())
    }
}

/// The exchange response arrives in several shapes depending on backend
/// version: tokens at the top level, under `result`, under `tokens`, or
/// under `result.tokens`; keys in either snake or camel case.
pub fn extract_session_credentials(
    body: &Value,
    role: &str,
) -> Result<SessionCredentials, ExchangeError> {
    let candidates = [
        Some(body),
        body.get("result"),
        body.get("tokens"),
        body.get("result").and_then(|r| r.get("tokens")),
    ];

    for candidate in candidates.into_iter().flatten() {
        let access = pick_str(candidate, &["access_token", "accessToken"]);
        if let Some(access) = access.filter(|a| !a.is_empty()) {
            let refresh = pick_str(candidate, &["refresh_token", "refreshToken"]).unwrap_or_default();
            return Ok(SessionCredentials {
                access_token: access,
                refresh_token: refresh,
                role: role.to_string(),
            });
        }
    }
    Err(ExchangeError::EmptyAccessToken)
}

fn pick_str(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|k| value.get(k).and_then(|v| v.as_str()))
        .map(String::from)
}

/// Profile payloads wrap the record as `{driver:{...}}` or `{data:{...}}`,
/// or return it bare.
fn unwrap_profile_record(body: &Value) -> &Value {
    body.get("driver").or_else(|| body.get("data")).unwrap_or(body)
}
