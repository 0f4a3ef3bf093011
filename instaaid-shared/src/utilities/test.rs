//! In-memory doubles for the external collaborators, used by unit and
//! flow tests across the workspace.

use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use async_trait::async_trait;
use uuid::Uuid;
use crate::models::auth::{IdentityToken, SessionCredentials, VerificationHandle};
use crate::models::device::PushTokenRegistration;
use crate::models::errors::{
    BackendError, DispatchError, ExchangeError, NotificationError, ProfileError, VerifyError,
};
use crate::models::profile::{DriverProfile, ProfileProbe, Vehicle};
use crate::models::ride::RideAlert;
use crate::services::backend::DriverApi;
use crate::services::identity::IdentityProvider;
use crate::services::ride_alerts::LocalNotifier;

/// A unique file path under the system temp dir for a throwaway store.
pub fn temp_store_path() -> PathBuf {
    std::env::temp_dir().join(format!("instaaid-test-{}.json", Uuid::new_v4()))
}

pub const TEST_ID_TOKEN: &str = "fresh-id-token";

/// Identity provider that accepts one fixed code and counts every call.
pub struct InMemoryIdentityProvider {
    accepted_code: String,
    dispatch_calls: AtomicUsize,
    confirm_calls: AtomicUsize,
    expire_sessions: bool,
}

impl InMemoryIdentityProvider {
    pub fn accepting(code: &str) -> Self {
        Self {
            accepted_code: code.to_string(),
            dispatch_calls: AtomicUsize::new(0),
            confirm_calls: AtomicUsize::new(0),
            expire_sessions: false,
        }
    }

    /// Every confirm attempt fails as an expired session.
    pub fn expiring() -> Self {
        Self {
            accepted_code: String::new(),
            dispatch_calls: AtomicUsize::new(0),
            confirm_calls: AtomicUsize::new(0),
            expire_sessions: true,
        }
    }

    pub fn dispatch_calls(&self) -> usize {
        self.dispatch_calls.load(Ordering::SeqCst)
    }

    pub fn confirm_calls(&self) -> usize {
        self.confirm_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    async fn send_verification_code(
        &self,
        _e164_phone: &str,
    ) -> Result<VerificationHandle, DispatchError> {
        self.dispatch_calls.fetch_add(1, Ordering::SeqCst);
        let id = format!("vrf-{}", Uuid::new_v4());
        let session = format!("sess-{}", Uuid::new_v4());
        Ok(VerificationHandle::new(id, session))
    }

    async fn confirm_code(
        &self,
        _handle: &VerificationHandle,
        code: &str,
    ) -> Result<IdentityToken, VerifyError> {
        self.confirm_calls.fetch_add(1, Ordering::SeqCst);
        if self.expire_sessions {
            return Err(VerifyError::CodeExpired);
        }
        if code == self.accepted_code {
            Ok(IdentityToken {
                id_token: TEST_ID_TOKEN.to_string(),
                refresh_token: Some("refresh".to_string()),
            })
        } else {
            Err(VerifyError::InvalidCode)
        }
    }

    async fn fresh_id_token(&self, _force_refresh: bool) -> Result<String, VerifyError> {
        Ok(TEST_ID_TOKEN.to_string())
    }
}

pub enum StubExchange {
    Accept { access_token: String },
    Expired,
    Rejected,
    EmptyToken,
}

pub enum StubProfileResponse {
    Complete,
    Incomplete,
    NotRegistered,
    NetworkError,
}

/// Backend double with programmable exchange and probe outcomes.
pub struct StubDriverApi {
    exchange: StubExchange,
    profile: StubProfileResponse,
    exchange_calls: AtomicUsize,
    profile_calls: AtomicUsize,
    push_calls: AtomicUsize,
}

impl StubDriverApi {
    pub fn new(exchange: StubExchange, profile: StubProfileResponse) -> Self {
        Self {
            exchange,
            profile,
            exchange_calls: AtomicUsize::new(0),
            profile_calls: AtomicUsize::new(0),
            push_calls: AtomicUsize::new(0),
        }
    }

    /// Exchange succeeds with token "tok", profile is complete.
    pub fn happy() -> Self {
        Self::new(
            StubExchange::Accept {
                access_token: "tok".to_string(),
            },
            StubProfileResponse::Complete,
        )
    }

    pub fn exchange_calls(&self) -> usize {
        self.exchange_calls.load(Ordering::SeqCst)
    }

    pub fn profile_calls(&self) -> usize {
        self.profile_calls.load(Ordering::SeqCst)
    }

    pub fn push_calls(&self) -> usize {
        self.push_calls.load(Ordering::SeqCst)
    }
}

fn complete_profile() -> DriverProfile {
    DriverProfile {
        id: Some("drv-1".to_string()),
        name: Some("Asha".to_string()),
        vehicle: Some(Vehicle {
            vehicle_type: Some("ambulance".to_string()),
            plate_number: Some("KA01AB1234".to_string()),
        }),
        profile_completed: true,
    }
}

#[async_trait]
impl DriverApi for StubDriverApi {
    async fn verify_firebase_token(
        &self,
        _id_token: &str,
        role: &str,
    ) -> Result<SessionCredentials, ExchangeError> {
        self.exchange_calls.fetch_add(1, Ordering::SeqCst);
        match &self.exchange {
            StubExchange::Accept { access_token } => Ok(SessionCredentials {
                access_token: access_token.clone(),
                refresh_token: "refresh".to_string(),
                role: role.to_string(),
            }),
            StubExchange::Expired => Err(ExchangeError::SessionExpired),
            StubExchange::Rejected => Err(ExchangeError::Rejected("invalid token".to_string())),
            StubExchange::EmptyToken => Err(ExchangeError::EmptyAccessToken),
        }
    }

    async fn fetch_driver_profile(&self, _access_token: &str) -> Result<ProfileProbe, ProfileError> {
        self.profile_calls.fetch_add(1, Ordering::SeqCst);
        match self.profile {
            StubProfileResponse::Complete => Ok(ProfileProbe::Found(complete_profile())),
            StubProfileResponse::Incomplete => Ok(ProfileProbe::Found(DriverProfile {
                name: Some("Asha".to_string()),
                ..Default::default()
            })),
            StubProfileResponse::NotRegistered => Ok(ProfileProbe::NotRegistered),
            StubProfileResponse::NetworkError => {
                Err(ProfileError::Decode("connection reset".to_string()))
            }
        }
    }

    async fn register_push_token(
        &self,
        _registration: &PushTokenRegistration,
    ) -> Result<(), BackendError> {
        self.push_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Local notifier that records every alert it is asked to show.
pub struct RecordingNotifier {
    alerts: Mutex<Vec<RideAlert>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self {
            alerts: Mutex::new(Vec::new()),
        }
    }

    pub fn alerts(&self) -> Vec<RideAlert> {
        self.alerts.lock().unwrap().clone()
    }
}

impl Default for RecordingNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LocalNotifier for RecordingNotifier {
    async fn notify(&self, alert: &RideAlert) -> Result<(), NotificationError> {
        self.alerts.lock().unwrap().push(alert.clone());
        Ok(())
    }
}
