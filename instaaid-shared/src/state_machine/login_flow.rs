use std::sync::Arc;
use crate::models::auth::{PendingVerification, ROLE_DRIVER};
use crate::models::errors::{ExchangeError, VerifyError};
use crate::models::otp::OTP_LENGTH;
use crate::models::profile::ProfileProbe;
use crate::services::backend::DriverApi;
use crate::services::confirmation::ConfirmationStore;
use crate::services::identity::IdentityProvider;
use crate::utilities::countdown::ResendCountdown;
use crate::utilities::logging::{log_error, log_info};
use crate::utilities::phone_numbers;
use crate::utilities::storage::{keys, KeyValueStore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Dashboard,
    ProfileForm,
}

/// One authoritative value for where the login flow stands. Illegal
/// combinations (verifying while already routed, resending mid-exchange)
/// are unrepresentable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginState {
    Idle,
    AwaitingCode,
    Verifying,
    Exchanging,
    CheckingProfile,
    Routed(Route),
    Failed { message: String },
}

impl LoginState {
    /// A network attempt is underway and further input must be ignored.
    fn in_flight(&self) -> bool {
        matches!(
            self,
            LoginState::Verifying | LoginState::Exchanging | LoginState::CheckingProfile
        )
    }

    /// Code entry is accepted in these states.
    fn accepts_code(&self) -> bool {
        matches!(self, LoginState::AwaitingCode | LoginState::Failed { .. })
    }
}

/// Authentication and session bootstrap: phone → OTP → identity token →
/// backend session credentials → profile-based routing.
pub struct LoginFlow {
    provider: Arc<dyn IdentityProvider>,
    api: Arc<dyn DriverApi>,
    store: KeyValueStore,
    confirmations: ConfirmationStore,
    countdown: ResendCountdown,
    state: LoginState,
    region: String,
    phone: Option<String>,
    active_verification: Option<String>,
    last_attempted_code: Option<String>,
}

impl LoginFlow {
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        api: Arc<dyn DriverApi>,
        store: KeyValueStore,
        region: impl Into<String>,
        resend_cooldown_secs: u32,
    ) -> Self {
        Self {
            provider,
            api,
            store,
            confirmations: ConfirmationStore::new(),
            countdown: ResendCountdown::new(resend_cooldown_secs),
            state: LoginState::Idle,
            region: region.into(),
            phone: None,
            active_verification: None,
            last_attempted_code: None,
        }
    }

    pub fn state(&self) -> &LoginState {
        &self.state
    }

    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    pub fn resend_ready(&self) -> bool {
        self.countdown.ready()
    }

    pub fn seconds_until_resend(&self) -> u32 {
        self.countdown.remaining()
    }

    /// One second of the resend cooldown elapsed. Returns true on the
    /// tick that enables resend.
    pub fn tick(&mut self) -> bool {
        self.countdown.tick()
    }

    /// Phone Collector submit. Invalid input fails locally without any
    /// network call; valid input is formatted to E.164 and dispatched.
    pub async fn submit_phone(&mut self, raw_input: &str) -> &LoginState {
        let cleaned = phone_numbers::clean_local_input(raw_input);
        if !phone_numbers::is_valid_local(&cleaned) {
            self.state = LoginState::Failed {
                message: "Enter a valid 10-digit mobile number".to_string(),
            };
            return &self.state;
        }

        let formatted = match phone_numbers::format_e164(&cleaned, &self.region) {
            Ok(phone) => phone,
            Err(err) => {
                log_error("phone_format", &err.to_string());
                self.state = LoginState::Failed {
                    message: err.to_string(),
                };
                return &self.state;
            }
        };

        self.dispatch_code(formatted).await;
        &self.state
    }

    /// Code entry submit. No-op unless the assembled code is exactly six
    /// digits and differs from the last attempted one; a duplicate submit
    /// from a double-tap or re-render never reaches the provider.
    pub async fn submit_code(&mut self, code: &str) -> &LoginState {
        if !self.state.accepts_code() {
            return &self.state;
        }
        if code.len() != OTP_LENGTH || !code.chars().all(|c| c.is_ascii_digit()) {
            return &self.state;
        }
        if self.last_attempted_code.as_deref() == Some(code) {
            return &self.state;
        }

        let Some(verification_id) = self.active_verification.clone() else {
            self.state = LoginState::Failed {
                message: VerifyError::MissingSession.user_message().to_string(),
            };
            return &self.state;
        };
        let Some(pending) = self.confirmations.get(&verification_id).cloned() else {
            self.state = LoginState::Failed {
                message: VerifyError::MissingSession.user_message().to_string(),
            };
            return &self.state;
        };

        self.last_attempted_code = Some(code.to_string());
        self.state = LoginState::Verifying;

        let confirmed = self.provider.clone().confirm_code(&pending.handle, code).await;
        match confirmed {
            Ok(_) => self.bootstrap_session(&verification_id).await,
            Err(err) => {
                log_error("otp_confirm", &err.to_string());
                if err.invalidates_session() {
                    self.confirmations.remove(&verification_id);
                    self.active_verification = None;
                }
                self.state = LoginState::Failed {
                    message: err.user_message().to_string(),
                };
            }
        }
        &self.state
    }

    /// Resend gate: no-op while the cooldown runs or an attempt is in
    /// flight. Otherwise clears the error, rearms the cooldown, and
    /// replaces the stored verification with a fresh dispatch.
    pub async fn resend(&mut self) -> &LoginState {
        if !self.countdown.ready() || self.state.in_flight() {
            return &self.state;
        }
        if matches!(self.state, LoginState::Routed(_)) {
            return &self.state;
        }
        let Some(phone) = self.phone.clone() else {
            return &self.state;
        };

        if let Some(old_id) = self.active_verification.take() {
            self.confirmations.remove(&old_id);
        }
        self.dispatch_code(phone).await;
        &self.state
    }

    /// Drops session credentials and every pending verification.
    pub fn sign_out(&mut self) {
        if let Err(err) = self.store.clear() {
            log_error("sign_out_storage", &err.to_string());
        }
        self.confirmations.clear();
        self.active_verification = None;
        self.last_attempted_code = None;
        self.phone = None;
        self.state = LoginState::Idle;
    }

    pub fn storage(&self) -> &KeyValueStore {
        &self.store
    }

    async fn dispatch_code(&mut self, phone: String) {
        let dispatched = self.provider.clone().send_verification_code(&phone).await;
        match dispatched {
            Ok(handle) => {
                let verification_id = handle.verification_id.clone();
                log_info("otp_dispatch", &format!("Code sent for {}", phone));
                self.confirmations
                    .insert(PendingVerification::new(handle, phone.clone()));
                self.phone = Some(phone);
                self.active_verification = Some(verification_id);
                self.last_attempted_code = None;
                self.countdown.reset();
                self.state = LoginState::AwaitingCode;
            }
            Err(err) => {
                log_error("otp_dispatch", &err.to_string());
                self.state = LoginState::Failed {
                    message: err.user_message().to_string(),
                };
            }
        }
    }

    /// Verified code → fresh identity token → backend exchange → profile
    /// probe → route.
    async fn bootstrap_session(&mut self, verification_id: &str) {
        // A cached identity token can go stale between confirm and
        // exchange and the backend rejects it, so always force refresh.
        let refreshed = self.provider.clone().fresh_id_token(true).await;
        let id_token = match refreshed {
            Ok(token) => token,
            Err(err) => {
                log_error("id_token_refresh", &err.to_string());
                self.state = LoginState::Failed {
                    message: err.user_message().to_string(),
                };
                return;
            }
        };
        if let Err(err) = self.store.set_str(keys::FIREBASE_ID_TOKEN, &id_token) {
            log_error("id_token_persist", &err.to_string());
        }

        self.state = LoginState::Exchanging;
        let exchanged = self.api.clone().verify_firebase_token(&id_token, ROLE_DRIVER).await;
        let credentials = match exchanged {
            Ok(credentials) => credentials,
            Err(ExchangeError::SessionExpired) => {
                log_error("token_exchange", "identity token expired");
                self.confirmations.remove(verification_id);
                self.active_verification = None;
                self.state = LoginState::Failed {
                    message: "Your session expired. Please verify your number again.".to_string(),
                };
                return;
            }
            Err(err) => {
                log_error("token_exchange", &err.to_string());
                self.state = LoginState::Failed {
                    message: "Sign-in failed. Please try again.".to_string(),
                };
                return;
            }
        };

        // Partial or failed exchanges must never reach durable storage.
        if credentials.access_token.is_empty() {
            self.state = LoginState::Failed {
                message: "Sign-in failed. Please try again.".to_string(),
            };
            return;
        }
        if let Err(err) = self.store.set_str(keys::ACCESS_TOKEN, &credentials.access_token) {
            log_error("credentials_persist", &err.to_string());
        }
        if let Err(err) = self.store.set_str(keys::REFRESH_TOKEN, &credentials.refresh_token) {
            log_error("credentials_persist", &err.to_string());
        }
        if let Err(err) = self.store.set_str(keys::ROLE, &credentials.role) {
            log_error("credentials_persist", &err.to_string());
        }

        self.state = LoginState::CheckingProfile;
        let probed = self.api.clone().fetch_driver_profile(&credentials.access_token).await;
        let route = match probed {
            Ok(ProfileProbe::Found(profile)) if profile.is_complete() => Route::Dashboard,
            Ok(ProfileProbe::Found(_)) => Route::ProfileForm,
            Ok(ProfileProbe::NotRegistered) => Route::ProfileForm,
            Err(err) => {
                // A failed probe must not hand an unverified driver the
                // dispatch controls; default to the profile form.
                log_error("profile_probe", &err.to_string());
                Route::ProfileForm
            }
        };

        let complete = route == Route::Dashboard;
        if let Err(err) = self.store.set_json(keys::PROFILE_COMPLETE, &complete) {
            log_error("profile_flag_persist", &err.to_string());
        }

        self.confirmations.remove(verification_id);
        self.active_verification = None;
        self.state = LoginState::Routed(route);
    }
}
