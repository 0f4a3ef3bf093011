use std::fmt;
use std::io;
use phonenumber::ParseError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use reqwest::Error as ReqwestError;
use serde_json::Error as SerdeJsonError;

#[derive(Debug, Serialize, Deserialize)]
pub enum PhoneNumberError {
    InvalidPhoneNumber(String),
    InvalidCountryCode,
    InvalidNumberLength,
    ParseError(String),
}

impl From<ParseError> for PhoneNumberError {
    fn from(err: ParseError) -> Self {
        PhoneNumberError::InvalidPhoneNumber(format!("Invalid phone number {:?}", err))
    }
}

impl fmt::Display for PhoneNumberError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhoneNumberError::InvalidPhoneNumber(msg) => write!(f, "Invalid phone number: {}", msg),
            PhoneNumberError::InvalidCountryCode => write!(f, "Invalid country code"),
            PhoneNumberError::InvalidNumberLength => write!(f, "Enter a valid 10-digit mobile number"),
            PhoneNumberError::ParseError(msg) => write!(f, "Parse error: {}", msg),
        }
    }
}
impl std::error::Error for PhoneNumberError {}

/// Failure modes when asking the identity provider to send an OTP.
#[derive(Debug, Serialize, Deserialize)]
pub enum DispatchError {
    RateLimited,
    MalformedNumber,
    ChallengeFailed,
    Network(String),
    Provider(String),
}

impl DispatchError {
    /// The inline message shown to the driver.
    pub fn user_message(&self) -> &str {
        match self {
            DispatchError::RateLimited => "Too many attempts. Please wait a while and try again.",
            DispatchError::MalformedNumber => "That phone number doesn't look right.",
            DispatchError::ChallengeFailed => "Verification check failed. Please try again.",
            DispatchError::Network(_) => "Couldn't reach the verification service. Check your connection.",
            DispatchError::Provider(_) => "Couldn't send the code. Please try again.",
        }
    }
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::RateLimited => write!(f, "OTP dispatch rate limited"),
            DispatchError::MalformedNumber => write!(f, "Malformed phone number"),
            DispatchError::ChallengeFailed => write!(f, "Anti-abuse challenge failed"),
            DispatchError::Network(msg) => write!(f, "Network error: {}", msg),
            DispatchError::Provider(msg) => write!(f, "Provider error: {}", msg),
        }
    }
}
impl std::error::Error for DispatchError {}

impl From<ReqwestError> for DispatchError {
    fn from(err: ReqwestError) -> Self {
        DispatchError::Network(err.to_string())
    }
}

/// Failure modes when confirming an entered code with the identity provider.
#[derive(Debug, Serialize, Deserialize)]
pub enum VerifyError {
    InvalidCode,
    CodeExpired,
    InvalidSession,
    MissingSession,
    Network(String),
    Provider(String),
}

impl VerifyError {
    pub fn user_message(&self) -> &str {
        match self {
            VerifyError::InvalidCode => "That code is incorrect. Please check and try again.",
            VerifyError::CodeExpired => "That code has expired. Request a new one.",
            VerifyError::InvalidSession => "This verification session is no longer valid. Request a new code.",
            VerifyError::MissingSession => "No verification in progress. Request a new code.",
            VerifyError::Network(_) => "Couldn't reach the verification service. Check your connection.",
            VerifyError::Provider(_) => "Verification failed. Please try again.",
        }
    }

    /// True when the pending verification itself is dead and a retry
    /// with the same handle can never succeed.
    pub fn invalidates_session(&self) -> bool {
        matches!(self, VerifyError::CodeExpired | VerifyError::InvalidSession)
    }
}

impl fmt::Display for VerifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerifyError::InvalidCode => write!(f, "Invalid verification code"),
            VerifyError::CodeExpired => write!(f, "Verification code expired"),
            VerifyError::InvalidSession => write!(f, "Invalid verification session"),
            VerifyError::MissingSession => write!(f, "No pending verification"),
            VerifyError::Network(msg) => write!(f, "Network error: {}", msg),
            VerifyError::Provider(msg) => write!(f, "Provider error: {}", msg),
        }
    }
}
impl std::error::Error for VerifyError {}

impl From<ReqwestError> for VerifyError {
    fn from(err: ReqwestError) -> Self {
        VerifyError::Network(err.to_string())
    }
}

#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("Session expired, please sign in again")]
    SessionExpired,

    #[error("Backend rejected the token exchange: {0}")]
    Rejected(String),

    #[error("Backend returned no access token")]
    EmptyAccessToken,

    #[error("HTTP request failed: {0}")]
    Http(#[from] ReqwestError),
}

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] ReqwestError),

    #[error("Backend returned status {0}")]
    Status(u16),

    #[error("Unexpected profile response: {0}")]
    Decode(String),
}

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] ReqwestError),

    #[error("Backend returned {status}: {message}")]
    Status { status: u16, message: String },
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("Storage encoding failed: {0}")]
    Serde(#[from] SerdeJsonError),
}

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("Failed to dispatch local notification: {0}")]
    DispatchFailed(String),
}
