use dotenv::dotenv;
use std::env;

/// Initialize dotenv (only needs to be called once at startup)
pub fn init() {
    if dotenv().is_ok() {
        println!("Loaded .env file");
    } else {
        println!("Failed to load .env file");
    }
}

/// Fetch environment variables by key
pub fn get_env_var(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("Environment variable {} must be set", key))
}

/// Base URL of the dispatch backend REST API
pub fn get_api_url() -> String {
    get_env_var("INSTAAID_API_URL")
}

pub fn get_firebase_api_key() -> String {
    get_env_var("FIREBASE_API_KEY")
}

pub fn get_identity_base_url() -> String {
    env::var("FIREBASE_IDENTITY_URL")
        .unwrap_or_else(|_| "https://identitytoolkit.googleapis.com/v1".to_string())
}

pub fn get_secure_token_url() -> String {
    env::var("FIREBASE_SECURE_TOKEN_URL")
        .unwrap_or_else(|_| "https://securetoken.googleapis.com/v1/token".to_string())
}

/// Region used to complete bare 10-digit numbers into E.164
pub fn get_default_region() -> String {
    env::var("INSTAAID_DEFAULT_REGION").unwrap_or_else(|_| "IN".to_string())
}

/// Path of the on-device key-value store file
pub fn get_storage_path() -> String {
    env::var("INSTAAID_STORAGE_PATH").unwrap_or_else(|_| "instaaid_store.json".to_string())
}

pub fn get_resend_cooldown_secs() -> u32 {
    env::var("RESEND_COOLDOWN_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(60)
}

pub fn get_platform() -> String {
    env::var("INSTAAID_PLATFORM").unwrap_or_else(|_| "android".to_string())
}
