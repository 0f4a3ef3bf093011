use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Mutex;
use instaaid_shared::models::device::PushTokenRegistration;
use instaaid_shared::models::otp::OtpInput;
use instaaid_shared::models::profile::ProfileProbe;
use instaaid_shared::services::backend::{BackendClient, DriverApi};
use instaaid_shared::services::device::PushTokenRegistrar;
use instaaid_shared::services::identity::{FirebasePhoneAuth, IdentityProvider};
use instaaid_shared::state_machine::login_flow::{LoginFlow, LoginState, Route};
use instaaid_shared::utilities::config;
use instaaid_shared::utilities::storage::{keys, KeyValueStore};

/// Terminal-driven login: phone entry, code entry with resend, then the
/// route decision the UI layer would navigate on.
pub async fn run() -> Result<Route, Box<dyn std::error::Error>> {
    let provider: Arc<dyn IdentityProvider> = Arc::new(FirebasePhoneAuth::new(
        config::get_firebase_api_key(),
        config::get_identity_base_url(),
        config::get_secure_token_url(),
    ));
    let api: Arc<dyn DriverApi> = Arc::new(BackendClient::new(config::get_api_url()));
    let store = KeyValueStore::open(config::get_storage_path())?;
    let flow = Arc::new(Mutex::new(LoginFlow::new(
        provider,
        api.clone(),
        store,
        config::get_default_region(),
        config::get_resend_cooldown_secs(),
    )));

    // Cooldown ticker; a scheduled tick, not a busy loop.
    let ticker_flow = flow.clone();
    let ticker = tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(1));
        interval.tick().await; // the first tick fires immediately
        loop {
            interval.tick().await;
            if ticker_flow.lock().await.tick() {
                println!("You can resend the code now.");
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        println!("Enter your 10-digit mobile number:");
        let Some(line) = lines.next_line().await? else {
            ticker.abort();
            return Err("input closed".into());
        };
        let mut guard = flow.lock().await;
        let state = guard.submit_phone(line.trim()).await.clone();
        match state {
            LoginState::AwaitingCode => {
                println!("Code sent to {}.", guard.phone().unwrap_or_default());
                break;
            }
            LoginState::Failed { message } => println!("{}", message),
            _ => {}
        }
    }

    let mut otp = OtpInput::new();
    let route = loop {
        println!("Enter the 6-digit code (or type 'resend'):");
        let Some(line) = lines.next_line().await? else {
            ticker.abort();
            return Err("input closed".into());
        };
        let input = line.trim().to_string();
        let mut guard = flow.lock().await;

        if input.eq_ignore_ascii_case("resend") {
            if guard.resend_ready() {
                guard.resend().await;
                println!("A new code is on its way.");
            } else {
                println!("Resend available in {}s.", guard.seconds_until_resend());
            }
            continue;
        }

        // Mirror the entry screen: the code only submits once all six
        // cells are filled, and the cells empty again after every attempt.
        otp.paste(&input);
        let Some(code) = otp.assembled() else {
            println!("Enter all six digits.");
            otp.clear();
            continue;
        };
        otp.clear();

        let state = guard.submit_code(&code).await.clone();
        match state {
            LoginState::Routed(route) => break route,
            LoginState::Failed { message } => println!("{}", message),
            _ => {}
        }
    };
    ticker.abort();

    match route {
        Route::Dashboard => println!("Profile complete. Opening dashboard."),
        Route::ProfileForm => println!("Almost there. Please complete your driver profile."),
    }

    register_push_token(api).await;

    Ok(route)
}

/// Best-effort push-token registration after a successful login; a
/// failure here must not block the driver.
async fn register_push_token(api: Arc<dyn DriverApi>) {
    let Ok(push_token) = std::env::var("INSTAAID_PUSH_TOKEN") else {
        log::info!("No push token configured, skipping registration");
        return;
    };
    let store = match KeyValueStore::open(config::get_storage_path()) {
        Ok(store) => store,
        Err(err) => {
            log::error!("Could not open storage for push registration: {}", err);
            return;
        }
    };
    let Some(access_token) = store.get_str(keys::ACCESS_TOKEN) else {
        log::info!("No session, skipping push registration");
        return;
    };
    let driver_id = match api.fetch_driver_profile(&access_token).await {
        Ok(ProfileProbe::Found(profile)) => profile.id.unwrap_or_default(),
        _ => String::new(),
    };
    if driver_id.is_empty() {
        log::info!("Driver id unknown, skipping push registration");
        return;
    }

    let mut registrar = PushTokenRegistrar::new(api, store);
    let registration = PushTokenRegistration::new(driver_id, push_token, config::get_platform());
    match registrar.ensure_registered(&registration).await {
        Ok(true) => log::info!("Push token registered"),
        Ok(false) => {}
        Err(err) => log::error!("Push token registration failed: {}", err),
    }
}
