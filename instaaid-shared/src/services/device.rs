use std::sync::Arc;
use crate::models::device::PushTokenRegistration;
use crate::models::errors::BackendError;
use crate::services::backend::DriverApi;
use crate::utilities::logging::log_error;
use crate::utilities::storage::{keys, KeyValueStore};

/// Registers the device's push token with the backend so ride offers can
/// be pushed to it. The last registered token is cached in storage and
/// an unchanged token skips the network call.
pub struct PushTokenRegistrar {
    api: Arc<dyn DriverApi>,
    store: KeyValueStore,
}

impl PushTokenRegistrar {
    pub fn new(api: Arc<dyn DriverApi>, store: KeyValueStore) -> Self {
        Self { api, store }
    }

    /// Returns true when a registration was actually sent.
    pub async fn ensure_registered(
        &mut self,
        registration: &PushTokenRegistration,
    ) -> Result<bool, BackendError> {
        if self.store.get_str(keys::PUSH_TOKEN).as_deref() == Some(registration.push_token.as_str()) {
            log::info!("Push token unchanged, skipping registration");
            return Ok(false);
        }

        self.api.register_push_token(registration).await?;

        if let Err(err) = self.store.set_str(keys::PUSH_TOKEN, &registration.push_token) {
            log_error("push_token_cache", &err.to_string());
        }
        Ok(true)
    }
}
