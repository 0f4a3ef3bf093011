use serde::{Deserialize, Serialize};

/// What gets posted to the backend so it can push ride offers to this
/// device.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct PushTokenRegistration {
    #[serde(rename = "driverId")]
    pub driver_id: String,
    #[serde(rename = "pushToken")]
    pub push_token: String,
    pub platform: String,
}

impl PushTokenRegistration {
    pub fn new(
        driver_id: impl Into<String>,
        push_token: impl Into<String>,
        platform: impl Into<String>,
    ) -> Self {
        Self {
            driver_id: driver_id.into(),
            push_token: push_token.into(),
            platform: platform.into(),
        }
    }
}
