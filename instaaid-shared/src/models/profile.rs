use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct Vehicle {
    #[serde(rename = "type", default)]
    pub vehicle_type: Option<String>,
    #[serde(alias = "plateNumber", default)]
    pub plate_number: Option<String>,
}

/// Backend record of the driver. Read-only from this client; the
/// profile-edit flow mutates it server side.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct DriverProfile {
    #[serde(alias = "_id", default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub vehicle: Option<Vehicle>,
    #[serde(alias = "profileCompleted", default)]
    pub profile_completed: bool,
}

impl DriverProfile {
    /// A driver may reach the dashboard either via the explicit backend
    /// flag or by having every required field filled in.
    pub fn is_complete(&self) -> bool {
        if self.profile_completed {
            return true;
        }
        let has_name = self.name.as_deref().is_some_and(|n| !n.is_empty());
        let has_vehicle = self.vehicle.as_ref().is_some_and(|v| {
            v.vehicle_type.as_deref().is_some_and(|t| !t.is_empty())
                && v.plate_number.as_deref().is_some_and(|p| !p.is_empty())
        });
        has_name && has_vehicle
    }
}

/// Outcome of the profile-completeness probe.
#[derive(Debug, Clone)]
pub enum ProfileProbe {
    Found(DriverProfile),
    NotRegistered,
}
