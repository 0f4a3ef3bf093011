use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    #[serde(alias = "lat")]
    pub latitude: f64,
    #[serde(alias = "lng", alias = "lon")]
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// A ride offered to this driver, either polled in a batch or pushed
/// over the socket.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RideRequest {
    #[serde(alias = "_id", alias = "rideId")]
    pub ride_id: String,
    pub pickup: GeoPoint,
    #[serde(alias = "pickupAddress", default)]
    pub pickup_address: Option<String>,
    #[serde(alias = "patientName", default)]
    pub patient_name: Option<String>,
}

/// What gets handed to the local-notification layer for one ride.
#[derive(Debug, Clone)]
pub struct RideAlert {
    pub ride_id: String,
    pub title: String,
    pub body: String,
    pub distance_meters: f64,
}
