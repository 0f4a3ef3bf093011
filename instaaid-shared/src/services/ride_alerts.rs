use std::collections::BTreeSet;
use std::sync::Arc;
use async_trait::async_trait;
use crate::models::errors::NotificationError;
use crate::models::ride::{GeoPoint, RideAlert, RideRequest};
use crate::utilities::geo::haversine_meters;
use crate::utilities::logging::log_error;
use crate::utilities::storage::{keys, KeyValueStore};

/// Interface to the platform's local-notification facility.
#[async_trait]
pub trait LocalNotifier: Send + Sync {
    async fn notify(&self, alert: &RideAlert) -> Result<(), NotificationError>;
}

/// Deduplicating ride notifier. At most one local notification per ride
/// id for the lifetime of the stored set, including across restarts; no
/// TTL. The set is persisted as an ordered list on every change.
pub struct RideAlertService {
    notifier: Arc<dyn LocalNotifier>,
    store: KeyValueStore,
    notified: BTreeSet<String>,
    driver_location: Option<GeoPoint>,
}

impl RideAlertService {
    pub fn new(notifier: Arc<dyn LocalNotifier>, store: KeyValueStore) -> Self {
        let notified = store
            .get_json::<Vec<String>>(keys::NOTIFIED_RIDE_IDS)
            .map(|ids| ids.into_iter().collect())
            .unwrap_or_default();
        Self {
            notifier,
            store,
            notified,
            driver_location: None,
        }
    }

    pub fn set_driver_location(&mut self, location: GeoPoint) {
        self.driver_location = Some(location);
    }

    /// A polled batch of candidate rides.
    pub async fn handle_available_rides(&mut self, rides: &[RideRequest]) {
        for ride in rides {
            self.notify_once(ride).await;
        }
    }

    /// A single socket-pushed ride event.
    pub async fn handle_pushed_ride(&mut self, ride: &RideRequest) {
        self.notify_once(ride).await;
    }

    async fn notify_once(&mut self, ride: &RideRequest) {
        if self.notified.contains(&ride.ride_id) {
            return;
        }

        // Distance defaults to 0 until a driver location is known.
        let distance_meters = self
            .driver_location
            .map(|loc| haversine_meters(&loc, &ride.pickup))
            .unwrap_or(0.0);

        let alert = RideAlert {
            ride_id: ride.ride_id.clone(),
            title: "New ride request".to_string(),
            body: alert_body(ride, distance_meters),
            distance_meters,
        };

        if let Err(err) = self.notifier.notify(&alert).await {
            log_error("ride_notification", &err.to_string());
        }

        self.notified.insert(ride.ride_id.clone());
        let ids: Vec<&String> = self.notified.iter().collect();
        if let Err(err) = self.store.set_json(keys::NOTIFIED_RIDE_IDS, &ids) {
            log_error("ride_notification_persist", &err.to_string());
        }
    }

    pub fn notified_count(&self) -> usize {
        self.notified.len()
    }
}

fn alert_body(ride: &RideRequest, distance_meters: f64) -> String {
    let place = ride
        .pickup_address
        .as_deref()
        .unwrap_or("the pickup point");
    if distance_meters > 0.0 {
        format!("Pickup at {}, {:.1} km away", place, distance_meters / 1000.0)
    } else {
        format!("Pickup at {}", place)
    }
}
