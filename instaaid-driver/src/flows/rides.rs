use std::sync::Arc;
use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use instaaid_shared::models::errors::NotificationError;
use instaaid_shared::models::ride::{RideAlert, RideRequest};
use instaaid_shared::services::ride_alerts::{LocalNotifier, RideAlertService};
use instaaid_shared::utilities::config;
use instaaid_shared::utilities::storage::KeyValueStore;

/// Local notifications rendered to the terminal. A mobile shell would
/// swap in the platform notification API behind the same trait.
pub struct ConsoleNotifier;

#[async_trait]
impl LocalNotifier for ConsoleNotifier {
    async fn notify(&self, alert: &RideAlert) -> Result<(), NotificationError> {
        println!("[{}] {}", alert.title, alert.body);
        log::info!("Notified ride {}", alert.ride_id);
        Ok(())
    }
}

/// Reads pushed ride events as JSON lines from stdin, standing in for
/// the socket channel, and raises a deduplicated alert for each. A line
/// may hold a single ride object or a batch array.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let store = KeyValueStore::open(config::get_storage_path())?;
    let mut service = RideAlertService::new(Arc::new(ConsoleNotifier), store);

    println!("Waiting for ride events (one JSON object or array per line, Ctrl-D to quit):");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Ok(batch) = serde_json::from_str::<Vec<RideRequest>>(line) {
            service.handle_available_rides(&batch).await;
        } else {
            match serde_json::from_str::<RideRequest>(line) {
                Ok(ride) => service.handle_pushed_ride(&ride).await,
                Err(err) => log::warn!("Ignoring unparseable ride event: {}", err),
            }
        }
    }
    Ok(())
}
