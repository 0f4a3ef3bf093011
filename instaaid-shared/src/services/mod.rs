pub mod backend;
pub mod confirmation;
pub mod device;
pub mod identity;
pub mod ride_alerts;
