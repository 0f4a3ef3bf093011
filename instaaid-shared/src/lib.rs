pub mod models;
pub mod services;
pub mod state_machine;
pub mod utilities;
