pub mod auth;
pub mod device;
pub mod errors;
pub mod otp;
pub mod profile;
pub mod ride;
