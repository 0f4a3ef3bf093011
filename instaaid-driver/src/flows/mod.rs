pub mod login;
pub mod rides;
