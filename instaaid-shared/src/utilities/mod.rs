pub mod config;
pub mod countdown;
pub mod geo;
pub mod logging;
pub mod phone_numbers;
pub mod storage;
pub mod test;
