pub mod config;
pub mod driver;
pub mod error;
pub mod sensors;
pub mod test;
pub mod time;
pub mod transport;
pub mod utils;
