pub mod mock_api;
pub mod mock_publisher;
pub mod mock_time;

use crate::{
    config::{default_fields, Config},
    sensors::{ds::Field, generator::ReadingGenerator},
};

pub const TEST_SEED: u64 = 42;
/// 2024-11-29T17:00:00Z
pub const REF_TIME: i64 = 1_732_899_600;

pub fn test_fields() -> Vec<Field> {
    default_fields()
}

pub fn seeded_generator() -> ReadingGenerator {
    ReadingGenerator::new(Some(TEST_SEED))
}

pub fn test_config() -> Config {
    let mut cfg = Config::default();
    cfg.simulation.seed = Some(TEST_SEED);
    cfg
}
