pub mod ds;
pub mod generator;
