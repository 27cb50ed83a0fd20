pub mod live;
pub mod populate;
