pub mod kvpath;
pub mod tank_api;

pub use tank_api::{ApiError, TankUtilityClient};
