pub mod models;
pub mod normalize;
pub mod usage;

pub use normalize::{device_ids, normalize, NormalizeError};
