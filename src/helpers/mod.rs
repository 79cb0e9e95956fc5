mod load_dotenv;
mod time;

pub use load_dotenv::load_dotenv;
pub use time::{month_key, Zone, DISPLAY_FORMAT};

pub mod base_path;
