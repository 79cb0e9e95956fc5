use std::time::Duration;

pub const API_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
pub const LOG_LEVEL: &str = "INFO";

/// Hours between status polls
pub const STATUS_FREQUENCY_HOURS: f64 = 12.0;
pub const MAX_STATUS_FREQUENCY_HOURS: f64 = 24.0 * 365.0;
pub const SCHEDULER_TICK: Duration = Duration::from_secs(60);

pub const MIN_LOGIN_LEN: usize = 5;

pub const API_BASE_URL: &str = "https://data.tankutility.com/api";
