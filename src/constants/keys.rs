// Settings keys (stored in SQLITE_STORE)
pub const TU_LOGIN: &str = "tu_login";
pub const TU_PASSWORD: &str = "tu_password";
pub const STATUS_FREQUENCY: &str = "status_frequency";
pub const API_BASE_URL: &str = "api_base_url";
pub const DISPLAY_TIMEZONE: &str = "display_timezone";

// Scheduler markers
pub const LAST_DAILY_RUN: &str = "last_daily_run";
pub const LAST_MONTHLY_RUN: &str = "last_monthly_run";

// Device records live under this prefix, one per remote id
pub const DEVICE_RECORD_PFX: &str = "tank_sensor";
