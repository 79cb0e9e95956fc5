//! Names of the state fields written to tank sensor records

pub const SENSOR_VALUE: &str = "sensorValue";
pub const TEMPERATURE: &str = "temperature";
pub const LAST_UPDATE: &str = "last_update";

pub const OWNER_NAME: &str = "owner_name";
pub const TANK_ADDRESS: &str = "tank_address";
pub const CAPACITY: &str = "capacity";
pub const FUEL_TYPE: &str = "fuel_type";

pub const PREVIOUS_READING: &str = "previous_reading";
pub const DAILY_USAGE: &str = "daily_usage";
pub const CURRENT_MONTH_USAGE: &str = "current_month_usage";
pub const MONTHLY_READING: &str = "monthly_reading";
pub const MONTHLY_USAGE: &str = "monthly_usage";
