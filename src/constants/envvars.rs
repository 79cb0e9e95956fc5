pub const DATA_DIR: &str = "TANKMON_DATA_DIR";

pub const LOG_LEVEL: &str = "LOG_LEVEL";
