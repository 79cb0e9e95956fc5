#![allow(dead_code)]
// Each test binary only uses some of these helpers

use std::ffi::OsStr;
use std::path::Path;

use assert_cmd::{assert::Assert, Command};
use kvstore::KVDb;

pub const DATA_DIR_ENV: &str = "TANKMON_DATA_DIR";
pub const SAMPLE_LOGIN: &str = "user@example.com";
pub const SAMPLE_PASSWORD: &str = "secret";
pub const SAMPLE_TOKEN: &str = "tok-123";

pub fn cmd_assert(data_dir: impl AsRef<OsStr>, args: &[&str]) -> Assert {
    let mut cmd = Command::cargo_bin("tankmon").unwrap();
    cmd.env(DATA_DIR_ENV, data_dir).args(args).assert()
}

pub fn open_kvs(data_dir: &Path) -> KVDb {
    KVDb::new(data_dir.join("kvs-db/kvstore.db")).unwrap()
}

/// Valid settings pointing at `api_base_url`, with UTC display times
pub fn write_settings(kvs: &KVDb, api_base_url: &str) {
    kvs.set("tu_login", SAMPLE_LOGIN).unwrap();
    kvs.set("tu_password", SAMPLE_PASSWORD).unwrap();
    kvs.set("api_base_url", api_base_url).unwrap();
    kvs.set("display_timezone", "UTC").unwrap();
}

pub fn reading_body(tank: f64) -> String {
    serde_json::json!({
        "device": {
            "name": "Backyard",
            "address": "123 Main",
            "capacity": 275,
            "fuel_type": "propane",
            "lastReading": {
                "tank": tank,
                "temperature": 61.2,
                "time": "1700000000000"
            }
        }
    })
    .to_string()
}
