use std::env;

use crate::constants::envvars;

pub fn load_dotenv() {
    if dotenv::dotenv().is_ok() {
        println!("Loaded local .env")
    }
    // Also load $TANKMON_DATA_DIR/.env if exists
    if let Ok(data_dir) = env::var(envvars::DATA_DIR) {
        let data_dir_dotenv = format!("{data_dir}/.env");
        if dotenv::from_path(&data_dir_dotenv).is_ok() {
            println!("Loaded {data_dir_dotenv}");
        }
    }
}
