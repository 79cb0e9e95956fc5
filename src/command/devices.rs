use anyhow::Result;

use crate::device_mgmt::{KvRegistry, Registry, TANK_SENSOR_TYPE};

use super::open_store;

pub fn devices() -> Result<()> {
    let registry = KvRegistry::new(open_store()?);
    let records = registry.list(TANK_SENSOR_TYPE)?;
    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(())
}
