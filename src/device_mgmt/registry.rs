use std::path::Path;

use kvstore::{KVDb, KVStoreError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::keys;
use crate::data_mgmt::models::{StateUpdate, States};

pub const TANK_SENSOR_TYPE: &str = "tankSensor";
const TANK_SENSOR_DESCRIPTION: &str = "Tank Sensor Device auto-created by TankUtility plugin";
const TANK_SENSOR_NAME_PFX: &str = "TankUtility";

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("device creation rejected for '{0}': {1}")]
    Creation(String, String),
    #[error("no device record for '{0}'")]
    NotFound(String),
    #[error(transparent)]
    Store(#[from] KVStoreError),
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Capabilities {
    pub allow_on_state_change: bool,
    pub supports_on_state: bool,
    pub supports_sensor_value: bool,
    pub supports_status_request: bool,
}

impl Capabilities {
    pub const TANK_SENSOR: Capabilities = Capabilities {
        allow_on_state_change: false,
        supports_on_state: false,
        supports_sensor_value: true,
        supports_status_request: true,
    };
}

/// What the host needs to create a record
#[derive(Clone, Debug, PartialEq)]
pub struct NewDevice {
    pub remote_id: String,
    pub name: String,
    pub device_type: String,
    pub description: String,
    pub capabilities: Capabilities,
}

impl NewDevice {
    pub fn tank_sensor(remote_id: &str) -> Self {
        Self {
            remote_id: remote_id.to_string(),
            name: format!("{TANK_SENSOR_NAME_PFX} {remote_id}"),
            device_type: TANK_SENSOR_TYPE.to_string(),
            description: TANK_SENSOR_DESCRIPTION.to_string(),
            capabilities: Capabilities::TANK_SENSOR,
        }
    }
}

/// Local mirror of one remote tank sensor
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct DeviceRecord {
    pub remote_id: String,
    pub name: String,
    pub device_type: String,
    pub description: String,
    pub capabilities: Capabilities,
    #[serde(default)]
    pub states: States,
}

impl DeviceRecord {
    pub fn apply(&mut self, updates: &[StateUpdate]) {
        self.states
            .extend(updates.iter().cloned().map(StateUpdate::into_entry));
    }
}

impl From<NewDevice> for DeviceRecord {
    fn from(new_device: NewDevice) -> Self {
        Self {
            remote_id: new_device.remote_id,
            name: new_device.name,
            device_type: new_device.device_type,
            description: new_device.description,
            capabilities: new_device.capabilities,
            states: States::new(),
        }
    }
}

/// Device store owned by the host
pub trait Registry {
    /// Records of the given device type
    fn list(&self, device_type: &str) -> Result<Vec<DeviceRecord>, RegistryError>;
    fn create(&self, new_device: NewDevice) -> Result<DeviceRecord, RegistryError>;
    /// Write a batch of state fields; returns the record as stored afterwards
    fn write_states(
        &self,
        remote_id: &str,
        updates: &[StateUpdate],
    ) -> Result<DeviceRecord, RegistryError>;
}

/// Registry kept in the local key/value store, one entry per remote id
pub struct KvRegistry {
    kvs: KVDb,
}

impl KvRegistry {
    pub fn new(kvs: KVDb) -> Self {
        Self { kvs }
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        Ok(Self::new(KVDb::new(path)?))
    }

    fn record_key(remote_id: &str) -> String {
        format!("{}/{}", keys::DEVICE_RECORD_PFX, remote_id)
    }
}

fn check_remote_id(remote_id: &str) -> Result<(), RegistryError> {
    if remote_id.is_empty() {
        return Err(RegistryError::Creation(
            remote_id.into(),
            "empty address".into(),
        ));
    }
    if remote_id.contains('/') || remote_id.contains(char::is_whitespace) {
        return Err(RegistryError::Creation(
            remote_id.into(),
            "address contains '/' or whitespace".into(),
        ));
    }
    Ok(())
}

impl Registry for KvRegistry {
    fn list(&self, device_type: &str) -> Result<Vec<DeviceRecord>, RegistryError> {
        let records: Vec<(String, DeviceRecord)> = self
            .kvs
            .scan_prefix(format!("{}/", keys::DEVICE_RECORD_PFX))?;
        Ok(records
            .into_iter()
            .map(|(_, record)| record)
            .filter(|record| record.device_type == device_type)
            .collect())
    }

    fn create(&self, new_device: NewDevice) -> Result<DeviceRecord, RegistryError> {
        check_remote_id(&new_device.remote_id)?;
        let key = Self::record_key(&new_device.remote_id);
        if self.kvs.get::<DeviceRecord>(&key)?.is_some() {
            return Err(RegistryError::Creation(
                new_device.remote_id,
                "record already exists".into(),
            ));
        }
        let record = DeviceRecord::from(new_device);
        self.kvs.set(&key, &record)?;
        log::info!("Created device record \"{}\"", record.name);
        Ok(record)
    }

    fn write_states(
        &self,
        remote_id: &str,
        updates: &[StateUpdate],
    ) -> Result<DeviceRecord, RegistryError> {
        let key = Self::record_key(remote_id);
        let mut record: DeviceRecord = self
            .kvs
            .get(&key)?
            .ok_or_else(|| RegistryError::NotFound(remote_id.into()))?;
        record.apply(updates);
        self.kvs.set(&key, &record)?;
        Ok(record)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn temp_registry() -> (tempfile::TempDir, KvRegistry) {
        let tempdir = tempfile::tempdir().unwrap();
        let registry = KvRegistry::open(tempdir.path().join("kvs-db/kvstore.db")).unwrap();
        (tempdir, registry)
    }

    #[test]
    fn tank_sensor_defaults() {
        let new_device = NewDevice::tank_sensor("dev1");
        assert_eq!(new_device.name, "TankUtility dev1");
        assert_eq!(new_device.device_type, TANK_SENSOR_TYPE);
        assert!(new_device.capabilities.supports_sensor_value);
        assert!(new_device.capabilities.supports_status_request);
        assert!(!new_device.capabilities.supports_on_state);
        assert!(!new_device.capabilities.allow_on_state_change);
    }

    #[test]
    fn capabilities_use_host_property_names() {
        let json = serde_json::to_value(Capabilities::TANK_SENSOR).unwrap();
        assert_eq!(json["SupportsSensorValue"], true);
        assert_eq!(json["AllowOnStateChange"], false);
    }

    #[test]
    fn create_list_and_write() {
        let (_tempdir, registry) = temp_registry();
        registry.create(NewDevice::tank_sensor("dev1")).unwrap();
        registry.create(NewDevice::tank_sensor("dev2")).unwrap();

        let record = registry
            .write_states("dev1", &[StateUpdate::new("capacity", 275.0)])
            .unwrap();
        assert_eq!(record.states["capacity"].value.as_f64(), Some(275.0));

        let records = registry.list(TANK_SENSOR_TYPE).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].remote_id, "dev1");
        assert_eq!(records[0].states.len(), 1);
        assert!(registry.list("thermostat").unwrap().is_empty());
    }

    #[test]
    fn writes_merge_with_existing_states() {
        let (_tempdir, registry) = temp_registry();
        registry.create(NewDevice::tank_sensor("dev1")).unwrap();
        registry
            .write_states("dev1", &[StateUpdate::new("capacity", 275.0)])
            .unwrap();
        let record = registry
            .write_states(
                "dev1",
                &[StateUpdate::with_ui("sensorValue", 55.5, "55.50 %".into())],
            )
            .unwrap();
        assert_eq!(record.states.len(), 2);
        assert_eq!(
            record.states["sensorValue"].ui_value.as_deref(),
            Some("55.50 %")
        );
    }

    #[test]
    fn rejects_bad_and_duplicate_ids() {
        let (_tempdir, registry) = temp_registry();
        for bad in ["", "a/b", "has space"] {
            assert!(matches!(
                registry.create(NewDevice::tank_sensor(bad)),
                Err(RegistryError::Creation(..))
            ));
        }
        registry.create(NewDevice::tank_sensor("dev1")).unwrap();
        assert!(matches!(
            registry.create(NewDevice::tank_sensor("dev1")),
            Err(RegistryError::Creation(..))
        ));
    }

    #[test]
    fn write_to_unknown_record_fails() {
        let (_tempdir, registry) = temp_registry();
        assert!(matches!(
            registry.write_states("ghost", &[]),
            Err(RegistryError::NotFound(_))
        ));
    }
}
