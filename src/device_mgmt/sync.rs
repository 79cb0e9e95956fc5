use crate::constants::states;
use crate::data_mgmt::models::{Reading, StateUpdate};
use crate::helpers::Zone;

use super::registry::{DeviceRecord, NewDevice, Registry, RegistryError, TANK_SENSOR_TYPE};

#[derive(Debug)]
pub struct Reconciled {
    pub record: DeviceRecord,
    pub created: bool,
}

/// Make sure a local record exists for `remote_id` and write the reading to it.
///
/// Owner, address, capacity and fuel type are written when the record is created, and
/// again later only if one of them is missing (e.g. the first write after creation failed).
pub fn reconcile<R: Registry + ?Sized>(
    remote_id: &str,
    reading: &Reading,
    registry: &R,
    zone: &Zone,
) -> Result<Reconciled, RegistryError> {
    let existing = registry
        .list(TANK_SENSOR_TYPE)?
        .into_iter()
        .find(|record| record.remote_id == remote_id);
    let created = existing.is_none();

    let mut updates = Vec::new();
    let needs_identity = match existing {
        Some(record) => IDENTITY_KEYS
            .iter()
            .any(|key| !record.states.contains_key(*key)),
        None => {
            log::debug!("Unknown TankUtility device: {remote_id}");
            registry.create(NewDevice::tank_sensor(remote_id))?;
            true
        }
    };
    if needs_identity {
        updates.extend(identity_states(reading));
    }
    updates.extend(telemetry_states(reading, zone));

    let record = registry.write_states(remote_id, &updates)?;
    Ok(Reconciled { record, created })
}

const IDENTITY_KEYS: [&str; 4] = [
    states::OWNER_NAME,
    states::TANK_ADDRESS,
    states::CAPACITY,
    states::FUEL_TYPE,
];

fn identity_states(reading: &Reading) -> Vec<StateUpdate> {
    vec![
        StateUpdate::new(states::OWNER_NAME, reading.owner_name.as_str()),
        StateUpdate::new(states::TANK_ADDRESS, reading.address.as_str()),
        StateUpdate::new(states::CAPACITY, reading.capacity_gallons),
        StateUpdate::new(states::FUEL_TYPE, reading.fuel_type.as_str()),
    ]
}

fn telemetry_states(reading: &Reading, zone: &Zone) -> Vec<StateUpdate> {
    vec![
        StateUpdate::with_ui(
            states::SENSOR_VALUE,
            reading.tank_percent,
            reading.percent_display(),
        ),
        StateUpdate::with_ui(
            states::TEMPERATURE,
            reading.temperature_f,
            reading.temperature_display(),
        ),
        StateUpdate::new(states::LAST_UPDATE, reading.last_update_display(zone)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::device_mgmt::registry::mem::MemRegistry;

    const UTC: Zone = Zone::Named(chrono_tz::UTC);

    fn sample_reading() -> Reading {
        Reading {
            tank_percent: 55.5,
            temperature_f: 61.2,
            capacity_gallons: 275.0,
            fuel_type: "propane".into(),
            owner_name: "Backyard".into(),
            address: "123 Main".into(),
            timestamp_ms: 1_700_000_000_000,
        }
    }

    #[test]
    fn creates_unseen_device_with_all_fields() {
        let registry = MemRegistry::default();
        let reconciled = reconcile("dev1", &sample_reading(), &registry, &UTC).unwrap();
        assert!(reconciled.created);

        let record = reconciled.record;
        assert_eq!(record.name, "TankUtility dev1");
        let value = |key: &str| record.states[key].value.clone();
        assert_eq!(value(states::OWNER_NAME).as_str(), Some("Backyard"));
        assert_eq!(value(states::TANK_ADDRESS).as_str(), Some("123 Main"));
        assert_eq!(value(states::CAPACITY).as_f64(), Some(275.0));
        assert_eq!(value(states::FUEL_TYPE).as_str(), Some("propane"));
        assert_eq!(value(states::SENSOR_VALUE).as_f64(), Some(55.5));
        assert_eq!(
            record.states[states::SENSOR_VALUE].ui_value.as_deref(),
            Some("55.50 %")
        );
        assert_eq!(
            record.states[states::TEMPERATURE].ui_value.as_deref(),
            Some("61.2 °F")
        );
        assert_eq!(
            value(states::LAST_UPDATE).as_str(),
            Some("Tue, 14 Nov 2023 22:13:20")
        );
    }

    #[test]
    fn existing_device_only_gets_telemetry() {
        let registry = MemRegistry::default();
        reconcile("dev1", &sample_reading(), &registry, &UTC).unwrap();

        let mut later = sample_reading();
        later.tank_percent = 50.25;
        later.owner_name = "Renamed".into();
        let reconciled = reconcile("dev1", &later, &registry, &UTC).unwrap();

        assert!(!reconciled.created);
        assert_eq!(*registry.creates.borrow(), 1);
        let record = registry.record("dev1").unwrap();
        assert_eq!(
            record.states[states::SENSOR_VALUE].ui_value.as_deref(),
            Some("50.25 %")
        );
        assert_eq!(
            record.states[states::OWNER_NAME].value.as_str(),
            Some("Backyard")
        );
    }

    #[test]
    fn missing_identity_fields_are_restored() {
        let registry = MemRegistry::default();
        // Record created but its first state write never happened
        registry.create(NewDevice::tank_sensor("dev1")).unwrap();

        let reconciled = reconcile("dev1", &sample_reading(), &registry, &UTC).unwrap();
        assert!(!reconciled.created);
        let record = reconciled.record;
        assert_eq!(
            record.states[states::CAPACITY].value.as_f64(),
            Some(275.0)
        );
        assert_eq!(
            record.states[states::OWNER_NAME].value.as_str(),
            Some("Backyard")
        );
        assert_eq!(*registry.creates.borrow(), 1);
    }

    #[test]
    fn rejected_creation_writes_nothing() {
        let registry = MemRegistry::rejecting("dev1");
        assert!(matches!(
            reconcile("dev1", &sample_reading(), &registry, &UTC),
            Err(RegistryError::Creation(..))
        ));
        assert!(registry.records.borrow().is_empty());
    }
}
