use chrono::DateTime;
use serde_json::Value;
use thiserror::Error;

use super::models::Reading;

const DEVICES: &str = "devices";
const NAME: &str = "device.name";
const ADDRESS: &str = "device.address";
const CAPACITY: &str = "device.capacity";
const FUEL_TYPE: &str = "device.fuel_type";
const TANK: &str = "device.lastReading.tank";
const TEMPERATURE: &str = "device.lastReading.temperature";
const TIME: &str = "device.lastReading.time";

#[derive(Error, Debug, PartialEq)]
pub enum NormalizeError {
    #[error("missing field '{0}'")]
    MissingField(&'static str),
    #[error("field '{0}' has the wrong type")]
    WrongType(&'static str),
    #[error("invalid timestamp: {0}")]
    Timestamp(String),
}

/// Build a [`Reading`] from the body of a device reading response.
///
/// Every field is required; a payload missing any of them is rejected as a whole
/// rather than filled in with defaults.
pub fn normalize(raw: &Value) -> Result<Reading, NormalizeError> {
    Ok(Reading {
        tank_percent: number(raw, TANK)?,
        temperature_f: number(raw, TEMPERATURE)?,
        capacity_gallons: number(raw, CAPACITY)?,
        fuel_type: string(raw, FUEL_TYPE)?,
        owner_name: string(raw, NAME)?,
        address: string(raw, ADDRESS)?,
        timestamp_ms: timestamp_millis(raw, TIME)?,
    })
}

/// Remote device ids from the body of a device list response
pub fn device_ids(raw: &Value) -> Result<Vec<String>, NormalizeError> {
    lookup(raw, DEVICES)?
        .as_array()
        .ok_or(NormalizeError::WrongType(DEVICES))?
        .iter()
        .map(|id| {
            id.as_str()
                .map(str::to_owned)
                .ok_or(NormalizeError::WrongType(DEVICES))
        })
        .collect()
}

fn lookup<'a>(raw: &'a Value, path: &'static str) -> Result<&'a Value, NormalizeError> {
    let pointer = format!("/{}", path.replace('.', "/"));
    raw.pointer(&pointer)
        .filter(|v| !v.is_null())
        .ok_or(NormalizeError::MissingField(path))
}

fn number(raw: &Value, path: &'static str) -> Result<f64, NormalizeError> {
    lookup(raw, path)?
        .as_f64()
        .ok_or(NormalizeError::WrongType(path))
}

fn string(raw: &Value, path: &'static str) -> Result<String, NormalizeError> {
    lookup(raw, path)?
        .as_str()
        .map(str::to_owned)
        .ok_or(NormalizeError::WrongType(path))
}

// Epoch milliseconds, sent either as a JSON number or as a numeric string
fn timestamp_millis(raw: &Value, path: &'static str) -> Result<i64, NormalizeError> {
    let millis = match lookup(raw, path)? {
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|e| NormalizeError::Timestamp(format!("{s:?}: {e}")))?,
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .ok_or_else(|| NormalizeError::Timestamp(n.to_string()))?,
        _ => return Err(NormalizeError::WrongType(path)),
    };
    if DateTime::from_timestamp_millis(millis).is_none() {
        return Err(NormalizeError::Timestamp(format!("{millis} is out of range")));
    }
    Ok(millis)
}
