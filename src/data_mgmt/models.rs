use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::helpers::Zone;

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(untagged)]
pub enum StateValue {
    Bool(bool),
    Float(f64),
    String(String),
}

impl StateValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            StateValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            StateValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<f64> for StateValue {
    fn from(value: f64) -> Self {
        StateValue::Float(value)
    }
}

impl From<bool> for StateValue {
    fn from(value: bool) -> Self {
        StateValue::Bool(value)
    }
}

impl From<&str> for StateValue {
    fn from(value: &str) -> Self {
        StateValue::String(value.to_string())
    }
}

impl From<String> for StateValue {
    fn from(value: String) -> Self {
        StateValue::String(value)
    }
}

/// Stored value of a single state field, with the string shown to users if it differs
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct StateEntry {
    pub value: StateValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ui_value: Option<String>,
}

pub type States = BTreeMap<String, StateEntry>;

pub fn state_f64(states: &States, key: &str) -> Option<f64> {
    states.get(key).and_then(|s| s.value.as_f64())
}

#[derive(Clone, Debug, PartialEq)]
pub struct StateUpdate {
    pub key: String,
    pub value: StateValue,
    pub ui_value: Option<String>,
}

impl StateUpdate {
    pub fn new(key: &str, value: impl Into<StateValue>) -> Self {
        Self {
            key: key.to_string(),
            value: value.into(),
            ui_value: None,
        }
    }

    pub fn with_ui(key: &str, value: impl Into<StateValue>, ui_value: String) -> Self {
        Self {
            key: key.to_string(),
            value: value.into(),
            ui_value: Some(ui_value),
        }
    }

    pub fn into_entry(self) -> (String, StateEntry) {
        (
            self.key,
            StateEntry {
                value: self.value,
                ui_value: self.ui_value,
            },
        )
    }
}

/// Latest telemetry for one tank, as reported by the cloud service
#[derive(Clone, Debug, PartialEq)]
pub struct Reading {
    pub tank_percent: f64,
    pub temperature_f: f64,
    pub capacity_gallons: f64,
    pub fuel_type: String,
    pub owner_name: String,
    pub address: String,
    pub timestamp_ms: i64,
}

impl Reading {
    pub fn percent_display(&self) -> String {
        format_percent(self.tank_percent)
    }

    pub fn temperature_display(&self) -> String {
        format!("{:.1} °F", self.temperature_f)
    }

    pub fn last_update_display(&self, zone: &Zone) -> String {
        // Timestamp range is checked during normalization
        zone.format_epoch_millis(self.timestamp_ms)
            .unwrap_or_else(|| self.timestamp_ms.to_string())
    }
}

pub fn format_percent(percent: f64) -> String {
    format!("{percent:.2} %")
}

pub fn format_gallons(gallons: f64) -> String {
    format!("{gallons:.2} gal")
}
