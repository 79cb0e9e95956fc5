//! Daily and monthly fuel usage accounting.
//!
//! Both transitions read the ledger fields from a record's states, treating any
//! field that was never written as 0.0, and produce the state updates to write back.
//! Scheduling them is up to the caller.

use crate::constants::states;

use super::models::{format_gallons, format_percent, state_f64, StateUpdate, States};

/// Gallons used between two tank level readings (in percent).
///
/// A rise in level means the tank was refilled, which counts as no usage.
pub fn daily_usage(previous_reading: f64, current_reading: f64, capacity: f64) -> f64 {
    if current_reading > previous_reading {
        0.0
    } else {
        ((previous_reading - current_reading) / 100.0) * capacity
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Ledger {
    pub previous_reading: f64,
    pub current_month_usage: f64,
    pub monthly_reading: f64,
    pub monthly_usage: f64,
}

impl Ledger {
    pub fn from_states(states: &States) -> Self {
        let field = |key| state_f64(states, key).unwrap_or(0.0);
        Ledger {
            previous_reading: field(states::PREVIOUS_READING),
            current_month_usage: field(states::CURRENT_MONTH_USAGE),
            monthly_reading: field(states::MONTHLY_READING),
            monthly_usage: field(states::MONTHLY_USAGE),
        }
    }

    /// Returns the usage for the day just closed
    pub fn close_day(&mut self, current_reading: f64, capacity: f64) -> f64 {
        let usage = daily_usage(self.previous_reading, current_reading, capacity);
        self.previous_reading = current_reading;
        self.current_month_usage += usage;
        usage
    }

    pub fn close_month(&mut self, current_reading: f64) {
        self.monthly_reading = current_reading;
        self.monthly_usage = self.current_month_usage;
        self.current_month_usage = 0.0;
    }
}

/// Daily transition for one record. `None` if the record has no tank level yet.
pub fn apply_daily(states: &States) -> Option<Vec<StateUpdate>> {
    let current_reading = state_f64(states, states::SENSOR_VALUE)?;
    let capacity = state_f64(states, states::CAPACITY).unwrap_or(0.0);

    let mut ledger = Ledger::from_states(states);
    let previous_reading = ledger.previous_reading;
    let usage = ledger.close_day(current_reading, capacity);
    log::debug!(
        "Daily usage: {:.2} gal ({:.2} % -> {:.2} %)",
        usage,
        previous_reading,
        current_reading
    );

    Some(vec![
        StateUpdate::with_ui(
            states::PREVIOUS_READING,
            ledger.previous_reading,
            format_percent(ledger.previous_reading),
        ),
        StateUpdate::with_ui(
            states::CURRENT_MONTH_USAGE,
            ledger.current_month_usage,
            format_gallons(ledger.current_month_usage),
        ),
        StateUpdate::with_ui(states::DAILY_USAGE, usage, format_gallons(usage)),
    ])
}

/// Monthly transition for one record. `None` if the record has no tank level yet.
///
/// Capacity is not consulted: the month's usage is what the daily transitions
/// accumulated, refills already excluded.
pub fn apply_monthly(states: &States) -> Option<Vec<StateUpdate>> {
    let current_reading = state_f64(states, states::SENSOR_VALUE)?;

    let mut ledger = Ledger::from_states(states);
    log::debug!(
        "Closing month: previous month-end level {:.2} %, now {:.2} %",
        ledger.monthly_reading,
        current_reading
    );
    ledger.close_month(current_reading);

    Some(vec![
        StateUpdate::with_ui(
            states::MONTHLY_READING,
            ledger.monthly_reading,
            format_percent(ledger.monthly_reading),
        ),
        StateUpdate::with_ui(
            states::MONTHLY_USAGE,
            ledger.monthly_usage,
            format_gallons(ledger.monthly_usage),
        ),
        StateUpdate::with_ui(
            states::CURRENT_MONTH_USAGE,
            ledger.current_month_usage,
            format_gallons(ledger.current_month_usage),
        ),
    ])
}
