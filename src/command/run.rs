use std::thread;
use std::time::Instant;

use anyhow::Result;
use chrono::NaiveDate;
use kvstore::KVDb;

use crate::constants::{defaults, keys};
use crate::device_mgmt::{Poller, Registry};
use crate::helpers::month_key;

use super::{open_poller, open_store};

/// Which calendar-based accounting runs are due
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct CalendarDue {
    daily: bool,
    monthly: bool,
}

/// Nothing is due until a previous run has been recorded
fn calendar_due(
    last_daily: Option<NaiveDate>,
    last_monthly: Option<&str>,
    today: NaiveDate,
) -> CalendarDue {
    CalendarDue {
        daily: last_daily.is_some_and(|last| today > last),
        monthly: last_monthly.is_some_and(|last| last != month_key(today)),
    }
}

/// Start the scheduler: poll every status interval and run daily/monthly accounting
pub fn run() -> Result<()> {
    let kvs = open_store()?;
    let (settings, poller) = open_poller(&kvs)?;
    let status_interval = settings.status_interval();

    log::info!(
        "Starting TankUtility scheduler; status frequency {}h",
        settings.status_frequency_hours
    );

    let mut next_status_check = Instant::now();
    loop {
        if Instant::now() >= next_status_check {
            // Failures are logged by the poller; the next tick retries the whole cycle
            if let Err(e) = poller.poll_now() {
                log::debug!("Poll cycle failed: {e}");
            }
            next_status_check = Instant::now() + status_interval;
        }

        if let Err(e) = run_calendar_accounting(&kvs, &poller, settings.zone.today()) {
            log::error!("Usage accounting error: {e}");
        }

        thread::sleep(defaults::SCHEDULER_TICK);
    }
}

fn run_calendar_accounting<R: Registry>(
    kvs: &KVDb,
    poller: &Poller<R>,
    today: NaiveDate,
) -> Result<CalendarDue> {
    let last_daily = kvs
        .get::<String>(keys::LAST_DAILY_RUN)?
        .and_then(|d| d.parse::<NaiveDate>().ok());
    let last_monthly = kvs.get::<String>(keys::LAST_MONTHLY_RUN)?;
    let due = calendar_due(last_daily, last_monthly.as_deref(), today);

    // Daily first, so the last day of the month is counted before the snapshot
    if due.daily {
        poller.run_daily()?;
    }
    if due.daily || last_daily.is_none() {
        kvs.set(keys::LAST_DAILY_RUN, today.to_string())?;
    }

    if due.monthly {
        poller.run_monthly()?;
    }
    if due.monthly || last_monthly.is_none() {
        kvs.set(keys::LAST_MONTHLY_RUN, month_key(today))?;
    }

    Ok(due)
}
