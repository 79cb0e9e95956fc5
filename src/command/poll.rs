use anyhow::Result;

use crate::device_mgmt::PollOutcome;

use super::{open_poller, open_store};

/// One poll cycle now, as for a status request
pub fn poll() -> Result<()> {
    let kvs = open_store()?;
    let (_, poller) = open_poller(&kvs)?;
    match poller.request_status()? {
        PollOutcome::Completed(summary) => {
            println!(
                "{} device(s): {} created, {} updated, {} skipped",
                summary.listed, summary.created, summary.updated, summary.skipped
            );
        }
        PollOutcome::AlreadyRunning => println!("Poll already in progress"),
    }
    Ok(())
}
