use anyhow::Result;

use super::{open_poller, open_store};

pub fn daily() -> Result<()> {
    let kvs = open_store()?;
    let (_, poller) = open_poller(&kvs)?;
    let updated = poller.run_daily()?;
    println!("Daily usage updated for {updated} device(s)");
    Ok(())
}

pub fn monthly() -> Result<()> {
    let kvs = open_store()?;
    let (_, poller) = open_poller(&kvs)?;
    let updated = poller.run_monthly()?;
    println!("Monthly usage updated for {updated} device(s)");
    Ok(())
}
