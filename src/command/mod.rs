mod devices;
mod kvs;
mod poll;
mod run;
mod usage;
mod validate;

pub use devices::devices;
pub use kvs::{kvs_get, kvs_set};
pub use poll::poll;
pub use run::run;
pub use usage::{daily, monthly};
pub use validate::validate;

use anyhow::Result;
use kvstore::KVDb;

use crate::device_mgmt::{KvRegistry, PollLock, Poller};
use crate::interfaces::kvpath;
use crate::settings::{self, Settings};

fn open_store() -> Result<KVDb> {
    Ok(KVDb::new(kvpath::SQLITE_STORE.as_path())?)
}

fn open_poller(kvs: &KVDb) -> Result<(Settings, Poller<KvRegistry>)> {
    let settings = settings::load(kvs)?;
    let registry = KvRegistry::open(kvpath::SQLITE_STORE.as_path())?;
    let lock = PollLock::new(kvpath::POLL_LOCK.as_path());
    let poller = Poller::from_settings(&settings, registry, lock)?;
    Ok((settings, poller))
}
