mod poll_lock;
mod poller;
pub mod registry;
mod sync;

pub use poll_lock::{PollGuard, PollLock};
pub use poller::{Credentials, PollOutcome, PollSummary, Poller, SyncError};
pub use registry::{DeviceRecord, KvRegistry, NewDevice, Registry, RegistryError, TANK_SENSOR_TYPE};
pub use sync::{reconcile, Reconciled};
