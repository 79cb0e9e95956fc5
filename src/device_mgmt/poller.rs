//! Poll and accounting entry points invoked by the scheduler or on request.

use std::io;

use thiserror::Error;

use crate::data_mgmt::models::{StateUpdate, States};
use crate::data_mgmt::usage;
use crate::helpers::Zone;
use crate::interfaces::{ApiError, TankUtilityClient};
use crate::settings::Settings;

use super::poll_lock::PollLock;
use super::registry::{Registry, RegistryError, TANK_SENSOR_TYPE};
use super::sync::{reconcile, Reconciled};

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("TankUtility login failure: {0}")]
    Auth(#[source] ApiError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("could not take poll lock: {0}")]
    Lock(#[source] io::Error),
}

#[derive(Clone, Debug)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PollSummary {
    pub listed: usize,
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PollOutcome {
    Completed(PollSummary),
    AlreadyRunning,
}

type Transition = fn(&States) -> Option<Vec<StateUpdate>>;

pub struct Poller<R> {
    client: TankUtilityClient,
    credentials: Credentials,
    registry: R,
    zone: Zone,
    lock: PollLock,
}

impl<R: Registry> Poller<R> {
    pub fn new(
        client: TankUtilityClient,
        credentials: Credentials,
        registry: R,
        zone: Zone,
        lock: PollLock,
    ) -> Self {
        Self {
            client,
            credentials,
            registry,
            zone,
            lock,
        }
    }

    pub fn from_settings(
        settings: &Settings,
        registry: R,
        lock: PollLock,
    ) -> Result<Self, ApiError> {
        Ok(Self::new(
            TankUtilityClient::new(&settings.api_base_url)?,
            Credentials {
                username: settings.login.clone(),
                password: settings.password.clone(),
            },
            registry,
            settings.zone,
            lock,
        ))
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    /// Log in, list remote devices and mirror each one's latest reading.
    ///
    /// A failure on one device is logged and the remaining devices are still processed.
    /// Only a login or device list failure fails the whole poll.
    /// While another process holds the poll lock nothing is fetched.
    pub fn poll_now(&self) -> Result<PollOutcome, SyncError> {
        let Some(_guard) = self.lock.try_acquire().map_err(SyncError::Lock)? else {
            log::warn!("Poll already in progress; ignoring request");
            return Ok(PollOutcome::AlreadyRunning);
        };

        let token = self
            .client
            .login(&self.credentials.username, &self.credentials.password)
            .map_err(|e| {
                log::error!("TankUtility login failure: {e}");
                SyncError::Auth(e)
            })?;

        let device_ids = self.client.list_devices(&token).map_err(|e| {
            log::error!("Could not list TankUtility devices: {e}");
            SyncError::Api(e)
        })?;
        let mut summary = PollSummary {
            listed: device_ids.len(),
            ..Default::default()
        };

        for device_id in &device_ids {
            match self.sync_device(&token, device_id) {
                Ok(Reconciled { created, .. }) => {
                    summary.updated += 1;
                    if created {
                        summary.created += 1;
                    }
                }
                Err(e) => {
                    log::error!("Skipping device {device_id}: {e}");
                    summary.skipped += 1;
                }
            }
        }

        log::info!(
            "Poll complete: {} listed, {} created, {} updated, {} skipped",
            summary.listed,
            summary.created,
            summary.updated,
            summary.skipped
        );
        Ok(PollOutcome::Completed(summary))
    }

    fn sync_device(&self, token: &str, device_id: &str) -> Result<Reconciled, SyncError> {
        let reading = self.client.fetch_reading(token, device_id)?;
        Ok(reconcile(device_id, &reading, &self.registry, &self.zone)?)
    }

    /// Explicit status request outside the schedule; refreshes every device
    pub fn request_status(&self) -> Result<PollOutcome, SyncError> {
        log::info!("Status requested");
        self.poll_now()
    }

    pub fn run_daily(&self) -> Result<usize, SyncError> {
        self.run_accounting("Daily", usage::apply_daily)
    }

    pub fn run_monthly(&self) -> Result<usize, SyncError> {
        self.run_accounting("Monthly", usage::apply_monthly)
    }

    fn run_accounting(&self, label: &str, transition: Transition) -> Result<usize, SyncError> {
        let mut updated = 0;
        for record in self.registry.list(TANK_SENSOR_TYPE)? {
            let Some(updates) = transition(&record.states) else {
                log::debug!("{label}: \"{}\" has no tank level yet", record.name);
                continue;
            };
            match self.registry.write_states(&record.remote_id, &updates) {
                Ok(_) => updated += 1,
                Err(e) => log::error!("{label}: could not update \"{}\": {e}", record.name),
            }
        }
        log::info!("{label} usage accounting updated {updated} device(s)");
        Ok(updated)
    }
}
