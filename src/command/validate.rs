use anyhow::{anyhow, Result};

use crate::settings::{self, SettingsError};

use super::open_store;

pub fn validate() -> Result<()> {
    let kvs = open_store()?;
    match settings::load(&kvs) {
        Ok(settings) => {
            println!(
                "Settings OK (login {}, status every {}h)",
                settings.login, settings.status_frequency_hours
            );
            Ok(())
        }
        Err(SettingsError::Invalid(errors)) => {
            for error in &errors {
                println!("{error}");
            }
            Err(anyhow!("{} setting(s) need attention", errors.len()))
        }
        Err(e) => Err(e.into()),
    }
}
