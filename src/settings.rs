use std::fmt;
use std::time::Duration;

use chrono_tz::Tz;
use kvstore::{KVDb, KVStoreError};
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::constants::{defaults, keys};
use crate::helpers::Zone;

#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub login: String,
    pub password: String,
    pub status_frequency_hours: f64,
    pub api_base_url: String,
    pub zone: Zone,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FieldError {
    pub key: &'static str,
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key, self.message)
    }
}

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("invalid settings: {}", join_errors(.0))]
    Invalid(Vec<FieldError>),
    #[error(transparent)]
    Store(#[from] KVStoreError),
}

fn join_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl Settings {
    /// Falls back to the default frequency for values `field_errors` would reject
    pub fn status_interval(&self) -> Duration {
        let hours = if self.frequency_in_range() {
            self.status_frequency_hours
        } else {
            defaults::STATUS_FREQUENCY_HOURS
        };
        Duration::from_secs_f64(hours * 60.0 * 60.0)
    }

    fn frequency_in_range(&self) -> bool {
        self.status_frequency_hours > 0.0
            && self.status_frequency_hours <= defaults::MAX_STATUS_FREQUENCY_HOURS
    }

    /// All problems with the current values, one per field
    pub fn field_errors(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if self.login.chars().count() < defaults::MIN_LOGIN_LEN {
            errors.push(FieldError {
                key: keys::TU_LOGIN,
                message: "Enter your TankUtility login name (email address)".into(),
            });
        }
        if self.password.is_empty() {
            errors.push(FieldError {
                key: keys::TU_PASSWORD,
                message: "Enter your TankUtility login password".into(),
            });
        }
        if !self.frequency_in_range() {
            errors.push(FieldError {
                key: keys::STATUS_FREQUENCY,
                message: format!(
                    "Enter the number of hours between status updates (at most {})",
                    defaults::MAX_STATUS_FREQUENCY_HOURS
                ),
            });
        }
        if !Url::parse(&self.api_base_url).is_ok_and(|url| !url.cannot_be_a_base()) {
            errors.push(FieldError {
                key: keys::API_BASE_URL,
                message: format!("'{}' is not a valid API base URL", self.api_base_url),
            });
        }
        errors
    }
}

// Values written with kvs-set are stored as JSON; numbers and bare strings are both accepted
fn text(kvs: &KVDb, key: &str) -> Result<Option<String>, KVStoreError> {
    Ok(kvs.get::<Value>(key)?.map(|value| match value {
        Value::String(s) => s,
        other => other.to_string(),
    }))
}

pub fn load(kvs: &KVDb) -> Result<Settings, SettingsError> {
    let mut errors = Vec::new();

    let status_frequency_hours = match text(kvs, keys::STATUS_FREQUENCY)? {
        None => defaults::STATUS_FREQUENCY_HOURS,
        Some(raw) => raw.trim().parse::<f64>().unwrap_or(f64::NAN),
    };

    let zone = match text(kvs, keys::DISPLAY_TIMEZONE)? {
        None => Zone::Local,
        Some(name) => match name.parse::<Tz>() {
            Ok(tz) => Zone::Named(tz),
            Err(e) => {
                errors.push(FieldError {
                    key: keys::DISPLAY_TIMEZONE,
                    message: format!("unknown time zone: {e}"),
                });
                Zone::Local
            }
        },
    };

    let settings = Settings {
        login: text(kvs, keys::TU_LOGIN)?.unwrap_or_default(),
        password: text(kvs, keys::TU_PASSWORD)?.unwrap_or_default(),
        status_frequency_hours,
        api_base_url: text(kvs, keys::API_BASE_URL)?
            .unwrap_or_else(|| defaults::API_BASE_URL.to_string()),
        zone,
    };
    log::debug!(
        "statusFrequency = {}h, api = {}",
        settings.status_frequency_hours,
        settings.api_base_url
    );

    errors.extend(settings.field_errors());
    if errors.is_empty() {
        Ok(settings)
    } else {
        Err(SettingsError::Invalid(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_kvs() -> (tempfile::TempDir, KVDb) {
        let tempdir = tempfile::tempdir().unwrap();
        let kvs = KVDb::new(tempdir.path().join("kvs-db/kvstore.db")).unwrap();
        (tempdir, kvs)
    }

    fn invalid_keys(result: Result<Settings, SettingsError>) -> Vec<&'static str> {
        match result {
            Err(SettingsError::Invalid(errors)) => errors.iter().map(|e| e.key).collect(),
            other => panic!("expected invalid settings, got {other:?}"),
        }
    }

    #[test]
    fn defaults_apply() {
        let (_tempdir, kvs) = temp_kvs();
        kvs.set(keys::TU_LOGIN, "user@example.com").unwrap();
        kvs.set(keys::TU_PASSWORD, "secret").unwrap();

        let settings = load(&kvs).unwrap();
        assert_eq!(settings.status_frequency_hours, 12.0);
        assert_eq!(settings.status_interval(), Duration::from_secs(12 * 3600));
        assert_eq!(settings.api_base_url, defaults::API_BASE_URL);
        assert_eq!(settings.zone, Zone::Local);
    }

    #[test]
    fn values_from_store() {
        let (_tempdir, kvs) = temp_kvs();
        kvs.set(keys::TU_LOGIN, "user@example.com").unwrap();
        kvs.set(keys::TU_PASSWORD, 12345).unwrap();
        kvs.set(keys::STATUS_FREQUENCY, "0.5").unwrap();
        kvs.set(keys::API_BASE_URL, "http://localhost:8080/api").unwrap();
        kvs.set(keys::DISPLAY_TIMEZONE, "America/Chicago").unwrap();

        let settings = load(&kvs).unwrap();
        assert_eq!(settings.password, "12345");
        assert_eq!(settings.status_interval(), Duration::from_secs(1800));
        assert_eq!(settings.zone, Zone::Named(chrono_tz::America::Chicago));
    }

    #[test]
    fn all_field_errors_reported_together() {
        let (_tempdir, kvs) = temp_kvs();
        kvs.set(keys::TU_LOGIN, "abcd").unwrap();
        kvs.set(keys::STATUS_FREQUENCY, "often").unwrap();
        kvs.set(keys::API_BASE_URL, "nowhere").unwrap();
        kvs.set(keys::DISPLAY_TIMEZONE, "Mars/Olympus").unwrap();

        assert_eq!(
            invalid_keys(load(&kvs)),
            vec![
                keys::DISPLAY_TIMEZONE,
                keys::TU_LOGIN,
                keys::TU_PASSWORD,
                keys::STATUS_FREQUENCY,
                keys::API_BASE_URL
            ]
        );
    }

    #[test]
    fn login_needs_five_characters() {
        let (_tempdir, kvs) = temp_kvs();
        kvs.set(keys::TU_PASSWORD, "secret").unwrap();
        kvs.set(keys::TU_LOGIN, "a@b.c").unwrap();
        assert!(load(&kvs).is_ok());

        kvs.set(keys::STATUS_FREQUENCY, 0).unwrap();
        assert_eq!(invalid_keys(load(&kvs)), vec![keys::STATUS_FREQUENCY]);
    }

    #[test]
    fn frequency_above_one_year_is_rejected() {
        let (_tempdir, kvs) = temp_kvs();
        kvs.set(keys::TU_LOGIN, "user@example.com").unwrap();
        kvs.set(keys::TU_PASSWORD, "secret").unwrap();

        kvs.set(keys::STATUS_FREQUENCY, "1e16").unwrap();
        assert_eq!(invalid_keys(load(&kvs)), vec![keys::STATUS_FREQUENCY]);

        kvs.set(keys::STATUS_FREQUENCY, 8760).unwrap();
        let settings = load(&kvs).unwrap();
        assert_eq!(settings.status_interval(), Duration::from_secs(8760 * 3600));
    }

    #[test]
    fn out_of_range_interval_does_not_panic() {
        let settings = Settings {
            login: "user@example.com".into(),
            password: "secret".into(),
            status_frequency_hours: 1e16,
            api_base_url: defaults::API_BASE_URL.into(),
            zone: Zone::Local,
        };
        assert_eq!(settings.status_interval(), Duration::from_secs(12 * 3600));
        assert_eq!(
            Settings {
                status_frequency_hours: f64::NAN,
                ..settings
            }
            .status_interval(),
            Duration::from_secs(12 * 3600)
        );
    }

    #[test]
    fn error_message_lists_fields() {
        let err = SettingsError::Invalid(vec![FieldError {
            key: keys::TU_PASSWORD,
            message: "Enter your TankUtility login password".into(),
        }]);
        assert_eq!(
            err.to_string(),
            "invalid settings: tu_password: Enter your TankUtility login password"
        );
    }
}
