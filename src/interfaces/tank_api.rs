use std::sync::{Mutex, PoisonError};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use ureq::tls::{TlsConfig, TlsProvider};
use url::Url;

use crate::constants::defaults;
use crate::data_mgmt::{self, models::Reading, NormalizeError};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("request failed: {0}")]
    Transport(#[from] ureq::Error),
    #[error("malformed payload: {0}")]
    MalformedPayload(#[from] NormalizeError),
    #[error("invalid API base URL '{0}'")]
    BaseUrl(String),
}

#[derive(Debug, Deserialize, Serialize)]
struct TokenResponse {
    token: String,
}

/// Blocking client for the TankUtility cloud API
pub struct TankUtilityClient {
    agent: ureq::Agent,
    base_url: Url,
    token: Mutex<String>,
}

fn get_ureq_agent() -> ureq::Agent {
    let config = ureq::Agent::config_builder()
        .timeout_global(Some(defaults::API_REQUEST_TIMEOUT))
        .tls_config(
            TlsConfig::builder()
                .provider(TlsProvider::NativeTls)
                .build(),
        )
        .build();
    ureq::Agent::new_with_config(config)
}

fn basic_auth(username: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{username}:{password}")))
}

impl TankUtilityClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let base_url =
            Url::parse(base_url).map_err(|_| ApiError::BaseUrl(base_url.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::BaseUrl(base_url.to_string()));
        }
        Ok(Self {
            agent: get_ureq_agent(),
            base_url,
            token: Mutex::new(String::new()),
        })
    }

    /// Token from the last successful login; empty if the last login failed
    pub fn token(&self) -> String {
        self.token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn login(&self, username: &str, password: &str) -> Result<String, ApiError> {
        let result = self.request_token(username, password);
        let mut cached = self.token.lock().unwrap_or_else(PoisonError::into_inner);
        match &result {
            Ok(token) => {
                log::debug!("Login successful");
                cached.clone_from(token);
            }
            Err(_) => cached.clear(),
        }
        result
    }

    fn request_token(&self, username: &str, password: &str) -> Result<String, ApiError> {
        if username.is_empty() || password.is_empty() {
            return Err(ApiError::Auth("username or password not set".into()));
        }

        let url = self.endpoint(&["getToken"])?;
        log::debug!("Requesting token from {url}");
        let mut response = self
            .agent
            .get(url.as_str())
            .header("Authorization", basic_auth(username, password))
            .call()
            .map_err(|e| ApiError::Auth(format!("request to {url} failed: {e}")))?;

        let resp: TokenResponse = response
            .body_mut()
            .read_json()
            .map_err(|e| ApiError::Auth(format!("could not decode token response: {e}")))?;
        Ok(resp.token)
    }

    pub fn list_devices(&self, token: &str) -> Result<Vec<String>, ApiError> {
        let raw = self.get_json(self.endpoint(&["devices"])?, token)?;
        let device_ids = data_mgmt::device_ids(&raw)?;
        log::debug!("Found {} remote device(s)", device_ids.len());
        Ok(device_ids)
    }

    pub fn fetch_reading(&self, token: &str, device_id: &str) -> Result<Reading, ApiError> {
        let raw = self.get_json(self.endpoint(&["devices", device_id])?, token)?;
        log::trace!("Reading for {device_id}: {raw}");
        Ok(data_mgmt::normalize(&raw)?)
    }

    fn get_json(&self, url: Url, token: &str) -> Result<Value, ApiError> {
        let mut response = self.agent.get(url.as_str()).query("token", token).call()?;
        Ok(response.body_mut().read_json::<Value>()?)
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::BaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}
