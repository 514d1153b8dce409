// Tasmota command client
//
// Every interaction with a device is a single GET against
// `http://<address>/cm?cmnd=<command>`. There are no retries and no
// per-device coalescing -- each call is independent, and the caller is
// expected to re-query after a toggle to learn the resulting state.

use std::fmt;

use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Relay power state as reported by a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerState {
    On,
    Off,
}

impl PowerState {
    pub fn is_on(self) -> bool {
        matches!(self, Self::On)
    }

    /// Map the `POWER` report field. Anything other than the literal
    /// `"ON"` reads as off.
    fn from_report(raw: &str) -> Self {
        if raw == "ON" { Self::On } else { Self::Off }
    }
}

impl fmt::Display for PowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::On => write!(f, "ON"),
            Self::Off => write!(f, "OFF"),
        }
    }
}

/// Shape of the `cmnd=Power` response body.
#[derive(Debug, Deserialize)]
struct PowerReport {
    #[serde(rename = "POWER")]
    power: String,
}

/// HTTP client for the Tasmota command interface.
///
/// Cheap to clone; the underlying `reqwest::Client` pools connections.
#[derive(Debug, Clone)]
pub struct TasmotaClient {
    http: reqwest::Client,
}

impl TasmotaClient {
    /// Create a client from transport settings.
    pub fn new(transport: &TransportConfig) -> Result<Self, Error> {
        Ok(Self {
            http: transport.build_client()?,
        })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// Query the relay state (`cmnd=Power`).
    ///
    /// Succeeds only on HTTP 200 with a JSON body carrying a string
    /// `POWER` field; every other outcome is a typed error.
    pub async fn query_power(&self, address: &str) -> Result<PowerState, Error> {
        let url = command_url(address, "Power")?;
        debug!(%url, "GET power state");

        let resp = self.http.get(url).send().await.map_err(Error::Transport)?;
        let status = resp.status();
        if status != reqwest::StatusCode::OK {
            return Err(Error::UnexpectedStatus {
                status: status.as_u16(),
            });
        }

        let body = resp.text().await.map_err(Error::Transport)?;
        let report: PowerReport =
            serde_json::from_str(&body).map_err(|e| Error::Malformed {
                message: e.to_string(),
                body: body.clone(),
            })?;

        Ok(PowerState::from_report(&report.power))
    }

    /// Fire the relay toggle (`cmnd=Power Toggle`).
    ///
    /// Ok means the command was delivered (HTTP 200) -- it says nothing
    /// about the resulting relay value; the body is ignored.
    pub async fn toggle_power(&self, address: &str) -> Result<(), Error> {
        let url = command_url(address, "Power Toggle")?;
        debug!(%url, "GET power toggle");

        let resp = self.http.get(url).send().await.map_err(Error::Transport)?;
        let status = resp.status();
        if status != reqwest::StatusCode::OK {
            return Err(Error::UnexpectedStatus {
                status: status.as_u16(),
            });
        }

        Ok(())
    }
}

/// URL of a device's built-in web UI (`http://<address>`), for opening in
/// an external browser.
pub fn web_ui_url(address: &str) -> Result<Url, Error> {
    Url::parse(&format!("http://{address}")).map_err(|source| Error::InvalidAddress {
        address: address.to_owned(),
        source,
    })
}

/// Build the command URL for a device address.
///
/// The address is a host or host:port as stored in the registry; spaces
/// in the command are percent-encoded by the query serializer.
fn command_url(address: &str, command: &str) -> Result<Url, Error> {
    let mut url =
        Url::parse(&format!("http://{address}/cm")).map_err(|source| Error::InvalidAddress {
            address: address.to_owned(),
            source,
        })?;
    url.set_query(Some(&format!("cmnd={command}")));
    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn command_url_encodes_spaces() {
        let url = command_url("192.168.1.50", "Power Toggle").unwrap();
        assert_eq!(url.as_str(), "http://192.168.1.50/cm?cmnd=Power%20Toggle");
    }

    #[test]
    fn command_url_accepts_host_port() {
        let url = command_url("plug.local:8080", "Power").unwrap();
        assert_eq!(url.as_str(), "http://plug.local:8080/cm?cmnd=Power");
    }

    #[test]
    fn command_url_rejects_garbage_address() {
        let err = command_url("not a host", "Power").unwrap_err();
        assert!(err.is_address_error());
    }

    #[test]
    fn power_state_maps_only_literal_on() {
        assert_eq!(PowerState::from_report("ON"), PowerState::On);
        assert_eq!(PowerState::from_report("OFF"), PowerState::Off);
        assert_eq!(PowerState::from_report("on"), PowerState::Off);
        assert_eq!(PowerState::from_report(""), PowerState::Off);
    }

    #[test]
    fn web_ui_url_is_plain_http() {
        let url = web_ui_url("10.0.0.5").unwrap();
        assert_eq!(url.as_str(), "http://10.0.0.5/");
    }
}
