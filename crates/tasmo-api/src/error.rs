use thiserror::Error;

/// Top-level error type for the `tasmo-api` crate.
///
/// Covers every failure mode of the device command protocol. `tasmo-core`
/// collapses these into "state unknown" / "toggle not delivered" at its
/// reconciliation boundary; nothing here ever reaches an end user raw.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP transport error (connection refused, DNS failure, timeout).
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The stored device address did not form a valid URL.
    #[error("Invalid device address '{address}': {source}")]
    InvalidAddress {
        address: String,
        #[source]
        source: url::ParseError,
    },

    /// The device answered with a non-200 status.
    #[error("Device returned HTTP {status}")]
    UnexpectedStatus { status: u16 },

    /// The response body was not the expected JSON shape, with the raw
    /// body kept for debugging.
    #[error("Malformed device response: {message}")]
    Malformed { message: String, body: String },
}

impl Error {
    /// Returns `true` if this is a transient network failure; the device
    /// may come back without any registry change.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::UnexpectedStatus { .. } => true,
            _ => false,
        }
    }

    /// Returns `true` if the stored address itself is unusable, so no
    /// retry can succeed until the device is edited.
    pub fn is_address_error(&self) -> bool {
        matches!(self, Self::InvalidAddress { .. })
    }
}
