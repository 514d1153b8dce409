//! Async client for the Tasmota HTTP command interface.
//!
//! Tasmota devices expose a single unauthenticated endpoint,
//! `GET http://<address>/cm?cmnd=<command>`, answering with small JSON
//! objects. This crate wraps the two commands the registry tooling needs
//! (`Power` and `Power Toggle`) behind typed methods with typed errors.
//! `tasmo-core` decides how failures degrade; this crate only reports them.

pub mod client;
pub mod error;
pub mod transport;

pub use client::{PowerState, TasmotaClient, web_ui_url};
pub use error::Error;
pub use transport::TransportConfig;
