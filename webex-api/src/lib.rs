//! Blocking client for the Cisco Webex REST API endpoints used by `webextools`:
//! people management and the recording audit report.

pub mod client;
pub mod data_processing;
mod error;
pub mod people;
pub mod recordings;
pub mod time_ranges;

pub use client::{ClientOptions, DEFAULT_BASE_URL, WebexClient};
pub use error::ApiError;
