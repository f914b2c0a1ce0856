//! Core type definitions shared across the discovery pipeline.

mod host;

pub use host::{DeviceType, Host, ObservedHost, UNKNOWN, ZERO_LINK_ADDRESS};
