//! # Netwarden - Continuous LAN Discovery and Presence Monitoring
//!
//! Netwarden keeps a live, resilient view of what is on the local
//! network right now and what was there before. A background scheduler
//! repeatedly sweeps the subnet, enriches every discovered host, and
//! reconciles the results into a long-lived registry that any number of
//! readers can snapshot concurrently.
//!
//! ## Features
//!
//! - **Two discovery strategies**: link-layer broadcast probing when
//!   privileged, reachability sweep + neighbor-table read otherwise
//! - **Per-host enrichment**: latency, reverse DNS, well-known port
//!   probe, vendor lookup, and heuristic device classification
//! - **Presence history**: first-seen/last-seen tracking with
//!   flicker-free active/inactive flips; hosts are never forgotten
//! - **Concurrent reads**: the registry hands out isolated snapshots;
//!   the merge step alone holds the write lock
//! - **HTTP surface**: start/stop, live snapshot, Markdown report, and
//!   on-demand deep inspection via `nmap`
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use netwarden::cycle::DiscoveryCycle;
//! use netwarden::probe::ProbeStrategy;
//! use netwarden::registry::Registry;
//! use netwarden::scheduler::Scheduler;
//! use netwarden::config::AppSettings;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let settings = AppSettings::default();
//!     let registry = Arc::new(Registry::new());
//!     let cycle = Arc::new(DiscoveryCycle::new(&settings, ProbeStrategy::detect()));
//!
//!     registry.set_enabled(true);
//!     let scheduler = Scheduler::new(
//!         Arc::clone(&registry),
//!         cycle,
//!         settings.scan_interval(),
//!         settings.idle_poll(),
//!     );
//!     tokio::spawn(scheduler.run());
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`resolver`] - local address, interface, and subnet detection
//! - [`probe`] - broadcast and fallback discovery strategies
//! - [`enrich`] - latency, hostname, port probing, classification
//! - [`cycle`] - one resolve → probe → enrich pass
//! - [`registry`] - the reconciliation algorithm and shared state
//! - [`scheduler`] - the single-flight background loop
//! - [`scorer`] - network quality scoring
//! - [`api`] - the HTTP surface over registry snapshots

pub mod api;
pub mod banner;
pub mod cli;
pub mod config;
pub mod cycle;
pub mod enrich;
pub mod error;
pub mod inspect;
pub mod probe;
pub mod registry;
pub mod report;
pub mod resolver;
pub mod scheduler;
pub mod scorer;
pub mod types;
pub mod vendors;

// Re-export commonly used types
pub use error::{ConfigError, ProbeError};
pub use registry::Registry;
pub use scheduler::{DiscoverySource, Scheduler};
pub use scorer::NetworkQuality;
pub use types::{DeviceType, Host, ObservedHost};
