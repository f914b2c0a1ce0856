//! The host registry and its reconciliation algorithm.
//!
//! The registry is the only shared mutable state in the process: one
//! background cycle writes, any number of API/report/score readers take
//! snapshots. The exclusive lock is held only for the in-memory merge;
//! network I/O always happens before `reconcile` is called, so readers
//! never observe a partially merged registry.
//!
//! History is retained for the life of the process: a host that vanishes
//! from the network flips to inactive but is never deleted, and keeps the
//! enrichment values from the last cycle that saw it.

use crate::types::{Host, ObservedHost};
use chrono::{DateTime, Utc};
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashSet};
use std::net::IpAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

/// Process-lifetime store of every host ever observed, plus the scan
/// enable flag the scheduler polls.
#[derive(Debug, Default)]
pub struct Registry {
    hosts: RwLock<BTreeMap<IpAddr, Host>>,
    enabled: AtomicBool,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one completed cycle's observations into the registry.
    ///
    /// - An observed address already present is updated in place: the
    ///   observation overwrites the enrichment fields, `active` flips on,
    ///   `last_seen` advances. `first_seen` is never touched.
    /// - A new address is inserted with `first_seen = last_seen = now`.
    /// - Every known address missing from `observed` flips to inactive,
    ///   all other fields untouched.
    ///
    /// Idempotent for a fixed `now`: reapplying the same observations
    /// changes nothing.
    pub fn reconcile(&self, observed: Vec<ObservedHost>, now: DateTime<Utc>) {
        let seen: HashSet<IpAddr> = observed.iter().map(|o| o.address).collect();

        let mut hosts = self.write_hosts();

        for observation in observed {
            match hosts.entry(observation.address) {
                Entry::Occupied(mut entry) => {
                    let host = entry.get_mut();
                    host.absorb(observation);
                    host.active = true;
                    host.last_seen = now;
                }
                Entry::Vacant(entry) => {
                    entry.insert(Host::from_observation(observation, now));
                }
            }
        }

        for (address, host) in hosts.iter_mut() {
            if !seen.contains(address) {
                host.active = false;
            }
        }
    }

    /// Deep-copied view of every known host, in address order.
    pub fn snapshot(&self) -> Vec<Host> {
        self.read_hosts().values().cloned().collect()
    }

    /// Number of hosts ever observed.
    pub fn len(&self) -> usize {
        self.read_hosts().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_hosts().is_empty()
    }

    /// Toggle scanning. Idempotent; takes effect at the scheduler's next
    /// decision point, never mid-cycle.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    fn read_hosts(&self) -> std::sync::RwLockReadGuard<'_, BTreeMap<IpAddr, Host>> {
        // A poisoned lock means a reader panicked mid-read; the map itself
        // is still consistent, so keep serving.
        self.hosts.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_hosts(&self) -> std::sync::RwLockWriteGuard<'_, BTreeMap<IpAddr, Host>> {
        self.hosts.write().unwrap_or_else(|e| e.into_inner())
    }
}
