//! MAC vendor (OUI) lookups.
//!
//! Resolves hardware addresses to vendor labels from the bundled offline
//! OUI database. Accuracy is heuristic; every failure path collapses to
//! the "Unknown" sentinel so enrichment never stalls on a lookup.

use crate::types::UNKNOWN;
use mac_oui::Oui;
use tracing::warn;

/// Offline OUI database handle.
///
/// Loading the bundled database can fail; a [`VendorDb`] without a
/// database answers every query with "Unknown" rather than erroring.
pub struct VendorDb {
    db: Option<Oui>,
}

impl VendorDb {
    /// Load the bundled OUI database. Logs and degrades on failure.
    pub fn load() -> Self {
        match Oui::default() {
            Ok(db) => Self { db: Some(db) },
            Err(e) => {
                warn!(error = %e, "OUI database unavailable, vendor labels will be Unknown");
                Self { db: None }
            }
        }
    }

    /// Resolve a MAC address to a vendor label, `"Unknown"` if unresolved.
    pub fn lookup(&self, mac: &str) -> String {
        let Some(db) = &self.db else {
            return UNKNOWN.to_string();
        };

        match db.lookup_by_mac(mac) {
            Ok(Some(entry)) => entry.company_name.clone(),
            Ok(None) => UNKNOWN.to_string(),
            Err(e) => {
                warn!(mac, error = %e, "OUI lookup failed");
                UNKNOWN.to_string()
            }
        }
    }
}
