//! Background scan scheduling.
//!
//! One dedicated task runs for the process lifetime, alternating between
//! an idle poll (scanning disabled) and back-to-back discovery cycles
//! (scanning enabled). Cycles never overlap: the loop is single-flight
//! by construction, and the inter-cycle delay is measured from the end
//! of one cycle to the start of the next. Disabling scanning never
//! interrupts an in-flight cycle, it only suppresses the next one.

use crate::registry::Registry;
use crate::types::ObservedHost;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Anything that can produce one discovery cycle's observations.
///
/// The production implementation is [`crate::cycle::DiscoveryCycle`];
/// tests substitute slow or scripted sources to pin scheduling behavior.
#[async_trait]
pub trait DiscoverySource: Send + Sync {
    /// Run one full discovery pass. Must not fail: degraded passes
    /// return partial or empty lists.
    async fn discover(&self) -> Vec<ObservedHost>;
}

/// Drives discovery cycles while scanning is enabled, idles otherwise.
pub struct Scheduler {
    registry: Arc<Registry>,
    source: Arc<dyn DiscoverySource>,
    scan_interval: Duration,
    idle_poll: Duration,
}

impl Scheduler {
    pub fn new(
        registry: Arc<Registry>,
        source: Arc<dyn DiscoverySource>,
        scan_interval: Duration,
        idle_poll: Duration,
    ) -> Self {
        Self {
            registry,
            source,
            scan_interval,
            idle_poll,
        }
    }

    /// Run forever. Intended to be spawned once at startup.
    pub async fn run(self) {
        loop {
            if !self.registry.is_enabled() {
                tokio::time::sleep(self.idle_poll).await;
                continue;
            }

            self.run_cycle().await;

            tokio::time::sleep(self.scan_interval).await;
        }
    }

    /// Run one cycle and reconcile its results.
    ///
    /// The source runs in its own task so that even a panicking cycle
    /// only costs this cycle, not the scheduler.
    async fn run_cycle(&self) {
        let source = Arc::clone(&self.source);
        match tokio::spawn(async move { source.discover().await }).await {
            Ok(observed) => {
                let count = observed.len();
                self.registry.reconcile(observed, Utc::now());
                info!(hosts = count, "discovery cycle reconciled");
            }
            Err(e) => {
                warn!(error = %e, "discovery cycle aborted");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::IpAddr;
    use std::sync::Mutex;
    use tokio::time::Instant;

    /// Records each cycle's start/end and takes a configurable time.
    struct SlowSource {
        spans: Arc<Mutex<Vec<(Instant, Instant)>>>,
        delay: Duration,
    }

    #[async_trait]
    impl DiscoverySource for SlowSource {
        async fn discover(&self) -> Vec<ObservedHost> {
            let start = Instant::now();
            tokio::time::sleep(self.delay).await;
            let end = Instant::now();
            self.spans.lock().unwrap().push((start, end));
            vec![ObservedHost::new(
                "10.0.0.5".parse::<IpAddr>().unwrap(),
                "aa:aa:aa:aa:aa:aa",
            )]
        }
    }

    struct PanickingSource;

    #[async_trait]
    impl DiscoverySource for PanickingSource {
        async fn discover(&self) -> Vec<ObservedHost> {
            panic!("probe blew up");
        }
    }

    fn scheduler_with(
        source: Arc<dyn DiscoverySource>,
        registry: Arc<Registry>,
    ) -> Scheduler {
        Scheduler::new(
            registry,
            source,
            Duration::from_millis(10),
            Duration::from_millis(10),
        )
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_cycles_never_overlap() {
        let spans = Arc::new(Mutex::new(Vec::new()));
        let source = Arc::new(SlowSource {
            spans: Arc::clone(&spans),
            delay: Duration::from_millis(50),
        });
        let registry = Arc::new(Registry::new());
        registry.set_enabled(true);

        let handle = tokio::spawn(scheduler_with(source, Arc::clone(&registry)).run());
        tokio::time::sleep(Duration::from_millis(350)).await;
        handle.abort();

        let spans = spans.lock().unwrap();
        assert!(spans.len() >= 2, "expected several cycles, got {}", spans.len());
        for window in spans.windows(2) {
            assert!(
                window[1].0 >= window[0].1,
                "cycle started before the previous one ended"
            );
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_idle_until_enabled() {
        let spans = Arc::new(Mutex::new(Vec::new()));
        let source = Arc::new(SlowSource {
            spans: Arc::clone(&spans),
            delay: Duration::from_millis(1),
        });
        let registry = Arc::new(Registry::new());

        let handle = tokio::spawn(scheduler_with(source, Arc::clone(&registry)).run());

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(spans.lock().unwrap().is_empty(), "ran while disabled");

        registry.set_enabled(true);
        tokio::time::sleep(Duration::from_millis(100)).await;
        handle.abort();

        assert!(!spans.lock().unwrap().is_empty(), "start was not honored");
        assert!(!registry.is_empty(), "cycle results were not reconciled");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_stop_lets_inflight_cycle_finish() {
        let spans = Arc::new(Mutex::new(Vec::new()));
        let source = Arc::new(SlowSource {
            spans: Arc::clone(&spans),
            delay: Duration::from_millis(100),
        });
        let registry = Arc::new(Registry::new());
        registry.set_enabled(true);

        let handle = tokio::spawn(scheduler_with(source, Arc::clone(&registry)).run());

        // Disable while the first cycle is still in flight.
        tokio::time::sleep(Duration::from_millis(30)).await;
        registry.set_enabled(false);
        tokio::time::sleep(Duration::from_millis(300)).await;
        handle.abort();

        assert_eq!(
            spans.lock().unwrap().len(),
            1,
            "in-flight cycle must complete, and no further cycle may start"
        );
        assert_eq!(registry.len(), 1, "completed cycle must still reconcile");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_panicking_cycle_does_not_kill_scheduler() {
        let registry = Arc::new(Registry::new());
        registry.set_enabled(true);

        let handle = tokio::spawn(
            scheduler_with(Arc::new(PanickingSource), Arc::clone(&registry)).run(),
        );
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert!(!handle.is_finished(), "scheduler died with the cycle");
        assert!(registry.is_empty());
        handle.abort();
    }
}
