//! Ack handshake between the proxy and its backend servers.
//!
//! The channel has no delivery guarantees and a backend may run an older
//! protocol, or no plugin at all. The proxy therefore probes: each skin update
//! to an endpoint that has not yet proven itself carries a fresh ack id, and a
//! check is scheduled for later. An ack arriving in the meantime verifies the
//! endpoint; enough consecutive unanswered probes classify it as broken.
//!
//! ```text
//!            ack                      ack
//! Unverified ----> Verified <---------------- Broken
//!     |                                         ^
//!     +-- miss_threshold consecutive misses ----+
//! ```
//!
//! **Per-Endpoint State**
//! Each endpoint record sits behind its own mutex. The outer map is only
//! write-locked to insert a record the first time an endpoint is seen, so
//! traffic to independent endpoints never contends beyond the map lookup.

use crate::config::{HandshakeConfig, ProtocolConfig};
use crate::protocol::AckPayload;
use crate::transport::Scheduler;
use crate::utils::ack_cache::PendingAcks;
use crate::utils::metrics::{self, Metrics};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Compatibility classification of one endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EndpointStatus {
    #[default]
    Unverified,
    Verified,
    Broken,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EndpointState {
    pub status: EndpointStatus,
    pub consecutive_misses: u32,
}

/// Recover the guard from a poisoned lock; every update leaves the state
/// consistent, so a panic elsewhere cannot corrupt it.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Tracks which backend endpoints acknowledge skin updates.
pub struct AckTracker {
    endpoints: RwLock<HashMap<String, Arc<Mutex<EndpointState>>>>,
    pending: Mutex<PendingAcks>,
    scheduler: Arc<dyn Scheduler>,
    local_version: String,
    check_delay: Duration,
    miss_threshold: u32,
    metrics: &'static Metrics,
}

impl std::fmt::Debug for AckTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AckTracker")
            .field("local_version", &self.local_version)
            .field("check_delay", &self.check_delay)
            .field("miss_threshold", &self.miss_threshold)
            .finish_non_exhaustive()
    }
}

impl AckTracker {
    pub fn new(config: &ProtocolConfig, scheduler: Arc<dyn Scheduler>) -> Self {
        Self::with_settings(&config.channel.local_version, &config.handshake, scheduler)
    }

    pub fn with_settings(
        local_version: &str,
        handshake: &HandshakeConfig,
        scheduler: Arc<dyn Scheduler>,
    ) -> Self {
        Self {
            endpoints: RwLock::new(HashMap::new()),
            pending: Mutex::new(PendingAcks::with_settings(
                handshake.pending_ack_ttl,
                handshake.max_pending_acks,
            )),
            scheduler,
            local_version: local_version.to_string(),
            check_delay: handshake.ack_check_delay,
            miss_threshold: handshake.miss_threshold.max(1),
            metrics: metrics::global(),
        }
    }

    pub fn local_version(&self) -> &str {
        &self.local_version
    }

    /// Get or create the record for `endpoint`.
    fn record(&self, endpoint: &str) -> Arc<Mutex<EndpointState>> {
        {
            let endpoints = self.endpoints.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(record) = endpoints.get(endpoint) {
                return Arc::clone(record);
            }
        }

        let mut endpoints = self.endpoints.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(endpoints.entry(endpoint.to_string()).or_insert_with(|| {
            debug!(endpoint, "Tracking new endpoint");
            Arc::new(Mutex::new(EndpointState::default()))
        }))
    }

    /// Decide whether the next skin update to `endpoint` should request an ack.
    ///
    /// Verified endpoints get `None`. Anything else, broken endpoints
    /// included, gets a fresh ack id and a check scheduled after the ack
    /// check delay.
    #[instrument(skip(self))]
    pub fn should_ack(self: &Arc<Self>, endpoint: &str) -> Option<AckPayload> {
        let record = self.record(endpoint);
        if lock(&record).status == EndpointStatus::Verified {
            debug!("Endpoint already verified, not requesting ack");
            return None;
        }

        let ack_id = Uuid::new_v4();
        lock(&self.pending).issue(ack_id, endpoint);

        let tracker = Arc::downgrade(self);
        let name = endpoint.to_string();
        self.scheduler.run_after(
            self.check_delay,
            Box::new(move || {
                if let Some(tracker) = tracker.upgrade() {
                    tracker.check_endpoint(&name);
                }
            }),
        );

        self.metrics.ack_requested();
        debug!(%ack_id, "Requesting ack");
        Some(AckPayload::new(ack_id, self.local_version.clone()))
    }

    /// Record an ack reported by `endpoint`.
    ///
    /// The ack is credited to the endpoint its id was issued to; ids this
    /// tracker does not remember are credited to the reporter. Returns whether
    /// the credited endpoint became verified by this ack.
    #[instrument(skip(self, ack), fields(ack_id = %ack.ack_id))]
    pub fn received_ack(&self, endpoint: &str, ack: &AckPayload) -> bool {
        self.metrics.ack_received();

        let issuer = lock(&self.pending).claim(&ack.ack_id);
        let credited = match issuer {
            Some(issuer) => {
                if issuer != endpoint {
                    debug!(issuer = %issuer, "Ack arrived via a different endpoint");
                }
                issuer
            }
            None => {
                debug!("Ack id not pending, crediting reporting endpoint");
                endpoint.to_string()
            }
        };

        let record = self.record(&credited);
        let previous = {
            let mut state = lock(&record);
            let previous = state.status;
            state.status = EndpointStatus::Verified;
            state.consecutive_misses = 0;
            previous
        };

        if previous == EndpointStatus::Verified {
            return false;
        }

        if previous == EndpointStatus::Broken {
            info!(endpoint = %credited, "Endpoint recovered and acknowledged a skin update");
        }

        if ack.version.eq_ignore_ascii_case(&self.local_version) {
            debug!(endpoint = %credited, version = %ack.version, "Endpoint verified");
        } else {
            self.metrics.version_mismatch();
            warn!(
                endpoint = %credited,
                remote_version = %ack.version,
                local_version = %self.local_version,
                "Endpoint runs a different plugin version; update both sides to the same version"
            );
        }
        true
    }

    /// Count a miss for `endpoint` unless it has been verified.
    ///
    /// Reaching the miss threshold marks the endpoint broken and resets the
    /// count, so a broken endpoint that keeps failing warns only once.
    #[instrument(skip(self))]
    pub fn check_endpoint(&self, endpoint: &str) {
        let record = self.record(endpoint);
        let mut state = lock(&record);
        if state.status == EndpointStatus::Verified {
            return;
        }

        state.consecutive_misses += 1;
        self.metrics.ack_missed();
        debug!(misses = state.consecutive_misses, "No ack received");

        if state.consecutive_misses >= self.miss_threshold {
            let was_broken = state.status == EndpointStatus::Broken;
            state.status = EndpointStatus::Broken;
            state.consecutive_misses = 0;

            if !was_broken {
                self.metrics.endpoint_broken();
                warn!(
                    threshold = self.miss_threshold,
                    "Endpoint did not acknowledge skin updates; the backend plugin is missing, \
                     outdated or not configured for proxy mode"
                );
            }
        }
    }

    /// Current status; endpoints never seen are `Unverified`.
    pub fn status(&self, endpoint: &str) -> EndpointStatus {
        self.state(endpoint).status
    }

    pub fn misses(&self, endpoint: &str) -> u32 {
        self.state(endpoint).consecutive_misses
    }

    fn state(&self, endpoint: &str) -> EndpointState {
        let endpoints = self.endpoints.read().unwrap_or_else(PoisonError::into_inner);
        endpoints
            .get(endpoint)
            .map(|record| *lock(record))
            .unwrap_or_default()
    }

    /// State of every endpoint seen so far, ordered by name.
    pub fn snapshot(&self) -> BTreeMap<String, EndpointState> {
        let endpoints = self.endpoints.read().unwrap_or_else(PoisonError::into_inner);
        endpoints
            .iter()
            .map(|(name, record)| (name.clone(), *lock(record)))
            .collect()
    }

    pub fn pending_acks(&self) -> usize {
        lock(&self.pending).len()
    }
}
