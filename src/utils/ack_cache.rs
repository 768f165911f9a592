//! Pending Ack Cache
//!
//! Remembers which endpoint each outstanding ack id was issued to, so an ack
//! can be credited to the endpoint that was actually probed even if it comes
//! back on a different connection.
//!
//! Entries expire after a TTL and the cache is bounded; the oldest entries
//! are evicted first.

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};
use tracing::{debug, instrument};
use uuid::Uuid;

#[derive(Debug, Clone)]
struct PendingEntry {
    issued_at: Instant,
    endpoint: String,
}

/// TTL-bounded map from ack id to the endpoint it was issued to
#[derive(Debug)]
pub struct PendingAcks {
    entries: HashMap<Uuid, PendingEntry>,
    /// Issue order for FIFO eviction
    insertion_order: VecDeque<Uuid>,
    ttl: Duration,
    max_entries: usize,
}

impl PendingAcks {
    /// Default TTL: 5 minutes (ten times the default ack check delay)
    /// Default max entries: 10,000
    pub fn new() -> Self {
        Self::with_settings(Duration::from_secs(300), 10_000)
    }

    pub fn with_settings(ttl: Duration, max_entries: usize) -> Self {
        Self {
            entries: HashMap::new(),
            insertion_order: VecDeque::new(),
            ttl,
            max_entries: max_entries.max(1),
        }
    }

    /// Record that `ack_id` was sent to `endpoint`.
    #[instrument(skip(self))]
    pub fn issue(&mut self, ack_id: Uuid, endpoint: &str) {
        self.cleanup_expired();

        if self.entries.len() >= self.max_entries {
            let to_remove = self.entries.len() - self.max_entries + 1;
            self.remove_oldest_entries(to_remove);
        }

        self.entries.insert(
            ack_id,
            PendingEntry {
                issued_at: Instant::now(),
                endpoint: endpoint.to_string(),
            },
        );
        self.insertion_order.push_back(ack_id);
    }

    /// Remove `ack_id` and return the endpoint it was issued to.
    ///
    /// Returns `None` for ids that were never issued, have expired, or were
    /// already claimed.
    pub fn claim(&mut self, ack_id: &Uuid) -> Option<String> {
        self.cleanup_expired();
        self.entries.remove(ack_id).map(|entry| entry.endpoint)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn cleanup_expired(&mut self) {
        let now = Instant::now();
        let initial_count = self.entries.len();

        self.entries
            .retain(|_, entry| now.duration_since(entry.issued_at) < self.ttl);

        // Claimed and expired ids leave stale keys at the front of the queue
        while let Some(key) = self.insertion_order.front() {
            if !self.entries.contains_key(key) {
                self.insertion_order.pop_front();
            } else {
                break;
            }
        }

        let removed = initial_count - self.entries.len();
        if removed > 0 {
            debug!("Expired {} pending ack ids", removed);
        }
    }

    fn remove_oldest_entries(&mut self, count: usize) {
        let mut removed = 0;
        while removed < count {
            match self.insertion_order.pop_front() {
                Some(key) => {
                    if self.entries.remove(&key).is_some() {
                        removed += 1;
                    }
                }
                None => break,
            }
        }

        debug!("Evicted {} oldest pending ack ids due to size limit", removed);
    }
}

impl Default for PendingAcks {
    fn default() -> Self {
        Self::new()
    }
}
