//! Observability and Metrics
//!
//! Counters for envelope traffic and the ack handshake.
//!
//! Uses atomic counters for thread-safe metrics collection.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::LazyLock;
use std::time::Instant;
use tracing::{debug, info};

/// Metrics collector for codec and handshake activity
#[derive(Debug)]
pub struct Metrics {
    /// Envelopes encoded for sending
    pub messages_encoded: AtomicU64,
    /// Envelopes decoded successfully
    pub messages_decoded: AtomicU64,
    /// Total bytes encoded
    pub bytes_encoded: AtomicU64,
    /// Total bytes handed to the decoder
    pub bytes_decoded: AtomicU64,
    /// Envelopes dropped because they failed to decode
    pub decode_errors: AtomicU64,
    /// Envelopes or actions that resolved to the unknown variant
    pub unknown_payloads: AtomicU64,
    /// Ack requests attached to outgoing skin updates
    pub acks_requested: AtomicU64,
    /// Acks received from backend servers
    pub acks_received: AtomicU64,
    /// Ack checks that found no ack
    pub ack_misses: AtomicU64,
    /// Transitions of an endpoint into the broken state
    pub endpoints_broken: AtomicU64,
    /// Verified endpoints whose version differs from ours
    pub version_mismatches: AtomicU64,
    /// Start time for uptime calculation
    start_time: Instant,
}

impl Metrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            messages_encoded: AtomicU64::new(0),
            messages_decoded: AtomicU64::new(0),
            bytes_encoded: AtomicU64::new(0),
            bytes_decoded: AtomicU64::new(0),
            decode_errors: AtomicU64::new(0),
            unknown_payloads: AtomicU64::new(0),
            acks_requested: AtomicU64::new(0),
            acks_received: AtomicU64::new(0),
            ack_misses: AtomicU64::new(0),
            endpoints_broken: AtomicU64::new(0),
            version_mismatches: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record an envelope encoded for sending
    pub fn message_encoded(&self, byte_count: u64) {
        self.messages_encoded.fetch_add(1, Ordering::Relaxed);
        self.bytes_encoded.fetch_add(byte_count, Ordering::Relaxed);
    }

    /// Record an envelope decoded successfully
    pub fn message_decoded(&self, byte_count: u64) {
        self.messages_decoded.fetch_add(1, Ordering::Relaxed);
        self.bytes_decoded.fetch_add(byte_count, Ordering::Relaxed);
    }

    pub fn decode_error(&self) {
        self.decode_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn unknown_payload(&self) {
        self.unknown_payloads.fetch_add(1, Ordering::Relaxed);
    }

    pub fn ack_requested(&self) {
        self.acks_requested.fetch_add(1, Ordering::Relaxed);
    }

    pub fn ack_received(&self) {
        self.acks_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn ack_missed(&self) {
        self.ack_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn endpoint_broken(&self) {
        self.endpoints_broken.fetch_add(1, Ordering::Relaxed);
    }

    pub fn version_mismatch(&self) {
        self.version_mismatches.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            messages_encoded: self.messages_encoded.load(Ordering::Relaxed),
            messages_decoded: self.messages_decoded.load(Ordering::Relaxed),
            bytes_encoded: self.bytes_encoded.load(Ordering::Relaxed),
            bytes_decoded: self.bytes_decoded.load(Ordering::Relaxed),
            decode_errors: self.decode_errors.load(Ordering::Relaxed),
            unknown_payloads: self.unknown_payloads.load(Ordering::Relaxed),
            acks_requested: self.acks_requested.load(Ordering::Relaxed),
            acks_received: self.acks_received.load(Ordering::Relaxed),
            ack_misses: self.ack_misses.load(Ordering::Relaxed),
            endpoints_broken: self.endpoints_broken.load(Ordering::Relaxed),
            version_mismatches: self.version_mismatches.load(Ordering::Relaxed),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }

    /// Log current metrics
    pub fn log_summary(&self) {
        let snapshot = self.snapshot();
        info!(
            messages_encoded = snapshot.messages_encoded,
            messages_decoded = snapshot.messages_decoded,
            bytes_encoded = snapshot.bytes_encoded,
            bytes_decoded = snapshot.bytes_decoded,
            decode_errors = snapshot.decode_errors,
            unknown_payloads = snapshot.unknown_payloads,
            acks_requested = snapshot.acks_requested,
            acks_received = snapshot.acks_received,
            ack_misses = snapshot.ack_misses,
            endpoints_broken = snapshot.endpoints_broken,
            version_mismatches = snapshot.version_mismatches,
            uptime_seconds = snapshot.uptime_seconds,
            "Skin channel metrics snapshot"
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of metrics at a point in time
#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub messages_encoded: u64,
    pub messages_decoded: u64,
    pub bytes_encoded: u64,
    pub bytes_decoded: u64,
    pub decode_errors: u64,
    pub unknown_payloads: u64,
    pub acks_requested: u64,
    pub acks_received: u64,
    pub ack_misses: u64,
    pub endpoints_broken: u64,
    pub version_mismatches: u64,
    pub uptime_seconds: u64,
}

static METRICS: LazyLock<Metrics> = LazyLock::new(Metrics::new);

/// Process-wide metrics instance
pub fn global() -> &'static Metrics {
    &METRICS
}

/// Timer for measuring operation duration
pub struct Timer {
    start: Instant,
    operation: &'static str,
}

impl Timer {
    /// Start timing an operation
    pub fn start(operation: &'static str) -> Self {
        Self {
            start: Instant::now(),
            operation,
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        debug!(
            operation = self.operation,
            duration_us = duration.as_micros() as u64,
            "Operation completed"
        );
    }
}
