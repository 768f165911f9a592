//! # Transport Layer
//!
//! The seams between the protocol and its host.
//!
//! The protocol never owns a socket. Hosts hand it a [`Transport`] that can
//! deliver one message to a named peer, and a [`Scheduler`] that runs
//! callbacks later. Delivery is fire-and-forget: nothing here retries,
//! orders or acknowledges.
//!
//! ## Implementations
//! - **TokioScheduler**: spawns callbacks onto a tokio runtime
//! - **LocalTransport**: in-process channels, for tests and single-binary setups

use crate::error::{ProtocolError, Result};
use bytes::Bytes;
use std::time::Duration;
use tokio::runtime::Handle;

pub mod local;

pub use local::LocalTransport;

/// Deferred unit of work handed to a [`Scheduler`].
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Sends one encoded message to a named peer.
pub trait Transport: Send + Sync {
    /// Queue `data` for `endpoint`. Success means the message was handed off,
    /// not that it arrived.
    fn send(&self, endpoint: &str, data: Bytes) -> Result<()>;
}

/// Runs callbacks immediately or after a delay.
pub trait Scheduler: Send + Sync {
    fn run_after(&self, delay: Duration, task: Task);

    fn run_now(&self, task: Task);
}

/// [`Scheduler`] backed by a tokio runtime.
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    handle: Handle,
}

impl TokioScheduler {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Use the runtime the caller is running on.
    ///
    /// # Errors
    /// Returns `ProtocolError::TransportError` outside a tokio runtime.
    pub fn current() -> Result<Self> {
        Handle::try_current()
            .map(Self::new)
            .map_err(|e| ProtocolError::TransportError(format!("No tokio runtime: {e}")))
    }
}

impl Scheduler for TokioScheduler {
    fn run_after(&self, delay: Duration, task: Task) {
        self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            task();
        });
    }

    fn run_now(&self, task: Task) {
        self.handle.spawn(async move { task() });
    }
}
