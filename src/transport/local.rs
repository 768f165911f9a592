use crate::error::{constants, ProtocolError, Result};
use crate::transport::Transport;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::RwLock;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, instrument, warn};

/// Default per-endpoint queue depth
const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// In-process transport that routes messages to per-endpoint tokio channels.
///
/// Each endpoint gets one bounded queue. Messages to an endpoint that is not
/// registered, whose queue is full, or whose receiver was dropped are
/// discarded and the reason is returned as an error.
#[derive(Debug)]
pub struct LocalTransport {
    endpoints: RwLock<HashMap<String, mpsc::Sender<Bytes>>>,
    capacity: usize,
}

impl Default for LocalTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalTransport {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_QUEUE_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            endpoints: RwLock::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    /// Open a queue for `endpoint`, replacing any previous one.
    #[instrument(skip(self))]
    pub fn register(&self, endpoint: &str) -> Result<mpsc::Receiver<Bytes>> {
        let (tx, rx) = mpsc::channel(self.capacity);
        let mut endpoints = self.endpoints.write().map_err(|_| {
            ProtocolError::TransportError(constants::ERR_ENDPOINTS_WRITE_LOCK.to_string())
        })?;
        if endpoints.insert(endpoint.to_string(), tx).is_some() {
            debug!("Replaced existing endpoint queue");
        }
        Ok(rx)
    }

    /// Close the queue for `endpoint`. Returns whether it existed.
    pub fn unregister(&self, endpoint: &str) -> Result<bool> {
        let mut endpoints = self.endpoints.write().map_err(|_| {
            ProtocolError::TransportError(constants::ERR_ENDPOINTS_WRITE_LOCK.to_string())
        })?;
        Ok(endpoints.remove(endpoint).is_some())
    }

    pub fn endpoints(&self) -> Result<Vec<String>> {
        let endpoints = self.endpoints.read().map_err(|_| {
            ProtocolError::TransportError(constants::ERR_ENDPOINTS_READ_LOCK.to_string())
        })?;
        let mut names: Vec<String> = endpoints.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}

impl Transport for LocalTransport {
    fn send(&self, endpoint: &str, data: Bytes) -> Result<()> {
        let sender = {
            let endpoints = self.endpoints.read().map_err(|_| {
                ProtocolError::TransportError(constants::ERR_ENDPOINTS_READ_LOCK.to_string())
            })?;
            endpoints.get(endpoint).cloned()
        };

        let Some(sender) = sender else {
            debug!(endpoint, "Dropping message for unknown endpoint");
            return Err(ProtocolError::TransportError(format!(
                "{}: {endpoint}",
                constants::ERR_UNKNOWN_ENDPOINT
            )));
        };

        match sender.try_send(data) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                warn!(endpoint, "Dropping message, endpoint queue is full");
                Err(ProtocolError::TransportError(
                    constants::ERR_ENDPOINT_QUEUE_FULL.to_string(),
                ))
            }
            Err(TrySendError::Closed(_)) => {
                debug!(endpoint, "Dropping message, endpoint receiver closed");
                Err(ProtocolError::TransportError(format!(
                    "{}: {endpoint}",
                    constants::ERR_UNKNOWN_ENDPOINT
                )))
            }
        }
    }
}
