//! # Protocol Layer
//!
//! Channel payloads, message dispatch and the ack handshake.
//!
//! Each direction of the plugin channel carries one closed union of payloads,
//! named after the process that receives it:
//!
//! - **server_bound**: proxy to backend server (menus, skin updates, skulls)
//! - **proxy_bound**: backend server to proxy (menu actions, acks)
//!
//! Every message is `[string tag][body]`. A tag the receiver has never heard
//! of decodes to that union's `Unknown` variant and is logged, never fatal.
//!
//! ## Ack Handshake
//! ```text
//! Proxy                          Backend
//!   |-- skinUpdateV3 {ack id} ---->|
//!   |<------------ ack {ack id} ---|
//! ```
//! A backend that never answers is classified as broken after a few
//! consecutive misses; see [`handshake::AckTracker`].

use crate::core::builtin::{STRING, UUID};
use crate::core::codec::{record2, NetworkCodec};
use std::sync::LazyLock;
use uuid::Uuid;

pub mod dispatcher;
pub mod handshake;
pub mod proxy_bound;
pub mod server_bound;

#[cfg(test)]
mod tests;

pub use dispatcher::{
    dispatch_gui_action, is_plugin_channel, GuiActionHandler, ProxyMessageAdapter,
    ProxyMessenger, ServerHooks, ServerMessageAdapter, ServerMessenger,
};
pub use handshake::{AckTracker, EndpointState, EndpointStatus};
pub use proxy_bound::{GuiAction, OpenPage, ProxyBoundPayload};
pub use server_bound::{GiveSkull, ServerBoundPayload, SkinUpdate};

/// Ack id plus the version of the process that sent it.
///
/// Travels proxy to backend inside a skin update, and back again as the
/// backend's reply carrying the backend's own version.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AckPayload {
    pub ack_id: Uuid,
    pub version: String,
}

impl AckPayload {
    pub fn new(ack_id: Uuid, version: impl Into<String>) -> Self {
        Self {
            ack_id,
            version: version.into(),
        }
    }
}

pub static ACK_PAYLOAD: LazyLock<NetworkCodec<AckPayload>> = LazyLock::new(|| {
    record2(
        UUID.clone(),
        |a: &AckPayload| &a.ack_id,
        STRING.clone(),
        |a: &AckPayload| &a.version,
        |ack_id, version| AckPayload { ack_id, version },
    )
});
