//! # skin-channel-protocol
//!
//! Binary plugin-message codec and ack handshake for a network proxy and its
//! backend servers.
//!
//! The proxy and each backend exchange fire-and-forget messages over a plugin
//! channel. This crate provides:
//!
//! - **Codecs**: composable `NetworkCodec<T>` combinators over a big-endian
//!   wire format (primitives, optionals, lists, ordered maps, enums, records,
//!   gzip sections)
//! - **Envelopes**: one tagged union per direction whose unknown tags decode
//!   to a harmless `Unknown` variant, so mixed versions keep talking
//! - **Handshake**: an ack protocol that tells the proxy which backends
//!   understand the current version, with a circuit breaker for those that
//!   never answer
//!
//! ## Example
//! ```rust
//! use skin_channel_protocol::model::SkinProperty;
//! use skin_channel_protocol::protocol::{ServerBoundPayload, SkinUpdate};
//!
//! let update = ServerBoundPayload::SkinUpdateV3(SkinUpdate {
//!     property: SkinProperty::new("textures-value", "textures-signature"),
//!     ack: None,
//! });
//! let bytes = update.encode().unwrap();
//! assert_eq!(ServerBoundPayload::decode(bytes).unwrap(), update);
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

pub mod config;
pub mod core;
pub mod error;
pub mod model;
pub mod protocol;
pub mod transport;
pub mod utils;

pub use crate::config::ProtocolConfig;
pub use crate::core::codec::NetworkCodec;
pub use crate::core::registry::{NetworkId, TypeRegistry};
pub use crate::error::{ProtocolError, Result};
pub use crate::protocol::{AckPayload, AckTracker, ProxyBoundPayload, ServerBoundPayload};
