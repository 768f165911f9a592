//! Payloads sent by the proxy to backend servers.
//!
//! ```text
//! openGUI       [gzip member: rows, title, items]
//! SkinUpdateV2  [string value] [string signature]
//! skinUpdateV3  [string value] [string signature] [bool has ack] ([uuid] [string version])?
//! giveSkull     [string display name] [string texture hash]
//! unknown       (empty)
//! ```
//!
//! `SkinUpdateV2` predates the ack handshake. It stays registered so older
//! proxies keep working; tags are never removed or reused.

use crate::core::builtin::STRING;
use crate::core::codec::{record2, NetworkCodec};
use crate::core::registry::{NetworkId, TypeRegistry, TypeRegistryBuilder};
use crate::error::Result;
use crate::model::gui::{ComponentString, GuiPage, COMPONENT_STRING, GUI_PAGE};
use crate::model::skin::{SkinProperty, SKIN_PROPERTY};
use crate::protocol::{AckPayload, ACK_PAYLOAD};
use bytes::Bytes;
use std::sync::{LazyLock, OnceLock};

pub const OPEN_GUI: &str = "openGUI";
pub const SKIN_UPDATE_V2: &str = "SkinUpdateV2";
pub const SKIN_UPDATE_V3: &str = "skinUpdateV3";
pub const GIVE_SKULL: &str = "giveSkull";
pub const UNKNOWN: &str = "unknown";

#[derive(Debug, Clone, PartialEq)]
pub enum ServerBoundPayload {
    OpenGui(GuiPage),
    /// Legacy skin update without an ack request
    SkinUpdateV2(SkinProperty),
    SkinUpdateV3(SkinUpdate),
    GiveSkull(GiveSkull),
    /// Sent by a newer proxy; ignored
    Unknown,
}

impl NetworkId for ServerBoundPayload {
    fn network_id(&self) -> &str {
        match self {
            ServerBoundPayload::OpenGui(_) => OPEN_GUI,
            ServerBoundPayload::SkinUpdateV2(_) => SKIN_UPDATE_V2,
            ServerBoundPayload::SkinUpdateV3(_) => SKIN_UPDATE_V3,
            ServerBoundPayload::GiveSkull(_) => GIVE_SKULL,
            ServerBoundPayload::Unknown => UNKNOWN,
        }
    }
}

impl ServerBoundPayload {
    pub fn encode(&self) -> Result<Bytes> {
        registry().envelope_codec().encode(self)
    }

    pub fn decode(data: impl Into<Bytes>) -> Result<Self> {
        registry().envelope_codec().decode(data)
    }
}

/// Skin to apply, with an optional request to acknowledge receipt.
#[derive(Debug, Clone, PartialEq)]
pub struct SkinUpdate {
    pub property: SkinProperty,
    pub ack: Option<AckPayload>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GiveSkull {
    pub display_name: ComponentString,
    pub texture_hash: String,
}

pub static SKIN_UPDATE: LazyLock<NetworkCodec<SkinUpdate>> = LazyLock::new(|| {
    record2(
        SKIN_PROPERTY.clone(),
        |u: &SkinUpdate| &u.property,
        ACK_PAYLOAD.optional(),
        |u: &SkinUpdate| &u.ack,
        |property, ack| SkinUpdate { property, ack },
    )
});

pub static GIVE_SKULL_CODEC: LazyLock<NetworkCodec<GiveSkull>> = LazyLock::new(|| {
    record2(
        COMPONENT_STRING.clone(),
        |g: &GiveSkull| &g.display_name,
        STRING.clone(),
        |g: &GiveSkull| &g.texture_hash,
        |display_name, texture_hash| GiveSkull {
            display_name,
            texture_hash,
        },
    )
});

fn build_registry() -> TypeRegistry<ServerBoundPayload> {
    let mut builder = TypeRegistryBuilder::new("server_bound");
    builder.register(
        OPEN_GUI,
        GUI_PAGE.clone(),
        ServerBoundPayload::OpenGui,
        |p| match p {
            ServerBoundPayload::OpenGui(page) => Some(page),
            _ => None,
        },
    );
    builder.register(
        SKIN_UPDATE_V2,
        SKIN_PROPERTY.clone(),
        ServerBoundPayload::SkinUpdateV2,
        |p| match p {
            ServerBoundPayload::SkinUpdateV2(property) => Some(property),
            _ => None,
        },
    );
    builder.register(
        SKIN_UPDATE_V3,
        SKIN_UPDATE.clone(),
        ServerBoundPayload::SkinUpdateV3,
        |p| match p {
            ServerBoundPayload::SkinUpdateV3(update) => Some(update),
            _ => None,
        },
    );
    builder.register(
        GIVE_SKULL,
        GIVE_SKULL_CODEC.clone(),
        ServerBoundPayload::GiveSkull,
        |p| match p {
            ServerBoundPayload::GiveSkull(skull) => Some(skull),
            _ => None,
        },
    );
    builder.build(UNKNOWN, ServerBoundPayload::Unknown)
}

static REGISTRY: OnceLock<TypeRegistry<ServerBoundPayload>> = OnceLock::new();

/// Registry of proxy-to-backend payloads, built on first use.
pub fn registry() -> &'static TypeRegistry<ServerBoundPayload> {
    REGISTRY.get_or_init(build_registry)
}
