//! Payloads sent by backend servers to the proxy.
//!
//! ```text
//! guiActionList   [i32 count] ([string action tag] [action body])*
//! ack             [uuid ack id] [string server version]
//! unknownChannel  (empty)
//! ```

use crate::core::builtin::INT;
use crate::core::codec::{record2, NetworkCodec};
use crate::core::registry::{NetworkId, TypeRegistry, TypeRegistryBuilder};
use crate::error::Result;
use crate::model::gui::{PageType, PAGE_TYPE};
use crate::model::skin::{SkinIdentifier, SKIN_IDENTIFIER};
use crate::protocol::AckPayload;
use bytes::Bytes;
use std::sync::{LazyLock, OnceLock};

pub const GUI_ACTION_LIST: &str = "guiActionList";
pub const ACK: &str = "ack";
pub const UNKNOWN_CHANNEL: &str = "unknownChannel";

pub const OPEN_PAGE: &str = "openPage";
pub const CLEAR_SKIN: &str = "clearSkin";
pub const SET_SKIN: &str = "setSkin";
pub const ADD_FAVOURITE: &str = "addFavourite";
pub const REMOVE_FAVOURITE: &str = "removeFavourite";
pub const UNKNOWN_ACTION: &str = "unknownAction";

#[derive(Debug, Clone, PartialEq)]
pub enum ProxyBoundPayload {
    /// Actions triggered by a click in a proxy-provided menu
    GuiActionList(Vec<GuiAction>),
    /// Reply to an ack request carried by a skin update
    Ack(AckPayload),
    /// Sent by a newer backend; ignored
    Unknown,
}

impl NetworkId for ProxyBoundPayload {
    fn network_id(&self) -> &str {
        match self {
            ProxyBoundPayload::GuiActionList(_) => GUI_ACTION_LIST,
            ProxyBoundPayload::Ack(_) => ACK,
            ProxyBoundPayload::Unknown => UNKNOWN_CHANNEL,
        }
    }
}

impl ProxyBoundPayload {
    pub fn encode(&self) -> Result<Bytes> {
        registry().envelope_codec().encode(self)
    }

    pub fn decode(data: impl Into<Bytes>) -> Result<Self> {
        registry().envelope_codec().decode(data)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenPage {
    pub page: i32,
    pub page_type: PageType,
}

/// One menu action, nested inside action lists and click handlers.
#[derive(Debug, Clone, PartialEq)]
pub enum GuiAction {
    OpenPage(OpenPage),
    ClearSkin,
    SetSkin(SkinIdentifier),
    AddFavourite(SkinIdentifier),
    RemoveFavourite(SkinIdentifier),
    Unknown,
}

impl NetworkId for GuiAction {
    fn network_id(&self) -> &str {
        match self {
            GuiAction::OpenPage(_) => OPEN_PAGE,
            GuiAction::ClearSkin => CLEAR_SKIN,
            GuiAction::SetSkin(_) => SET_SKIN,
            GuiAction::AddFavourite(_) => ADD_FAVOURITE,
            GuiAction::RemoveFavourite(_) => REMOVE_FAVOURITE,
            GuiAction::Unknown => UNKNOWN_ACTION,
        }
    }
}

pub static OPEN_PAGE_CODEC: LazyLock<NetworkCodec<OpenPage>> = LazyLock::new(|| {
    record2(
        INT.clone(),
        |o: &OpenPage| &o.page,
        PAGE_TYPE.clone(),
        |o: &OpenPage| &o.page_type,
        |page, page_type| OpenPage { page, page_type },
    )
});

/// `[string tag][body]` codec for a single [`GuiAction`].
pub static GUI_ACTION: LazyLock<NetworkCodec<GuiAction>> =
    LazyLock::new(|| gui_action_registry().envelope_codec());

fn build_gui_action_registry() -> TypeRegistry<GuiAction> {
    let mut builder = TypeRegistryBuilder::new("gui_action");
    builder.register(OPEN_PAGE, OPEN_PAGE_CODEC.clone(), GuiAction::OpenPage, |a| match a {
        GuiAction::OpenPage(open) => Some(open),
        _ => None,
    });
    builder.register(
        CLEAR_SKIN,
        NetworkCodec::unit(()),
        |()| GuiAction::ClearSkin,
        |a| match a {
            GuiAction::ClearSkin => Some(&()),
            _ => None,
        },
    );
    builder.register(SET_SKIN, SKIN_IDENTIFIER.clone(), GuiAction::SetSkin, |a| match a {
        GuiAction::SetSkin(skin) => Some(skin),
        _ => None,
    });
    builder.register(
        ADD_FAVOURITE,
        SKIN_IDENTIFIER.clone(),
        GuiAction::AddFavourite,
        |a| match a {
            GuiAction::AddFavourite(skin) => Some(skin),
            _ => None,
        },
    );
    builder.register(
        REMOVE_FAVOURITE,
        SKIN_IDENTIFIER.clone(),
        GuiAction::RemoveFavourite,
        |a| match a {
            GuiAction::RemoveFavourite(skin) => Some(skin),
            _ => None,
        },
    );
    builder.build(UNKNOWN_ACTION, GuiAction::Unknown)
}

fn build_registry() -> TypeRegistry<ProxyBoundPayload> {
    let mut builder = TypeRegistryBuilder::new("proxy_bound");
    builder.register(
        GUI_ACTION_LIST,
        GUI_ACTION.list(),
        ProxyBoundPayload::GuiActionList,
        |p| match p {
            ProxyBoundPayload::GuiActionList(actions) => Some(actions),
            _ => None,
        },
    );
    builder.register(
        ACK,
        crate::protocol::ACK_PAYLOAD.clone(),
        ProxyBoundPayload::Ack,
        |p| match p {
            ProxyBoundPayload::Ack(ack) => Some(ack),
            _ => None,
        },
    );
    builder.build(UNKNOWN_CHANNEL, ProxyBoundPayload::Unknown)
}

static GUI_ACTION_REGISTRY: OnceLock<TypeRegistry<GuiAction>> = OnceLock::new();
static REGISTRY: OnceLock<TypeRegistry<ProxyBoundPayload>> = OnceLock::new();

/// Registry of menu actions, built on first use.
pub fn gui_action_registry() -> &'static TypeRegistry<GuiAction> {
    GUI_ACTION_REGISTRY.get_or_init(build_gui_action_registry)
}

/// Registry of backend-to-proxy payloads, built on first use.
pub fn registry() -> &'static TypeRegistry<ProxyBoundPayload> {
    REGISTRY.get_or_init(build_registry)
}
