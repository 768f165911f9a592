//! Skin menu pages sent from the proxy for the backend to render.
//!
//! A page is a grid of items; each item can carry click handlers that list
//! the [`GuiAction`]s the backend sends back when the player clicks it.

use crate::core::builtin::{BOOLEAN, INT, STRING};
use crate::core::codec::{record2, record3, record6, NetworkCodec};
use crate::core::registry::NetworkId;
use crate::protocol::proxy_bound::{GuiAction, GUI_ACTION};
use indexmap::IndexMap;
use std::sync::LazyLock;

/// Serialized rich-text component (JSON text).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ComponentString(pub String);

impl ComponentString {
    pub fn new(json: impl Into<String>) -> Self {
        Self(json.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Menu page a click can navigate to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PageType {
    #[default]
    Main,
    Skins,
    Players,
    Favourites,
}

impl PageType {
    pub const ALL: [PageType; 4] = [
        PageType::Main,
        PageType::Skins,
        PageType::Players,
        PageType::Favourites,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PageType::Main => "main",
            PageType::Skins => "skins",
            PageType::Players => "players",
            PageType::Favourites => "favourites",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MaterialType {
    #[default]
    Dirt,
    Skull,
    Arrow,
    Barrier,
    Bookshelf,
    EnderEye,
    EnchantingTable,
}

impl MaterialType {
    pub const ALL: [MaterialType; 7] = [
        MaterialType::Dirt,
        MaterialType::Skull,
        MaterialType::Arrow,
        MaterialType::Barrier,
        MaterialType::Bookshelf,
        MaterialType::EnderEye,
        MaterialType::EnchantingTable,
    ];
}

impl NetworkId for MaterialType {
    fn network_id(&self) -> &str {
        match self {
            MaterialType::Dirt => "dirt",
            MaterialType::Skull => "skull",
            MaterialType::Arrow => "arrow",
            MaterialType::Barrier => "barrier",
            MaterialType::Bookshelf => "bookshelf",
            MaterialType::EnderEye => "ender_eye",
            MaterialType::EnchantingTable => "enchanting_table",
        }
    }
}

/// Mouse gesture that triggered a click.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ClickEventType {
    Left,
    Right,
    Middle,
    ShiftLeft,
    ShiftRight,
    #[default]
    Other,
}

impl ClickEventType {
    pub const ALL: [ClickEventType; 6] = [
        ClickEventType::Left,
        ClickEventType::Right,
        ClickEventType::Middle,
        ClickEventType::ShiftLeft,
        ClickEventType::ShiftRight,
        ClickEventType::Other,
    ];
}

impl NetworkId for ClickEventType {
    fn network_id(&self) -> &str {
        match self {
            ClickEventType::Left => "left",
            ClickEventType::Right => "right",
            ClickEventType::Middle => "middle",
            ClickEventType::ShiftLeft => "shift_left",
            ClickEventType::ShiftRight => "shift_right",
            ClickEventType::Other => "other",
        }
    }
}

/// What happens when an item is clicked with a given gesture.
#[derive(Debug, Clone, PartialEq)]
pub struct ClickEventAction {
    pub actions: Vec<GuiAction>,
    pub close_inventory: bool,
}

impl ClickEventAction {
    pub fn single(action: GuiAction, close_inventory: bool) -> Self {
        Self {
            actions: vec![action],
            close_inventory,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GuiItem {
    pub material: MaterialType,
    pub display_name: ComponentString,
    pub lore: Vec<ComponentString>,
    pub texture_hash: Option<String>,
    pub enchantment_glow: bool,
    pub click_handlers: IndexMap<ClickEventType, ClickEventAction>,
}

impl GuiItem {
    pub fn new(material: MaterialType, display_name: ComponentString) -> Self {
        Self {
            material,
            display_name,
            lore: Vec::new(),
            texture_hash: None,
            enchantment_glow: false,
            click_handlers: IndexMap::new(),
        }
    }

    pub fn on_click(mut self, event: ClickEventType, action: ClickEventAction) -> Self {
        self.click_handlers.insert(event, action);
        self
    }
}

/// One rendered menu page, slots keyed by index.
#[derive(Debug, Clone, PartialEq)]
pub struct GuiPage {
    pub rows: i32,
    pub title: ComponentString,
    pub items: IndexMap<i32, GuiItem>,
}

pub static COMPONENT_STRING: LazyLock<NetworkCodec<ComponentString>> =
    LazyLock::new(|| STRING.map_to(|c: &ComponentString| c.0.clone(), ComponentString));

pub static PAGE_TYPE: LazyLock<NetworkCodec<PageType>> = LazyLock::new(|| {
    NetworkCodec::of_enum_dynamic(&PageType::ALL, |page| page.name().to_owned(), PageType::Main)
});

pub static MATERIAL_TYPE: LazyLock<NetworkCodec<MaterialType>> =
    LazyLock::new(|| NetworkCodec::of_enum(&MaterialType::ALL, MaterialType::Dirt));

pub static CLICK_EVENT_TYPE: LazyLock<NetworkCodec<ClickEventType>> =
    LazyLock::new(|| NetworkCodec::of_enum(&ClickEventType::ALL, ClickEventType::Other));

pub static CLICK_EVENT_ACTION: LazyLock<NetworkCodec<ClickEventAction>> = LazyLock::new(|| {
    record2(
        GUI_ACTION.list(),
        |c: &ClickEventAction| &c.actions,
        BOOLEAN.clone(),
        |c: &ClickEventAction| &c.close_inventory,
        |actions, close_inventory| ClickEventAction {
            actions,
            close_inventory,
        },
    )
});

pub static GUI_ITEM: LazyLock<NetworkCodec<GuiItem>> = LazyLock::new(|| {
    record6(
        MATERIAL_TYPE.clone(),
        |i: &GuiItem| &i.material,
        COMPONENT_STRING.clone(),
        |i: &GuiItem| &i.display_name,
        COMPONENT_STRING.list(),
        |i: &GuiItem| &i.lore,
        STRING.optional(),
        |i: &GuiItem| &i.texture_hash,
        BOOLEAN.clone(),
        |i: &GuiItem| &i.enchantment_glow,
        CLICK_EVENT_TYPE.map_of(&CLICK_EVENT_ACTION),
        |i: &GuiItem| &i.click_handlers,
        |material, display_name, lore, texture_hash, enchantment_glow, click_handlers| GuiItem {
            material,
            display_name,
            lore,
            texture_hash,
            enchantment_glow,
            click_handlers,
        },
    )
});

/// Whole page, gzip-compressed on the wire.
pub static GUI_PAGE: LazyLock<NetworkCodec<GuiPage>> = LazyLock::new(|| {
    record3(
        INT.clone(),
        |p: &GuiPage| &p.rows,
        COMPONENT_STRING.clone(),
        |p: &GuiPage| &p.title,
        INT.map_of(&GUI_ITEM),
        |p: &GuiPage| &p.items,
        |rows, title, items| GuiPage { rows, title, items },
    )
    .compressed()
});
