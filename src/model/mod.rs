//! # Domain Values
//!
//! Records carried inside channel payloads, each with its codec.

pub mod gui;
pub mod skin;

pub use gui::{
    ClickEventAction, ClickEventType, ComponentString, GuiItem, GuiPage, MaterialType, PageType,
};
pub use skin::{SkinIdentifier, SkinProperty, SkinType, SkinVariant};
