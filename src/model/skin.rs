//! Skin values carried inside channel payloads.

use crate::core::builtin::STRING;
use crate::core::codec::{record2, record3, NetworkCodec};
use std::sync::LazyLock;

/// Signed texture property as issued by the session service.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SkinProperty {
    pub value: String,
    pub signature: String,
}

impl SkinProperty {
    pub fn new(value: impl Into<String>, signature: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            signature: signature.into(),
        }
    }
}

/// Player model a skin texture is drawn for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SkinVariant {
    #[default]
    Classic,
    Slim,
}

impl SkinVariant {
    pub const ALL: [SkinVariant; 2] = [SkinVariant::Classic, SkinVariant::Slim];

    pub fn name(self) -> &'static str {
        match self {
            SkinVariant::Classic => "classic",
            SkinVariant::Slim => "slim",
        }
    }
}

/// Where a stored skin came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SkinType {
    Player,
    Url,
    #[default]
    Custom,
    Legacy,
}

impl SkinType {
    pub const ALL: [SkinType; 4] = [
        SkinType::Player,
        SkinType::Url,
        SkinType::Custom,
        SkinType::Legacy,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SkinType::Player => "player",
            SkinType::Url => "url",
            SkinType::Custom => "custom",
            SkinType::Legacy => "legacy",
        }
    }
}

/// Reference to a stored skin.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SkinIdentifier {
    pub identifier: String,
    pub variant: Option<SkinVariant>,
    pub skin_type: SkinType,
}

impl SkinIdentifier {
    pub fn new(identifier: impl Into<String>, variant: Option<SkinVariant>, skin_type: SkinType) -> Self {
        Self {
            identifier: identifier.into(),
            variant,
            skin_type,
        }
    }
}

pub static SKIN_PROPERTY: LazyLock<NetworkCodec<SkinProperty>> = LazyLock::new(|| {
    record2(
        STRING.clone(),
        |p: &SkinProperty| &p.value,
        STRING.clone(),
        |p: &SkinProperty| &p.signature,
        |value, signature| SkinProperty { value, signature },
    )
});

/// Lower-cased variant name; unknown names read as `Classic`.
pub static SKIN_VARIANT: LazyLock<NetworkCodec<SkinVariant>> = LazyLock::new(|| {
    NetworkCodec::of_enum_dynamic(
        &SkinVariant::ALL,
        |variant| variant.name().to_owned(),
        SkinVariant::Classic,
    )
});

/// Lower-cased type name; unknown names read as `Custom`.
pub static SKIN_TYPE: LazyLock<NetworkCodec<SkinType>> = LazyLock::new(|| {
    NetworkCodec::of_enum_dynamic(&SkinType::ALL, |kind| kind.name().to_owned(), SkinType::Custom)
});

pub static SKIN_IDENTIFIER: LazyLock<NetworkCodec<SkinIdentifier>> = LazyLock::new(|| {
    record3(
        STRING.clone(),
        |s: &SkinIdentifier| &s.identifier,
        SKIN_VARIANT.optional(),
        |s: &SkinIdentifier| &s.variant,
        SKIN_TYPE.clone(),
        |s: &SkinIdentifier| &s.skin_type,
        |identifier, variant, skin_type| SkinIdentifier {
            identifier,
            variant,
            skin_type,
        },
    )
});
