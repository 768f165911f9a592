//! Property-based tests using proptest
//!
//! These tests check the round-trip law `read(write(x)) == x` for primitive
//! codecs, nested combinators and whole envelopes, plus decoder robustness
//! against arbitrary bytes.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use indexmap::IndexMap;
use proptest::prelude::*;
use skin_channel_protocol::core::builtin::{BOOLEAN, INT, LONG, STRING, UUID};
use skin_channel_protocol::core::io::Reader;
use skin_channel_protocol::model::gui::{GUI_PAGE, MATERIAL_TYPE};
use skin_channel_protocol::model::{
    ClickEventAction, ClickEventType, ComponentString, GuiItem, GuiPage, MaterialType, PageType,
    SkinIdentifier, SkinProperty, SkinType, SkinVariant,
};
use skin_channel_protocol::protocol::{
    AckPayload, GiveSkull, GuiAction, OpenPage, ProxyBoundPayload, ServerBoundPayload,
    SkinUpdate,
};
use skin_channel_protocol::utils::compression::{compress, decompress, CompressionKind};
use uuid::Uuid;

fn arb_uuid() -> impl Strategy<Value = Uuid> {
    any::<u128>().prop_map(Uuid::from_u128)
}

fn arb_skin_identifier() -> impl Strategy<Value = SkinIdentifier> {
    (
        "[a-zA-Z0-9_]{1,16}",
        prop::option::of(prop::sample::select(SkinVariant::ALL.to_vec())),
        prop::sample::select(SkinType::ALL.to_vec()),
    )
        .prop_map(|(identifier, variant, skin_type)| {
            SkinIdentifier::new(identifier, variant, skin_type)
        })
}

fn arb_gui_action() -> impl Strategy<Value = GuiAction> {
    prop_oneof![
        (any::<i32>(), prop::sample::select(PageType::ALL.to_vec()))
            .prop_map(|(page, page_type)| GuiAction::OpenPage(OpenPage { page, page_type })),
        Just(GuiAction::ClearSkin),
        arb_skin_identifier().prop_map(GuiAction::SetSkin),
        arb_skin_identifier().prop_map(GuiAction::AddFavourite),
        arb_skin_identifier().prop_map(GuiAction::RemoveFavourite),
        Just(GuiAction::Unknown),
    ]
}

fn arb_gui_item() -> impl Strategy<Value = GuiItem> {
    (
        prop::sample::select(MaterialType::ALL.to_vec()),
        ".{0,32}",
        prop::collection::vec(".{0,16}", 0..4),
        prop::option::of("[0-9a-f]{64}"),
        any::<bool>(),
        prop::collection::vec(
            (
                prop::sample::select(ClickEventType::ALL.to_vec()),
                prop::collection::vec(arb_gui_action(), 0..3),
                any::<bool>(),
            ),
            0..4,
        ),
    )
        .prop_map(|(material, name, lore, texture_hash, glow, handlers)| {
            let mut click_handlers = IndexMap::new();
            for (event, actions, close_inventory) in handlers {
                click_handlers.insert(
                    event,
                    ClickEventAction {
                        actions,
                        close_inventory,
                    },
                );
            }
            GuiItem {
                material,
                display_name: ComponentString::new(name),
                lore: lore.into_iter().map(ComponentString::new).collect(),
                texture_hash,
                enchantment_glow: glow,
                click_handlers,
            }
        })
}

fn arb_gui_page() -> impl Strategy<Value = GuiPage> {
    (
        1..=6i32,
        ".{0,32}",
        prop::collection::vec((0..54i32, arb_gui_item()), 0..8),
    )
        .prop_map(|(rows, title, slots)| GuiPage {
            rows,
            title: ComponentString::new(title),
            items: slots.into_iter().collect(),
        })
}

fn arb_server_bound() -> impl Strategy<Value = ServerBoundPayload> {
    let property = (".{0,64}", ".{0,64}").prop_map(|(v, s)| SkinProperty::new(v, s));
    prop_oneof![
        arb_gui_page().prop_map(ServerBoundPayload::OpenGui),
        property.clone().prop_map(ServerBoundPayload::SkinUpdateV2),
        (
            property,
            prop::option::of((arb_uuid(), "[0-9.]{1,10}"))
        )
            .prop_map(|(property, ack)| ServerBoundPayload::SkinUpdateV3(SkinUpdate {
                property,
                ack: ack.map(|(id, version)| AckPayload::new(id, version)),
            })),
        (".{0,32}", "[0-9a-f]{64}").prop_map(|(name, hash)| {
            ServerBoundPayload::GiveSkull(GiveSkull {
                display_name: ComponentString(name),
                texture_hash: hash,
            })
        }),
        Just(ServerBoundPayload::Unknown),
    ]
}

fn arb_proxy_bound() -> impl Strategy<Value = ProxyBoundPayload> {
    prop_oneof![
        prop::collection::vec(arb_gui_action(), 0..8).prop_map(ProxyBoundPayload::GuiActionList),
        (arb_uuid(), ".{0,16}")
            .prop_map(|(id, version)| ProxyBoundPayload::Ack(AckPayload::new(id, version))),
        Just(ProxyBoundPayload::Unknown),
    ]
}

// Property: primitive codecs round-trip
proptest! {
    #[test]
    fn prop_primitive_roundtrip(i in any::<i32>(), l in any::<i64>(), b in any::<bool>(), s in ".*", u in arb_uuid()) {
        prop_assert_eq!(INT.decode(INT.encode(&i).unwrap()).unwrap(), i);
        prop_assert_eq!(LONG.decode(LONG.encode(&l).unwrap()).unwrap(), l);
        prop_assert_eq!(BOOLEAN.decode(BOOLEAN.encode(&b).unwrap()).unwrap(), b);
        prop_assert_eq!(STRING.decode(STRING.encode(&s).unwrap()).unwrap(), s);
        prop_assert_eq!(UUID.decode(UUID.encode(&u).unwrap()).unwrap(), u);
    }
}

// Property: nested optional/list/map combinators round-trip
proptest! {
    #[test]
    fn prop_nested_combinators_roundtrip(
        value in prop::collection::vec(prop::option::of(prop::collection::vec(".{0,8}", 0..4)), 0..6),
        entries in prop::collection::vec((any::<i32>(), ".{0,8}"), 0..16),
    ) {
        let nested = STRING.list().optional().list();
        prop_assert_eq!(nested.decode(nested.encode(&value).unwrap()).unwrap(), value);

        let map: IndexMap<i32, String> = entries.into_iter().collect();
        let map_codec = INT.map_of(&STRING);
        prop_assert_eq!(map_codec.decode(map_codec.encode(&map).unwrap()).unwrap(), map);
    }
}

// Property: compressed sections round-trip
proptest! {
    #[test]
    fn prop_gui_page_roundtrip(page in arb_gui_page()) {
        let bytes = GUI_PAGE.encode(&page).unwrap();
        prop_assert_eq!(GUI_PAGE.decode(bytes).unwrap(), page);
    }
}

// Property: every server-bound payload round-trips through the envelope
proptest! {
    #[test]
    fn prop_server_bound_envelope_roundtrip(payload in arb_server_bound()) {
        let bytes = payload.encode().unwrap();
        prop_assert_eq!(ServerBoundPayload::decode(bytes).unwrap(), payload);
    }
}

proptest! {
    #[test]
    fn prop_proxy_bound_envelope_roundtrip(payload in arb_proxy_bound()) {
        let bytes = payload.encode().unwrap();
        prop_assert_eq!(ProxyBoundPayload::decode(bytes).unwrap(), payload);
    }
}

// Property: encoding is deterministic
proptest! {
    #[test]
    fn prop_envelope_encoding_deterministic(payload in arb_proxy_bound()) {
        prop_assert_eq!(payload.encode().unwrap(), payload.encode().unwrap());
    }
}

// Property: an unknown tag consumes only the tag, whatever follows it
proptest! {
    #[test]
    fn prop_unknown_tag_consumes_only_tag(
        tag in "future[A-Z][a-zA-Z]{0,12}",
        trailing in prop::collection::vec(any::<u8>(), 0..64),
    ) {
        let mut data = STRING.encode(&tag).unwrap().to_vec();
        data.extend_from_slice(&trailing);

        let registry = skin_channel_protocol::protocol::server_bound::registry();
        let mut reader = Reader::new(data);
        prop_assert_eq!(registry.read_payload(&mut reader).unwrap(), ServerBoundPayload::Unknown);
        prop_assert_eq!(reader.remaining(), trailing.len());
    }
}

// Property: decoders never panic on arbitrary input
proptest! {
    #[test]
    fn prop_decode_arbitrary_bytes_never_panics(data in prop::collection::vec(any::<u8>(), 0..512)) {
        let _ = ServerBoundPayload::decode(data.clone());
        let _ = ProxyBoundPayload::decode(data.clone());
        let _ = MATERIAL_TYPE.decode(data);
    }
}

// Property: block compression roundtrip preserves data
proptest! {
    #[test]
    fn prop_compression_roundtrip(data in prop::collection::vec(any::<u8>(), 0..20000)) {
        for kind in [CompressionKind::Gzip, CompressionKind::Lz4, CompressionKind::Zstd] {
            let compressed = compress(&data, &kind).expect("Compression should not fail");
            let decompressed = decompress(&compressed, &kind).expect("Decompression should not fail");
            prop_assert_eq!(&decompressed, &data);
        }
    }
}
