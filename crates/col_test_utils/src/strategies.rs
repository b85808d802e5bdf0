//! Proptest strategies.
//!
//! These strategies generate random but reproducible maps and trait
//! payloads for property-based testing.

use col_core::features::{
    Ability, HistoryEvent, HistoryEventType, LastSale, ModelMessage, MessageType, Modifier,
    ModifierType, Trait,
};
use col_core::map::{Map, TilePos};
use proptest::prelude::*;

/// Generate a map between 1x1 and `max_width` x `max_height` with random land.
pub fn arb_map(max_width: u32, max_height: u32) -> impl Strategy<Value = Map> {
    (1..=max_width, 1..=max_height).prop_flat_map(|(w, h)| arb_map_of_size(w, h))
}

/// Generate a `width` x `height` map with random land.
pub fn arb_map_of_size(width: u32, height: u32) -> impl Strategy<Value = Map> {
    let cells = (width * height) as usize;
    // Land on roughly a third of the tiles.
    proptest::collection::vec(prop::bool::weighted(0.35), cells).prop_map(move |land| {
        let mut map = Map::new(width, height);
        for (i, is_land) in land.into_iter().enumerate() {
            let pos = TilePos::new(i as u32 % width, i as u32 / width);
            // Always in bounds: `i` ranges over the grid.
            let _ = map.set_land(pos, is_land);
        }
        map
    })
}

/// Generate a tile position inside a `width` x `height` map.
pub fn arb_tile_pos(width: u32, height: u32) -> impl Strategy<Value = TilePos> {
    (0..width, 0..height).prop_map(|(x, y)| TilePos::new(x, y))
}

fn arb_id(prefix: &'static str) -> impl Strategy<Value = String> {
    "[a-z]{1,8}".prop_map(move |s| format!("{prefix}.{s}"))
}

/// Generate an ability.
pub fn arb_ability() -> impl Strategy<Value = Ability> {
    (arb_id("model.ability"), any::<bool>()).prop_map(|(id, value)| Ability {
        id,
        value,
        source: None,
    })
}

/// Generate a modifier.
pub fn arb_modifier() -> impl Strategy<Value = Modifier> {
    (
        arb_id("model.modifier"),
        -100i32..100,
        prop_oneof![
            Just(ModifierType::Additive),
            Just(ModifierType::Multiplicative),
            Just(ModifierType::Percentage),
        ],
    )
        .prop_map(|(id, value, modifier_type)| Modifier {
            id,
            value,
            modifier_type,
            source: None,
        })
}

/// Generate a history event.
pub fn arb_history_event() -> impl Strategy<Value = HistoryEvent> {
    (
        1u32..500,
        prop_oneof![
            Just(HistoryEventType::DiscoverRegion),
            Just(HistoryEventType::MeetNation),
            Just(HistoryEventType::FoundColony),
        ],
        0i32..200,
    )
        .prop_map(|(turn, event_type, score)| HistoryEvent {
            turn,
            event_type,
            text: String::new(),
            score,
        })
}

/// Generate any trait.
pub fn arb_trait() -> impl Strategy<Value = Trait> {
    prop_oneof![
        arb_ability().prop_map(Trait::Ability),
        arb_modifier().prop_map(Trait::Modifier),
        arb_history_event().prop_map(Trait::HistoryEvent),
        (1u64..50, arb_id("model.goods"), 1u32..500, 1u32..20).prop_map(
            |(location, goods_type, turn, price)| Trait::LastSale(LastSale {
                location,
                goods_type,
                turn,
                price,
            })
        ),
        arb_id("model.message").prop_map(|id| Trait::ModelMessage(ModelMessage {
            id,
            message_type: MessageType::Default,
            text: String::new(),
        })),
    ]
}

/// Generate a batch of up to `max_len` traits.
pub fn arb_trait_list(max_len: usize) -> impl Strategy<Value = Vec<Trait>> {
    proptest::collection::vec(arb_trait(), 0..max_len)
}
