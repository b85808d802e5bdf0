//! Feature change tests through the wire codec.
//!
//! Messages are encoded to JSON lines and decoded again before they are
//! applied, the way a client receives them.

use col_core::features::Trait;
use col_core::objects::{GameObject, ObjectGraph};
use col_core::protocol::{FeatureChangeMessage, FeatureChangeOutcome, Message};
use col_test_utils::fixtures::sample_game;
use col_test_utils::strategies::arb_trait_list;
use proptest::prelude::*;

fn over_the_wire(message: &Message) -> FeatureChangeMessage {
    let line = message.to_wire().unwrap();
    match Message::from_wire(&line).unwrap() {
        Message::FeatureChange(change) => change,
        other => panic!("decoded {other:?}"),
    }
}

#[test]
fn stale_target_leaves_game_untouched() {
    let mut sample = sample_game();
    let doomed = sample.ship;
    let message = Message::FeatureChange(FeatureChangeMessage::new(
        doomed,
        Trait::Ability(col_core::features::Ability::new("model.ability.navalUnit")),
        true,
    ));

    sample.game.dispose_unit(doomed).unwrap();
    let before = sample.game.state_hash();

    let change = over_the_wire(&message);
    assert_eq!(
        change.apply(sample.game.objects_mut()),
        FeatureChangeOutcome::MissingTarget
    );
    assert_eq!(sample.game.state_hash(), before);
}

proptest! {
    /// Attaching a batch and then detaching it restores the target.
    #[test]
    fn attach_detach_round_trip(
        existing in arb_trait_list(6),
        batch in arb_trait_list(8),
    ) {
        let mut objects = ObjectGraph::new();
        let id = objects.insert(GameObject::new());
        if !existing.is_empty() {
            FeatureChangeMessage::with_children(id, existing, true).apply(&mut objects);
        }
        let before = objects.clone();

        let attach = Message::FeatureChange(
            FeatureChangeMessage::with_children(id, batch.clone(), true),
        );
        let detach = Message::FeatureChange(
            FeatureChangeMessage::with_children(id, batch.clone(), false),
        );
        let attached = over_the_wire(&attach).apply(&mut objects);
        let detached = over_the_wire(&detach).apply(&mut objects);

        if batch.is_empty() {
            prop_assert_eq!(attached, FeatureChangeOutcome::NoChildren);
        } else {
            prop_assert_eq!(attached, FeatureChangeOutcome::Applied { changed: batch.len() });
            prop_assert_eq!(detached, FeatureChangeOutcome::Applied { changed: batch.len() });
        }
        prop_assert_eq!(objects, before);
    }

    /// A message for an id that was never allocated changes nothing.
    #[test]
    fn absent_target_is_noop(batch in arb_trait_list(4), add in any::<bool>()) {
        let mut objects = ObjectGraph::new();
        objects.insert(GameObject::new());
        let before = objects.clone();

        let outcome = FeatureChangeMessage::with_children(999, batch, add).apply(&mut objects);
        prop_assert_eq!(outcome, FeatureChangeOutcome::MissingTarget);
        prop_assert_eq!(objects, before);
    }
}
