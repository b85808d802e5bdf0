//! The `featureChange` message: add or remove traits on one object.

use serde::Serialize;
use serde_json::Value;

use super::{parse_trait, MessagePriority, WireError};
use crate::features::Trait;
use crate::objects::{ObjectGraph, ObjectId};

/// Add or remove a batch of traits on a target object.
///
/// The target is held by id. It is resolved only when the message is
/// applied, so a message for an object that has since been removed is
/// dropped instead of failing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureChangeMessage {
    /// Target object.
    pub id: ObjectId,
    /// Add when true, remove when false.
    pub add: bool,
    /// Trait payloads, in order.
    pub children: Vec<Trait>,
}

/// What applying a [`FeatureChangeMessage`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureChangeOutcome {
    /// The batch was applied; `changed` traits were actually added or removed.
    Applied {
        /// Traits added, or traits found and removed.
        changed: usize,
    },
    /// The target does not exist. Nothing changed.
    MissingTarget,
    /// The message carried no traits. Nothing changed.
    NoChildren,
}

impl FeatureChangeMessage {
    /// Wire tag.
    pub const TAG: &'static str = "featureChange";

    /// A change of one trait on `target`.
    #[must_use]
    pub fn new(target: ObjectId, child: Trait, add: bool) -> Self {
        Self::with_children(target, vec![child], add)
    }

    /// A change of several traits on `target`.
    #[must_use]
    pub fn with_children(target: ObjectId, children: Vec<Trait>, add: bool) -> Self {
        Self {
            id: target,
            add,
            children,
        }
    }

    /// Delivery priority.
    #[must_use]
    pub const fn priority(&self) -> MessagePriority {
        MessagePriority::Owned
    }

    /// Decode from a wire record whose `type` is [`Self::TAG`].
    ///
    /// `id` is required. A missing `add` means remove and a missing
    /// `children` list is empty. Any child with an unknown tag fails the
    /// whole record.
    pub fn from_wire(value: &Value) -> Result<Self, WireError> {
        let id = value
            .get("id")
            .and_then(Value::as_u64)
            .ok_or(WireError::MissingAttribute("id"))?;
        let add = match value.get("add") {
            None => false,
            Some(v) => v.as_bool().ok_or(WireError::MissingAttribute("add"))?,
        };
        let children = match value.get("children") {
            None => Vec::new(),
            Some(Value::Array(items)) => items.iter().map(parse_trait).collect::<Result<_, _>>()?,
            Some(_) => return Err(WireError::MissingAttribute("children")),
        };
        Ok(Self { id, add, children })
    }

    /// Apply the change to the live object graph.
    ///
    /// Adds or removes every child on the target in order. A missing target
    /// or an empty batch is logged and leaves the graph untouched.
    pub fn apply(&self, objects: &mut ObjectGraph) -> FeatureChangeOutcome {
        let Some(target) = objects.get_mut(self.id) else {
            tracing::warn!(target_id = self.id, "featureChange with missing target");
            return FeatureChangeOutcome::MissingTarget;
        };
        if self.children.is_empty() {
            tracing::warn!(target_id = self.id, "featureChange with no children");
            return FeatureChangeOutcome::NoChildren;
        }

        let mut changed = 0;
        for child in &self.children {
            if self.add {
                target.features.add(child.clone());
                changed += 1;
            } else if target.features.remove(child) {
                changed += 1;
            }
        }
        tracing::trace!(
            target_id = self.id,
            add = self.add,
            changed,
            "featureChange applied"
        );
        FeatureChangeOutcome::Applied { changed }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{Ability, Modifier, ModifierType};
    use crate::objects::GameObject;
    use crate::protocol::Message;

    fn scout() -> Trait {
        Trait::Ability(Ability::new("model.ability.expertScout"))
    }

    fn bonus() -> Trait {
        Trait::Modifier(Modifier {
            id: "model.modifier.lineOfSightBonus".into(),
            value: 1,
            modifier_type: ModifierType::Additive,
            source: None,
        })
    }

    #[test]
    fn test_attach_then_detach_restores() {
        let mut objects = ObjectGraph::new();
        let id = objects.insert(GameObject::new());
        let before = objects.clone();

        let add = FeatureChangeMessage::with_children(id, vec![scout(), bonus()], true);
        assert_eq!(
            add.apply(&mut objects),
            FeatureChangeOutcome::Applied { changed: 2 }
        );
        assert!(objects.get(id).unwrap().features.has_ability("model.ability.expertScout"));

        let remove = FeatureChangeMessage::with_children(id, vec![scout(), bonus()], false);
        remove.apply(&mut objects);
        assert_eq!(objects, before);
    }

    #[test]
    fn test_missing_target_is_noop() {
        let mut objects = ObjectGraph::new();
        objects.insert(GameObject::new());
        let before = objects.clone();

        let outcome = FeatureChangeMessage::new(404, scout(), true).apply(&mut objects);
        assert_eq!(outcome, FeatureChangeOutcome::MissingTarget);
        assert_eq!(objects, before);
    }

    #[test]
    fn test_empty_children_is_noop() {
        let mut objects = ObjectGraph::new();
        let id = objects.insert(GameObject::new());
        let before = objects.clone();

        let outcome = FeatureChangeMessage::with_children(id, Vec::new(), true).apply(&mut objects);
        assert_eq!(outcome, FeatureChangeOutcome::NoChildren);
        assert_eq!(objects, before);
    }

    #[test]
    fn test_removing_absent_trait_counts_nothing() {
        let mut objects = ObjectGraph::new();
        let id = objects.insert(GameObject::new());
        let outcome = FeatureChangeMessage::new(id, scout(), false).apply(&mut objects);
        assert_eq!(outcome, FeatureChangeOutcome::Applied { changed: 0 });
    }

    #[test]
    fn test_wire_format() {
        let message = Message::FeatureChange(FeatureChangeMessage::new(7, scout(), true));
        let line = message.to_wire().unwrap();
        let value: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["type"], "featureChange");
        assert_eq!(value["id"], 7);
        assert_eq!(value["add"], true);
        assert_eq!(value["children"][0]["tag"], "ability");

        assert_eq!(Message::from_wire(&line).unwrap(), message);
        assert_eq!(message.priority(), MessagePriority::Owned);
    }

    #[test]
    fn test_add_defaults_to_remove() {
        let message = Message::from_wire(r#"{"type":"featureChange","id":3}"#).unwrap();
        let Message::FeatureChange(change) = message else {
            panic!("wrong message");
        };
        assert!(!change.add);
        assert!(change.children.is_empty());
    }

    #[test]
    fn test_bad_child_rejects_record() {
        let line = r#"{"type":"featureChange","id":3,"add":true,"children":[
            {"tag":"ability","id":"model.ability.a"},
            {"tag":"goods","id":"model.goods.furs"}
        ]}"#;
        let err = Message::from_wire(line).unwrap_err();
        assert!(matches!(err, WireError::UnexpectedTag { found } if found == "goods"));
    }

    #[test]
    fn test_missing_id() {
        assert!(matches!(
            Message::from_wire(r#"{"type":"featureChange","add":true}"#),
            Err(WireError::MissingAttribute("id"))
        ));
    }
}
