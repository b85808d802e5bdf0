//! Traits attachable to game objects.
//!
//! A game object carries a [`FeatureSet`]: abilities, modifiers, history
//! events, last-sale records and player messages. The set owns the values it
//! holds. Traits are added and removed as values; removal takes out the most
//! recently added equal entry, so an add followed by a remove of the same
//! value leaves the set exactly as it was.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::objects::ObjectId;

/// A boolean capability (for example `model.ability.navalUnit`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ability {
    /// Ability id.
    pub id: String,
    /// Whether the ability is granted or denied.
    #[serde(default = "granted")]
    pub value: bool,
    /// What grants the ability.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

fn granted() -> bool {
    true
}

impl Ability {
    /// A granted ability with no source.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            value: true,
            source: None,
        }
    }
}

/// How a modifier combines with the base value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum ModifierType {
    /// Added to the base value.
    #[default]
    Additive,
    /// Multiplies the base value.
    Multiplicative,
    /// Adds a percentage of the base value.
    Percentage,
}

/// A numeric adjustment (for example `model.modifier.offence`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Modifier {
    /// Modifier id.
    pub id: String,
    /// Amount.
    pub value: i32,
    /// Combination rule.
    #[serde(default, rename = "type")]
    pub modifier_type: ModifierType,
    /// What grants the modifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl Modifier {
    /// Apply the modifier to a base value.
    #[must_use]
    pub fn apply(&self, base: i32) -> i32 {
        match self.modifier_type {
            ModifierType::Additive => base + self.value,
            ModifierType::Multiplicative => base * self.value,
            ModifierType::Percentage => base + base * self.value / 100,
        }
    }
}

/// Kinds of recorded history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HistoryEventType {
    /// First landfall in the new world.
    DiscoverNewWorld,
    /// A named region was discovered.
    DiscoverRegion,
    /// First contact with another nation.
    MeetNation,
    /// A colony was founded.
    FoundColony,
    /// A colony was abandoned.
    AbandonColony,
    /// Independence was declared.
    DeclareIndependence,
}

/// A record in a player's history.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEvent {
    /// Turn of the event.
    pub turn: u32,
    /// What happened.
    #[serde(rename = "type")]
    pub event_type: HistoryEventType,
    /// Description.
    #[serde(default)]
    pub text: String,
    /// Score change caused by the event.
    #[serde(default)]
    pub score: i32,
}

/// The last sale of a goods type at a location.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastSale {
    /// Where the goods were sold.
    pub location: ObjectId,
    /// Goods type id.
    pub goods_type: String,
    /// Turn of the sale.
    pub turn: u32,
    /// Price paid per unit.
    pub price: u32,
}

/// Category of a player message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageType {
    /// Plain information.
    #[default]
    Default,
    /// Something needs attention.
    Warning,
    /// A discovery was made.
    Discovery,
    /// Combat report.
    Combat,
    /// Market report.
    Market,
}

/// A message shown to a player.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelMessage {
    /// Message template id.
    pub id: String,
    /// Category.
    #[serde(default, rename = "type")]
    pub message_type: MessageType,
    /// Rendered text.
    #[serde(default)]
    pub text: String,
}

/// The closed set of trait kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TraitKind {
    /// [`Ability`].
    Ability,
    /// [`Modifier`].
    Modifier,
    /// [`HistoryEvent`].
    HistoryEvent,
    /// [`LastSale`].
    LastSale,
    /// [`ModelMessage`].
    ModelMessage,
}

impl TraitKind {
    /// Every kind.
    pub const ALL: [Self; 5] = [
        Self::Ability,
        Self::Modifier,
        Self::HistoryEvent,
        Self::LastSale,
        Self::ModelMessage,
    ];

    /// Wire tag naming the kind.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Ability => "ability",
            Self::Modifier => "modifier",
            Self::HistoryEvent => "historyEvent",
            Self::LastSale => "lastSale",
            Self::ModelMessage => "modelMessage",
        }
    }
}

impl fmt::Display for TraitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// One trait value of any kind.
///
/// Serializes self-tagged: the `tag` field names the kind and the payload
/// fields sit beside it. Parsing goes through
/// [`protocol::parse_trait`](crate::protocol::parse_trait).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "tag", rename_all = "camelCase")]
pub enum Trait {
    /// An ability.
    Ability(Ability),
    /// A modifier.
    Modifier(Modifier),
    /// A history record.
    HistoryEvent(HistoryEvent),
    /// A sale record.
    LastSale(LastSale),
    /// A player message.
    ModelMessage(ModelMessage),
}

impl Trait {
    /// Kind of this trait.
    #[must_use]
    pub const fn kind(&self) -> TraitKind {
        match self {
            Self::Ability(_) => TraitKind::Ability,
            Self::Modifier(_) => TraitKind::Modifier,
            Self::HistoryEvent(_) => TraitKind::HistoryEvent,
            Self::LastSale(_) => TraitKind::LastSale,
            Self::ModelMessage(_) => TraitKind::ModelMessage,
        }
    }
}

/// Traits held by one game object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeatureSet {
    abilities: Vec<Ability>,
    modifiers: Vec<Modifier>,
    history: Vec<HistoryEvent>,
    sales: Vec<LastSale>,
    messages: Vec<ModelMessage>,
}

impl FeatureSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a trait.
    pub fn add(&mut self, value: Trait) {
        match value {
            Trait::Ability(a) => self.abilities.push(a),
            Trait::Modifier(m) => self.modifiers.push(m),
            Trait::HistoryEvent(h) => self.history.push(h),
            Trait::LastSale(s) => self.sales.push(s),
            Trait::ModelMessage(m) => self.messages.push(m),
        }
    }

    /// Remove the most recently added trait equal to `value`.
    ///
    /// Returns `false` if no equal trait is held.
    pub fn remove(&mut self, value: &Trait) -> bool {
        match value {
            Trait::Ability(a) => remove_last(&mut self.abilities, a),
            Trait::Modifier(m) => remove_last(&mut self.modifiers, m),
            Trait::HistoryEvent(h) => remove_last(&mut self.history, h),
            Trait::LastSale(s) => remove_last(&mut self.sales, s),
            Trait::ModelMessage(m) => remove_last(&mut self.messages, m),
        }
    }

    /// Whether an ability is granted. The most recent entry for the id wins.
    #[must_use]
    pub fn has_ability(&self, id: &str) -> bool {
        self.abilities
            .iter()
            .rev()
            .find(|a| a.id == id)
            .is_some_and(|a| a.value)
    }

    /// All modifiers with an id, oldest first.
    pub fn modifiers<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Modifier> + 'a {
        self.modifiers.iter().filter(move |m| m.id == id)
    }

    /// Apply every modifier with an id to a base value, oldest first.
    #[must_use]
    pub fn apply_modifiers(&self, id: &str, base: i32) -> i32 {
        self.modifiers(id).fold(base, |value, m| m.apply(value))
    }

    /// Recorded history, oldest first.
    #[must_use]
    pub fn history(&self) -> &[HistoryEvent] {
        &self.history
    }

    /// Most recent sale of a goods type at a location.
    #[must_use]
    pub fn last_sale(&self, location: ObjectId, goods_type: &str) -> Option<&LastSale> {
        self.sales
            .iter()
            .rev()
            .find(|s| s.location == location && s.goods_type == goods_type)
    }

    /// Pending player messages, oldest first.
    #[must_use]
    pub fn messages(&self) -> &[ModelMessage] {
        &self.messages
    }

    /// Total number of traits held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.abilities.len()
            + self.modifiers.len()
            + self.history.len()
            + self.sales.len()
            + self.messages.len()
    }

    /// Whether the set holds no traits.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn remove_last<T: PartialEq>(items: &mut Vec<T>, value: &T) -> bool {
    match items.iter().rposition(|item| item == value) {
        Some(index) => {
            items.remove(index);
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offence(value: i32) -> Modifier {
        Modifier {
            id: "model.modifier.offence".into(),
            value,
            modifier_type: ModifierType::Percentage,
            source: None,
        }
    }

    #[test]
    fn test_add_then_remove_restores_set() {
        let mut set = FeatureSet::new();
        set.add(Trait::Ability(Ability::new("model.ability.expertScout")));
        set.add(Trait::Modifier(offence(50)));
        let before = set.clone();

        let extra = Trait::Modifier(offence(50));
        set.add(extra.clone());
        assert_eq!(set.len(), 3);
        assert!(set.remove(&extra));
        assert_eq!(set, before);
    }

    #[test]
    fn test_remove_missing_trait() {
        let mut set = FeatureSet::new();
        assert!(!set.remove(&Trait::Ability(Ability::new("model.ability.missing"))));
        assert!(set.is_empty());
    }

    #[test]
    fn test_latest_ability_wins() {
        let mut set = FeatureSet::new();
        set.add(Trait::Ability(Ability::new("model.ability.bombard")));
        assert!(set.has_ability("model.ability.bombard"));

        set.add(Trait::Ability(Ability {
            id: "model.ability.bombard".into(),
            value: false,
            source: Some("model.event.treaty".into()),
        }));
        assert!(!set.has_ability("model.ability.bombard"));
        assert!(!set.has_ability("model.ability.other"));
    }

    #[test]
    fn test_modifiers_apply_in_order() {
        let mut set = FeatureSet::new();
        set.add(Trait::Modifier(offence(50)));
        set.add(Trait::Modifier(Modifier {
            id: "model.modifier.offence".into(),
            value: 2,
            modifier_type: ModifierType::Additive,
            source: None,
        }));
        assert_eq!(set.apply_modifiers("model.modifier.offence", 10), 17);
        assert_eq!(set.apply_modifiers("model.modifier.defence", 10), 10);
    }

    #[test]
    fn test_last_sale_lookup() {
        let mut set = FeatureSet::new();
        for (turn, price) in [(3, 10), (5, 12)] {
            set.add(Trait::LastSale(LastSale {
                location: 7,
                goods_type: "model.goods.furs".into(),
                turn,
                price,
            }));
        }
        assert_eq!(set.last_sale(7, "model.goods.furs").unwrap().price, 12);
        assert!(set.last_sale(8, "model.goods.furs").is_none());
    }

    #[test]
    fn test_trait_serializes_self_tagged() {
        let value = Trait::Ability(Ability::new("model.ability.navalUnit"));
        let json = serde_json::to_value(&value).unwrap();
        assert_eq!(json["tag"], "ability");
        assert_eq!(json["id"], "model.ability.navalUnit");
        assert_eq!(json["value"], true);
    }

    #[test]
    fn test_kind_tags_are_distinct() {
        let mut tags: Vec<_> = TraitKind::ALL.iter().map(|k| k.tag()).collect();
        tags.sort_unstable();
        tags.dedup();
        assert_eq!(tags.len(), TraitKind::ALL.len());
    }
}
