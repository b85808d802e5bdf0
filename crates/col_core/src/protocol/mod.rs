//! Wire protocol between server and clients.
//!
//! Messages travel as JSON objects, one per line. The `type` field names the
//! message; the remaining fields are its attributes. Trait payloads inside a
//! message are self-tagged with a `tag` field and parsed through
//! [`TRAIT_PARSERS`], a table with one parser per [`TraitKind`].

pub mod feature_change;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::features::{Ability, HistoryEvent, LastSale, ModelMessage, Modifier, Trait, TraitKind};

pub use feature_change::{FeatureChangeMessage, FeatureChangeOutcome};

/// Errors raised while decoding a wire record.
#[derive(Debug, Error)]
pub enum WireError {
    /// A trait payload carried a tag no parser handles.
    #[error("unexpected trait tag '{found}'")]
    UnexpectedTag {
        /// The tag that was read.
        found: String,
    },

    /// A required attribute is absent or has the wrong type.
    #[error("missing attribute '{0}'")]
    MissingAttribute(&'static str),

    /// The record is not valid JSON or a payload does not fit its kind.
    #[error("malformed record: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The `type` of the record is not a known message.
    #[error("unknown message type '{0}'")]
    UnknownMessage(String),

    /// The trait parser table does not cover a kind exactly once.
    #[error("trait kind '{kind}' has {count} parsers")]
    ParserTable {
        /// The offending kind.
        kind: TraitKind,
        /// How many parsers were registered for it.
        count: usize,
    },
}

/// Delivery priority, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MessagePriority {
    /// Must arrive before anything else queued (turn changes).
    Early,
    /// Ordinary updates.
    Normal,
    /// Changes to objects the receiving player owns.
    Owned,
    /// Informational messages that may trail.
    Late,
}

/// A protocol message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Message {
    /// Add or remove traits on an object.
    FeatureChange(FeatureChangeMessage),
    /// A new turn has started.
    NewTurn {
        /// The turn that started.
        turn: u32,
    },
}

impl Message {
    /// Wire tag of the message.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::FeatureChange(_) => FeatureChangeMessage::TAG,
            Self::NewTurn { .. } => "newTurn",
        }
    }

    /// Delivery priority.
    #[must_use]
    pub const fn priority(&self) -> MessagePriority {
        match self {
            Self::FeatureChange(m) => m.priority(),
            Self::NewTurn { .. } => MessagePriority::Early,
        }
    }

    /// Encode as a single JSON line, without the trailing newline.
    pub fn to_wire(&self) -> Result<String, WireError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode one JSON line.
    pub fn from_wire(line: &str) -> Result<Self, WireError> {
        let value: Value = serde_json::from_str(line)?;
        let tag = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or(WireError::MissingAttribute("type"))?;
        match tag {
            FeatureChangeMessage::TAG => Ok(Self::FeatureChange(FeatureChangeMessage::from_wire(
                &value,
            )?)),
            "newTurn" => {
                let turn = value
                    .get("turn")
                    .and_then(Value::as_u64)
                    .and_then(|t| u32::try_from(t).ok())
                    .ok_or(WireError::MissingAttribute("turn"))?;
                Ok(Self::NewTurn { turn })
            }
            other => Err(WireError::UnknownMessage(other.to_owned())),
        }
    }
}

/// Parses one trait payload of a known kind.
pub type TraitParser = fn(Value) -> serde_json::Result<Trait>;

fn parse_ability(value: Value) -> serde_json::Result<Trait> {
    serde_json::from_value::<Ability>(value).map(Trait::Ability)
}

fn parse_modifier(value: Value) -> serde_json::Result<Trait> {
    serde_json::from_value::<Modifier>(value).map(Trait::Modifier)
}

fn parse_history_event(value: Value) -> serde_json::Result<Trait> {
    serde_json::from_value::<HistoryEvent>(value).map(Trait::HistoryEvent)
}

fn parse_last_sale(value: Value) -> serde_json::Result<Trait> {
    serde_json::from_value::<LastSale>(value).map(Trait::LastSale)
}

fn parse_model_message(value: Value) -> serde_json::Result<Trait> {
    serde_json::from_value::<ModelMessage>(value).map(Trait::ModelMessage)
}

/// Tag to parser table for trait payloads.
pub static TRAIT_PARSERS: &[(TraitKind, TraitParser)] = &[
    (TraitKind::Ability, parse_ability),
    (TraitKind::Modifier, parse_modifier),
    (TraitKind::HistoryEvent, parse_history_event),
    (TraitKind::LastSale, parse_last_sale),
    (TraitKind::ModelMessage, parse_model_message),
];

/// Check that every trait kind has exactly one parser.
///
/// Run once at startup so a missing entry shows up before any message does.
pub fn verify_trait_parsers() -> Result<(), WireError> {
    verify_parser_table(TRAIT_PARSERS)
}

fn verify_parser_table(table: &[(TraitKind, TraitParser)]) -> Result<(), WireError> {
    for kind in TraitKind::ALL {
        let count = table.iter().filter(|(k, _)| *k == kind).count();
        if count != 1 {
            return Err(WireError::ParserTable { kind, count });
        }
    }
    Ok(())
}

/// Parse one self-tagged trait payload.
pub fn parse_trait(value: &Value) -> Result<Trait, WireError> {
    let tag = value
        .get("tag")
        .and_then(Value::as_str)
        .ok_or(WireError::MissingAttribute("tag"))?;
    let (_, parser) = TRAIT_PARSERS
        .iter()
        .find(|(kind, _)| kind.tag() == tag)
        .ok_or_else(|| WireError::UnexpectedTag {
            found: tag.to_owned(),
        })?;
    Ok(parser(value.clone())?)
}
