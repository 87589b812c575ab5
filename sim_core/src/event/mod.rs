//! Typed events coupling the combat subsystems

mod bus;

pub use bus::{EventBus, ListenerHandle};

use crate::types::{Element, MoveType, PhysAnomaly, ReactionKind, Tick};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Every event kind the bus dispatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    CombatStart,
    CombatEnd,
    TickStart,
    TickEnd,
    PreDamage,
    PostDamage,
    DamageDealt,
    DamageTaken,
    CritDealt,
    CritTaken,
    ActionStart,
    ActionEnd,
    SkillCast,
    EffectApplied,
    EffectStacked,
    EffectExpired,
    EffectRemoved,
    ReactionTriggered,
    ElementAttached,
    ElementBurst,
    HpChanged,
    StaggerStart,
    StaggerEnd,
    Custom,
}

/// A payload slot value. Listeners read and write these through
/// [`Event::get`] / [`Event::set`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PayloadValue {
    Number(f64),
    Int(i64),
    Flag(bool),
    Text(String),
    Element(Element),
    Move(MoveType),
    Reaction(ReactionKind),
    Anomaly(PhysAnomaly),
}

impl PayloadValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PayloadValue::Number(v) => Some(*v),
            PayloadValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            PayloadValue::Int(v) => Some(*v),
            PayloadValue::Number(v) => Some(*v as i64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PayloadValue::Flag(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PayloadValue::Text(v) => Some(v),
            _ => None,
        }
    }
}

/// One event instance with a mutable payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub kind: EventKind,
    pub data: BTreeMap<String, PayloadValue>,
    pub source: Option<String>,
    pub target: Option<String>,
    pub tick: Tick,
    pub cancelled: bool,
    pub modified: bool,
}

impl Event {
    pub fn new(kind: EventKind, tick: Tick) -> Self {
        Event {
            kind,
            data: BTreeMap::new(),
            source: None,
            target: None,
            tick,
            cancelled: false,
            modified: false,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn with(mut self, key: impl Into<String>, value: PayloadValue) -> Self {
        self.data.insert(key.into(), value);
        self
    }

    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    pub fn get(&self, key: &str) -> Option<&PayloadValue> {
        self.data.get(key)
    }

    /// Set a payload slot, marking the event modified.
    pub fn set(&mut self, key: impl Into<String>, value: PayloadValue) {
        self.data.insert(key.into(), value);
        self.modified = true;
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(PayloadValue::as_f64)
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(PayloadValue::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_marks_modified() {
        let mut event = Event::new(EventKind::PreDamage, 3)
            .with("damage", PayloadValue::Number(100.0));
        assert!(!event.modified);
        event.set("damage", PayloadValue::Number(250.0));
        assert!(event.modified);
        assert_eq!(event.number("damage"), Some(250.0));
    }
}
