//! Per-tick battle snapshots

use crate::effect::{Effect, EffectCategory};
use crate::types::Tick;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One effect as seen in a snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectFrame {
    pub name: String,
    pub stacks: u32,
    pub remaining_seconds: f64,
    pub category: EffectCategory,
}

impl EffectFrame {
    pub fn from_effect(effect: &Effect, tick_rate: f64) -> Self {
        EffectFrame {
            name: effect.name.clone(),
            stacks: effect.stacks,
            remaining_seconds: effect.duration as f64 / tick_rate,
            category: effect.category,
        }
    }
}

/// Current action progress of a character.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionFrame {
    pub name: String,
    /// 0.0 ..= 1.0
    pub progress: f64,
}

/// One entity's state inside a snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityFrame {
    pub effects: Vec<EffectFrame>,
    pub action: Option<ActionFrame>,
    pub qte_ready: bool,
    /// Kit gauge readout or target attachment summary
    pub extra: String,
}

/// State of the whole battle after one tick. Snapshots are observations
/// only; nothing reads them back into the loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotFrame {
    pub tick: Tick,
    pub time: String,
    /// Damage applied during this tick
    pub damage_tick: i64,
    /// Party technique points, floored
    pub sp: i64,
    pub entities: BTreeMap<String, EntityFrame>,
}
