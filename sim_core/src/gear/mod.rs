//! Weapons, equipment, and set bonuses
//!
//! The core consumes already-deserialized catalog records; nothing here
//! touches disk. Stat bonuses are folded into the character at setup; special
//! effects become [`GearWatcher`]s the scheduler matches against drained
//! events.

mod watcher;

pub use watcher::GearWatcher;

use crate::stats::StatKey;
use crate::types::{EffectTag, Element, MoveType, ReactionKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// When a gear effect fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GearTrigger {
    OnReaction,
    OnSkillCast,
    OnDamageDealt,
    OnCrit,
    OnBuffApplied,
    OnElementAttach,
    /// Catalog data naming a trigger this build does not know; never fires.
    #[serde(other)]
    Unknown,
}

/// Filters a trigger must pass. Every list is "empty means any"; a condition
/// entry deserialized as unknown can never equal a live value, so it never
/// fires.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TriggerCondition {
    pub reactions: Vec<ReactionKind>,
    pub move_types: Vec<MoveType>,
    pub min_damage: Option<f64>,
    pub buff_tags: Vec<EffectTag>,
    pub min_stacks: Option<u32>,
    pub elements: Vec<Element>,
}

/// One triggered effect on a weapon or equipment piece.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GearEffect {
    pub trigger: GearTrigger,
    #[serde(default)]
    pub condition: TriggerCondition,
    /// Stat-modifier buff granted on trigger
    pub buff_stats: BTreeMap<StatKey, f64>,
    /// Buff duration in seconds
    pub duration: f64,
    /// Grant the buff to every other teammate instead of the owner
    #[serde(default)]
    pub team_wide: bool,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Weapon {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub weapon_atk: f64,
    #[serde(default)]
    pub stat_bonuses: BTreeMap<StatKey, f64>,
    #[serde(default)]
    pub effects: Vec<GearEffect>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Equipment {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub slot: String,
    #[serde(default)]
    pub stat_bonuses: BTreeMap<StatKey, f64>,
    #[serde(default)]
    pub effects: Vec<GearEffect>,
    #[serde(default)]
    pub set_id: Option<String>,
}

/// One tier of a set: active while `count >= pieces_required`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetBonus {
    pub pieces_required: u32,
    #[serde(default)]
    pub stat_bonuses: BTreeMap<StatKey, f64>,
    #[serde(default)]
    pub effects: Vec<GearEffect>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquipmentSet {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub bonuses: Vec<SetBonus>,
}

/// The loaded catalogs handed in by the host.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GearCatalog {
    pub weapons: BTreeMap<String, Weapon>,
    pub equipment: BTreeMap<String, Equipment>,
    pub sets: BTreeMap<String, EquipmentSet>,
}

impl GearCatalog {
    pub fn new() -> Self {
        GearCatalog::default()
    }

    /// Set tiers satisfied by `counts` (set id -> equipped piece count).
    pub fn active_set_bonuses<'a>(
        &'a self,
        counts: &BTreeMap<String, u32>,
    ) -> Vec<(&'a EquipmentSet, &'a SetBonus)> {
        let mut active = Vec::new();
        for (set_id, count) in counts {
            let Some(set) = self.sets.get(set_id) else { continue };
            for bonus in &set.bonuses {
                if *count >= bonus.pieces_required {
                    active.push((set, bonus));
                }
            }
        }
        active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_trigger_from_serde() {
        let json = r#"{"trigger": "on_full_moon", "buff_stats": {}, "duration": 5.0}"#;
        let effect: GearEffect = serde_json::from_str(json).unwrap();
        assert_eq!(effect.trigger, GearTrigger::Unknown);
    }

    #[test]
    fn test_set_tiers_by_count() {
        let mut catalog = GearCatalog::new();
        catalog.sets.insert(
            "oath".to_string(),
            EquipmentSet {
                id: "oath".to_string(),
                name: "Oathbound".to_string(),
                bonuses: vec![
                    SetBonus {
                        pieces_required: 2,
                        stat_bonuses: BTreeMap::from([(StatKey::AtkPct, 0.10)]),
                        effects: vec![],
                    },
                    SetBonus {
                        pieces_required: 4,
                        stat_bonuses: BTreeMap::from([(StatKey::CritRate, 0.08)]),
                        effects: vec![],
                    },
                ],
            },
        );
        let counts = BTreeMap::from([("oath".to_string(), 3u32)]);
        let active = catalog.active_set_bonuses(&counts);
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].1.pieces_required, 2);

        let counts = BTreeMap::from([("oath".to_string(), 4u32)]);
        assert_eq!(catalog.active_set_bonuses(&counts).len(), 2);
    }
}
