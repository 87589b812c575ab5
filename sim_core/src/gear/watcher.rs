//! Matching gear effects against drained events

use super::{GearEffect, GearTrigger};
use crate::config::SimConfig;
use crate::effect::{Effect, EffectCategory};
use crate::event::{Event, EventKind, PayloadValue};
use crate::types::EffectTag;

/// A registered gear effect waiting for its trigger.
#[derive(Debug, Clone)]
pub struct GearWatcher {
    /// Arena index of the owning character
    pub owner_index: usize,
    pub owner_name: String,
    /// Gear display name, used for the granted buff's name
    pub gear_name: String,
    pub effect: GearEffect,
}

impl GearWatcher {
    /// Does this event fire the effect? Ownership, kind, and every condition
    /// list must pass; unknown triggers and unknown condition entries never
    /// match.
    pub fn matches(&self, event: &Event) -> bool {
        let expected_kind = match self.effect.trigger {
            GearTrigger::OnReaction => EventKind::ReactionTriggered,
            GearTrigger::OnSkillCast => EventKind::SkillCast,
            GearTrigger::OnDamageDealt => EventKind::DamageDealt,
            GearTrigger::OnCrit => EventKind::CritDealt,
            GearTrigger::OnBuffApplied => EventKind::EffectApplied,
            GearTrigger::OnElementAttach => EventKind::ElementAttached,
            GearTrigger::Unknown => return false,
        };
        if event.kind != expected_kind {
            return false;
        }
        if event.source.as_deref() != Some(self.owner_name.as_str()) {
            return false;
        }

        let condition = &self.effect.condition;
        if !condition.reactions.is_empty() {
            let Some(PayloadValue::Reaction(kind)) = event.get("reaction_type") else {
                return false;
            };
            if !condition.reactions.contains(kind) {
                return false;
            }
        }
        if !condition.move_types.is_empty() {
            let Some(PayloadValue::Move(move_type)) = event.get("move_type") else {
                return false;
            };
            if !condition.move_types.contains(move_type) {
                return false;
            }
        }
        if let Some(min_damage) = condition.min_damage {
            match event.number("damage") {
                Some(damage) if damage >= min_damage => {}
                _ => return false,
            }
        }
        if let Some(min_stacks) = condition.min_stacks {
            match event.get("stacks").and_then(PayloadValue::as_i64) {
                Some(stacks) if stacks >= min_stacks as i64 => {}
                _ => return false,
            }
        }
        if !condition.elements.is_empty() {
            let Some(PayloadValue::Element(element)) = event.get("element") else {
                return false;
            };
            if !condition.elements.contains(element) {
                return false;
            }
        }
        if !condition.buff_tags.is_empty() {
            let Some(tags) = event.text("buff_tags") else {
                return false;
            };
            let present: Vec<&str> = tags.split_whitespace().collect();
            if !condition.buff_tags.iter().any(|t| present.contains(&t.name())) {
                return false;
            }
        }
        true
    }

    /// Build the granted buff.
    pub fn buff(&self, config: &SimConfig) -> Effect {
        let mods = self.effect.buff_stats.iter().map(|(k, v)| (*k, *v)).collect();
        let name = if self.effect.team_wide {
            format!("{} (team)", self.gear_name)
        } else {
            format!("{} effect", self.gear_name)
        };
        let mut effect = Effect::stat_modifier(
            name,
            EffectCategory::Buff,
            config.ticks(self.effect.duration),
            mods,
            self.owner_name.clone(),
        );
        if self.effect.team_wide {
            effect = effect.with_tag(EffectTag::TeamBuff);
        }
        effect
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gear::TriggerCondition;
    use crate::stats::StatKey;
    use crate::types::{Element, MoveType, ReactionKind};
    use std::collections::BTreeMap;

    fn watcher(trigger: GearTrigger, condition: TriggerCondition) -> GearWatcher {
        GearWatcher {
            owner_index: 1,
            owner_name: "莱瓦汀".to_string(),
            gear_name: "Nova Staff".to_string(),
            effect: GearEffect {
                trigger,
                condition,
                buff_stats: BTreeMap::from([(StatKey::HeatDmgBonus, 0.336)]),
                duration: 15.0,
                team_wide: false,
                description: String::new(),
            },
        }
    }

    #[test]
    fn test_on_reaction_matches_kind_and_owner() {
        let w = watcher(
            GearTrigger::OnReaction,
            TriggerCondition { reactions: vec![ReactionKind::Burning], ..Default::default() },
        );
        let mut event = Event::new(EventKind::ReactionTriggered, 5)
            .with_source("莱瓦汀")
            .with("reaction_type", PayloadValue::Reaction(ReactionKind::Burning));
        assert!(w.matches(&event));

        event.source = Some("骏卫".to_string());
        assert!(!w.matches(&event));

        let event = Event::new(EventKind::ReactionTriggered, 5)
            .with_source("莱瓦汀")
            .with("reaction_type", PayloadValue::Reaction(ReactionKind::Conductive));
        assert!(!w.matches(&event));
    }

    #[test]
    fn test_min_damage_condition() {
        let w = watcher(
            GearTrigger::OnDamageDealt,
            TriggerCondition { min_damage: Some(1000.0), ..Default::default() },
        );
        let low = Event::new(EventKind::DamageDealt, 0)
            .with_source("莱瓦汀")
            .with("damage", PayloadValue::Number(500.0));
        let high = Event::new(EventKind::DamageDealt, 0)
            .with_source("莱瓦汀")
            .with("damage", PayloadValue::Number(1500.0));
        assert!(!w.matches(&low));
        assert!(w.matches(&high));
    }

    #[test]
    fn test_element_attach_min_stacks() {
        let w = watcher(
            GearTrigger::OnElementAttach,
            TriggerCondition {
                min_stacks: Some(2),
                elements: vec![Element::Heat],
                ..Default::default()
            },
        );
        let ok = Event::new(EventKind::ElementAttached, 0)
            .with_source("莱瓦汀")
            .with("element", PayloadValue::Element(Element::Heat))
            .with("stacks", PayloadValue::Int(2));
        let short = Event::new(EventKind::ElementAttached, 0)
            .with_source("莱瓦汀")
            .with("element", PayloadValue::Element(Element::Heat))
            .with("stacks", PayloadValue::Int(1));
        assert!(w.matches(&ok));
        assert!(!w.matches(&short));
    }

    #[test]
    fn test_unknown_trigger_never_fires() {
        let w = watcher(GearTrigger::Unknown, TriggerCondition::default());
        let event = Event::new(EventKind::DamageDealt, 0).with_source("莱瓦汀");
        assert!(!w.matches(&event));
    }

    #[test]
    fn test_skill_cast_move_type_filter() {
        let w = watcher(
            GearTrigger::OnSkillCast,
            TriggerCondition { move_types: vec![MoveType::Ultimate], ..Default::default() },
        );
        let ult = Event::new(EventKind::SkillCast, 0)
            .with_source("莱瓦汀")
            .with("move_type", PayloadValue::Move(MoveType::Ultimate));
        let skill = Event::new(EventKind::SkillCast, 0)
            .with_source("莱瓦汀")
            .with("move_type", PayloadValue::Move(MoveType::Skill));
        assert!(w.matches(&ult));
        assert!(!w.matches(&skill));
    }

    #[test]
    fn test_buff_carries_gear_name_and_mods() {
        let config = SimConfig::default();
        let w = watcher(GearTrigger::OnReaction, TriggerCondition::default());
        let buff = w.buff(&config);
        assert_eq!(buff.name, "Nova Staff effect");
        assert_eq!(buff.duration, 150);
    }
}
