//! Elemental reaction state machine
//!
//! One instance per target. Tracks the magic attachment (element + stacks)
//! and the physical break gauge, and resolves every incoming hit's
//! attachments into extra damage, derived effects, and reaction notes.
//!
//! The machine never touches the event bus or statistics itself: derived
//! effects and notes ride back on the [`ReactionResult`] and the damage
//! pipeline applies them.

use crate::config::SimConfig;
use crate::effect::{Effect, EffectManager};
use crate::error::SimError;
use crate::types::{Attachment, Element, MvKind, PhysAnomaly, ReactionKind};

/// What a hit's attachments resolved to.
#[derive(Debug, Clone, Default)]
pub struct ReactionResult {
    /// Extra multiplier (percent) added to the triggering hit
    pub extra_mv: f64,
    /// Reactions triggered, in resolution order
    pub reactions: Vec<ReactionKind>,
    /// Human-readable summary for the battle log (empty when nothing happened)
    pub log: String,
    /// Stack level consumed by the reaction
    pub level: u32,
    /// Physical anomaly carried by the hit, when one applied
    pub phys_anomaly: Option<PhysAnomaly>,
    /// Derived effects to attach to the target
    pub effects: Vec<Effect>,
    /// Notes the pipeline turns into bus events
    pub notes: Vec<ReactionNote>,
}

impl ReactionResult {
    pub fn triggered(&self) -> bool {
        !self.reactions.is_empty()
    }

    fn merge(&mut self, other: ReactionResult) {
        self.extra_mv += other.extra_mv;
        self.reactions.extend(other.reactions);
        if !other.log.is_empty() {
            if !self.log.is_empty() {
                self.log.push_str(" | ");
            }
            self.log.push_str(&other.log);
        }
        self.level = other.level;
        if other.phys_anomaly.is_some() {
            self.phys_anomaly = other.phys_anomaly;
        }
        self.effects.extend(other.effects);
        self.notes.extend(other.notes);
    }
}

/// Bus-event descriptors produced during reaction resolution.
#[derive(Debug, Clone)]
pub enum ReactionNote {
    ElementAttached { element: Element, stacks: u32 },
    ElementBurst { element: Element, stacks: u32 },
    ReactionTriggered {
        kind: ReactionKind,
        element: Element,
        level: u32,
        extra_mv: f64,
        phys_anomaly: Option<PhysAnomaly>,
    },
}

/// Per-target reaction state.
#[derive(Debug, Clone, Default)]
pub struct ReactionState {
    pub attachment_element: Option<Element>,
    pub attachment_stacks: u32,
    pub phys_break_stacks: u32,
    pub last_phys_anomaly: Option<PhysAnomaly>,
}

impl ReactionState {
    pub fn new() -> Self {
        ReactionState::default()
    }

    pub fn has_magic_attachment(&self) -> bool {
        self.attachment_element.is_some()
    }

    /// Resolve one hit's attachments against the current state.
    ///
    /// `effects` is the target's own container (frozen consumption, derived
    /// effect duplicates are the caller's concern — returned effects are
    /// attached by the pipeline).
    #[allow(clippy::too_many_arguments)]
    pub fn apply_hit(
        &mut self,
        config: &SimConfig,
        effects: &mut EffectManager,
        attachments: &[Attachment],
        attacker_atk: f64,
        attacker_tech: f64,
        attacker_level: u32,
        attacker_name: &str,
    ) -> Result<ReactionResult, SimError> {
        let mut result = ReactionResult::default();
        for attachment in attachments {
            let sub = match *attachment {
                Attachment::Magic(element) if element.is_magic() => self.magic_hit(
                    config,
                    element,
                    attacker_atk,
                    attacker_tech,
                    attacker_level,
                    attacker_name,
                )?,
                Attachment::Magic(_) => ReactionResult::default(),
                Attachment::Physical(kind) => self.physical_hit(
                    config,
                    effects,
                    kind,
                    attacker_tech,
                    attacker_level,
                    attacker_name,
                )?,
            };
            result.merge(sub);
        }
        Ok(result)
    }

    fn physical_hit(
        &mut self,
        config: &SimConfig,
        effects: &mut EffectManager,
        kind: PhysAnomaly,
        attacker_tech: f64,
        attacker_level: u32,
        attacker_name: &str,
    ) -> Result<ReactionResult, SimError> {
        let mut result = ReactionResult::default();

        // Shatter a frozen target first, whatever the anomaly kind.
        if effects.consume_tag(crate::types::EffectTag::Frozen).is_some() {
            let mv = config.reaction_mv(MvKind::Shatter, 1, attacker_tech, attacker_level, false)?;
            result.extra_mv = mv;
            result.level = 1;
            result.reactions.push(ReactionKind::Shatter);
            result.log = format!("shatter! frozen broken (+{}% mv)", mv as i64);
            result.notes.push(ReactionNote::ReactionTriggered {
                kind: ReactionKind::Shatter,
                element: Element::Physical,
                level: 1,
                extra_mv: mv,
                phys_anomaly: Some(kind),
            });
            return Ok(result);
        }

        if kind == PhysAnomaly::None {
            return Ok(result);
        }

        result.reactions.push(ReactionKind::PhysAnomaly);
        result.phys_anomaly = Some(kind);
        self.last_phys_anomaly = Some(kind);

        // First anomaly on a clean target opens the break state.
        if self.phys_break_stacks == 0 {
            self.phys_break_stacks = 1;
            result.level = 1;
            result.log = "break state opened (1 stack)".to_string();
            result.notes.push(ReactionNote::ReactionTriggered {
                kind: ReactionKind::PhysAnomaly,
                element: Element::Physical,
                level: 1,
                extra_mv: 0.0,
                phys_anomaly: Some(kind),
            });
            return Ok(result);
        }

        let lv = self.phys_break_stacks;
        match kind {
            PhysAnomaly::Impact => {
                let mv = config.reaction_mv(MvKind::Impact, lv, attacker_tech, attacker_level, false)?;
                result.extra_mv = mv;
                result.level = lv;
                self.phys_break_stacks = 0;
                result.log = format!("impact lv{} (+{}% mv)", lv, mv as i64);
            }
            PhysAnomaly::Shatter => {
                let mv = config.reaction_mv(MvKind::Break, lv, attacker_tech, attacker_level, false)?;
                result.extra_mv = mv;
                result.level = lv;
                result
                    .effects
                    .push(Effect::shatter_armor(config, lv, attacker_tech, attacker_name));
                self.phys_break_stacks = 0;
                result.log = format!("shatter armor lv{} applied", lv);
            }
            PhysAnomaly::Launch | PhysAnomaly::Knockdown => {
                let before = self.phys_break_stacks;
                self.phys_break_stacks =
                    (self.phys_break_stacks + 1).min(config.max_phys_break_stacks);
                result.level = self.phys_break_stacks;
                result.log = format!("break stacks {} -> {}", before, self.phys_break_stacks);
            }
            PhysAnomaly::Break | PhysAnomaly::None => {}
        }

        result.notes.push(ReactionNote::ReactionTriggered {
            kind: ReactionKind::PhysAnomaly,
            element: Element::Physical,
            level: result.level,
            extra_mv: result.extra_mv,
            phys_anomaly: Some(kind),
        });
        Ok(result)
    }

    fn magic_hit(
        &mut self,
        config: &SimConfig,
        element: Element,
        attacker_atk: f64,
        attacker_tech: f64,
        attacker_level: u32,
        attacker_name: &str,
    ) -> Result<ReactionResult, SimError> {
        let mut result = ReactionResult::default();

        let attached = match self.attachment_element {
            None => {
                self.attachment_element = Some(element);
                self.attachment_stacks = 1;
                result.reactions.push(ReactionKind::Attach);
                result.log = format!("{} attached", element.name());
                result.notes.push(ReactionNote::ElementAttached { element, stacks: 1 });
                return Ok(result);
            }
            Some(attached) => attached,
        };

        if attached == element {
            // Same element: burst, stack up.
            let mv = config.reaction_mv(MvKind::Burst, 0, attacker_tech, attacker_level, true)?;
            result.extra_mv = mv;
            self.attachment_stacks = (self.attachment_stacks + 1).min(config.max_attachment_stacks);
            result.level = self.attachment_stacks;
            result.reactions.push(ReactionKind::Burst);
            result.log = format!("burst ({} x{})", element.name(), self.attachment_stacks);
            result.notes.push(ReactionNote::ElementBurst {
                element,
                stacks: self.attachment_stacks,
            });
            return Ok(result);
        }

        // Different element: reaction at the attached stack level.
        let level = self.attachment_stacks;
        result.extra_mv = config.reaction_mv(MvKind::Reaction, level, attacker_tech, attacker_level, true)?;

        let kind = match element {
            Element::Heat => {
                let dot_mv =
                    config.reaction_mv(MvKind::BurningDot, level, attacker_tech, attacker_level, true)?;
                let dot_damage = attacker_atk * dot_mv / 100.0;
                result.effects.push(Effect::burning(config, dot_damage, attacker_name));
                ReactionKind::Burning
            }
            Element::Electric => {
                result
                    .effects
                    .push(Effect::conductive(config, level, attacker_tech, attacker_name));
                ReactionKind::Conductive
            }
            Element::Frost => {
                // Frozen overrides the generic reaction multiplier.
                result.extra_mv =
                    config.reaction_mv(MvKind::Frozen, 0, attacker_tech, attacker_level, true)?;
                result.effects.push(Effect::frozen(config, level, attacker_name));
                ReactionKind::Frozen
            }
            Element::Nature => {
                result
                    .effects
                    .push(Effect::corrosion(config, level, attacker_tech, attacker_name));
                ReactionKind::Corrosion
            }
            Element::Physical => unreachable!("physical is not a magic attachment"),
        };

        self.attachment_element = None;
        self.attachment_stacks = 0;
        result.level = level;
        result.reactions.push(kind);
        result.log = format!("{} reaction lv{} (+{}% mv)", kind.name(), level, result.extra_mv as i64);
        result.notes.push(ReactionNote::ReactionTriggered {
            kind,
            element,
            level,
            extra_mv: result.extra_mv,
            phys_anomaly: None,
        });
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(
        state: &mut ReactionState,
        effects: &mut EffectManager,
        config: &SimConfig,
        attachment: Attachment,
    ) -> ReactionResult {
        state
            .apply_hit(config, effects, &[attachment], 1000.0, 0.0, 80, "tester")
            .unwrap()
    }

    #[test]
    fn test_first_magic_hit_attaches() {
        let config = SimConfig::default();
        let mut state = ReactionState::new();
        let mut effects = EffectManager::new();
        let result = apply(&mut state, &mut effects, &config, Attachment::Magic(Element::Heat));
        assert_eq!(result.reactions, vec![ReactionKind::Attach]);
        assert!((result.extra_mv).abs() < f64::EPSILON);
        assert_eq!(state.attachment_element, Some(Element::Heat));
        assert_eq!(state.attachment_stacks, 1);
    }

    #[test]
    fn test_same_element_bursts() {
        let config = SimConfig::default();
        let mut state = ReactionState::new();
        let mut effects = EffectManager::new();
        apply(&mut state, &mut effects, &config, Attachment::Magic(Element::Heat));
        let result = apply(&mut state, &mut effects, &config, Attachment::Magic(Element::Heat));
        assert_eq!(result.reactions, vec![ReactionKind::Burst]);
        let expected = 160.0 * (1.0 + 79.0 / 196.0);
        assert!((result.extra_mv - expected).abs() < 1e-9);
        assert_eq!(state.attachment_stacks, 2);
    }

    #[test]
    fn test_attachment_stacks_capped() {
        let config = SimConfig::default();
        let mut state = ReactionState::new();
        let mut effects = EffectManager::new();
        for _ in 0..8 {
            apply(&mut state, &mut effects, &config, Attachment::Magic(Element::Frost));
        }
        assert_eq!(state.attachment_stacks, config.max_attachment_stacks);
    }

    #[test]
    fn test_cross_element_reaction_clears_attachment() {
        let config = SimConfig::default();
        let mut state = ReactionState::new();
        let mut effects = EffectManager::new();
        apply(&mut state, &mut effects, &config, Attachment::Magic(Element::Heat));
        let result = apply(&mut state, &mut effects, &config, Attachment::Magic(Element::Electric));
        assert_eq!(result.reactions, vec![ReactionKind::Conductive]);
        assert_eq!(result.level, 1);
        let expected = 80.0 * 2.0 * (1.0 + 79.0 / 196.0);
        assert!((result.extra_mv - expected).abs() < 1e-9);
        assert_eq!(state.attachment_element, None);
        assert_eq!(state.attachment_stacks, 0);
        assert_eq!(result.effects.len(), 1);
        assert_eq!(result.effects[0].name, "Conductive");
    }

    #[test]
    fn test_heat_on_electric_applies_burning_dot() {
        let config = SimConfig::default();
        let mut state = ReactionState::new();
        let mut effects = EffectManager::new();
        apply(&mut state, &mut effects, &config, Attachment::Magic(Element::Electric));
        let result = apply(&mut state, &mut effects, &config, Attachment::Magic(Element::Heat));
        assert_eq!(result.reactions, vec![ReactionKind::Burning]);
        assert_eq!(result.effects[0].name, "Burning");
    }

    #[test]
    fn test_first_phys_anomaly_opens_break_state() {
        let config = SimConfig::default();
        let mut state = ReactionState::new();
        let mut effects = EffectManager::new();
        let result = apply(&mut state, &mut effects, &config, Attachment::Physical(PhysAnomaly::Break));
        assert_eq!(result.reactions, vec![ReactionKind::PhysAnomaly]);
        assert!((result.extra_mv).abs() < f64::EPSILON);
        assert_eq!(state.phys_break_stacks, 1);
    }

    #[test]
    fn test_impact_consumes_break_stacks() {
        let config = SimConfig::default();
        let mut state = ReactionState::new();
        let mut effects = EffectManager::new();
        apply(&mut state, &mut effects, &config, Attachment::Physical(PhysAnomaly::Break));
        let result = apply(&mut state, &mut effects, &config, Attachment::Physical(PhysAnomaly::Impact));
        let expected = 150.0 * 2.0 * (1.0 + 79.0 / 392.0);
        assert!((result.extra_mv - expected).abs() < 1e-9);
        assert_eq!(result.level, 1);
        assert_eq!(state.phys_break_stacks, 0);
    }

    #[test]
    fn test_shatter_applies_armor_shred() {
        let config = SimConfig::default();
        let mut state = ReactionState::new();
        let mut effects = EffectManager::new();
        apply(&mut state, &mut effects, &config, Attachment::Physical(PhysAnomaly::Launch));
        apply(&mut state, &mut effects, &config, Attachment::Physical(PhysAnomaly::Launch));
        assert_eq!(state.phys_break_stacks, 2);
        let result = apply(&mut state, &mut effects, &config, Attachment::Physical(PhysAnomaly::Shatter));
        assert_eq!(state.phys_break_stacks, 0);
        assert_eq!(result.effects[0].name, "Shatter Armor");
        assert_eq!(result.level, 2);
    }

    #[test]
    fn test_launch_caps_at_four_stacks() {
        let config = SimConfig::default();
        let mut state = ReactionState::new();
        let mut effects = EffectManager::new();
        for _ in 0..6 {
            apply(&mut state, &mut effects, &config, Attachment::Physical(PhysAnomaly::Launch));
        }
        assert_eq!(state.phys_break_stacks, 4);
    }

    #[test]
    fn test_frozen_target_shatters_on_physical_hit() {
        let config = SimConfig::default();
        let mut state = ReactionState::new();
        let mut effects = EffectManager::new();
        apply(&mut state, &mut effects, &config, Attachment::Magic(Element::Heat));
        let result = apply(&mut state, &mut effects, &config, Attachment::Magic(Element::Frost));
        assert_eq!(result.reactions, vec![ReactionKind::Frozen]);
        for effect in result.effects {
            effects.add(effect, 0);
        }
        let result = apply(&mut state, &mut effects, &config, Attachment::Physical(PhysAnomaly::Impact));
        assert_eq!(result.reactions, vec![ReactionKind::Shatter]);
        assert!(result.extra_mv > 0.0);
        assert!(!effects.has_tag(crate::types::EffectTag::Frozen));
    }

    #[test]
    fn test_frozen_reaction_uses_frozen_multiplier() {
        let config = SimConfig::default();
        let mut state = ReactionState::new();
        let mut effects = EffectManager::new();
        apply(&mut state, &mut effects, &config, Attachment::Magic(Element::Heat));
        let result = apply(&mut state, &mut effects, &config, Attachment::Magic(Element::Frost));
        let expected = 130.0 * (1.0 + 79.0 / 196.0);
        assert!((result.extra_mv - expected).abs() < 1e-9);
    }
}
