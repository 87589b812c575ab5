//! Effects: buffs, debuffs, DoTs, and stacking statuses

mod manager;

pub use manager::{AddOutcome, EffectManager, TickOutcome};

use crate::config::SimConfig;
use crate::stats::{AttackerPanel, DefenderPanel, StatKey};
use crate::types::{EffectTag, Element, Tick};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Semantic category, for display and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectCategory {
    Buff,
    Debuff,
    Neutral,
}

/// What an effect does, as data. The manager dispatches on the variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    /// Additive stat contributions, scaled by current stacks.
    StatModifier { mods: Vec<(StatKey, f64)> },
    /// Periodic damage attributed to `source` on the owning target.
    Dot { damage: f64, interval: Tick, timer: Tick, element: Element },
    /// Resistance shred that grows every second up to a cap and applies to
    /// every elemental resistance.
    CorrosionShred { current: f64, per_second: f64, cap: f64, timer: Tick },
    /// Control state (freeze, seal-crystal); its vulnerability contribution
    /// rides along as stat mods.
    ControlFlag { mods: Vec<(StatKey, f64)> },
    /// Stat contribution consumed after a number of triggering hits.
    UsageCapped { mods: Vec<(StatKey, f64)>, usages: u32 },
}

/// One effect instance attached to an entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Effect {
    pub name: String,
    pub category: EffectCategory,
    pub kind: EffectKind,
    /// Remaining duration in ticks
    pub duration: Tick,
    pub stacks: u32,
    pub max_stacks: u32,
    pub tags: BTreeSet<EffectTag>,
    /// Attribution: who created this effect
    pub source: String,
    /// Arena index of the owning entity, set on attach
    #[serde(skip)]
    pub owner: Option<usize>,
    /// Tick the effect was attached, for uptime records
    #[serde(default)]
    pub applied_tick: Tick,
}

impl Effect {
    pub fn new(
        name: impl Into<String>,
        category: EffectCategory,
        kind: EffectKind,
        duration: Tick,
        source: impl Into<String>,
    ) -> Self {
        Effect {
            name: name.into(),
            category,
            kind,
            duration,
            stacks: 1,
            max_stacks: 1,
            tags: BTreeSet::new(),
            source: source.into(),
            owner: None,
            applied_tick: 0,
        }
    }

    pub fn with_max_stacks(mut self, max_stacks: u32) -> Self {
        self.max_stacks = max_stacks;
        self
    }

    pub fn with_stacks(mut self, stacks: u32) -> Self {
        self.stacks = stacks.min(self.max_stacks.max(1));
        self
    }

    pub fn with_tag(mut self, tag: EffectTag) -> Self {
        self.tags.insert(tag);
        self
    }

    pub fn has_tag(&self, tag: EffectTag) -> bool {
        self.tags.contains(&tag)
    }

    /// Plain timed stat modifier.
    pub fn stat_modifier(
        name: impl Into<String>,
        category: EffectCategory,
        duration: Tick,
        mods: Vec<(StatKey, f64)>,
        source: impl Into<String>,
    ) -> Self {
        Effect::new(name, category, EffectKind::StatModifier { mods }, duration, source)
    }

    /// Burning: heat DoT whose per-pulse damage was fixed at application time.
    pub fn burning(config: &SimConfig, dot_damage: f64, source: impl Into<String>) -> Self {
        let interval = config.ticks(config.dot_interval_seconds).max(1);
        Effect::new(
            "Burning",
            EffectCategory::Debuff,
            EffectKind::Dot { damage: dot_damage, interval, timer: 0, element: Element::Heat },
            config.ticks(config.reaction_duration.burning),
            source,
        )
        .with_tag(EffectTag::Burning)
    }

    /// Conductive: tech-enhanced magic vulnerability scaled by reaction level.
    pub fn conductive(config: &SimConfig, level: u32, tech_power: f64, source: impl Into<String>) -> Self {
        let growth = &config.reaction_growth;
        let vuln = growth.conductive_base_vuln + growth.conductive_per_level * level as f64;
        let vuln = config.tech_enhance(vuln, tech_power);
        Effect::stat_modifier(
            "Conductive",
            EffectCategory::Debuff,
            config.ticks(config.reaction_duration.conductive),
            vec![(StatKey::MagicVulnerability, vuln)],
            source,
        )
        .with_tag(EffectTag::Conductive)
        .with_tag(EffectTag::Vulnerability)
    }

    /// Frozen: control flag consumed by the next physical hit (shatter).
    /// Duration grows with the consumed attachment level.
    pub fn frozen(config: &SimConfig, level: u32, source: impl Into<String>) -> Self {
        let growth = &config.reaction_growth;
        let seconds =
            growth.frozen_base_duration + growth.frozen_per_level * level.saturating_sub(1) as f64;
        Effect::new(
            "Frozen",
            EffectCategory::Debuff,
            EffectKind::ControlFlag { mods: Vec::new() },
            config.ticks(seconds),
            source,
        )
        .with_tag(EffectTag::Frozen)
    }

    /// Corrosion: growing all-resistance shred, all three knobs tech-enhanced.
    pub fn corrosion(config: &SimConfig, level: u32, tech_power: f64, source: impl Into<String>) -> Self {
        let growth = &config.reaction_growth;
        let lv = level as f64;
        let initial = config.tech_enhance(growth.corrosion_base_shred + growth.corrosion_shred_per_level * lv, tech_power);
        let per_second = config.tech_enhance(growth.corrosion_tick_base + growth.corrosion_tick_per_level * lv, tech_power);
        let cap = config.tech_enhance(growth.corrosion_max_base + growth.corrosion_max_per_level * lv, tech_power);
        Effect::new(
            "Corrosion",
            EffectCategory::Debuff,
            EffectKind::CorrosionShred { current: initial, per_second, cap, timer: 0 },
            config.ticks(config.reaction_duration.corrosion),
            source,
        )
        .with_tag(EffectTag::Corrosion)
    }

    /// Shatter armor: tech-enhanced physical vulnerability scaled by the
    /// consumed break level.
    pub fn shatter_armor(config: &SimConfig, level: u32, tech_power: f64, source: impl Into<String>) -> Self {
        let growth = &config.reaction_growth;
        let vuln = growth.shatter_armor_base + growth.shatter_armor_per_level * level as f64;
        let vuln = config.tech_enhance(vuln, tech_power);
        Effect::stat_modifier(
            "Shatter Armor",
            EffectCategory::Debuff,
            config.ticks(config.reaction_duration.shatter_armor),
            vec![(StatKey::PhysVulnerability, vuln)],
            source,
        )
        .with_tag(EffectTag::ShatterArmor)
        .with_tag(EffectTag::Vulnerability)
    }

    /// Seal-crystal: control flag carrying a physical vulnerability while held.
    pub fn seal_crystal(config: &SimConfig, duration_seconds: f64, vuln: f64, source: impl Into<String>) -> Self {
        Effect::new(
            "Seal Crystal",
            EffectCategory::Debuff,
            EffectKind::ControlFlag { mods: vec![(StatKey::PhysVulnerability, vuln)] },
            config.ticks(duration_seconds),
            source,
        )
        .with_tag(EffectTag::SealCrystal)
    }

    /// Stat contributions of this effect, as `(key, total value)` pairs.
    fn contributions(&self) -> Option<&[(StatKey, f64)]> {
        match &self.kind {
            EffectKind::StatModifier { mods }
            | EffectKind::ControlFlag { mods }
            | EffectKind::UsageCapped { mods, .. } => Some(mods),
            _ => None,
        }
    }

    /// Apply this effect's additive contributions to an attacker panel.
    pub fn apply_to_attacker(&self, panel: &mut AttackerPanel) {
        if let Some(mods) = self.contributions() {
            for &(key, value) in mods {
                panel.apply_mod(key, value * self.stacks as f64);
            }
        }
    }

    /// Apply this effect's additive contributions to a defender panel.
    pub fn apply_to_defender(&self, panel: &mut DefenderPanel) {
        match &self.kind {
            EffectKind::CorrosionShred { current, .. } => panel.shred_all_res(*current),
            _ => {
                if let Some(mods) = self.contributions() {
                    for &(key, value) in mods {
                        panel.apply_mod(key, value * self.stacks as f64);
                    }
                }
            }
        }
    }

    /// Merge a fresh application of the same-named effect: stacks clamp to
    /// the cap, duration resets to the incoming duration.
    pub fn merge(&mut self, incoming: &Effect) {
        self.stacks = (self.stacks + incoming.stacks).min(self.max_stacks);
        self.duration = incoming.duration;
    }
}
