//! Tunable simulation constants
//!
//! One immutable bundle per run, passed by reference. Loadable from TOML;
//! every field has a sensible default so `SimConfig::default()` is a
//! complete, playable configuration.

use crate::error::SimError;
use crate::types::{MvKind, Tick};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Complete constant bundle for one simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    /// Ticks per second (1 tick = 1/tick_rate seconds)
    #[serde(default = "default_tick_rate")]
    pub tick_rate: f64,
    /// Defense zone constant: mult = c / (c + defense)
    #[serde(default = "default_defense_constant")]
    pub defense_constant: f64,
    /// Cap on magic attachment stacks
    #[serde(default = "default_max_stacks")]
    pub max_attachment_stacks: u32,
    /// Cap on physical break stacks
    #[serde(default = "default_max_stacks")]
    pub max_phys_break_stacks: u32,
    /// Base reaction multipliers (percent) keyed by reaction kind
    #[serde(default = "default_reaction_mv")]
    pub reaction_mv: BTreeMap<MvKind, f64>,
    #[serde(default)]
    pub reaction_duration: ReactionDurations,
    #[serde(default)]
    pub reaction_growth: ReactionGrowth,
    #[serde(default)]
    pub stagger: StaggerConstants,
    #[serde(default)]
    pub tech: TechConstants,
    #[serde(default)]
    pub party: PartyConstants,
    /// Default interval between DoT damage pulses, in seconds
    #[serde(default = "default_dot_interval")]
    pub dot_interval_seconds: f64,
    /// Emit per-hit damage log lines
    #[serde(default = "default_true")]
    pub enable_damage_log: bool,
    /// Emit effect apply/expire log lines
    #[serde(default = "default_true")]
    pub enable_effect_log: bool,
    /// Emit reaction log lines
    #[serde(default = "default_true")]
    pub enable_reaction_log: bool,
}

/// Reaction-derived effect durations, in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactionDurations {
    #[serde(default = "default_burning_duration")]
    pub burning: f64,
    #[serde(default = "default_conductive_duration")]
    pub conductive: f64,
    #[serde(default = "default_corrosion_duration")]
    pub corrosion: f64,
    #[serde(default = "default_shatter_armor_duration")]
    pub shatter_armor: f64,
}

impl Default for ReactionDurations {
    fn default() -> Self {
        ReactionDurations {
            burning: 10.0,
            conductive: 12.0,
            corrosion: 15.0,
            shatter_armor: 12.0,
        }
    }
}

/// Per-level growth coefficients for reaction-derived effects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactionGrowth {
    /// Conductive: magic vulnerability = base + per_level * level
    #[serde(default = "default_conductive_base")]
    pub conductive_base_vuln: f64,
    #[serde(default = "default_conductive_per_level")]
    pub conductive_per_level: f64,
    /// Corrosion: initial shred, per-second growth, and cap, each base + per_level * level
    #[serde(default = "default_corrosion_base_shred")]
    pub corrosion_base_shred: f64,
    #[serde(default = "default_corrosion_shred_per_level")]
    pub corrosion_shred_per_level: f64,
    #[serde(default = "default_corrosion_tick_base")]
    pub corrosion_tick_base: f64,
    #[serde(default = "default_corrosion_tick_per_level")]
    pub corrosion_tick_per_level: f64,
    #[serde(default = "default_corrosion_max_base")]
    pub corrosion_max_base: f64,
    #[serde(default = "default_corrosion_max_per_level")]
    pub corrosion_max_per_level: f64,
    /// Shatter armor: physical vulnerability = base + per_level * level
    #[serde(default = "default_shatter_armor_base")]
    pub shatter_armor_base: f64,
    #[serde(default = "default_shatter_armor_per_level")]
    pub shatter_armor_per_level: f64,
    /// Frozen: duration seconds = base + per_level * (level - 1)
    #[serde(default = "default_frozen_base_duration")]
    pub frozen_base_duration: f64,
    #[serde(default = "default_frozen_per_level")]
    pub frozen_per_level: f64,
}

impl Default for ReactionGrowth {
    fn default() -> Self {
        ReactionGrowth {
            conductive_base_vuln: 0.08,
            conductive_per_level: 0.04,
            corrosion_base_shred: 0.024,
            corrosion_shred_per_level: 0.012,
            corrosion_tick_base: 0.0056,
            corrosion_tick_per_level: 0.0028,
            corrosion_max_base: 0.08,
            corrosion_max_per_level: 0.04,
            shatter_armor_base: 0.08,
            shatter_armor_per_level: 0.03,
            frozen_base_duration: 6.0,
            frozen_per_level: 1.0,
        }
    }
}

/// Stagger gauge constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaggerConstants {
    /// Gauge threshold that flips the target into the staggered state
    #[serde(default = "default_stagger_threshold")]
    pub threshold: f64,
    /// Staggered duration in seconds
    #[serde(default = "default_stagger_duration")]
    pub duration_seconds: f64,
    /// Zone-10 multiplier while staggered; (mult - 1) also feeds general vulnerability
    #[serde(default = "default_stagger_vuln")]
    pub vuln_multiplier: f64,
}

impl Default for StaggerConstants {
    fn default() -> Self {
        StaggerConstants {
            threshold: 100.0,
            duration_seconds: 5.0,
            vuln_multiplier: 1.3,
        }
    }
}

/// Technique-power enhancement parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechConstants {
    #[serde(default = "default_tech_multiplier")]
    pub multiplier: f64,
    #[serde(default = "default_tech_coefficient")]
    pub coefficient: f64,
}

impl Default for TechConstants {
    fn default() -> Self {
        TechConstants {
            multiplier: 2.0,
            coefficient: 300.0,
        }
    }
}

/// Shared party resource (technique points).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartyConstants {
    #[serde(default = "default_max_sp")]
    pub max_sp: f64,
    #[serde(default = "default_initial_sp")]
    pub initial_sp: f64,
    #[serde(default = "default_sp_regen")]
    pub sp_regen_per_second: f64,
}

impl Default for PartyConstants {
    fn default() -> Self {
        PartyConstants {
            max_sp: 300.0,
            initial_sp: 200.0,
            sp_regen_per_second: 8.0,
        }
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            tick_rate: 10.0,
            defense_constant: 100.0,
            max_attachment_stacks: 4,
            max_phys_break_stacks: 4,
            reaction_mv: default_reaction_mv(),
            reaction_duration: ReactionDurations::default(),
            reaction_growth: ReactionGrowth::default(),
            stagger: StaggerConstants::default(),
            tech: TechConstants::default(),
            party: PartyConstants::default(),
            dot_interval_seconds: 1.0,
            enable_damage_log: true,
            enable_effect_log: true,
            enable_reaction_log: true,
        }
    }
}

impl SimConfig {
    /// Parse a configuration from TOML, falling back to defaults per field.
    pub fn from_toml(text: &str) -> Result<Self, SimError> {
        toml::from_str(text).map_err(|e| SimError::Config(e.to_string()))
    }

    /// Convert a duration in seconds to whole ticks (rounded).
    pub fn ticks(&self, seconds: f64) -> Tick {
        (seconds * self.tick_rate).round().max(0.0) as Tick
    }

    /// Seconds covered by one tick.
    pub fn tick_seconds(&self) -> f64 {
        1.0 / self.tick_rate
    }

    /// Reaction multiplier (percent) for a reaction of `kind` at `level`.
    ///
    /// `base[kind] * (1 + level) * (1 + tech_power / 100) * level_coefficient`
    /// where the level coefficient is `1 + (lvl - 1) / 196` for magic and
    /// `1 + (lvl - 1) / 392` for physical anomalies.
    pub fn reaction_mv(
        &self,
        kind: MvKind,
        level: u32,
        tech_power: f64,
        attacker_level: u32,
        is_magic: bool,
    ) -> Result<f64, SimError> {
        let base = self
            .reaction_mv
            .get(&kind)
            .copied()
            .ok_or(SimError::UnknownReaction(kind))?;
        let level_mult = base * (1.0 + level as f64);
        let tech_mult = 1.0 + tech_power / 100.0;
        let lvl = attacker_level.max(1) as f64;
        let level_coeff = if is_magic {
            1.0 + (lvl - 1.0) / 196.0
        } else {
            1.0 + (lvl - 1.0) / 392.0
        };
        Ok(level_mult * tech_mult * level_coeff)
    }

    /// Technique-power enhancement: `value * (1 + m * tech / (tech + c))`.
    pub fn tech_enhance(&self, value: f64, tech_power: f64) -> f64 {
        if tech_power <= 0.0 {
            return value;
        }
        value * (1.0 + self.tech.multiplier * tech_power / (tech_power + self.tech.coefficient))
    }
}

fn default_reaction_mv() -> BTreeMap<MvKind, f64> {
    BTreeMap::from([
        (MvKind::Burst, 160.0),
        (MvKind::Reaction, 80.0),
        (MvKind::BurningDot, 12.0),
        (MvKind::Frozen, 130.0),
        (MvKind::Shatter, 120.0),
        (MvKind::Impact, 150.0),
        (MvKind::Break, 50.0),
    ])
}

fn default_tick_rate() -> f64 {
    10.0
}
fn default_defense_constant() -> f64 {
    100.0
}
fn default_max_stacks() -> u32 {
    4
}
fn default_dot_interval() -> f64 {
    1.0
}
fn default_true() -> bool {
    true
}
fn default_burning_duration() -> f64 {
    10.0
}
fn default_conductive_duration() -> f64 {
    12.0
}
fn default_corrosion_duration() -> f64 {
    15.0
}
fn default_shatter_armor_duration() -> f64 {
    12.0
}
fn default_conductive_base() -> f64 {
    0.08
}
fn default_conductive_per_level() -> f64 {
    0.04
}
fn default_corrosion_base_shred() -> f64 {
    0.024
}
fn default_corrosion_shred_per_level() -> f64 {
    0.012
}
fn default_corrosion_tick_base() -> f64 {
    0.0056
}
fn default_corrosion_tick_per_level() -> f64 {
    0.0028
}
fn default_corrosion_max_base() -> f64 {
    0.08
}
fn default_corrosion_max_per_level() -> f64 {
    0.04
}
fn default_shatter_armor_base() -> f64 {
    0.08
}
fn default_shatter_armor_per_level() -> f64 {
    0.03
}
fn default_frozen_base_duration() -> f64 {
    6.0
}
fn default_frozen_per_level() -> f64 {
    1.0
}
fn default_stagger_threshold() -> f64 {
    100.0
}
fn default_stagger_duration() -> f64 {
    5.0
}
fn default_stagger_vuln() -> f64 {
    1.3
}
fn default_tech_multiplier() -> f64 {
    2.0
}
fn default_tech_coefficient() -> f64 {
    300.0
}
fn default_max_sp() -> f64 {
    300.0
}
fn default_initial_sp() -> f64 {
    200.0
}
fn default_sp_regen() -> f64 {
    8.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_constants() {
        let config = SimConfig::default();
        assert!((config.tick_rate - 10.0).abs() < f64::EPSILON);
        assert!((config.defense_constant - 100.0).abs() < f64::EPSILON);
        assert_eq!(config.max_attachment_stacks, 4);
        assert!((config.reaction_mv[&MvKind::Burst] - 160.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_reaction_mv_magic_level_coefficient() {
        let config = SimConfig::default();
        // Burst at level 0, attacker level 80: 160 * (1 + 79/196)
        let mv = config.reaction_mv(MvKind::Burst, 0, 0.0, 80, true).unwrap();
        let expected = 160.0 * (1.0 + 79.0 / 196.0);
        assert!((mv - expected).abs() < 1e-9);
    }

    #[test]
    fn test_reaction_mv_physical_level_coefficient() {
        let config = SimConfig::default();
        // Impact at level 1, attacker level 80: 150 * 2 * (1 + 79/392)
        let mv = config.reaction_mv(MvKind::Impact, 1, 0.0, 80, false).unwrap();
        let expected = 150.0 * 2.0 * (1.0 + 79.0 / 392.0);
        assert!((mv - expected).abs() < 1e-9);
    }

    #[test]
    fn test_reaction_mv_unknown_kind() {
        let mut config = SimConfig::default();
        config.reaction_mv.remove(&MvKind::Frozen);
        let err = config.reaction_mv(MvKind::Frozen, 0, 0.0, 80, true).unwrap_err();
        assert!(matches!(err, SimError::UnknownReaction(MvKind::Frozen)));
    }

    #[test]
    fn test_tech_enhance() {
        let config = SimConfig::default();
        assert!((config.tech_enhance(1.0, 0.0) - 1.0).abs() < f64::EPSILON);
        // 1 * (1 + 2*300/(300+300)) = 2.0
        assert!((config.tech_enhance(1.0, 300.0) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_parse_partial_toml() {
        let toml = r#"
tick_rate = 20.0

[stagger]
threshold = 150.0
"#;
        let config = SimConfig::from_toml(toml).unwrap();
        assert!((config.tick_rate - 20.0).abs() < f64::EPSILON);
        assert!((config.stagger.threshold - 150.0).abs() < f64::EPSILON);
        // Unlisted fields keep their defaults
        assert!((config.stagger.vuln_multiplier - 1.3).abs() < f64::EPSILON);
        assert!((config.defense_constant - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_ticks_conversion() {
        let config = SimConfig::default();
        assert_eq!(config.ticks(2.0), 20);
        assert_eq!(config.ticks(0.0), 0);
        assert_eq!(config.ticks(0.25), 3); // rounded
    }
}
