//! The enemy target: defense config, stagger gauge, reaction state

use crate::config::SimConfig;
use crate::effect::EffectManager;
use crate::reaction::ReactionState;
use crate::stats::DefenderPanel;
use crate::types::Tick;

/// Result of feeding the stagger gauge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaggerOutcome {
    pub gauge: f64,
    /// The target entered the staggered state on this application
    pub entered: bool,
}

/// The simulation's enemy.
pub struct Target {
    pub name: String,
    /// Static defensive numbers (defense, base resistances, vulnerability
    /// and fragility fields, reductions, sanctuary, non-main penalty)
    pub base_panel: DefenderPanel,
    pub max_hp: f64,
    pub hp: f64,
    /// Monotone damage accumulator
    pub total_damage_taken: i64,

    pub stagger_gauge: f64,
    pub stagger_threshold: f64,
    pub is_staggered: bool,
    pub stagger_remaining: Tick,

    pub effects: EffectManager,
    pub reactions: ReactionState,
}

impl Target {
    pub fn new(name: impl Into<String>, base_panel: DefenderPanel, max_hp: f64, stagger_threshold: f64) -> Self {
        Target {
            name: name.into(),
            base_panel,
            max_hp,
            hp: max_hp,
            total_damage_taken: 0,
            stagger_gauge: 0.0,
            stagger_threshold,
            is_staggered: false,
            stagger_remaining: 0,
            effects: EffectManager::new(),
            reactions: ReactionState::new(),
        }
    }

    /// Assemble the defender panel: static config, the staggered flag (which
    /// also feeds general vulnerability), then effect contributions.
    pub fn defense_panel(&self, config: &SimConfig) -> DefenderPanel {
        let mut panel = self.base_panel.clone();
        if self.is_staggered {
            panel.is_staggered = true;
            panel.vulnerability += config.stagger.vuln_multiplier - 1.0;
        }
        self.effects.apply_to_defender(&mut panel);
        panel
    }

    /// Apply damage. Returns the HP remaining.
    pub fn take_damage(&mut self, amount: i64) -> f64 {
        let amount = amount.max(0);
        self.total_damage_taken += amount;
        self.hp = (self.hp - amount as f64).max(0.0);
        self.hp
    }

    /// Feed the stagger gauge. While staggered, further gauge is ignored.
    pub fn apply_stagger(&mut self, value: f64, config: &SimConfig) -> StaggerOutcome {
        if self.is_staggered {
            return StaggerOutcome { gauge: self.stagger_gauge, entered: false };
        }
        self.stagger_gauge += value;
        if self.stagger_gauge >= self.stagger_threshold {
            self.is_staggered = true;
            self.stagger_remaining = config.ticks(config.stagger.duration_seconds);
            return StaggerOutcome { gauge: self.stagger_gauge, entered: true };
        }
        StaggerOutcome { gauge: self.stagger_gauge, entered: false }
    }

    /// Count down the staggered state. Returns true when it ended this tick.
    pub fn tick_stagger(&mut self) -> bool {
        if !self.is_staggered {
            return false;
        }
        self.stagger_remaining = self.stagger_remaining.saturating_sub(1);
        if self.stagger_remaining == 0 {
            self.is_staggered = false;
            self.stagger_gauge = 0.0;
            return true;
        }
        false
    }
}
