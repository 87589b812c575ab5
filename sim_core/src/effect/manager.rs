//! Per-entity effect container

use super::{Effect, EffectKind};
use crate::config::SimConfig;
use crate::stats::{AttackerPanel, DefenderPanel};
use crate::types::EffectTag;

/// Result of adding an effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    Applied,
    Stacked { stacks: u32 },
}

/// Something that happened during a container tick. The caller (which holds
/// the engine) turns these into damage, statistics, and events; the container
/// itself never touches the outside world.
#[derive(Debug, Clone)]
pub enum TickOutcome {
    /// A DoT pulse came due.
    DotDamage { effect_name: String, source: String, amount: f64, element: crate::types::Element },
    /// The effect ran out this tick and was removed.
    Expired(Effect),
}

/// Effect container owned by each entity.
///
/// Effects are unique by name; re-adding merges stacks and refreshes the
/// duration. Every structural mutation bumps `version`, which keys the
/// owner's panel cache.
#[derive(Debug, Clone, Default)]
pub struct EffectManager {
    effects: Vec<Effect>,
    version: u64,
    owner_index: usize,
}

impl EffectManager {
    pub fn new() -> Self {
        EffectManager::default()
    }

    /// Arena index of the owning entity; stamped onto attached effects.
    pub fn set_owner_index(&mut self, index: usize) {
        self.owner_index = index;
        for effect in &mut self.effects {
            effect.owner = Some(index);
        }
    }

    /// Monotone version, bumped on any structural mutation.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Bump the version without a structural change (used by owners whose
    /// panel depends on private state, to keep the cache invariant).
    pub fn touch(&mut self) {
        self.version += 1;
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Effect> {
        self.effects.iter()
    }

    pub fn get(&self, name: &str) -> Option<&Effect> {
        self.effects.iter().find(|e| e.name == name)
    }

    pub fn has_tag(&self, tag: EffectTag) -> bool {
        self.effects.iter().any(|e| e.has_tag(tag))
    }

    /// Add an effect, merging with an existing one of the same name.
    pub fn add(&mut self, mut effect: Effect, now: crate::types::Tick) -> AddOutcome {
        self.version += 1;
        if let Some(existing) = self.effects.iter_mut().find(|e| e.name == effect.name) {
            existing.merge(&effect);
            AddOutcome::Stacked { stacks: existing.stacks }
        } else {
            effect.owner = Some(self.owner_index);
            effect.applied_tick = now;
            self.effects.push(effect);
            AddOutcome::Applied
        }
    }

    /// Remove an effect by name.
    pub fn remove(&mut self, name: &str) -> Option<Effect> {
        let pos = self.effects.iter().position(|e| e.name == name)?;
        self.version += 1;
        Some(self.effects.remove(pos))
    }

    /// Remove and return the first effect carrying `tag`.
    pub fn consume_tag(&mut self, tag: EffectTag) -> Option<Effect> {
        let pos = self.effects.iter().position(|e| e.has_tag(tag))?;
        self.version += 1;
        Some(self.effects.remove(pos))
    }

    /// Spend one usage on every usage-capped effect carrying `tag`; effects
    /// that run out are removed and returned.
    pub fn consume_usages(&mut self, tag: EffectTag) -> Vec<Effect> {
        let mut spent = false;
        for effect in &mut self.effects {
            if let EffectKind::UsageCapped { usages, .. } = &mut effect.kind {
                if effect.tags.contains(&tag) && *usages > 0 {
                    *usages -= 1;
                    spent = true;
                }
            }
        }
        if !spent {
            return Vec::new();
        }
        self.version += 1;
        let mut removed = Vec::new();
        let mut i = 0;
        while i < self.effects.len() {
            let done = matches!(self.effects[i].kind, EffectKind::UsageCapped { usages: 0, .. });
            if done {
                removed.push(self.effects.remove(i));
            } else {
                i += 1;
            }
        }
        removed
    }

    /// Advance every effect one tick. DoT pulses and corrosion growth happen
    /// before the duration decrement; effects whose duration reaches zero are
    /// removed at the end of this tick and reported as expired.
    pub fn tick(&mut self, config: &SimConfig) -> Vec<TickOutcome> {
        let mut outcomes = Vec::new();
        let second = config.ticks(1.0).max(1);

        for effect in &mut self.effects {
            match &mut effect.kind {
                EffectKind::Dot { damage, interval, timer, element } => {
                    *timer += 1;
                    if *timer >= *interval {
                        *timer = 0;
                        outcomes.push(TickOutcome::DotDamage {
                            effect_name: effect.name.clone(),
                            source: effect.source.clone(),
                            amount: *damage * effect.stacks as f64,
                            element: *element,
                        });
                    }
                }
                EffectKind::CorrosionShred { current, per_second, cap, timer } => {
                    *timer += 1;
                    if *timer >= second {
                        *timer = 0;
                        *current = (*current + *per_second).min(*cap);
                    }
                }
                _ => {}
            }
            effect.duration = effect.duration.saturating_sub(1);
        }

        let mut i = 0;
        while i < self.effects.len() {
            if self.effects[i].duration == 0 {
                self.version += 1;
                outcomes.push(TickOutcome::Expired(self.effects.remove(i)));
            } else {
                i += 1;
            }
        }
        outcomes
    }

    /// Fold every effect's contribution into an attacker panel.
    pub fn apply_to_attacker(&self, panel: &mut AttackerPanel) {
        for effect in &self.effects {
            effect.apply_to_attacker(panel);
        }
    }

    /// Fold every effect's contribution into a defender panel.
    pub fn apply_to_defender(&self, panel: &mut DefenderPanel) {
        for effect in &self.effects {
            effect.apply_to_defender(panel);
        }
    }

    /// Drain everything (end of combat), reporting survivors for records.
    pub fn drain(&mut self) -> Vec<Effect> {
        if !self.effects.is_empty() {
            self.version += 1;
        }
        std::mem::take(&mut self.effects)
    }
}
