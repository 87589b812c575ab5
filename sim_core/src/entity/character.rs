//! Party characters: stats, effect container, and the action runtime

use crate::action::{Action, Command};
use crate::config::SimConfig;
use crate::effect::EffectManager;
use crate::kits::Kit;
use crate::stats::{AttackerPanel, AttributeKind, Attributes, BaseStats};
use crate::types::Tick;
use std::collections::{BTreeMap, VecDeque};

/// One queued rotation command. `start_tick` is set in timeline mode; the
/// command does not start before that tick.
#[derive(Debug, Clone, Copy)]
pub struct QueuedCommand {
    pub command: Command,
    pub start_tick: Option<Tick>,
}

/// A playable character owned by the scheduler.
pub struct Character {
    pub name: String,
    pub attrs: Attributes,
    pub base: BaseStats,
    pub main_attr: AttributeKind,
    pub sub_attr: AttributeKind,
    pub effects: EffectManager,
    pub kit: Box<dyn Kit>,
    /// Arena index of this character's target
    pub target_index: usize,

    pub queue: VecDeque<QueuedCommand>,
    pub current_action: Option<Action>,
    /// Ticks elapsed inside the current action
    pub elapsed: Tick,
    pub cooldowns: BTreeMap<String, Tick>,
    /// Remaining ticks of the QTE window (0 = not ready)
    pub qte_ready_timer: Tick,
    pub script_finished: bool,

    panel_cache: Option<(u64, AttackerPanel)>,
}

impl Character {
    pub fn new(kit: Box<dyn Kit>, target_index: usize) -> Self {
        let loadout = kit.loadout();
        Character {
            name: kit.display_name().to_string(),
            attrs: loadout.attrs,
            base: loadout.base,
            main_attr: loadout.main_attr,
            sub_attr: loadout.sub_attr,
            effects: EffectManager::new(),
            kit,
            target_index,
            queue: VecDeque::new(),
            current_action: None,
            elapsed: 0,
            cooldowns: BTreeMap::new(),
            qte_ready_timer: 0,
            script_finished: false,
            panel_cache: None,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.current_action.is_some()
    }

    /// Load a parsed script (relative waits, no timestamps).
    pub fn set_script(&mut self, commands: Vec<Command>) {
        self.queue = commands
            .into_iter()
            .map(|command| QueuedCommand { command, start_tick: None })
            .collect();
        self.script_finished = false;
    }

    /// Load a parsed timeline (absolute start ticks).
    pub fn set_timeline(&mut self, commands: Vec<(Tick, Command)>) {
        self.queue = commands
            .into_iter()
            .map(|(start_tick, command)| QueuedCommand { command, start_tick: Some(start_tick) })
            .collect();
        self.script_finished = false;
    }

    /// Assemble the attacker panel, cached by effect-container version.
    ///
    /// Base stats are copied in, the kit passive mutates first, then effect
    /// contributions, then the attribute multiplier fixes `final_atk`.
    pub fn current_panel(&mut self, _config: &SimConfig) -> AttackerPanel {
        let version = self.effects.version();
        if let Some((cached_version, panel)) = &self.panel_cache {
            if *cached_version == version {
                return panel.clone();
            }
        }

        let mut panel = AttackerPanel {
            level: self.base.level,
            technique_power: self.base.technique_power,
            tech_pct: self.base.tech_pct,
            base_atk: self.base.base_atk,
            weapon_atk: self.base.weapon_atk,
            atk_pct: self.base.atk_pct,
            flat_atk: self.base.flat_atk,
            crit_rate: self.base.crit_rate,
            crit_dmg: self.base.crit_dmg,
            res_pen: self.base.res_pen,
            amplification: self.base.amplification,
            special_bonus: self.base.special_bonus,
            heal_bonus: self.base.heal_bonus,
            non_main_penalty: self.base.non_main_penalty,
            dmg_bonus: self.base.dmg_bonus,
            normal_dmg_bonus: self.base.normal_dmg_bonus,
            heavy_dmg_bonus: self.base.heavy_dmg_bonus,
            plunge_dmg_bonus: self.base.plunge_dmg_bonus,
            execution_dmg_bonus: self.base.execution_dmg_bonus,
            skill_dmg_bonus: self.base.skill_dmg_bonus,
            ult_dmg_bonus: self.base.ult_dmg_bonus,
            qte_dmg_bonus: self.base.qte_dmg_bonus,
            stagger_dmg_bonus: self.base.stagger_dmg_bonus,
            heat_dmg_bonus: self.base.heat_dmg_bonus,
            electric_dmg_bonus: self.base.electric_dmg_bonus,
            frost_dmg_bonus: self.base.frost_dmg_bonus,
            nature_dmg_bonus: self.base.nature_dmg_bonus,
            physical_dmg_bonus: self.base.physical_dmg_bonus,
            final_atk: 0.0,
        };

        self.kit.modify_panel(&mut panel);
        self.effects.apply_to_attacker(&mut panel);
        panel.finalize(self.attrs.attack_multiplier(self.main_attr, self.sub_attr));

        self.panel_cache = Some((version, panel.clone()));
        panel
    }

    /// Invalidate the cached panel after kit private state changed.
    pub fn invalidate_panel(&mut self) {
        self.effects.touch();
    }

    /// Count down cooldowns and the QTE window.
    pub fn tick_timers(&mut self) {
        for remaining in self.cooldowns.values_mut() {
            *remaining = remaining.saturating_sub(1);
        }
        self.qte_ready_timer = self.qte_ready_timer.saturating_sub(1);
    }

    pub fn cooldown_active(&self, key: &str) -> bool {
        self.cooldowns.get(key).copied().unwrap_or(0) > 0
    }

    /// Begin an action; the caller has already settled resources and events.
    pub fn begin_action(&mut self, mut action: Action) {
        action.reset();
        if let Some((key, ticks)) = action.cooldown.clone() {
            self.cooldowns.insert(key, ticks);
        }
        self.elapsed = 0;
        self.current_action = Some(action);
    }

    /// Finish the current action, returning it for the `ActionEnd` event.
    pub fn finish_action(&mut self) -> Option<Action> {
        self.elapsed = 0;
        self.current_action.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::{Effect, EffectCategory};
    use crate::kits::Levatine;
    use crate::stats::StatKey;

    fn character() -> Character {
        Character::new(Box::new(Levatine::new()), 0)
    }

    #[test]
    fn test_panel_cache_keyed_by_effect_version() {
        let config = SimConfig::default();
        let mut ch = character();
        let first = ch.current_panel(&config);
        let again = ch.current_panel(&config);
        assert_eq!(first, again);

        ch.effects.add(
            Effect::stat_modifier(
                "Rally",
                EffectCategory::Buff,
                100,
                vec![(StatKey::AtkPct, 0.25)],
                "test",
            ),
            0,
        );
        let buffed = ch.current_panel(&config);
        assert!(buffed.final_atk > first.final_atk);
    }

    #[test]
    fn test_invalidate_panel_recomputes() {
        let config = SimConfig::default();
        let mut ch = character();
        let first = ch.current_panel(&config);
        ch.kit.set_private_counter(4);
        ch.invalidate_panel();
        let after = ch.current_panel(&config);
        // Four molten stacks grant resistance penetration
        assert!(after.res_pen > first.res_pen);
    }

    #[test]
    fn test_cooldown_countdown() {
        let mut ch = character();
        ch.cooldowns.insert("skill".to_string(), 2);
        assert!(ch.cooldown_active("skill"));
        ch.tick_timers();
        ch.tick_timers();
        assert!(!ch.cooldown_active("skill"));
    }

    #[test]
    fn test_begin_action_applies_cooldown() {
        let mut ch = character();
        let action = Action::new("skill", 10, crate::types::MoveType::Skill)
            .with_cooldown("skill", 100);
        ch.begin_action(action);
        assert!(ch.is_busy());
        assert!(ch.cooldown_active("skill"));
    }
}
