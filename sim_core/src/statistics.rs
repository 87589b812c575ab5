//! Combat statistics collection and reporting

use crate::types::{Element, MoveType, ReactionKind, Tick};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// One resolved hit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DamageRecord {
    pub tick: Tick,
    pub source: String,
    pub target: String,
    pub skill_name: String,
    pub damage: i64,
    pub element: Element,
    pub move_type: MoveType,
    pub is_crit: bool,
    pub is_reaction: bool,
}

/// One effect's lifetime on an entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuffRecord {
    pub tick_start: Tick,
    pub tick_end: Tick,
    pub owner: String,
    pub buff_name: String,
    pub source: String,
    pub stacks: u32,
}

/// One triggered reaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactionRecord {
    pub tick: Tick,
    pub trigger: String,
    pub target: String,
    pub reaction: ReactionKind,
    pub level: u32,
    pub extra_damage: f64,
}

/// One action start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillUsageRecord {
    pub tick: Tick,
    pub character: String,
    pub skill_name: String,
    pub duration: Tick,
}

/// Per-source aggregates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CharacterStats {
    pub name: String,
    pub total_damage: i64,
    pub skill_damage: BTreeMap<String, i64>,
    pub skill_count: BTreeMap<String, u32>,
    pub reaction_damage: i64,
    pub reaction_count: BTreeMap<ReactionKind, u32>,
    pub crit_count: u32,
    pub hit_count: u32,
}

/// Append-only collector fed by the damage pipeline and the scheduler.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CombatStatistics {
    pub damage_records: Vec<DamageRecord>,
    pub buff_records: Vec<BuffRecord>,
    pub reaction_records: Vec<ReactionRecord>,
    pub skill_usage_records: Vec<SkillUsageRecord>,
    pub character_stats: BTreeMap<String, CharacterStats>,
    pub total_damage: i64,
    /// Combat duration in ticks
    pub combat_duration: Tick,
    /// Ticks per second, captured so DPS math survives serialization
    pub tick_rate: f64,
}

impl CombatStatistics {
    pub fn new(tick_rate: f64) -> Self {
        CombatStatistics { tick_rate, ..Default::default() }
    }

    fn stats_mut(&mut self, source: &str) -> &mut CharacterStats {
        self.character_stats
            .entry(source.to_string())
            .or_insert_with(|| CharacterStats { name: source.to_string(), ..Default::default() })
    }

    #[allow(clippy::too_many_arguments)]
    pub fn record_damage(
        &mut self,
        tick: Tick,
        source: &str,
        target: &str,
        skill_name: &str,
        damage: i64,
        element: Element,
        move_type: MoveType,
        is_crit: bool,
        is_reaction: bool,
    ) {
        self.damage_records.push(DamageRecord {
            tick,
            source: source.to_string(),
            target: target.to_string(),
            skill_name: skill_name.to_string(),
            damage,
            element,
            move_type,
            is_crit,
            is_reaction,
        });

        let stats = self.stats_mut(source);
        stats.total_damage += damage;
        stats.hit_count += 1;
        if is_crit {
            stats.crit_count += 1;
        }
        if is_reaction {
            stats.reaction_damage += damage;
        } else {
            *stats.skill_damage.entry(skill_name.to_string()).or_insert(0) += damage;
        }
        self.total_damage += damage;
    }

    pub fn record_buff(
        &mut self,
        tick_start: Tick,
        tick_end: Tick,
        owner: &str,
        buff_name: &str,
        source: &str,
        stacks: u32,
    ) {
        self.buff_records.push(BuffRecord {
            tick_start,
            tick_end,
            owner: owner.to_string(),
            buff_name: buff_name.to_string(),
            source: source.to_string(),
            stacks,
        });
    }

    pub fn record_reaction(
        &mut self,
        tick: Tick,
        trigger: &str,
        target: &str,
        reaction: ReactionKind,
        level: u32,
        extra_damage: f64,
    ) {
        self.reaction_records.push(ReactionRecord {
            tick,
            trigger: trigger.to_string(),
            target: target.to_string(),
            reaction,
            level,
            extra_damage,
        });
        let stats = self.stats_mut(trigger);
        *stats.reaction_count.entry(reaction).or_insert(0) += 1;
    }

    pub fn record_skill_usage(&mut self, tick: Tick, character: &str, skill_name: &str, duration: Tick) {
        self.skill_usage_records.push(SkillUsageRecord {
            tick,
            character: character.to_string(),
            skill_name: skill_name.to_string(),
            duration,
        });
        let stats = self.stats_mut(character);
        *stats.skill_count.entry(skill_name.to_string()).or_insert(0) += 1;
    }

    pub fn update_combat_duration(&mut self, tick: Tick) {
        self.combat_duration = self.combat_duration.max(tick);
    }

    /// DPS for one character, or the whole party when `character` is `None`.
    pub fn dps(&self, character: Option<&str>) -> f64 {
        if self.combat_duration == 0 || self.tick_rate <= 0.0 {
            return 0.0;
        }
        let seconds = self.combat_duration as f64 / self.tick_rate;
        let damage = match character {
            None => self.total_damage,
            Some(name) => self.character_stats.get(name).map_or(0, |s| s.total_damage),
        };
        damage as f64 / seconds
    }

    /// Damage share per skill (plus a `reactions` bucket) as fractions of the
    /// character's total.
    pub fn damage_breakdown(&self, character: &str) -> BTreeMap<String, f64> {
        let mut breakdown = BTreeMap::new();
        let Some(stats) = self.character_stats.get(character) else {
            return breakdown;
        };
        if stats.total_damage == 0 {
            return breakdown;
        }
        let total = stats.total_damage as f64;
        for (skill, damage) in &stats.skill_damage {
            breakdown.insert(skill.clone(), *damage as f64 / total);
        }
        if stats.reaction_damage > 0 {
            breakdown.insert("reactions".to_string(), stats.reaction_damage as f64 / total);
        }
        breakdown
    }

    /// Observed crit ratio for a character.
    pub fn crit_rate(&self, character: &str) -> f64 {
        match self.character_stats.get(character) {
            Some(stats) if stats.hit_count > 0 => stats.crit_count as f64 / stats.hit_count as f64,
            _ => 0.0,
        }
    }

    /// Fraction of the combat an effect was present on an owner, capped at 1.
    pub fn buff_uptime(&self, owner: &str, buff_name: &str) -> f64 {
        if self.combat_duration == 0 {
            return 0.0;
        }
        let uptime: Tick = self
            .buff_records
            .iter()
            .filter(|r| r.owner == owner && r.buff_name == buff_name)
            .map(|r| r.tick_end.saturating_sub(r.tick_start))
            .sum();
        (uptime as f64 / self.combat_duration as f64).min(1.0)
    }

    /// Reaction trigger counts across all sources.
    pub fn reaction_summary(&self) -> BTreeMap<ReactionKind, u32> {
        let mut summary = BTreeMap::new();
        for record in &self.reaction_records {
            *summary.entry(record.reaction).or_insert(0) += 1;
        }
        summary
    }

    /// Human-readable multi-section report.
    pub fn generate_report(&self) -> String {
        let mut out = String::new();
        let rule = "=".repeat(60);
        let thin = "-".repeat(60);
        let _ = writeln!(out, "{rule}");
        let _ = writeln!(out, "{:^60}", "Combat Report");
        let _ = writeln!(out, "{rule}");

        let seconds = if self.tick_rate > 0.0 { self.combat_duration as f64 / self.tick_rate } else { 0.0 };
        let _ = writeln!(out, "\nDuration: {:.1}s ({} ticks)", seconds, self.combat_duration);
        let _ = writeln!(out, "Total damage: {}", self.total_damage);
        let _ = writeln!(out, "Party DPS: {:.1}", self.dps(None));

        let _ = writeln!(out, "\n{thin}");
        let _ = writeln!(out, "{:^60}", "Per-character damage");
        let _ = writeln!(out, "{thin}");

        let mut sorted: Vec<&CharacterStats> = self.character_stats.values().collect();
        sorted.sort_by(|a, b| b.total_damage.cmp(&a.total_damage).then(a.name.cmp(&b.name)));

        for stats in sorted {
            let share = if self.total_damage > 0 {
                stats.total_damage as f64 / self.total_damage as f64 * 100.0
            } else {
                0.0
            };
            let _ = writeln!(out, "\n[{}]", stats.name);
            let _ = writeln!(out, "  total: {} ({:.1}%)", stats.total_damage, share);
            let _ = writeln!(out, "  dps: {:.1}", self.dps(Some(&stats.name)));
            let _ = writeln!(out, "  hits: {}", stats.hit_count);
            if stats.hit_count > 0 {
                let _ = writeln!(out, "  observed crit rate: {:.1}%", self.crit_rate(&stats.name) * 100.0);
            }
            if stats.total_damage > 0 && !stats.skill_damage.is_empty() {
                let _ = writeln!(out, "  by skill:");
                let mut skills: Vec<(&String, &i64)> = stats.skill_damage.iter().collect();
                skills.sort_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));
                for (skill, damage) in skills {
                    let pct = *damage as f64 / stats.total_damage as f64 * 100.0;
                    let _ = writeln!(out, "    - {}: {} ({:.1}%)", skill, damage, pct);
                }
            }
            if stats.reaction_damage > 0 && stats.total_damage > 0 {
                let pct = stats.reaction_damage as f64 / stats.total_damage as f64 * 100.0;
                let _ = writeln!(out, "  reaction damage: {} ({:.1}%)", stats.reaction_damage, pct);
            }
        }

        let summary = self.reaction_summary();
        if !summary.is_empty() {
            let _ = writeln!(out, "\n{thin}");
            let _ = writeln!(out, "{:^60}", "Reactions");
            let _ = writeln!(out, "{thin}");
            let mut entries: Vec<(ReactionKind, u32)> = summary.into_iter().collect();
            entries.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
            for (kind, count) in entries {
                let _ = writeln!(out, "  {}: {}", kind.name(), count);
            }
        }

        let _ = writeln!(out, "\n{rule}");
        out
    }

    pub fn reset(&mut self) {
        let tick_rate = self.tick_rate;
        *self = CombatStatistics::new(tick_rate);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_hit(stats: &mut CombatStatistics, tick: Tick, damage: i64, is_crit: bool, is_reaction: bool) {
        stats.record_damage(
            tick, "hero", "dummy", "slash", damage,
            Element::Physical, MoveType::Normal, is_crit, is_reaction,
        );
    }

    #[test]
    fn test_damage_aggregation() {
        let mut stats = CombatStatistics::new(10.0);
        record_hit(&mut stats, 1, 100, false, false);
        record_hit(&mut stats, 2, 200, true, false);
        record_hit(&mut stats, 3, 50, false, true);

        let hero = &stats.character_stats["hero"];
        assert_eq!(hero.total_damage, 350);
        assert_eq!(hero.hit_count, 3);
        assert_eq!(hero.crit_count, 1);
        assert_eq!(hero.reaction_damage, 50);
        assert_eq!(hero.skill_damage["slash"], 300);
        assert_eq!(stats.total_damage, 350);
    }

    #[test]
    fn test_dps() {
        let mut stats = CombatStatistics::new(10.0);
        record_hit(&mut stats, 1, 1000, false, false);
        stats.update_combat_duration(50); // 5 seconds
        assert!((stats.dps(None) - 200.0).abs() < 1e-9);
        assert!((stats.dps(Some("hero")) - 200.0).abs() < 1e-9);
        assert!((stats.dps(Some("nobody"))).abs() < f64::EPSILON);
    }

    #[test]
    fn test_breakdown_fractions() {
        let mut stats = CombatStatistics::new(10.0);
        record_hit(&mut stats, 1, 750, false, false);
        record_hit(&mut stats, 2, 250, false, true);
        let breakdown = stats.damage_breakdown("hero");
        assert!((breakdown["slash"] - 0.75).abs() < 1e-9);
        assert!((breakdown["reactions"] - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_observed_crit_rate() {
        let mut stats = CombatStatistics::new(10.0);
        record_hit(&mut stats, 1, 100, true, false);
        record_hit(&mut stats, 2, 100, false, false);
        assert!((stats.crit_rate("hero") - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_buff_uptime() {
        let mut stats = CombatStatistics::new(10.0);
        stats.update_combat_duration(100);
        stats.record_buff(0, 30, "dummy", "Burning", "hero", 1);
        stats.record_buff(50, 70, "dummy", "Burning", "hero", 1);
        assert!((stats.buff_uptime("dummy", "Burning") - 0.5).abs() < 1e-9);
        assert!((stats.buff_uptime("dummy", "Frozen")).abs() < f64::EPSILON);
    }

    #[test]
    fn test_reaction_summary_and_counts() {
        let mut stats = CombatStatistics::new(10.0);
        stats.record_reaction(1, "hero", "dummy", ReactionKind::Burst, 1, 100.0);
        stats.record_reaction(2, "hero", "dummy", ReactionKind::Burst, 2, 120.0);
        stats.record_reaction(3, "hero", "dummy", ReactionKind::Conductive, 1, 80.0);
        let summary = stats.reaction_summary();
        assert_eq!(summary[&ReactionKind::Burst], 2);
        assert_eq!(summary[&ReactionKind::Conductive], 1);
        assert_eq!(stats.character_stats["hero"].reaction_count[&ReactionKind::Burst], 2);
    }

    #[test]
    fn test_report_contains_sections() {
        let mut stats = CombatStatistics::new(10.0);
        record_hit(&mut stats, 1, 500, false, false);
        stats.record_skill_usage(1, "hero", "slash", 10);
        stats.update_combat_duration(100);
        let report = stats.generate_report();
        assert!(report.contains("Combat Report"));
        assert!(report.contains("[hero]"));
        assert!(report.contains("slash"));
    }

    #[test]
    fn test_reset() {
        let mut stats = CombatStatistics::new(10.0);
        record_hit(&mut stats, 1, 500, false, false);
        stats.reset();
        assert_eq!(stats.total_damage, 0);
        assert!(stats.damage_records.is_empty());
        assert!((stats.tick_rate - 10.0).abs() < f64::EPSILON);
    }
}
