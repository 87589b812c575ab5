//! The one path every hit takes: reactions, formula, events, statistics

use super::formula;
use crate::action::HitSpec;
use crate::effect::AddOutcome;
use crate::engine::Engine;
use crate::entity::{Character, Target};
use crate::error::SimError;
use crate::event::{Event, EventKind, PayloadValue};
use crate::reaction::ReactionNote;
use crate::types::{EffectTag, Element, MoveType, ReactionKind};
use rand::Rng;

/// Resolve one hit end to end. Returns the damage actually applied (zero
/// when a `PreDamage` listener cancelled the hit).
pub fn deal_damage(
    engine: &mut Engine,
    attacker: &mut Character,
    target: &mut Target,
    spec: &HitSpec,
) -> Result<i64, SimError> {
    // 1. Attacker panel, cached by effect version.
    let panel = attacker.current_panel(&engine.config);

    // 2. Reactions: resolve attachments, attach derived effects, emit notes.
    let reaction = target.reactions.apply_hit(
        &engine.config,
        &mut target.effects,
        &spec.attachments,
        panel.final_atk,
        panel.technique_power,
        panel.level,
        &attacker.name,
    )?;
    for effect in &reaction.effects {
        attach_effect(engine, &attacker.name, target, effect.clone());
    }
    emit_reaction_notes(engine, &attacker.name, &target.name, &reaction.notes);

    // 3. Defender panel, with the staggered flag folded in.
    let defender = target.defense_panel(&engine.config);

    // 4. The fourteen zones.
    let total_mv = spec.mv + reaction.extra_mv;
    let computed = formula::calculate(
        &engine.config,
        &panel,
        &defender,
        total_mv,
        spec.element,
        spec.move_type,
    );

    // 5. Crit roll: flags the hit, never changes the number.
    let roll: f64 = engine.rng.gen();
    let is_crit = roll < panel.crit_rate;

    // 6. PreDamage: listeners may rewrite the damage or cancel outright.
    let mut pre = Event::new(EventKind::PreDamage, engine.tick)
        .with_source(attacker.name.clone())
        .with_target(target.name.clone())
        .with("damage", PayloadValue::Number(computed as f64))
        .with("skill_name", PayloadValue::Text(spec.skill_name.clone()))
        .with("element", PayloadValue::Element(spec.element))
        .with("move_type", PayloadValue::Move(spec.move_type))
        .with("is_crit", PayloadValue::Flag(is_crit));
    engine.bus.emit(&mut pre);
    if pre.cancelled {
        return Ok(0);
    }
    let damage = pre.number("damage").unwrap_or(computed as f64) as i64;

    // 7. Apply, then record.
    let hp = target.take_damage(damage);
    engine.bus.emit_new(
        Event::new(EventKind::HpChanged, engine.tick)
            .with_target(target.name.clone())
            .with("hp", PayloadValue::Number(hp)),
    );
    engine.bus.emit_new(
        Event::new(EventKind::DamageDealt, engine.tick)
            .with_source(attacker.name.clone())
            .with_target(target.name.clone())
            .with("damage", PayloadValue::Number(damage as f64))
            .with("skill_name", PayloadValue::Text(spec.skill_name.clone()))
            .with("move_type", PayloadValue::Move(spec.move_type))
            .with("element", PayloadValue::Element(spec.element)),
    );
    let is_reaction = reaction.extra_mv > 0.0;
    engine.stats.record_damage(
        engine.tick,
        &attacker.name,
        &target.name,
        &spec.skill_name,
        damage,
        spec.element,
        spec.move_type,
        is_crit,
        is_reaction,
    );

    // 8. PostDamage with the applied value.
    let mut post = pre;
    post.kind = EventKind::PostDamage;
    post.set("actual_damage", PayloadValue::Number(damage as f64));
    engine.bus.emit(&mut post);

    // 9. Crit event.
    if is_crit {
        engine.bus.emit_new(
            Event::new(EventKind::CritDealt, engine.tick)
                .with_source(attacker.name.clone())
                .with_target(target.name.clone())
                .with("damage", PayloadValue::Number(damage as f64)),
        );
    }

    // 10. Reaction records.
    if is_reaction {
        for kind in reaction.reactions.iter().filter(|k| **k != ReactionKind::Attach) {
            engine.stats.record_reaction(
                engine.tick,
                &attacker.name,
                &target.name,
                *kind,
                reaction.level,
                reaction.extra_mv * panel.final_atk / 100.0,
            );
        }
    }

    // 11. One structured damage line.
    let mut line = format!("[{}] {} hit {}", attacker.name, spec.skill_name, damage);
    if is_crit {
        line.push_str(" crit!");
    }
    if !reaction.log.is_empty() && engine.config.enable_reaction_log {
        line.push_str(" | ");
        line.push_str(&reaction.log);
    }
    engine.log_damage(line);

    // Hits also feed the stagger gauge and settle usage-capped buffs.
    if spec.stagger > 0.0 {
        apply_stagger(engine, target, spec.stagger);
    }
    for spent in attacker.effects.consume_usages(EffectTag::ConsumeOnHit) {
        engine.stats.record_buff(
            spent.applied_tick,
            engine.tick,
            &attacker.name,
            &spent.name,
            &spent.source,
            spent.stacks,
        );
        engine.bus.emit_new(
            Event::new(EventKind::EffectRemoved, engine.tick)
                .with_source(spent.source.clone())
                .with_target(attacker.name.clone())
                .with("buff_name", PayloadValue::Text(spent.name.clone())),
        );
    }

    Ok(damage)
}

/// Apply damage bypassing the formula and reactions; still recorded.
pub fn deal_true_damage(
    engine: &mut Engine,
    attacker_name: &str,
    target: &mut Target,
    skill_name: &str,
    damage: f64,
) -> i64 {
    let damage = damage.max(0.0) as i64;
    let hp = target.take_damage(damage);
    engine.bus.emit_new(
        Event::new(EventKind::HpChanged, engine.tick)
            .with_target(target.name.clone())
            .with("hp", PayloadValue::Number(hp)),
    );
    engine.stats.record_damage(
        engine.tick,
        attacker_name,
        &target.name,
        skill_name,
        damage,
        Element::Physical,
        MoveType::Other,
        false,
        false,
    );
    engine.log_damage(format!("[{attacker_name}] {skill_name} true damage {damage}"));
    damage
}

/// Feed the stagger gauge, emitting `StaggerStart` when the threshold trips.
pub fn apply_stagger(engine: &mut Engine, target: &mut Target, value: f64) {
    let outcome = target.apply_stagger(value, &engine.config);
    if outcome.entered {
        engine.bus.emit_new(
            Event::new(EventKind::StaggerStart, engine.tick)
                .with_target(target.name.clone())
                .with("gauge", PayloadValue::Number(outcome.gauge)),
        );
        engine.log_info(format!("[{}] staggered!", target.name));
    }
}

/// Attach an effect to the target, emitting the apply/stack event.
pub fn attach_effect(
    engine: &mut Engine,
    source_name: &str,
    target: &mut Target,
    effect: crate::effect::Effect,
) {
    let owner_name = target.name.clone();
    attach_to_container(engine, source_name, &owner_name, &mut target.effects, effect);
}

/// Attach an effect to any entity's container, emitting the apply/stack
/// event and the effect log line.
pub fn attach_to_container(
    engine: &mut Engine,
    source_name: &str,
    owner_name: &str,
    effects: &mut crate::effect::EffectManager,
    effect: crate::effect::Effect,
) {
    let name = effect.name.clone();
    let initial_stacks = effect.stacks;
    let tags: Vec<&str> = effect.tags.iter().map(|t| t.name()).collect();
    let tag_line = tags.join(" ");
    let outcome = effects.add(effect, engine.tick);
    let (kind, stacks) = match outcome {
        AddOutcome::Applied => (EventKind::EffectApplied, initial_stacks),
        AddOutcome::Stacked { stacks } => (EventKind::EffectStacked, stacks),
    };
    engine.bus.emit_new(
        Event::new(kind, engine.tick)
            .with_source(source_name.to_string())
            .with_target(owner_name.to_string())
            .with("buff_name", PayloadValue::Text(name.clone()))
            .with("stacks", PayloadValue::Int(stacks as i64))
            .with("buff_tags", PayloadValue::Text(tag_line)),
    );
    if engine.config.enable_effect_log {
        engine.log_info(format!("[{owner_name}] {name} applied ({stacks} stacks)"));
    }
}

fn emit_reaction_notes(
    engine: &mut Engine,
    attacker_name: &str,
    target_name: &str,
    notes: &[ReactionNote],
) {
    for note in notes {
        match note {
            ReactionNote::ElementAttached { element, stacks } => {
                engine.bus.emit_new(
                    Event::new(EventKind::ElementAttached, engine.tick)
                        .with_source(attacker_name.to_string())
                        .with_target(target_name.to_string())
                        .with("element", PayloadValue::Element(*element))
                        .with("stacks", PayloadValue::Int(*stacks as i64)),
                );
            }
            ReactionNote::ElementBurst { element, stacks } => {
                engine.bus.emit_new(
                    Event::new(EventKind::ElementBurst, engine.tick)
                        .with_source(attacker_name.to_string())
                        .with_target(target_name.to_string())
                        .with("element", PayloadValue::Element(*element))
                        .with("stacks", PayloadValue::Int(*stacks as i64)),
                );
            }
            ReactionNote::ReactionTriggered { kind, element, level, extra_mv, phys_anomaly } => {
                let mut event = Event::new(EventKind::ReactionTriggered, engine.tick)
                    .with_source(attacker_name.to_string())
                    .with_target(target_name.to_string())
                    .with("reaction_type", PayloadValue::Reaction(*kind))
                    .with("element", PayloadValue::Element(*element))
                    .with("level", PayloadValue::Int(*level as i64))
                    .with("extra_mv", PayloadValue::Number(*extra_mv));
                if let Some(anomaly) = phys_anomaly {
                    event = event.with("phys_type", PayloadValue::Anomaly(*anomaly));
                }
                engine.bus.emit_new(event);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::kits::Levatine;
    use crate::stats::DefenderPanel;
    use crate::types::Attachment;

    fn setup() -> (Engine, Character, Target) {
        let config = SimConfig::default();
        let engine = Engine::new(config, 42);
        let mut attacker = Character::new(Box::new(Levatine::new()), 0);
        attacker.base.crit_rate = 0.0;
        let target = Target::new(
            "dummy",
            DefenderPanel { defense: 100.0, ..Default::default() },
            1.0e12,
            100.0,
        );
        (engine, attacker, target)
    }

    fn plain_hit(mv: f64) -> HitSpec {
        HitSpec::new("test hit", mv, Element::Physical, MoveType::Normal)
    }

    #[test]
    fn test_damage_applied_and_recorded() {
        let (mut engine, mut attacker, mut target) = setup();
        let damage = deal_damage(&mut engine, &mut attacker, &mut target, &plain_hit(100.0)).unwrap();
        assert!(damage > 0);
        assert_eq!(target.total_damage_taken, damage);
        assert_eq!(engine.stats.damage_records.len(), 1);
        assert_eq!(engine.stats.damage_records[0].damage, damage);
        assert!(!engine.stats.damage_records[0].is_reaction);
    }

    #[test]
    fn test_pre_damage_cancellation_skips_everything() {
        let (mut engine, mut attacker, mut target) = setup();
        engine.bus.subscribe(EventKind::PreDamage, 0, false, |event| {
            if event.text("skill_name") == Some("cancel-me") {
                event.cancel();
            }
        });
        let spec = HitSpec::new("cancel-me", 100.0, Element::Physical, MoveType::Normal);
        let damage = deal_damage(&mut engine, &mut attacker, &mut target, &spec).unwrap();
        assert_eq!(damage, 0);
        assert_eq!(target.total_damage_taken, 0);
        assert!(engine.stats.damage_records.is_empty());
        // No PostDamage after a cancelled PreDamage
        assert!(engine.bus.recent(Some(EventKind::PostDamage), 10).is_empty());
    }

    #[test]
    fn test_pre_damage_listener_rewrites_damage() {
        let (mut engine, mut attacker, mut target) = setup();
        engine.bus.subscribe(EventKind::PreDamage, 0, false, |event| {
            event.set("damage", PayloadValue::Number(12345.0));
        });
        let damage = deal_damage(&mut engine, &mut attacker, &mut target, &plain_hit(100.0)).unwrap();
        assert_eq!(damage, 12345);
        assert_eq!(engine.stats.damage_records[0].damage, 12345);
        assert_eq!(target.total_damage_taken, 12345);
    }

    #[test]
    fn test_reaction_extra_mv_flows_into_damage() {
        let (mut engine, mut attacker, mut target) = setup();
        let attach = HitSpec::new("heat hit", 100.0, Element::Heat, MoveType::Normal)
            .with_attachment(Attachment::Magic(Element::Heat));
        let first = deal_damage(&mut engine, &mut attacker, &mut target, &attach).unwrap();
        let second = deal_damage(&mut engine, &mut attacker, &mut target, &attach).unwrap();
        // Second hit bursts: total mv 100 + ~224.5
        assert!(second > first * 3);
        let records = &engine.stats.damage_records;
        assert!(records[1].is_reaction);
        assert_eq!(engine.stats.reaction_records.len(), 1);
        assert_eq!(engine.stats.reaction_records[0].reaction, ReactionKind::Burst);
    }

    #[test]
    fn test_crit_flag_respects_bounds() {
        let (mut engine, mut attacker, mut target) = setup();
        attacker.base.crit_rate = 1.5;
        attacker.invalidate_panel();
        for _ in 0..5 {
            deal_damage(&mut engine, &mut attacker, &mut target, &plain_hit(100.0)).unwrap();
        }
        assert_eq!(engine.stats.character_stats[&attacker.name].crit_count, 5);

        let (mut engine, mut attacker, mut target) = setup();
        attacker.base.crit_rate = -1.0;
        attacker.invalidate_panel();
        for _ in 0..5 {
            deal_damage(&mut engine, &mut attacker, &mut target, &plain_hit(100.0)).unwrap();
        }
        assert_eq!(engine.stats.character_stats[&attacker.name].crit_count, 0);
    }

    #[test]
    fn test_hit_feeds_stagger_gauge() {
        let (mut engine, mut attacker, mut target) = setup();
        target.stagger_gauge = 80.0;
        let spec = plain_hit(100.0).with_stagger(25.0);
        deal_damage(&mut engine, &mut attacker, &mut target, &spec).unwrap();
        assert!(target.is_staggered);
        assert_eq!(engine.bus.recent(Some(EventKind::StaggerStart), 5).len(), 1);
    }

    #[test]
    fn test_true_damage_bypasses_formula() {
        let (mut engine, _attacker, mut target) = setup();
        let damage = deal_true_damage(&mut engine, "script", &mut target, "execution", 5000.0);
        assert_eq!(damage, 5000);
        assert_eq!(target.total_damage_taken, 5000);
        assert_eq!(engine.stats.damage_records.len(), 1);
        assert!(!engine.stats.damage_records[0].is_reaction);
    }
}
