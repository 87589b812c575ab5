//! 莱瓦汀 — heat DPS built around molten stacks
//!
//! Normal chain applies heat; the skill stacks molten and detonates at four
//! stacks (burst hit plus a forced burning DoT); the ultimate opens a 15 s
//! empowered window with an enhanced chain whose marks can be absorbed into
//! molten stacks by the chain finisher. Four molten stacks grant resistance
//! penetration.

use super::{Kit, KitCtx, Loadout};
use crate::action::{Action, ActionOp, HitSpec, KitCue};
use crate::config::SimConfig;
use crate::effect::{Effect, EffectCategory, EffectKind};
use crate::stats::{AttackerPanel, AttributeKind, Attributes, BaseStats};
use crate::types::{Attachment, EffectTag, Element, MoveType, Tick};

const NORMAL_MV: [f64; 5] = [64.0, 75.0, 107.0, 118.0, 160.0];
const NORMAL_FRAMES: [(Tick, Tick); 5] = [(6, 4), (5, 3), (7, 4), (9, 5), (12, 8)];
const ENHANCED_MV: [f64; 4] = [162.0, 203.0, 289.0, 506.0];
const ENHANCED_FRAMES: [(Tick, Tick); 4] = [(7, 4), (6, 3), (8, 5), (13, 9)];

const SKILL_INITIAL_MV: f64 = 140.0;
const SKILL_BURST_MV: f64 = 909.0;
const SKILL_DOT_MV: f64 = 14.0;

const MOLTEN_MAX: u32 = 4;
const MOLTEN_RES_PEN: f64 = 0.20;
const EMPOWERED_TICKS: Tick = 150;
const MARK_DURATION_SECONDS: f64 = 20.0;

pub struct Levatine {
    molten_stacks: u32,
    empowered_ticks: Tick,
}

impl Levatine {
    pub fn new() -> Self {
        Levatine { molten_stacks: 0, empowered_ticks: 0 }
    }

    fn is_empowered(&self) -> bool {
        self.empowered_ticks > 0
    }

    fn heat_hit(&self, name: &str, mv: f64, move_type: MoveType) -> HitSpec {
        HitSpec::new(name, mv, Element::Heat, move_type)
            .with_attachment(Attachment::Magic(Element::Heat))
    }

    fn heat_mark(config: &SimConfig) -> Effect {
        Effect::new(
            "灼热附着",
            EffectCategory::Neutral,
            EffectKind::StatModifier { mods: Vec::new() },
            config.ticks(MARK_DURATION_SECONDS),
            "莱瓦汀",
        )
        .with_tag(EffectTag::HeatMark)
    }
}

impl Default for Levatine {
    fn default() -> Self {
        Levatine::new()
    }
}

impl Kit for Levatine {
    fn display_name(&self) -> &'static str {
        "莱瓦汀"
    }

    fn loadout(&self) -> Loadout {
        Loadout {
            attrs: Attributes::new(121, 99, 197, 89),
            base: BaseStats { base_hp: 5495.0, base_atk: 318.0, ..Default::default() },
            main_attr: AttributeKind::Intelligence,
            sub_attr: AttributeKind::Strength,
        }
    }

    fn default_script(&self) -> Option<&'static str> {
        Some("a1\na2\na3\na4\na5\nskill\nwait 1.0\nult\na1\na2\na3\na4")
    }

    fn normal_attack(&mut self, _config: &SimConfig, seq: usize) -> Option<Action> {
        let (mv_table, frames): (&[f64], &[(Tick, Tick)]) = if self.is_empowered() {
            (&ENHANCED_MV, &ENHANCED_FRAMES)
        } else {
            (&NORMAL_MV, &NORMAL_FRAMES)
        };
        let idx = seq.min(mv_table.len() - 1);
        let (total, hit) = frames[idx.min(frames.len() - 1)];
        Some(
            Action::new(format!("普攻{}", idx + 1), total, MoveType::Normal)
                .with_event(hit, ActionOp::Cue(KitCue::NormalHit(idx))),
        )
    }

    fn skill(&mut self, _config: &SimConfig) -> Option<Action> {
        Some(
            Action::new("灼热荆棘", 15, MoveType::Skill)
                .with_sp_cost(25.0)
                .with_cooldown("skill", 100)
                .with_event(5, ActionOp::Cue(KitCue::SkillInit))
                .with_event(10, ActionOp::Cue(KitCue::SkillFollowup)),
        )
    }

    fn ult(&mut self, _config: &SimConfig) -> Option<Action> {
        Some(
            Action::new("黄昏", 20, MoveType::Ultimate)
                .with_cooldown("ult", 300)
                .with_event(10, ActionOp::Cue(KitCue::UltActivate)),
        )
    }

    fn modify_panel(&self, panel: &mut AttackerPanel) {
        if self.molten_stacks >= MOLTEN_MAX {
            panel.res_pen += MOLTEN_RES_PEN;
        }
    }

    fn on_tick(&mut self, _tick: Tick) -> Vec<ActionOp> {
        if self.empowered_ticks > 0 {
            self.empowered_ticks -= 1;
            if self.empowered_ticks == 0 {
                return vec![ActionOp::Log("[莱瓦汀] empowered state ended".to_string())];
            }
        }
        Vec::new()
    }

    fn on_cue(&mut self, cue: KitCue, ctx: &KitCtx) -> Vec<ActionOp> {
        match cue {
            KitCue::NormalHit(idx) => {
                let mv_table: &[f64] = if self.is_empowered() { &ENHANCED_MV } else { &NORMAL_MV };
                let mv = mv_table[idx.min(mv_table.len() - 1)];
                let mut ops = vec![ActionOp::Hit(self.heat_hit(
                    &format!("普攻{}", idx + 1),
                    mv,
                    MoveType::Normal,
                ))];
                if self.is_empowered() && (idx + 1 == 2 || idx + 1 == 4) {
                    ops.push(ActionOp::ApplyToTarget(Levatine::heat_mark(ctx.config)));
                }
                if !self.is_empowered() && idx == 4 && ctx.target.has_heat_mark {
                    ops.push(ActionOp::ConsumeTargetTag(EffectTag::HeatMark));
                    self.molten_stacks = (self.molten_stacks + 1).min(MOLTEN_MAX);
                    ops.push(ActionOp::Log(format!(
                        "[莱瓦汀] mark absorbed, molten {}",
                        self.molten_stacks
                    )));
                }
                ops
            }
            KitCue::SkillInit => {
                self.molten_stacks = (self.molten_stacks + 1).min(MOLTEN_MAX);
                vec![
                    ActionOp::Hit(self.heat_hit("灼热荆棘", SKILL_INITIAL_MV, MoveType::Skill)),
                    ActionOp::Log(format!("[莱瓦汀] molten {}", self.molten_stacks)),
                ]
            }
            KitCue::SkillFollowup => {
                if self.molten_stacks < MOLTEN_MAX {
                    return Vec::new();
                }
                self.molten_stacks = 0;
                let dot_damage = ctx.panel.final_atk * SKILL_DOT_MV / 100.0;
                vec![
                    ActionOp::Log("[莱瓦汀] molten burst!".to_string()),
                    ActionOp::Hit(self.heat_hit("熔火核爆", SKILL_BURST_MV, MoveType::Skill)),
                    ActionOp::ApplyToTarget(Effect::burning(ctx.config, dot_damage, "莱瓦汀")),
                ]
            }
            KitCue::UltActivate => {
                self.empowered_ticks = EMPOWERED_TICKS;
                vec![ActionOp::Log("[莱瓦汀] empowered state".to_string())]
            }
            KitCue::QteResolve => Vec::new(),
        }
    }

    fn set_private_counter(&mut self, value: u32) {
        self.molten_stacks = value.min(MOLTEN_MAX);
    }

    fn gauge(&self) -> Option<String> {
        Some(format!("molten: {}", self.molten_stacks))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kits::TargetView;

    fn ctx<'a>(config: &'a SimConfig, panel: &'a AttackerPanel, target: TargetView) -> KitCtx<'a> {
        KitCtx { config, tick: 0, panel, target, party_sp: 200.0 }
    }

    #[test]
    fn test_molten_burst_requires_four_stacks() {
        let config = SimConfig::default();
        let panel = AttackerPanel { final_atk: 1000.0, ..Default::default() };
        let mut kit = Levatine::new();
        kit.set_private_counter(3);
        assert!(kit.on_cue(KitCue::SkillFollowup, &ctx(&config, &panel, TargetView::default())).is_empty());

        kit.set_private_counter(4);
        let ops = kit.on_cue(KitCue::SkillFollowup, &ctx(&config, &panel, TargetView::default()));
        assert_eq!(kit.gauge().unwrap(), "molten: 0");
        assert!(ops.iter().any(|op| matches!(op, ActionOp::Hit(h) if h.mv == SKILL_BURST_MV)));
        assert!(ops.iter().any(|op| matches!(op, ActionOp::ApplyToTarget(e) if e.name == "Burning")));
    }

    #[test]
    fn test_enhanced_chain_while_empowered() {
        let config = SimConfig::default();
        let mut kit = Levatine::new();
        let normal = kit.normal_attack(&config, 0).unwrap();
        assert_eq!(normal.duration, 6);

        let panel = AttackerPanel::default();
        kit.on_cue(KitCue::UltActivate, &ctx(&config, &panel, TargetView::default()));
        let enhanced = kit.normal_attack(&config, 0).unwrap();
        assert_eq!(enhanced.duration, 7);
    }

    #[test]
    fn test_finisher_absorbs_mark() {
        let config = SimConfig::default();
        let panel = AttackerPanel::default();
        let mut kit = Levatine::new();
        let view = TargetView { has_heat_mark: true, ..Default::default() };
        let ops = kit.on_cue(KitCue::NormalHit(4), &ctx(&config, &panel, view));
        assert!(ops.iter().any(|op| matches!(op, ActionOp::ConsumeTargetTag(EffectTag::HeatMark))));
        assert_eq!(kit.gauge().unwrap(), "molten: 1");
    }

    #[test]
    fn test_four_stacks_grant_penetration() {
        let mut kit = Levatine::new();
        let mut panel = AttackerPanel::default();
        kit.modify_panel(&mut panel);
        assert!(panel.res_pen.abs() < f64::EPSILON);
        kit.set_private_counter(4);
        kit.modify_panel(&mut panel);
        assert!((panel.res_pen - MOLTEN_RES_PEN).abs() < 1e-9);
    }

    #[test]
    fn test_empowered_window_counts_down() {
        let config = SimConfig::default();
        let panel = AttackerPanel::default();
        let mut kit = Levatine::new();
        kit.on_cue(KitCue::UltActivate, &ctx(&config, &panel, TargetView::default()));
        for _ in 0..149 {
            assert!(kit.on_tick(0).is_empty());
        }
        let ops = kit.on_tick(0);
        assert_eq!(ops.len(), 1);
        assert!(!kit.is_empowered());
    }
}
