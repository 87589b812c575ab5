//! 管理员 — physical burst: seal crystals shattered for bonus damage

use super::{Kit, KitCtx, Loadout};
use crate::action::{Action, ActionOp, HitSpec, KitCue};
use crate::config::SimConfig;
use crate::effect::Effect;
use crate::event::{Event, EventKind, PayloadValue};
use crate::stats::{AttributeKind, Attributes, BaseStats};
use crate::types::{Attachment, EffectTag, Element, MoveType, PhysAnomaly, Tick};

const NORMAL_MV: [f64; 5] = [51.0, 61.0, 68.0, 78.0, 90.0];
const NORMAL_FRAMES: [(Tick, Tick); 5] = [(20, 10), (20, 10), (20, 10), (25, 12), (35, 15)];

const SKILL_MV: f64 = 350.0;
const ULT_MV: f64 = 800.0;
const ULT_SHATTER_MV: f64 = 600.0;
const QTE_MV: f64 = 100.0;

const SEAL_DURATION_SECONDS: f64 = 5.0;
const SEAL_VULN: f64 = 0.10;

const QTE_WINDOW: Tick = 30;

pub struct Admin;

impl Admin {
    pub fn new() -> Self {
        Admin
    }
}

impl Default for Admin {
    fn default() -> Self {
        Admin::new()
    }
}

impl Kit for Admin {
    fn display_name(&self) -> &'static str {
        "管理员"
    }

    fn loadout(&self) -> Loadout {
        Loadout {
            attrs: Attributes::new(123, 140, 96, 107),
            base: BaseStats { base_hp: 5495.0, base_atk: 319.0, ..Default::default() },
            main_attr: AttributeKind::Strength,
            sub_attr: AttributeKind::Agility,
        }
    }

    fn default_script(&self) -> Option<&'static str> {
        Some("a1\na2\nskill\nwait 1.0\nult")
    }

    fn normal_attack(&mut self, _config: &SimConfig, seq: usize) -> Option<Action> {
        let idx = seq.min(NORMAL_MV.len() - 1);
        let (total, hit) = NORMAL_FRAMES[idx];
        Some(
            Action::new(format!("普攻{}", idx + 1), total, MoveType::Normal).with_event(
                hit,
                ActionOp::Hit(HitSpec::new(
                    format!("普攻{}", idx + 1),
                    NORMAL_MV[idx],
                    Element::Physical,
                    MoveType::Normal,
                )),
            ),
        )
    }

    fn skill(&mut self, _config: &SimConfig) -> Option<Action> {
        let spec = HitSpec::new("构成序列", SKILL_MV, Element::Physical, MoveType::Skill)
            .with_attachment(Attachment::Physical(PhysAnomaly::Impact));
        Some(
            Action::new("构成序列", 40, MoveType::Skill)
                .with_sp_cost(25.0)
                .with_cooldown("skill", 120)
                .with_event(20, ActionOp::Hit(spec)),
        )
    }

    fn ult(&mut self, _config: &SimConfig) -> Option<Action> {
        Some(
            Action::new("轰击序列", 60, MoveType::Ultimate)
                .with_cooldown("ult", 300)
                .with_event(30, ActionOp::Cue(KitCue::UltActivate)),
        )
    }

    fn qte(&mut self, config: &SimConfig) -> Option<Action> {
        let seal = Effect::seal_crystal(config, SEAL_DURATION_SECONDS, SEAL_VULN, "管理员");
        Some(
            Action::new("锁闭序列", 30, MoveType::Qte)
                .with_event(
                    15,
                    ActionOp::Hit(HitSpec::new("锁闭序列", QTE_MV, Element::Physical, MoveType::Qte)),
                )
                .with_event(15, ActionOp::ApplyToTarget(seal)),
        )
    }

    fn observe(&mut self, event: &Event, self_name: &str) -> Vec<ActionOp> {
        // A teammate's QTE hit opens this character's QTE window.
        if event.kind == EventKind::PostDamage
            && event.source.as_deref() != Some(self_name)
            && matches!(event.get("move_type"), Some(PayloadValue::Move(MoveType::Qte)))
        {
            return vec![ActionOp::QteReady(QTE_WINDOW)];
        }
        Vec::new()
    }

    fn on_cue(&mut self, cue: KitCue, ctx: &KitCtx) -> Vec<ActionOp> {
        match cue {
            KitCue::UltActivate => {
                let mut ops = vec![ActionOp::Hit(HitSpec::new(
                    "轰击序列",
                    ULT_MV,
                    Element::Physical,
                    MoveType::Ultimate,
                ))];
                if ctx.target.has_seal {
                    ops.push(ActionOp::ConsumeTargetTag(EffectTag::SealCrystal));
                    ops.push(ActionOp::Log("[管理员] crystal shattered!".to_string()));
                    // The shatter burst counts as QTE damage
                    ops.push(ActionOp::Hit(HitSpec::new(
                        "结晶碎裂",
                        ULT_SHATTER_MV,
                        Element::Physical,
                        MoveType::Qte,
                    )));
                }
                ops
            }
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kits::TargetView;
    use crate::stats::AttackerPanel;

    fn ctx<'a>(config: &'a SimConfig, panel: &'a AttackerPanel, target: TargetView) -> KitCtx<'a> {
        KitCtx { config, tick: 0, panel, target, party_sp: 200.0 }
    }

    #[test]
    fn test_ult_without_seal_is_single_hit() {
        let config = SimConfig::default();
        let panel = AttackerPanel::default();
        let mut kit = Admin::new();
        let ops = kit.on_cue(KitCue::UltActivate, &ctx(&config, &panel, TargetView::default()));
        let hits = ops.iter().filter(|op| matches!(op, ActionOp::Hit(_))).count();
        assert_eq!(hits, 1);
    }

    #[test]
    fn test_ult_shatters_seal_for_bonus_hit() {
        let config = SimConfig::default();
        let panel = AttackerPanel::default();
        let mut kit = Admin::new();
        let view = TargetView { has_seal: true, ..Default::default() };
        let ops = kit.on_cue(KitCue::UltActivate, &ctx(&config, &panel, view));
        assert!(ops.iter().any(|op| matches!(op, ActionOp::ConsumeTargetTag(EffectTag::SealCrystal))));
        let bonus = ops.iter().any(|op| {
            matches!(op, ActionOp::Hit(h) if h.skill_name == "结晶碎裂" && h.move_type == MoveType::Qte)
        });
        assert!(bonus);
    }

    #[test]
    fn test_qte_ready_on_teammate_qte_damage() {
        let mut kit = Admin::new();
        let event = Event::new(EventKind::PostDamage, 0)
            .with_source("艾尔黛拉")
            .with("move_type", PayloadValue::Move(MoveType::Qte));
        assert!(!kit.observe(&event, "管理员").is_empty());

        let own = Event::new(EventKind::PostDamage, 0)
            .with_source("管理员")
            .with("move_type", PayloadValue::Move(MoveType::Qte));
        assert!(kit.observe(&own, "管理员").is_empty());
    }
}
