//! 艾尔黛拉 — nature support: corrosion supply and fragility conversion

use super::{Kit, KitCtx, Loadout};
use crate::action::{Action, ActionOp, HitSpec, KitCue};
use crate::config::SimConfig;
use crate::effect::{Effect, EffectCategory};
use crate::event::{Event, EventKind, PayloadValue};
use crate::stats::{AttributeKind, Attributes, BaseStats, StatKey};
use crate::types::{Attachment, EffectTag, Element, MoveType, Tick};

const NORMAL_MV: [f64; 4] = [68.0, 90.0, 118.0, 124.0];
const NORMAL_FRAMES: [(Tick, Tick); 4] = [(8, 5), (8, 5), (10, 6), (14, 8)];

const SKILL_MV: f64 = 320.0;
const ULT_HIT_MV: f64 = 165.0;
const ULT_HITS: usize = 5;
const QTE_HIT_MV: f64 = 100.0;
const QTE_EXPLODE_MV: f64 = 250.0;

const FRAGILITY_VALUE: f64 = 0.25;
const FRAGILITY_DURATION_SECONDS: f64 = 30.0;
/// The QTE's forced corrosion runs shorter than a reaction-born one.
const QTE_CORROSION_SECONDS: f64 = 7.0;

const QTE_WINDOW: Tick = 30;

pub struct Erdila;

impl Erdila {
    pub fn new() -> Self {
        Erdila
    }

    fn nature_hit(name: &str, mv: f64, move_type: MoveType) -> HitSpec {
        HitSpec::new(name, mv, Element::Nature, move_type)
            .with_attachment(Attachment::Magic(Element::Nature))
    }

    fn physical_fragility(config: &SimConfig) -> Effect {
        Effect::stat_modifier(
            "物理脆弱",
            EffectCategory::Debuff,
            config.ticks(FRAGILITY_DURATION_SECONDS),
            vec![(StatKey::PhysicalFragility, FRAGILITY_VALUE)],
            "艾尔黛拉",
        )
        .with_tag(EffectTag::Fragility)
    }

    fn magic_fragility(config: &SimConfig) -> Effect {
        Effect::stat_modifier(
            "法术脆弱",
            EffectCategory::Debuff,
            config.ticks(FRAGILITY_DURATION_SECONDS),
            vec![
                (StatKey::HeatFragility, FRAGILITY_VALUE),
                (StatKey::ElectricFragility, FRAGILITY_VALUE),
                (StatKey::FrostFragility, FRAGILITY_VALUE),
                (StatKey::NatureFragility, FRAGILITY_VALUE),
            ],
            "艾尔黛拉",
        )
        .with_tag(EffectTag::Fragility)
    }
}

impl Default for Erdila {
    fn default() -> Self {
        Erdila::new()
    }
}

impl Kit for Erdila {
    fn display_name(&self) -> &'static str {
        "艾尔黛拉"
    }

    fn loadout(&self) -> Loadout {
        Loadout {
            attrs: Attributes::new(95, 102, 180, 120),
            base: BaseStats { base_hp: 5495.0, base_atk: 315.0, ..Default::default() },
            main_attr: AttributeKind::Intelligence,
            sub_attr: AttributeKind::Willpower,
        }
    }

    fn default_script(&self) -> Option<&'static str> {
        Some("a1\na2\na3\nskill\nwait 2.0\nult")
    }

    fn normal_attack(&mut self, _config: &SimConfig, seq: usize) -> Option<Action> {
        let idx = seq.min(NORMAL_MV.len() - 1);
        let (total, hit) = NORMAL_FRAMES[idx];
        Some(
            Action::new(format!("普攻{}", idx + 1), total, MoveType::Normal).with_event(
                hit,
                ActionOp::Hit(Erdila::nature_hit(
                    &format!("普攻{}", idx + 1),
                    NORMAL_MV[idx],
                    MoveType::Normal,
                )),
            ),
        )
    }

    fn skill(&mut self, _config: &SimConfig) -> Option<Action> {
        Some(
            Action::new("奔腾的多利", 20, MoveType::Skill)
                .with_sp_cost(20.0)
                .with_cooldown("skill", 80)
                .with_event(8, ActionOp::Cue(KitCue::SkillInit)),
        )
    }

    fn ult(&mut self, _config: &SimConfig) -> Option<Action> {
        let mut action = Action::new("毛茸茸派对", 30, MoveType::Ultimate).with_cooldown("ult", 300);
        for i in 0..ULT_HITS {
            action = action.with_event(
                5 + 5 * i as Tick,
                ActionOp::Hit(Erdila::nature_hit("毛茸茸派对", ULT_HIT_MV, MoveType::Ultimate)),
            );
        }
        Some(action)
    }

    fn qte(&mut self, _config: &SimConfig) -> Option<Action> {
        Some(
            Action::new("火山蘑菇云", 15, MoveType::Qte)
                .with_event(
                    5,
                    ActionOp::Hit(HitSpec::new("火山蘑菇云", QTE_HIT_MV, Element::Nature, MoveType::Qte)),
                )
                .with_event(10, ActionOp::Cue(KitCue::QteResolve)),
        )
    }

    fn observe(&mut self, event: &Event, self_name: &str) -> Vec<ActionOp> {
        // A teammate's heavy hit opens the QTE window.
        if event.kind == EventKind::DamageDealt
            && event.source.as_deref() != Some(self_name)
            && matches!(event.get("move_type"), Some(PayloadValue::Move(MoveType::Heavy)))
        {
            return vec![ActionOp::QteReady(QTE_WINDOW)];
        }
        Vec::new()
    }

    fn on_cue(&mut self, cue: KitCue, ctx: &KitCtx) -> Vec<ActionOp> {
        match cue {
            KitCue::SkillInit => {
                let mut ops = Vec::new();
                let consumed = ctx.target.has_corrosion;
                if consumed {
                    ops.push(ActionOp::ConsumeTargetTag(EffectTag::Corrosion));
                    ops.push(ActionOp::ApplyToTarget(Erdila::physical_fragility(ctx.config)));
                    ops.push(ActionOp::ApplyToTarget(Erdila::magic_fragility(ctx.config)));
                    ops.push(ActionOp::Log(
                        "[艾尔黛拉] corrosion consumed, fragility applied".to_string(),
                    ));
                }
                ops.push(ActionOp::Hit(Erdila::nature_hit("奔腾的多利", SKILL_MV, MoveType::Skill)));
                if consumed {
                    // Follow-up ram without a fresh attachment
                    ops.push(ActionOp::Hit(HitSpec::new(
                        "奔腾的多利(2)",
                        SKILL_MV,
                        Element::Nature,
                        MoveType::Skill,
                    )));
                }
                ops
            }
            KitCue::QteResolve => {
                let mut corrosion = Effect::corrosion(ctx.config, 1, ctx.panel.technique_power, "艾尔黛拉");
                corrosion.duration = ctx.config.ticks(QTE_CORROSION_SECONDS);
                vec![
                    ActionOp::Hit(HitSpec::new(
                        "火山蘑菇云(爆炸)",
                        QTE_EXPLODE_MV,
                        Element::Nature,
                        MoveType::Qte,
                    )),
                    ActionOp::ApplyToTarget(corrosion),
                ]
            }
            _ => Vec::new(),
        }
    }
}
