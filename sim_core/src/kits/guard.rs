//! 骏卫 — physical support: stagger pressure, shatter, party morale

use super::{Kit, Loadout};
use crate::action::{Action, ActionOp, HitSpec};
use crate::config::SimConfig;
use crate::effect::{Effect, EffectCategory};
use crate::event::{Event, EventKind, PayloadValue};
use crate::stats::{AttributeKind, Attributes, BaseStats, StatKey};
use crate::types::{Attachment, Element, MoveType, PhysAnomaly, ReactionKind, Tick};

const NORMAL_MV: [f64; 5] = [52.0, 63.0, 74.0, 86.0, 97.0];
const NORMAL_FRAMES: [(Tick, Tick); 5] = [(20, 10), (20, 10), (20, 10), (25, 12), (35, 15)];
const HEAVY_STAGGER: f64 = 18.0;

const SKILL_MV: (f64, f64) = (192.0, 238.0);
const ULT_MV: f64 = 300.0;
const QTE_MV: [f64; 3] = [95.0, 122.0, 149.0];

/// Technique points restored per consumed break level on a shatter.
const SHATTER_SP: [f64; 4] = [5.0, 15.0, 25.0, 35.0];

const MORALE_DURATION_SECONDS: f64 = 20.0;
const MORALE_ATK_PCT: f64 = 0.08;
const MORALE_TECH_PCT: f64 = 0.08;
const MORALE_MAX_STACKS: u32 = 3;

const QTE_WINDOW: Tick = 30;

pub struct Guard;

impl Guard {
    pub fn new() -> Self {
        Guard
    }

    fn morale(config: &SimConfig) -> Effect {
        Effect::stat_modifier(
            "士气激昂",
            EffectCategory::Buff,
            config.ticks(MORALE_DURATION_SECONDS),
            vec![(StatKey::AtkPct, MORALE_ATK_PCT), (StatKey::TechPct, MORALE_TECH_PCT)],
            "骏卫",
        )
        .with_max_stacks(MORALE_MAX_STACKS)
    }
}

impl Default for Guard {
    fn default() -> Self {
        Guard::new()
    }
}

impl Kit for Guard {
    fn display_name(&self) -> &'static str {
        "骏卫"
    }

    fn loadout(&self) -> Loadout {
        Loadout {
            attrs: Attributes::new(101, 110, 97, 173),
            base: BaseStats { base_hp: 5495.0, base_atk: 321.0, ..Default::default() },
            main_attr: AttributeKind::Willpower,
            sub_attr: AttributeKind::Agility,
        }
    }

    fn default_script(&self) -> Option<&'static str> {
        Some("a1\na2\nskill\nwait 2.0\nult\na5")
    }

    fn normal_attack(&mut self, _config: &SimConfig, seq: usize) -> Option<Action> {
        let idx = seq.min(NORMAL_MV.len() - 1);
        let (total, hit) = NORMAL_FRAMES[idx];
        let is_heavy = idx == 4;
        let mut spec = HitSpec::new(
            format!("全面攻势{}", idx + 1),
            NORMAL_MV[idx],
            Element::Physical,
            if is_heavy { MoveType::Heavy } else { MoveType::Normal },
        );
        if is_heavy {
            spec = spec.with_stagger(HEAVY_STAGGER);
        }
        Some(
            Action::new(format!("全面攻势{}", idx + 1), total, MoveType::Normal)
                .with_event(hit, ActionOp::Hit(spec)),
        )
    }

    fn skill(&mut self, _config: &SimConfig) -> Option<Action> {
        let first = HitSpec::new("粉碎阵线(1)", SKILL_MV.0, Element::Physical, MoveType::Skill)
            .with_stagger(5.0);
        let second = HitSpec::new("粉碎阵线(2)", SKILL_MV.1, Element::Physical, MoveType::Skill)
            .with_attachment(Attachment::Physical(PhysAnomaly::Shatter))
            .with_stagger(5.0);
        Some(
            Action::new("粉碎阵线", 50, MoveType::Skill)
                .with_sp_cost(20.0)
                .with_cooldown("skill", 80)
                .with_event(25, ActionOp::Hit(first))
                .with_event(30, ActionOp::Hit(second)),
        )
    }

    fn ult(&mut self, config: &SimConfig) -> Option<Action> {
        let march = HitSpec::new("盾卫进军", ULT_MV, Element::Physical, MoveType::Ultimate)
            .with_stagger(10.0);
        Some(
            Action::new("盾卫旗队", 60, MoveType::Ultimate)
                .with_cooldown("ult", 300)
                .with_event(30, ActionOp::Hit(march))
                .with_event(
                    30,
                    ActionOp::ApplyToTeam { effect: Guard::morale(config), include_self: true },
                ),
        )
    }

    fn qte(&mut self, _config: &SimConfig) -> Option<Action> {
        let mut action = Action::new("盈月邀击", 45, MoveType::Qte);
        for (i, mv) in QTE_MV.iter().enumerate() {
            let mut spec = HitSpec::new(
                format!("盈月邀击({})", i + 1),
                *mv,
                Element::Physical,
                MoveType::Qte,
            );
            if i == QTE_MV.len() - 1 {
                spec = spec.with_attachment(Attachment::Physical(PhysAnomaly::Impact));
            }
            action = action.with_event(15 + 10 * i as Tick, ActionOp::Hit(spec));
        }
        Some(action)
    }

    fn observe(&mut self, event: &Event, self_name: &str) -> Vec<ActionOp> {
        if event.kind != EventKind::ReactionTriggered {
            return Vec::new();
        }
        let Some(PayloadValue::Reaction(kind)) = event.get("reaction_type") else {
            return Vec::new();
        };
        let mut ops = Vec::new();

        // Shatter settled by this character restores technique points by
        // consumed break level.
        if *kind == ReactionKind::PhysAnomaly
            && event.source.as_deref() == Some(self_name)
            && matches!(event.get("phys_type"), Some(PayloadValue::Anomaly(PhysAnomaly::Shatter)))
            && event.number("extra_mv").unwrap_or(0.0) > 0.0
        {
            let level = event.get("level").and_then(PayloadValue::as_i64).unwrap_or(0);
            if level >= 1 {
                let sp = SHATTER_SP[(level as usize - 1).min(SHATTER_SP.len() - 1)];
                ops.push(ActionOp::RestoreSp(sp));
            }
        }

        // The target entering break state arms the QTE window.
        if *kind == ReactionKind::PhysAnomaly
            && event.get("level").and_then(PayloadValue::as_i64) == Some(1)
            && event.number("extra_mv").unwrap_or(0.0) == 0.0
        {
            ops.push(ActionOp::QteReady(QTE_WINDOW));
        }
        ops
    }
}
