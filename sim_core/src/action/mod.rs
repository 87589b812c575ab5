//! Actions: multi-step abilities with embedded, data-described events

mod script;

pub use script::{parse_script, parse_timeline, Command, TimelineEntry};

use crate::effect::Effect;
use crate::types::{Attachment, EffectTag, Element, MoveType, Tick};

/// One damage instance inside an action.
#[derive(Debug, Clone)]
pub struct HitSpec {
    pub skill_name: String,
    pub mv: f64,
    pub element: Element,
    pub move_type: MoveType,
    pub attachments: Vec<Attachment>,
    /// Stagger gauge added on hit
    pub stagger: f64,
}

impl HitSpec {
    pub fn new(skill_name: impl Into<String>, mv: f64, element: Element, move_type: MoveType) -> Self {
        HitSpec {
            skill_name: skill_name.into(),
            mv,
            element,
            move_type,
            attachments: Vec::new(),
            stagger: 0.0,
        }
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    pub fn with_stagger(mut self, stagger: f64) -> Self {
        self.stagger = stagger;
        self
    }
}

/// Hooks a kit can ask to be called back on mid-action. The kit interprets
/// the cue with its private state and returns further ops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KitCue {
    NormalHit(usize),
    SkillInit,
    SkillFollowup,
    UltActivate,
    QteResolve,
}

/// A world mutation described as data. The scheduler applies these; nothing
/// inside an action holds references into the engine.
#[derive(Debug, Clone)]
pub enum ActionOp {
    /// Run the full damage pipeline for one hit
    Hit(HitSpec),
    /// Add stagger gauge to the target
    Stagger(f64),
    /// Attach an effect to the target
    ApplyToTarget(Effect),
    /// Attach an effect to the acting character
    ApplyToSelf(Effect),
    /// Attach a separate instance to every teammate
    ApplyToTeam { effect: Effect, include_self: bool },
    /// Remove the first target effect carrying the tag
    ConsumeTargetTag(EffectTag),
    /// Restore party technique points
    RestoreSp(f64),
    /// Arm the acting character's QTE window for a number of ticks
    QteReady(Tick),
    /// Defer to the kit for state-dependent behavior
    Cue(KitCue),
    /// Battle-log line (info)
    Log(String),
}

/// One scheduled op inside an action.
#[derive(Debug, Clone)]
pub struct ActionEvent {
    pub offset: Tick,
    pub op: ActionOp,
}

/// A multi-tick ability: fixed duration, ops firing at offsets.
#[derive(Debug, Clone)]
pub struct Action {
    pub name: String,
    pub duration: Tick,
    pub move_type: MoveType,
    /// Party resource consumed at start; start is refused (and retried)
    /// while the pool is short
    pub sp_cost: f64,
    /// Cooldown key and length applied on successful start
    pub cooldown: Option<(String, Tick)>,
    events: Vec<ActionEvent>,
    cursor: usize,
}

impl Action {
    pub fn new(name: impl Into<String>, duration: Tick, move_type: MoveType) -> Self {
        Action {
            name: name.into(),
            duration,
            move_type,
            sp_cost: 0.0,
            cooldown: None,
            events: Vec::new(),
            cursor: 0,
        }
    }

    /// An action that does nothing for `duration` ticks.
    pub fn wait(duration: Tick) -> Self {
        Action::new("wait", duration, MoveType::Other)
    }

    pub fn with_event(mut self, offset: Tick, op: ActionOp) -> Self {
        let pos = self.events.iter().position(|e| e.offset > offset).unwrap_or(self.events.len());
        self.events.insert(pos, ActionEvent { offset, op });
        self
    }

    pub fn with_sp_cost(mut self, sp_cost: f64) -> Self {
        self.sp_cost = sp_cost;
        self
    }

    pub fn with_cooldown(mut self, key: impl Into<String>, ticks: Tick) -> Self {
        self.cooldown = Some((key.into(), ticks));
        self
    }

    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Pop every op whose offset has been reached.
    pub fn due_ops(&mut self, elapsed: Tick) -> Vec<ActionOp> {
        let mut ops = Vec::new();
        while let Some(event) = self.events.get(self.cursor) {
            if event.offset > elapsed {
                break;
            }
            ops.push(event.op.clone());
            self.cursor += 1;
        }
        ops
    }

    pub fn finished(&self, elapsed: Tick) -> bool {
        elapsed >= self.duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ops_fire_in_offset_order() {
        let mut action = Action::new("combo", 10, MoveType::Skill)
            .with_event(8, ActionOp::Log("late".into()))
            .with_event(3, ActionOp::Log("early".into()));
        assert!(action.due_ops(2).is_empty());
        let ops = action.due_ops(3);
        assert_eq!(ops.len(), 1);
        assert!(matches!(&ops[0], ActionOp::Log(m) if m == "early"));
        let ops = action.due_ops(9);
        assert_eq!(ops.len(), 1);
        assert!(matches!(&ops[0], ActionOp::Log(m) if m == "late"));
    }

    #[test]
    fn test_finished() {
        let action = Action::wait(5);
        assert!(!action.finished(4));
        assert!(action.finished(5));
    }

    #[test]
    fn test_zero_duration_finishes_immediately() {
        let action = Action::wait(0);
        assert!(action.finished(0));
    }
}
