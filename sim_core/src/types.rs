//! Core enums shared across the simulation

use serde::{Deserialize, Serialize};

/// Discrete simulation time. One tick is `1 / tick_rate` seconds (0.1s by default).
pub type Tick = u32;

/// Damage element of a hit or attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Element {
    Physical,
    Heat,
    Electric,
    Frost,
    Nature,
}

impl Element {
    /// The four magic elements, in canonical order.
    pub fn magic() -> &'static [Element] {
        &[Element::Heat, Element::Electric, Element::Frost, Element::Nature]
    }

    pub fn is_magic(self) -> bool {
        self != Element::Physical
    }

    pub fn name(self) -> &'static str {
        match self {
            Element::Physical => "physical",
            Element::Heat => "heat",
            Element::Electric => "electric",
            Element::Frost => "frost",
            Element::Nature => "nature",
        }
    }
}

/// Categorization of a hit; selects the matching damage-bonus field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveType {
    Normal,
    Heavy,
    Plunge,
    Execution,
    Skill,
    Ultimate,
    Qte,
    Other,
}

impl MoveType {
    pub fn name(self) -> &'static str {
        match self {
            MoveType::Normal => "normal",
            MoveType::Heavy => "heavy",
            MoveType::Plunge => "plunge",
            MoveType::Execution => "execution",
            MoveType::Skill => "skill",
            MoveType::Ultimate => "ultimate",
            MoveType::Qte => "qte",
            MoveType::Other => "other",
        }
    }
}

/// Physical anomaly carried by a hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhysAnomaly {
    None,
    Break,
    Impact,
    Shatter,
    Launch,
    Knockdown,
}

/// Keys of the reaction multiplier table in [`crate::config::SimConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MvKind {
    Burst,
    Reaction,
    BurningDot,
    Frozen,
    Shatter,
    Impact,
    Break,
}

impl MvKind {
    pub fn name(self) -> &'static str {
        match self {
            MvKind::Burst => "burst",
            MvKind::Reaction => "reaction",
            MvKind::BurningDot => "burning_dot",
            MvKind::Frozen => "frozen",
            MvKind::Shatter => "shatter",
            MvKind::Impact => "impact",
            MvKind::Break => "break",
        }
    }
}

/// A triggered reaction, as recorded in events and statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReactionKind {
    Attach,
    Burst,
    Burning,
    Conductive,
    Frozen,
    Corrosion,
    Shatter,
    PhysAnomaly,
    /// Catalog data referencing a reaction kind this build does not know.
    /// Conditions naming it never fire.
    #[serde(other)]
    Unknown,
}

impl ReactionKind {
    pub fn name(self) -> &'static str {
        match self {
            ReactionKind::Attach => "attach",
            ReactionKind::Burst => "burst",
            ReactionKind::Burning => "burning",
            ReactionKind::Conductive => "conductive",
            ReactionKind::Frozen => "frozen",
            ReactionKind::Corrosion => "corrosion",
            ReactionKind::Shatter => "shatter",
            ReactionKind::PhysAnomaly => "phys_anomaly",
            ReactionKind::Unknown => "unknown",
        }
    }
}

/// Semantic tags attached to effects. Filters check membership here instead
/// of matching on display names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectTag {
    Burning,
    Conductive,
    Frozen,
    Corrosion,
    ShatterArmor,
    SealCrystal,
    HeatMark,
    Vulnerability,
    Fragility,
    TeamBuff,
    ConsumeOnHit,
}

impl EffectTag {
    pub fn name(self) -> &'static str {
        match self {
            EffectTag::Burning => "burning",
            EffectTag::Conductive => "conductive",
            EffectTag::Frozen => "frozen",
            EffectTag::Corrosion => "corrosion",
            EffectTag::ShatterArmor => "shatter_armor",
            EffectTag::SealCrystal => "seal_crystal",
            EffectTag::HeatMark => "heat_mark",
            EffectTag::Vulnerability => "vulnerability",
            EffectTag::Fragility => "fragility",
            EffectTag::TeamBuff => "team_buff",
            EffectTag::ConsumeOnHit => "consume_on_hit",
        }
    }
}

/// What a hit attaches to the target, fed to the reaction state machine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attachment {
    Magic(Element),
    Physical(PhysAnomaly),
}
