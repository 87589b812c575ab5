//! Tagged stat keys
//!
//! Effects and gear describe their contributions as `(StatKey, f64)` pairs;
//! panels apply the pairs to their matching fields. A key a panel has no
//! field for is simply ignored by that panel.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatKey {
    // Attributes (only meaningful as gear bonuses at setup)
    Strength,
    Agility,
    Intelligence,
    Willpower,

    // Attack composition
    BaseAtk,
    WeaponAtk,
    AtkPct,
    FlatAtk,
    TechPower,
    TechPct,

    // Damage bonuses
    DmgBonus,
    NormalDmgBonus,
    HeavyDmgBonus,
    PlungeDmgBonus,
    ExecutionDmgBonus,
    SkillDmgBonus,
    UltDmgBonus,
    QteDmgBonus,
    StaggerDmgBonus,
    HeatDmgBonus,
    ElectricDmgBonus,
    FrostDmgBonus,
    NatureDmgBonus,
    PhysicalDmgBonus,

    // Crit / penetration / independent multipliers
    CritRate,
    CritDmg,
    ResPen,
    Amplification,
    SpecialBonus,
    HealBonus,

    // Defender side
    Defense,
    Vulnerability,
    PhysVulnerability,
    MagicVulnerability,
    HeatVulnerability,
    ElectricVulnerability,
    FrostVulnerability,
    NatureVulnerability,
    PhysicalVulnerability,
    Fragility,
    HeatFragility,
    ElectricFragility,
    FrostFragility,
    NatureFragility,
    PhysicalFragility,
    DmgReduction,
    DmgReductionExtra,
    Sanctuary,
    HeatRes,
    ElectricRes,
    FrostRes,
    NatureRes,
    PhysicalRes,

    /// Catalog data naming a stat this build does not know; contributes
    /// nothing anywhere.
    #[serde(other)]
    Unknown,
}
