//! Attacker panel: everything the damage formula reads from the attacking side

use super::keys::StatKey;
use crate::types::{Element, MoveType};
use serde::{Deserialize, Serialize};

/// Snapshot of all attacker-side numbers for a single hit.
///
/// Built fresh per hit (or fetched from the version-keyed cache) by
/// [`crate::entity::Character::current_panel`]: base stats are copied in, the
/// kit hook and effect contributions mutate the record, then
/// [`AttackerPanel::finalize`] fixes `final_atk` and the effective technique
/// power.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttackerPanel {
    pub level: u32,
    pub technique_power: f64,
    pub tech_pct: f64,

    pub base_atk: f64,
    pub weapon_atk: f64,
    pub atk_pct: f64,
    pub flat_atk: f64,
    pub final_atk: f64,

    pub crit_rate: f64,
    pub crit_dmg: f64,
    pub res_pen: f64,
    pub amplification: f64,
    pub special_bonus: f64,
    pub heal_bonus: f64,
    pub non_main_penalty: f64,

    pub dmg_bonus: f64,
    pub normal_dmg_bonus: f64,
    pub heavy_dmg_bonus: f64,
    pub plunge_dmg_bonus: f64,
    pub execution_dmg_bonus: f64,
    pub skill_dmg_bonus: f64,
    pub ult_dmg_bonus: f64,
    pub qte_dmg_bonus: f64,
    pub stagger_dmg_bonus: f64,

    pub heat_dmg_bonus: f64,
    pub electric_dmg_bonus: f64,
    pub frost_dmg_bonus: f64,
    pub nature_dmg_bonus: f64,
    pub physical_dmg_bonus: f64,
}

impl AttackerPanel {
    /// Apply one additive contribution. Defender-side keys are ignored.
    pub fn apply_mod(&mut self, key: StatKey, amount: f64) {
        match key {
            StatKey::TechPower => self.technique_power += amount,
            StatKey::TechPct => self.tech_pct += amount,
            StatKey::BaseAtk => self.base_atk += amount,
            StatKey::WeaponAtk => self.weapon_atk += amount,
            StatKey::AtkPct => self.atk_pct += amount,
            StatKey::FlatAtk => self.flat_atk += amount,
            StatKey::CritRate => self.crit_rate += amount,
            StatKey::CritDmg => self.crit_dmg += amount,
            StatKey::ResPen => self.res_pen += amount,
            StatKey::Amplification => self.amplification += amount,
            StatKey::SpecialBonus => self.special_bonus += amount,
            StatKey::HealBonus => self.heal_bonus += amount,
            StatKey::DmgBonus => self.dmg_bonus += amount,
            StatKey::NormalDmgBonus => self.normal_dmg_bonus += amount,
            StatKey::HeavyDmgBonus => self.heavy_dmg_bonus += amount,
            StatKey::PlungeDmgBonus => self.plunge_dmg_bonus += amount,
            StatKey::ExecutionDmgBonus => self.execution_dmg_bonus += amount,
            StatKey::SkillDmgBonus => self.skill_dmg_bonus += amount,
            StatKey::UltDmgBonus => self.ult_dmg_bonus += amount,
            StatKey::QteDmgBonus => self.qte_dmg_bonus += amount,
            StatKey::StaggerDmgBonus => self.stagger_dmg_bonus += amount,
            StatKey::HeatDmgBonus => self.heat_dmg_bonus += amount,
            StatKey::ElectricDmgBonus => self.electric_dmg_bonus += amount,
            StatKey::FrostDmgBonus => self.frost_dmg_bonus += amount,
            StatKey::NatureDmgBonus => self.nature_dmg_bonus += amount,
            StatKey::PhysicalDmgBonus => self.physical_dmg_bonus += amount,
            _ => {}
        }
    }

    /// Fix the derived values after all contributions have been applied.
    ///
    /// `final_atk = (base + weapon + flat) * (1 + atk_pct) * attr_mult`;
    /// technique power picks up its percentage modifier.
    pub fn finalize(&mut self, attr_multiplier: f64) {
        self.final_atk =
            (self.base_atk + self.weapon_atk + self.flat_atk) * (1.0 + self.atk_pct) * attr_multiplier;
        self.technique_power *= 1.0 + self.tech_pct;
    }

    /// Damage bonus matching a move type. Heavy hits also enjoy the normal
    /// attack bonus.
    pub fn move_type_bonus(&self, move_type: MoveType) -> f64 {
        match move_type {
            MoveType::Normal => self.normal_dmg_bonus,
            MoveType::Heavy => self.normal_dmg_bonus + self.heavy_dmg_bonus,
            MoveType::Plunge => self.plunge_dmg_bonus,
            MoveType::Execution => self.execution_dmg_bonus,
            MoveType::Skill => self.skill_dmg_bonus,
            MoveType::Ultimate => self.ult_dmg_bonus,
            MoveType::Qte => self.qte_dmg_bonus,
            MoveType::Other => 0.0,
        }
    }

    /// Damage bonus matching the hit element.
    pub fn element_bonus(&self, element: Element) -> f64 {
        match element {
            Element::Heat => self.heat_dmg_bonus,
            Element::Electric => self.electric_dmg_bonus,
            Element::Frost => self.frost_dmg_bonus,
            Element::Nature => self.nature_dmg_bonus,
            Element::Physical => self.physical_dmg_bonus,
        }
    }
}
