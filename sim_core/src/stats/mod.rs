//! Stat model: attributes, base stats, and the two combat panels

mod attacker;
mod defender;
mod keys;

pub use attacker::AttackerPanel;
pub use defender::DefenderPanel;
pub use keys::StatKey;

use serde::{Deserialize, Serialize};

/// The four primary attributes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Attributes {
    #[serde(default)]
    pub strength: i64,
    #[serde(default)]
    pub agility: i64,
    #[serde(default)]
    pub intelligence: i64,
    #[serde(default)]
    pub willpower: i64,
}

/// Identifies one of the four attributes (main/sub designation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeKind {
    Strength,
    Agility,
    Intelligence,
    Willpower,
}

impl Attributes {
    pub fn new(strength: i64, agility: i64, intelligence: i64, willpower: i64) -> Self {
        Attributes { strength, agility, intelligence, willpower }
    }

    pub fn get(&self, kind: AttributeKind) -> i64 {
        match kind {
            AttributeKind::Strength => self.strength,
            AttributeKind::Agility => self.agility,
            AttributeKind::Intelligence => self.intelligence,
            AttributeKind::Willpower => self.willpower,
        }
    }

    pub fn add(&mut self, kind: AttributeKind, amount: i64) {
        match kind {
            AttributeKind::Strength => self.strength += amount,
            AttributeKind::Agility => self.agility += amount,
            AttributeKind::Intelligence => self.intelligence += amount,
            AttributeKind::Willpower => self.willpower += amount,
        }
    }

    /// Override one attribute by field name. Returns false for unknown names.
    pub fn set_by_name(&mut self, name: &str, value: i64) -> bool {
        match name {
            "strength" => self.strength = value,
            "agility" => self.agility = value,
            "intelligence" => self.intelligence = value,
            "willpower" => self.willpower = value,
            _ => return false,
        }
        true
    }

    /// Attribute conversion multiplier, applied only to attack:
    /// `1 + 0.005 * main + 0.002 * sub`.
    pub fn attack_multiplier(&self, main: AttributeKind, sub: AttributeKind) -> f64 {
        1.0 + self.get(main) as f64 * 0.005 + self.get(sub) as f64 * 0.002
    }

    /// Physical resistance derived from agility: `1 - 1 / (0.001 * agi + 1)`.
    pub fn physical_resistance(&self) -> f64 {
        if self.agility == 0 {
            return 0.0;
        }
        1.0 - 1.0 / (0.001 * self.agility as f64 + 1.0)
    }

    /// Magic resistance derived from intelligence: `1 - 1 / (0.001 * int + 1)`.
    pub fn magic_resistance(&self) -> f64 {
        if self.intelligence == 0 {
            return 0.0;
        }
        1.0 - 1.0 / (0.001 * self.intelligence as f64 + 1.0)
    }

    /// Healing-received bonus derived from willpower: `wil / 1000`.
    pub fn healing_received(&self) -> f64 {
        self.willpower as f64 / 1000.0
    }
}

/// Static combat stats of a character, before effects.
///
/// Zero is the neutral default for everything except crit (5% / 50%) and the
/// non-main penalty multiplier (1.0).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseStats {
    pub level: u32,
    pub base_hp: f64,
    pub base_def: f64,
    pub base_atk: f64,
    pub weapon_atk: f64,
    pub atk_pct: f64,
    pub flat_atk: f64,
    pub technique_power: f64,
    pub tech_pct: f64,

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

    pub crit_rate: f64,
    pub crit_dmg: f64,
    pub res_pen: f64,
    pub amplification: f64,
    pub special_bonus: f64,
    pub heal_bonus: f64,
    pub non_main_penalty: f64,
}

impl Default for BaseStats {
    fn default() -> Self {
        BaseStats {
            level: 80,
            base_hp: 0.0,
            base_def: 0.0,
            base_atk: 0.0,
            weapon_atk: 0.0,
            atk_pct: 0.0,
            flat_atk: 0.0,
            technique_power: 0.0,
            tech_pct: 0.0,
            dmg_bonus: 0.0,
            normal_dmg_bonus: 0.0,
            heavy_dmg_bonus: 0.0,
            plunge_dmg_bonus: 0.0,
            execution_dmg_bonus: 0.0,
            skill_dmg_bonus: 0.0,
            ult_dmg_bonus: 0.0,
            qte_dmg_bonus: 0.0,
            stagger_dmg_bonus: 0.0,
            heat_dmg_bonus: 0.0,
            electric_dmg_bonus: 0.0,
            frost_dmg_bonus: 0.0,
            nature_dmg_bonus: 0.0,
            physical_dmg_bonus: 0.0,
            crit_rate: 0.05,
            crit_dmg: 0.50,
            res_pen: 0.0,
            amplification: 0.0,
            special_bonus: 0.0,
            heal_bonus: 0.0,
            non_main_penalty: 1.0,
        }
    }
}

impl BaseStats {
    /// Max HP derived from strength: `base_hp + str * 5`.
    pub fn max_hp(&self, attrs: &Attributes) -> f64 {
        self.base_hp + attrs.strength as f64 * 5.0
    }

    /// Add a flat bonus to the field a stat key names (gear stat bonuses).
    /// Keys with no base-stat counterpart are ignored.
    pub fn add_bonus(&mut self, key: StatKey, amount: f64) {
        match key {
            StatKey::BaseAtk => self.base_atk += amount,
            StatKey::WeaponAtk => self.weapon_atk += amount,
            StatKey::AtkPct => self.atk_pct += amount,
            StatKey::FlatAtk => self.flat_atk += amount,
            StatKey::TechPower => self.technique_power += amount,
            StatKey::TechPct => self.tech_pct += amount,
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
            StatKey::CritRate => self.crit_rate += amount,
            StatKey::CritDmg => self.crit_dmg += amount,
            StatKey::ResPen => self.res_pen += amount,
            StatKey::Amplification => self.amplification += amount,
            StatKey::SpecialBonus => self.special_bonus += amount,
            StatKey::HealBonus => self.heal_bonus += amount,
            _ => {}
        }
    }

    /// Override one field by exact name. Returns false for unknown names,
    /// leaving the stats untouched.
    pub fn set_by_name(&mut self, name: &str, value: f64) -> bool {
        match name {
            "level" => self.level = value.max(1.0) as u32,
            "base_hp" => self.base_hp = value,
            "base_def" => self.base_def = value,
            "base_atk" => self.base_atk = value,
            "weapon_atk" => self.weapon_atk = value,
            "atk_pct" => self.atk_pct = value,
            "flat_atk" => self.flat_atk = value,
            "technique_power" => self.technique_power = value,
            "tech_pct" => self.tech_pct = value,
            "dmg_bonus" => self.dmg_bonus = value,
            "normal_dmg_bonus" => self.normal_dmg_bonus = value,
            "heavy_dmg_bonus" => self.heavy_dmg_bonus = value,
            "plunge_dmg_bonus" => self.plunge_dmg_bonus = value,
            "execution_dmg_bonus" => self.execution_dmg_bonus = value,
            "skill_dmg_bonus" => self.skill_dmg_bonus = value,
            "ult_dmg_bonus" => self.ult_dmg_bonus = value,
            "qte_dmg_bonus" => self.qte_dmg_bonus = value,
            "stagger_dmg_bonus" => self.stagger_dmg_bonus = value,
            "heat_dmg_bonus" => self.heat_dmg_bonus = value,
            "electric_dmg_bonus" => self.electric_dmg_bonus = value,
            "frost_dmg_bonus" => self.frost_dmg_bonus = value,
            "nature_dmg_bonus" => self.nature_dmg_bonus = value,
            "physical_dmg_bonus" => self.physical_dmg_bonus = value,
            "crit_rate" => self.crit_rate = value,
            "crit_dmg" => self.crit_dmg = value,
            "res_pen" => self.res_pen = value,
            "amplification" => self.amplification = value,
            "special_bonus" => self.special_bonus = value,
            "heal_bonus" => self.heal_bonus = value,
            "non_main_penalty" => self.non_main_penalty = value,
            _ => return false,
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attack_multiplier() {
        let attrs = Attributes::new(100, 0, 200, 0);
        let mult = attrs.attack_multiplier(AttributeKind::Intelligence, AttributeKind::Strength);
        // 1 + 200*0.005 + 100*0.002 = 2.2
        assert!((mult - 2.2).abs() < 1e-9);
    }

    #[test]
    fn test_derived_resistances() {
        let attrs = Attributes::new(0, 1000, 1000, 0);
        // 1 - 1/(0.001*1000 + 1) = 0.5
        assert!((attrs.physical_resistance() - 0.5).abs() < 1e-9);
        assert!((attrs.magic_resistance() - 0.5).abs() < 1e-9);
        assert!((Attributes::default().physical_resistance()).abs() < f64::EPSILON);
    }

    #[test]
    fn test_max_hp_and_healing() {
        let attrs = Attributes::new(121, 0, 0, 89);
        let stats = BaseStats { base_hp: 5495.0, ..Default::default() };
        assert!((stats.max_hp(&attrs) - (5495.0 + 605.0)).abs() < 1e-9);
        assert!((attrs.healing_received() - 0.089).abs() < 1e-9);
    }

    #[test]
    fn test_set_by_name_unknown_field() {
        let mut stats = BaseStats::default();
        assert!(stats.set_by_name("crit_rate", 0.5));
        assert!(!stats.set_by_name("no_such_stat", 1.0));
        assert!((stats.crit_rate - 0.5).abs() < f64::EPSILON);
    }
}
