//! Defender panel: everything the damage formula reads from the target side

use super::keys::StatKey;
use crate::types::Element;
use serde::{Deserialize, Serialize};

/// Snapshot of all defender-side numbers for a single hit.
///
/// Built per hit by [`crate::entity::Target::defense_panel`]: base target
/// config is copied in (resistances, defense), the staggered flag folds
/// `vuln_multiplier - 1` into general vulnerability, then effect
/// contributions apply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefenderPanel {
    pub defense: f64,
    pub is_staggered: bool,
    /// Multiplicative zone-13 factor, stored as-is (identity 1.0)
    pub non_main_penalty: f64,

    pub physical_res: f64,
    pub heat_res: f64,
    pub electric_res: f64,
    pub frost_res: f64,
    pub nature_res: f64,

    pub vulnerability: f64,
    pub phys_vulnerability: f64,
    pub magic_vulnerability: f64,
    pub heat_vulnerability: f64,
    pub electric_vulnerability: f64,
    pub frost_vulnerability: f64,
    pub nature_vulnerability: f64,
    pub physical_vulnerability: f64,

    pub fragility: f64,
    pub heat_fragility: f64,
    pub electric_fragility: f64,
    pub frost_fragility: f64,
    pub nature_fragility: f64,
    pub physical_fragility: f64,

    pub dmg_reduction: f64,
    pub dmg_reduction_extra: f64,
    pub sanctuary: f64,
}

impl Default for DefenderPanel {
    fn default() -> Self {
        DefenderPanel {
            defense: 0.0,
            is_staggered: false,
            non_main_penalty: 1.0,
            physical_res: 0.0,
            heat_res: 0.0,
            electric_res: 0.0,
            frost_res: 0.0,
            nature_res: 0.0,
            vulnerability: 0.0,
            phys_vulnerability: 0.0,
            magic_vulnerability: 0.0,
            heat_vulnerability: 0.0,
            electric_vulnerability: 0.0,
            frost_vulnerability: 0.0,
            nature_vulnerability: 0.0,
            physical_vulnerability: 0.0,
            fragility: 0.0,
            heat_fragility: 0.0,
            electric_fragility: 0.0,
            frost_fragility: 0.0,
            nature_fragility: 0.0,
            physical_fragility: 0.0,
            dmg_reduction: 0.0,
            dmg_reduction_extra: 0.0,
            sanctuary: 0.0,
        }
    }
}

impl DefenderPanel {
    /// Apply one additive contribution. Attacker-side keys are ignored.
    pub fn apply_mod(&mut self, key: StatKey, amount: f64) {
        match key {
            StatKey::Defense => self.defense += amount,
            StatKey::PhysicalRes => self.physical_res += amount,
            StatKey::HeatRes => self.heat_res += amount,
            StatKey::ElectricRes => self.electric_res += amount,
            StatKey::FrostRes => self.frost_res += amount,
            StatKey::NatureRes => self.nature_res += amount,
            StatKey::Vulnerability => self.vulnerability += amount,
            StatKey::PhysVulnerability => self.phys_vulnerability += amount,
            StatKey::MagicVulnerability => self.magic_vulnerability += amount,
            StatKey::HeatVulnerability => self.heat_vulnerability += amount,
            StatKey::ElectricVulnerability => self.electric_vulnerability += amount,
            StatKey::FrostVulnerability => self.frost_vulnerability += amount,
            StatKey::NatureVulnerability => self.nature_vulnerability += amount,
            StatKey::PhysicalVulnerability => self.physical_vulnerability += amount,
            StatKey::Fragility => self.fragility += amount,
            StatKey::HeatFragility => self.heat_fragility += amount,
            StatKey::ElectricFragility => self.electric_fragility += amount,
            StatKey::FrostFragility => self.frost_fragility += amount,
            StatKey::NatureFragility => self.nature_fragility += amount,
            StatKey::PhysicalFragility => self.physical_fragility += amount,
            StatKey::DmgReduction => self.dmg_reduction += amount,
            StatKey::DmgReductionExtra => self.dmg_reduction_extra += amount,
            StatKey::Sanctuary => self.sanctuary += amount,
            _ => {}
        }
    }

    /// Shred every elemental resistance by `amount` (corrosion).
    pub fn shred_all_res(&mut self, amount: f64) {
        self.physical_res -= amount;
        self.heat_res -= amount;
        self.electric_res -= amount;
        self.frost_res -= amount;
        self.nature_res -= amount;
    }

    pub fn resistance(&self, element: Element) -> f64 {
        match element {
            Element::Physical => self.physical_res,
            Element::Heat => self.heat_res,
            Element::Electric => self.electric_res,
            Element::Frost => self.frost_res,
            Element::Nature => self.nature_res,
        }
    }

    pub fn element_vulnerability(&self, element: Element) -> f64 {
        match element {
            Element::Physical => self.physical_vulnerability,
            Element::Heat => self.heat_vulnerability,
            Element::Electric => self.electric_vulnerability,
            Element::Frost => self.frost_vulnerability,
            Element::Nature => self.nature_vulnerability,
        }
    }

    pub fn element_fragility(&self, element: Element) -> f64 {
        match element {
            Element::Physical => self.physical_fragility,
            Element::Heat => self.heat_fragility,
            Element::Electric => self.electric_fragility,
            Element::Frost => self.frost_fragility,
            Element::Nature => self.nature_fragility,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shred_all_res() {
        let mut panel = DefenderPanel { heat_res: 0.10, ..Default::default() };
        panel.shred_all_res(0.04);
        assert!((panel.heat_res - 0.06).abs() < 1e-9);
        assert!((panel.nature_res + 0.04).abs() < 1e-9);
    }

    #[test]
    fn test_attacker_keys_ignored() {
        let mut panel = DefenderPanel::default();
        panel.apply_mod(StatKey::AtkPct, 0.5);
        panel.apply_mod(StatKey::CritRate, 0.5);
        assert_eq!(panel, Default::default());
    }
}
