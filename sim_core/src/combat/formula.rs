//! The fourteen-zone damage formula
//!
//! The multiplication order is a contract: tests pin each zone against
//! canonical vectors, and no two zones are interchangeable for all inputs
//! because of the internal clamps (crit, defense, resistance) and the final
//! integer truncation.

use crate::config::SimConfig;
use crate::stats::{AttackerPanel, DefenderPanel};
use crate::types::{Element, MoveType};

/// Compute final damage for one hit.
///
/// `total_mv` is the skill multiplier plus any reaction extra, in percent.
/// The crit zone uses the expected-value multiplier; the separate crit roll
/// in the pipeline only decides the `is_crit` flag.
pub fn calculate(
    config: &SimConfig,
    attacker: &AttackerPanel,
    defender: &DefenderPanel,
    total_mv: f64,
    element: Element,
    move_type: MoveType,
) -> i64 {
    // 1. Base
    let base = attacker.final_atk * total_mv / 100.0;

    // 2. Crit
    let crit_rate = attacker.crit_rate.clamp(0.0, 1.0);
    let crit_mult = 1.0 + crit_rate * attacker.crit_dmg;

    // 3. Damage bonus (additive within the zone)
    let stagger_bonus = if defender.is_staggered { attacker.stagger_dmg_bonus } else { 0.0 };
    let bonus_mult = 1.0
        + attacker.dmg_bonus
        + attacker.move_type_bonus(move_type)
        + attacker.element_bonus(element)
        + stagger_bonus;

    // 4. Damage reduction
    let reduction_mult = 1.0 - defender.dmg_reduction;

    // 5. Vulnerability (additive within the zone)
    let class_vuln = if element.is_magic() {
        defender.magic_vulnerability
    } else {
        defender.phys_vulnerability
    };
    let vuln_mult =
        1.0 + defender.vulnerability + class_vuln + defender.element_vulnerability(element);

    // 6. Amplification
    let amp_mult = 1.0 + attacker.amplification;

    // 7. Sanctuary
    let sanctuary_mult = 1.0 - defender.sanctuary;

    // 8. Fragility (additive within the zone)
    let fragility_mult = 1.0 + defender.fragility + defender.element_fragility(element);

    // 9. Defense
    let defense = defender.defense.max(0.0);
    let defense_mult = config.defense_constant / (config.defense_constant + defense);

    // 10. Stagger vulnerability
    let stagger_mult = if defender.is_staggered { config.stagger.vuln_multiplier } else { 1.0 };

    // 11. Extra reduction
    let extra_reduction_mult = 1.0 - defender.dmg_reduction_extra;

    // 12. Resistance
    let final_res = (defender.resistance(element) - attacker.res_pen).max(0.0);
    let res_mult = 1.0 - final_res;

    // 13. Non-main penalty (stored as a multiplier)
    let non_main_mult = defender.non_main_penalty;

    // 14. Special bonus
    let special_mult = 1.0 + attacker.special_bonus;

    let product = base
        * crit_mult
        * bonus_mult
        * reduction_mult
        * vuln_mult
        * amp_mult
        * sanctuary_mult
        * fragility_mult
        * defense_mult
        * stagger_mult
        * extra_reduction_mult
        * res_mult
        * non_main_mult
        * special_mult;

    product.max(0.0) as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn neutral_attacker(final_atk: f64) -> AttackerPanel {
        AttackerPanel {
            final_atk,
            crit_rate: 0.0,
            crit_dmg: 0.5,
            ..Default::default()
        }
    }

    #[test]
    fn test_single_hit_baseline() {
        // 1000 atk, mv 200, defense 100 => 1000 * 2.00 * (100/200) = 1000
        let config = SimConfig::default();
        let attacker = neutral_attacker(1000.0);
        let defender = DefenderPanel { defense: 100.0, ..Default::default() };
        let dmg = calculate(&config, &attacker, &defender, 200.0, Element::Physical, MoveType::Normal);
        assert_eq!(dmg, 1000);
    }

    #[test]
    fn test_crit_zone_expected_value() {
        let config = SimConfig::default();
        let mut attacker = neutral_attacker(1000.0);
        attacker.crit_rate = 0.5;
        attacker.crit_dmg = 0.5;
        let defender = DefenderPanel::default();
        // 1000 * 1.25
        let dmg = calculate(&config, &attacker, &defender, 100.0, Element::Physical, MoveType::Other);
        assert_eq!(dmg, 1250);
    }

    #[test]
    fn test_crit_rate_clamped() {
        let config = SimConfig::default();
        let mut attacker = neutral_attacker(1000.0);
        attacker.crit_rate = 3.0;
        attacker.crit_dmg = 1.0;
        let defender = DefenderPanel::default();
        // Clamp to 1.0 => x2, not x4
        let dmg = calculate(&config, &attacker, &defender, 100.0, Element::Physical, MoveType::Other);
        assert_eq!(dmg, 2000);
    }

    #[test]
    fn test_zero_defense_is_identity() {
        let config = SimConfig::default();
        let attacker = neutral_attacker(1000.0);
        let defender = DefenderPanel::default();
        let dmg = calculate(&config, &attacker, &defender, 100.0, Element::Heat, MoveType::Other);
        assert_eq!(dmg, 1000);
    }

    #[test]
    fn test_negative_defense_clamped() {
        let config = SimConfig::default();
        let attacker = neutral_attacker(1000.0);
        let defender = DefenderPanel { defense: -50.0, ..Default::default() };
        let dmg = calculate(&config, &attacker, &defender, 100.0, Element::Heat, MoveType::Other);
        assert_eq!(dmg, 1000);
    }

    #[test]
    fn test_immunity_at_full_resistance() {
        let config = SimConfig::default();
        let attacker = neutral_attacker(1000.0);
        let defender = DefenderPanel { heat_res: 1.2, ..Default::default() };
        let dmg = calculate(&config, &attacker, &defender, 100.0, Element::Heat, MoveType::Other);
        assert_eq!(dmg, 0);
    }

    #[test]
    fn test_resistance_penetration() {
        let config = SimConfig::default();
        let mut attacker = neutral_attacker(1000.0);
        attacker.res_pen = 0.10;
        let defender = DefenderPanel { heat_res: 0.30, ..Default::default() };
        // 1 - (0.30 - 0.10) = 0.8
        let dmg = calculate(&config, &attacker, &defender, 100.0, Element::Heat, MoveType::Other);
        assert_eq!(dmg, 800);
    }

    #[test]
    fn test_overpenetration_does_not_amplify() {
        let config = SimConfig::default();
        let mut attacker = neutral_attacker(1000.0);
        attacker.res_pen = 0.50;
        let defender = DefenderPanel { heat_res: 0.10, ..Default::default() };
        let dmg = calculate(&config, &attacker, &defender, 100.0, Element::Heat, MoveType::Other);
        assert_eq!(dmg, 1000);
    }

    #[test]
    fn test_stagger_contributes_two_zones() {
        let config = SimConfig::default();
        let attacker = neutral_attacker(1000.0);
        let mut defender = DefenderPanel::default();
        defender.is_staggered = true;
        defender.vulnerability += config.stagger.vuln_multiplier - 1.0;
        // Zone 5: 1.3, zone 10: 1.3 => 1000 * 1.69
        let dmg = calculate(&config, &attacker, &defender, 100.0, Element::Physical, MoveType::Other);
        assert_eq!(dmg, 1690);
    }

    #[test]
    fn test_vulnerability_class_split() {
        let config = SimConfig::default();
        let attacker = neutral_attacker(1000.0);
        let defender = DefenderPanel { magic_vulnerability: 0.12, ..Default::default() };
        let magic = calculate(&config, &attacker, &defender, 100.0, Element::Electric, MoveType::Other);
        let phys = calculate(&config, &attacker, &defender, 100.0, Element::Physical, MoveType::Other);
        assert_eq!(magic, 1120);
        assert_eq!(phys, 1000);
    }

    #[test]
    fn test_move_type_selects_bonus() {
        let config = SimConfig::default();
        let mut attacker = neutral_attacker(1000.0);
        attacker.skill_dmg_bonus = 0.30;
        let defender = DefenderPanel::default();
        let skill = calculate(&config, &attacker, &defender, 100.0, Element::Physical, MoveType::Skill);
        let normal = calculate(&config, &attacker, &defender, 100.0, Element::Physical, MoveType::Normal);
        assert_eq!(skill, 1300);
        assert_eq!(normal, 1000);
    }

    #[test]
    fn test_non_main_penalty_multiplies_directly() {
        let config = SimConfig::default();
        let attacker = neutral_attacker(1000.0);
        let defender = DefenderPanel { non_main_penalty: 0.65, ..Default::default() };
        let dmg = calculate(&config, &attacker, &defender, 100.0, Element::Physical, MoveType::Other);
        assert_eq!(dmg, 650);
    }

    #[test]
    fn test_never_negative() {
        let config = SimConfig::default();
        let attacker = neutral_attacker(1000.0);
        let defender = DefenderPanel { dmg_reduction: 2.0, ..Default::default() };
        let dmg = calculate(&config, &attacker, &defender, 100.0, Element::Physical, MoveType::Other);
        assert_eq!(dmg, 0);
    }

    #[test]
    fn test_zone_ordering_matters_under_truncation() {
        // Swapping the defense zone against the resistance clamp changes the
        // result on this vector: with res 0.5 and pen 0.6 the clamp floors at
        // zero penalty, while a reordering that subtracted pen after the
        // defense division would not. Exercised via the clamp tests above;
        // here we pin the full product on a mixed vector.
        let config = SimConfig::default();
        let attacker = AttackerPanel {
            final_atk: 1234.0,
            crit_rate: 0.25,
            crit_dmg: 0.8,
            dmg_bonus: 0.15,
            amplification: 0.10,
            special_bonus: 0.05,
            res_pen: 0.05,
            heat_dmg_bonus: 0.20,
            ..Default::default()
        };
        let defender = DefenderPanel {
            defense: 350.0,
            heat_res: 0.25,
            vulnerability: 0.08,
            magic_vulnerability: 0.12,
            fragility: 0.10,
            heat_fragility: 0.05,
            dmg_reduction: 0.10,
            dmg_reduction_extra: 0.05,
            sanctuary: 0.15,
            ..Default::default()
        };
        let expected = {
            let base = 1234.0 * 180.0 / 100.0;
            let product = base
                * (1.0 + 0.25 * 0.8)
                * (1.0 + 0.15 + 0.20)
                * 0.9
                * (1.0 + 0.08 + 0.12)
                * 1.10
                * 0.85
                * (1.0 + 0.10 + 0.05)
                * (100.0 / 450.0)
                * 1.0
                * 0.95
                * (1.0 - 0.20)
                * 1.0
                * 1.05;
            product as i64
        };
        let dmg = calculate(&config, &attacker, &defender, 180.0, Element::Heat, MoveType::Other);
        assert_eq!(dmg, expected);
    }
}
