//! The host-facing boundary: `run_simulation` and its request/result types
//!
//! The core never reads disk or network; catalogs and the character registry
//! arrive already loaded. Unknown references are skipped and collected into
//! the result's diagnostics; only structurally invalid input is an error.

use crate::action::{parse_script, parse_timeline, TimelineEntry};
use crate::config::SimConfig;
use crate::engine::{Engine, LogEntry, Simulation, SnapshotFrame};
use crate::entity::{Character, Entity, Target};
use crate::error::SimError;
use crate::gear::{GearCatalog, GearEffect, GearWatcher};
use crate::kits::KitRegistry;
use crate::stats::{AttributeKind, DefenderPanel, StatKey};
use crate::types::Element;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Placeholder name for an unused party slot; silently skipped.
pub const EMPTY_SLOT: &str = "无";

/// Maximum party size.
pub const MAX_PARTY: usize = 4;

/// Enemy configuration. Damage-taken multipliers convert to resistances as
/// `res = 1 - multiplier`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    pub name: String,
    pub defense: f64,
    pub damage_taken_multipliers: BTreeMap<Element, f64>,
    pub hp: f64,
}

impl Default for TargetConfig {
    fn default() -> Self {
        TargetConfig {
            name: "测试机甲".to_string(),
            defense: 100.0,
            damage_taken_multipliers: BTreeMap::new(),
            hp: 1.0e12,
        }
    }
}

/// Field-name-keyed overrides. Values that are not numbers are skipped, one
/// diagnostic per skipped field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomAttrs {
    pub level: Option<u32>,
    pub attrs: BTreeMap<String, serde_json::Value>,
    pub base_stats: BTreeMap<String, serde_json::Value>,
}

/// One party slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterEntry {
    pub name: String,
    #[serde(default)]
    pub script: Option<String>,
    #[serde(default)]
    pub timeline: Option<Vec<TimelineEntry>>,
    #[serde(default)]
    pub molten_stacks: Option<u32>,
    #[serde(default)]
    pub custom_attrs: Option<CustomAttrs>,
    #[serde(default)]
    pub weapon_id: Option<String>,
    /// slot -> equipment id
    #[serde(default)]
    pub equipment_ids: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationRequest {
    pub duration_seconds: f64,
    #[serde(default)]
    pub seed: u64,
    #[serde(default)]
    pub config: Option<SimConfig>,
    #[serde(default)]
    pub target: TargetConfig,
    #[serde(default)]
    pub characters: Vec<CharacterEntry>,
}

/// Per-character slice of the statistics, shaped for the host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterReport {
    pub name: String,
    pub total_damage: i64,
    pub skill_count: BTreeMap<String, u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationResult {
    pub history: Vec<SnapshotFrame>,
    pub logs: Vec<LogEntry>,
    pub total_damage: i64,
    pub character_names: Vec<String>,
    pub statistics: BTreeMap<String, CharacterReport>,
    pub diagnostics: Vec<String>,
    pub report: String,
}

/// Run one simulation to completion.
pub fn run_simulation(
    request: &SimulationRequest,
    registry: &KitRegistry,
    catalog: &GearCatalog,
) -> Result<SimulationResult, SimError> {
    if !request.duration_seconds.is_finite() || request.duration_seconds < 0.0 {
        return Err(SimError::InvalidInput(format!(
            "duration_seconds must be a non-negative number, got {}",
            request.duration_seconds
        )));
    }
    let active_entries: Vec<&CharacterEntry> =
        request.characters.iter().filter(|c| c.name != EMPTY_SLOT).collect();
    if active_entries.len() > MAX_PARTY {
        return Err(SimError::InvalidInput(format!(
            "party holds at most {MAX_PARTY} characters, got {}",
            active_entries.len()
        )));
    }

    let config = request.config.clone().unwrap_or_default();
    let engine = Engine::new(config, request.seed);
    let mut sim = Simulation::new(engine);
    let mut diagnostics = Vec::new();

    let target = build_target(&request.target, &sim.engine.config);
    let target_index = sim.add_entity(Entity::Target(target));

    let mut character_names = Vec::new();
    for entry in active_entries {
        let Some(kit) = registry.create(&entry.name) else {
            diagnostics
                .push(SimError::UnknownReference(format!("character `{}`", entry.name)).to_string());
            continue;
        };
        let mut character = Character::new(kit, target_index);

        if let Some(custom) = &entry.custom_attrs {
            apply_custom_attrs(&mut character, custom, &mut diagnostics);
        }
        if let Some(stacks) = entry.molten_stacks {
            character.kit.set_private_counter(stacks);
        }

        let index = sim.entities.len();
        let mut watchers = Vec::new();
        equip(
            &mut character,
            entry,
            catalog,
            index,
            &mut watchers,
            &mut diagnostics,
        );

        load_rotation(&mut character, entry, &sim.engine.config)?;

        character_names.push(character.name.clone());
        sim.add_entity(Entity::Character(character));
        for watcher in watchers {
            sim.add_watcher(watcher);
        }
    }

    sim.run(request.duration_seconds)?;

    let total_damage = sim.entities[target_index]
        .as_target()
        .map(|t| t.total_damage_taken)
        .unwrap_or(0);
    let statistics = sim
        .engine
        .stats
        .character_stats
        .iter()
        .map(|(name, stats)| {
            (
                name.clone(),
                CharacterReport {
                    name: stats.name.clone(),
                    total_damage: stats.total_damage,
                    skill_count: stats.skill_count.clone(),
                },
            )
        })
        .collect();

    Ok(SimulationResult {
        history: std::mem::take(&mut sim.history),
        logs: std::mem::take(&mut sim.engine.log.entries),
        total_damage,
        character_names,
        statistics,
        diagnostics,
        report: sim.engine.stats.generate_report(),
    })
}

fn build_target(config: &TargetConfig, sim_config: &SimConfig) -> Target {
    let mut panel = DefenderPanel { defense: config.defense, ..Default::default() };
    for (element, multiplier) in &config.damage_taken_multipliers {
        let resistance = 1.0 - multiplier;
        let key = match element {
            Element::Physical => StatKey::PhysicalRes,
            Element::Heat => StatKey::HeatRes,
            Element::Electric => StatKey::ElectricRes,
            Element::Frost => StatKey::FrostRes,
            Element::Nature => StatKey::NatureRes,
        };
        panel.apply_mod(key, resistance);
    }
    Target::new(config.name.clone(), panel, config.hp, sim_config.stagger.threshold)
}

fn apply_custom_attrs(character: &mut Character, custom: &CustomAttrs, diagnostics: &mut Vec<String>) {
    if let Some(level) = custom.level {
        character.base.level = level.max(1);
    }
    for (field, value) in &custom.attrs {
        match value.as_f64() {
            Some(v) if character.attrs.set_by_name(field, v as i64) => {}
            Some(_) => diagnostics.push(format!("unknown attribute `{field}` skipped")),
            None => diagnostics.push(format!("attribute `{field}` is not a number, skipped")),
        }
    }
    for (field, value) in &custom.base_stats {
        match value.as_f64() {
            Some(v) if character.base.set_by_name(field, v) => {}
            Some(_) => diagnostics.push(format!("unknown stat `{field}` skipped")),
            None => diagnostics.push(format!("stat `{field}` is not a number, skipped")),
        }
    }
}

fn attribute_for(key: StatKey) -> Option<AttributeKind> {
    match key {
        StatKey::Strength => Some(AttributeKind::Strength),
        StatKey::Agility => Some(AttributeKind::Agility),
        StatKey::Intelligence => Some(AttributeKind::Intelligence),
        StatKey::Willpower => Some(AttributeKind::Willpower),
        _ => None,
    }
}

fn apply_stat_bonuses(character: &mut Character, bonuses: &BTreeMap<StatKey, f64>) {
    for (key, amount) in bonuses {
        match attribute_for(*key) {
            Some(kind) => character.attrs.add(kind, *amount as i64),
            None => character.base.add_bonus(*key, *amount),
        }
    }
}

fn push_watchers(
    watchers: &mut Vec<GearWatcher>,
    owner_index: usize,
    owner_name: &str,
    gear_name: &str,
    effects: &[GearEffect],
) {
    for effect in effects {
        watchers.push(GearWatcher {
            owner_index,
            owner_name: owner_name.to_string(),
            gear_name: gear_name.to_string(),
            effect: effect.clone(),
        });
    }
}

fn equip(
    character: &mut Character,
    entry: &CharacterEntry,
    catalog: &GearCatalog,
    index: usize,
    watchers: &mut Vec<GearWatcher>,
    diagnostics: &mut Vec<String>,
) {
    let owner = character.name.clone();

    if let Some(weapon_id) = &entry.weapon_id {
        match catalog.weapons.get(weapon_id) {
            Some(weapon) => {
                character.base.weapon_atk += weapon.weapon_atk;
                apply_stat_bonuses(character, &weapon.stat_bonuses);
                push_watchers(watchers, index, &owner, &weapon.name, &weapon.effects);
            }
            None => diagnostics
                .push(SimError::UnknownReference(format!("weapon `{weapon_id}`")).to_string()),
        }
    }

    let mut set_counts: BTreeMap<String, u32> = BTreeMap::new();
    for equipment_id in entry.equipment_ids.values() {
        match catalog.equipment.get(equipment_id) {
            Some(piece) => {
                apply_stat_bonuses(character, &piece.stat_bonuses);
                push_watchers(watchers, index, &owner, &piece.name, &piece.effects);
                if let Some(set_id) = &piece.set_id {
                    *set_counts.entry(set_id.clone()).or_insert(0) += 1;
                }
            }
            None => diagnostics
                .push(SimError::UnknownReference(format!("equipment `{equipment_id}`")).to_string()),
        }
    }

    for (set, bonus) in catalog.active_set_bonuses(&set_counts) {
        apply_stat_bonuses(character, &bonus.stat_bonuses);
        push_watchers(watchers, index, &owner, &set.name, &bonus.effects);
    }
}

fn load_rotation(
    character: &mut Character,
    entry: &CharacterEntry,
    config: &SimConfig,
) -> Result<(), SimError> {
    if let Some(timeline) = &entry.timeline {
        character.set_timeline(parse_timeline(config, timeline)?);
    } else if let Some(script) = &entry.script {
        character.set_script(parse_script(script)?);
    } else if let Some(script) = character.kit.default_script() {
        character.set_script(parse_script(script)?);
    }
    Ok(())
}
