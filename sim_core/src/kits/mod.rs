//! Character kits: data-driven actions plus small state hooks per character
//!
//! A kit is the per-character collaborator behind the registry: it owns the
//! character's private gauges (molten stacks, empowered windows), builds
//! [`Action`] values for the command parser, and interprets [`KitCue`] ops
//! when an action needs state-dependent follow-ups. Kits never touch the
//! engine; everything they want done comes back as [`ActionOp`] data.

mod admin;
mod erdila;
mod guard;
mod levatine;

pub use admin::Admin;
pub use erdila::Erdila;
pub use guard::Guard;
pub use levatine::Levatine;

use crate::action::{Action, ActionOp, KitCue};
use crate::config::SimConfig;
use crate::event::Event;
use crate::stats::{AttackerPanel, Attributes, AttributeKind, BaseStats};
use crate::types::{Element, Tick};
use std::collections::BTreeMap;

/// Static identity of a character: attributes, base stats, and the main/sub
/// attribute designation feeding the attack multiplier.
#[derive(Debug, Clone)]
pub struct Loadout {
    pub attrs: Attributes,
    pub base: BaseStats,
    pub main_attr: AttributeKind,
    pub sub_attr: AttributeKind,
}

/// Read-only view of the target, for cue handlers that branch on its state.
#[derive(Debug, Clone, Copy, Default)]
pub struct TargetView {
    pub has_frozen: bool,
    pub has_corrosion: bool,
    pub has_seal: bool,
    pub has_heat_mark: bool,
    pub break_stacks: u32,
    pub attachment: Option<(Element, u32)>,
    pub is_staggered: bool,
}

/// Context handed to cue handlers.
pub struct KitCtx<'a> {
    pub config: &'a SimConfig,
    pub tick: Tick,
    pub panel: &'a AttackerPanel,
    pub target: TargetView,
    pub party_sp: f64,
}

/// Behavior and private state of one playable character.
pub trait Kit {
    /// Registry display name (the boundary identifier).
    fn display_name(&self) -> &'static str;

    /// Attributes, base stats, main/sub designation.
    fn loadout(&self) -> Loadout;

    /// Fallback rotation when the request carries neither script nor timeline.
    fn default_script(&self) -> Option<&'static str> {
        None
    }

    /// Build the `seq`-th hit of the normal chain (zero-based, clamped by
    /// the kit).
    fn normal_attack(&mut self, config: &SimConfig, seq: usize) -> Option<Action>;

    fn skill(&mut self, _config: &SimConfig) -> Option<Action> {
        None
    }

    fn ult(&mut self, _config: &SimConfig) -> Option<Action> {
        None
    }

    fn qte(&mut self, _config: &SimConfig) -> Option<Action> {
        None
    }

    /// Mutate the panel before effects apply (passives keyed on private state).
    fn modify_panel(&self, _panel: &mut AttackerPanel) {}

    /// Per-tick private-state upkeep; returned ops are applied immediately.
    fn on_tick(&mut self, _tick: Tick) -> Vec<ActionOp> {
        Vec::new()
    }

    /// Watch a drained event (QTE readiness, on-reaction passives).
    /// `self_name` is the owning character's name for source filtering.
    fn observe(&mut self, _event: &Event, _self_name: &str) -> Vec<ActionOp> {
        Vec::new()
    }

    /// Resolve a cue fired from one of this kit's own actions.
    fn on_cue(&mut self, _cue: KitCue, _ctx: &KitCtx) -> Vec<ActionOp> {
        Vec::new()
    }

    /// Seed the kit's private counter from the request (`molten_stacks`).
    fn set_private_counter(&mut self, _value: u32) {}

    /// One-line private-state readout for snapshots.
    fn gauge(&self) -> Option<String> {
        None
    }
}

type KitFactory = fn() -> Box<dyn Kit>;

/// Display name -> constructor table, built by the host at startup.
#[derive(Default)]
pub struct KitRegistry {
    factories: BTreeMap<String, KitFactory>,
}

impl KitRegistry {
    pub fn new() -> Self {
        KitRegistry::default()
    }

    /// Registry preloaded with the built-in roster.
    pub fn builtin() -> Self {
        let mut registry = KitRegistry::new();
        registry.register("莱瓦汀", || Box::new(Levatine::new()));
        registry.register("骏卫", || Box::new(Guard::new()));
        registry.register("艾尔黛拉", || Box::new(Erdila::new()));
        registry.register("管理员", || Box::new(Admin::new()));
        registry
    }

    pub fn register(&mut self, name: impl Into<String>, factory: KitFactory) {
        self.factories.insert(name.into(), factory);
    }

    pub fn create(&self, name: &str) -> Option<Box<dyn Kit>> {
        self.factories.get(name).map(|f| f())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }
}

impl std::fmt::Debug for KitRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KitRegistry")
            .field("names", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}
