//! Engine context and the fixed-timestep scheduler

mod party;
mod scheduler;
mod snapshot;

pub use party::PartyState;
pub use scheduler::Simulation;
pub use snapshot::{ActionFrame, EffectFrame, EntityFrame, SnapshotFrame};

use crate::config::SimConfig;
use crate::event::EventBus;
use crate::statistics::CombatStatistics;
use crate::types::Tick;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

/// Battle-log entry kinds surfaced to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogKind {
    Info,
    Action,
    Damage,
}

/// One structured battle-log line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub time: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: LogKind,
}

/// The output-facing log: timestamped lines of the three kinds the host
/// renders. Everything else goes to `tracing` only.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BattleLog {
    pub entries: Vec<LogEntry>,
}

impl BattleLog {
    fn push(&mut self, time: String, message: String, kind: LogKind) {
        self.entries.push(LogEntry { time, message, kind });
    }
}

/// The explicit context threaded through every operation: configuration,
/// event bus, statistics, party resource, RNG, clock, and log.
pub struct Engine {
    pub config: SimConfig,
    pub bus: EventBus,
    pub stats: CombatStatistics,
    pub party: PartyState,
    pub rng: ChaCha8Rng,
    pub tick: Tick,
    pub log: BattleLog,
}

impl Engine {
    pub fn new(config: SimConfig, seed: u64) -> Self {
        let stats = CombatStatistics::new(config.tick_rate);
        let party = PartyState::new(&config.party);
        Engine {
            config,
            bus: EventBus::new(),
            stats,
            party,
            rng: ChaCha8Rng::seed_from_u64(seed),
            tick: 0,
            log: BattleLog::default(),
        }
    }

    /// `[MM:SS.s]` stamp for the current tick.
    pub fn time_str(&self) -> String {
        let seconds = self.tick as f64 / self.config.tick_rate;
        let minutes = (seconds / 60.0) as u32;
        format!("[{:02}:{:04.1}]", minutes, seconds % 60.0)
    }

    pub fn log_info(&mut self, message: impl Into<String>) {
        let message = message.into();
        info!(tick = self.tick, "{message}");
        let time = self.time_str();
        self.log.push(time, message, LogKind::Info);
    }

    pub fn log_action(&mut self, message: impl Into<String>) {
        let message = message.into();
        info!(tick = self.tick, "{message}");
        let time = self.time_str();
        self.log.push(time, message, LogKind::Action);
    }

    pub fn log_damage(&mut self, message: impl Into<String>) {
        if !self.config.enable_damage_log {
            return;
        }
        let message = message.into();
        info!(tick = self.tick, "{message}");
        let time = self.time_str();
        self.log.push(time, message, LogKind::Damage);
    }

    /// WARN-level note; reaches tracing only.
    pub fn log_warn(&mut self, message: impl Into<String>) {
        warn!(tick = self.tick, "{}", message.into());
    }

    /// ERROR-level note; mirrored into the battle log so truncated runs are
    /// explainable from the output alone.
    pub fn log_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        error!(tick = self.tick, "{message}");
        let time = self.time_str();
        self.log.push(time, format!("error: {message}"), LogKind::Info);
    }
}
