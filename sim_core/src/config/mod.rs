//! Immutable numeric configuration for a simulation run

mod constants;

pub use constants::{
    PartyConstants, ReactionDurations, ReactionGrowth, SimConfig, StaggerConstants, TechConstants,
};
