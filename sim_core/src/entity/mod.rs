//! Simulation entities: party characters and the enemy target

mod character;
mod target;

pub use character::{Character, QueuedCommand};
pub use target::{StaggerOutcome, Target};

/// Anything the scheduler owns and ticks.
pub enum Entity {
    Character(Character),
    Target(Target),
}

impl Entity {
    pub fn name(&self) -> &str {
        match self {
            Entity::Character(c) => &c.name,
            Entity::Target(t) => &t.name,
        }
    }

    pub fn as_character(&self) -> Option<&Character> {
        match self {
            Entity::Character(c) => Some(c),
            Entity::Target(_) => None,
        }
    }

    pub fn as_character_mut(&mut self) -> Option<&mut Character> {
        match self {
            Entity::Character(c) => Some(c),
            Entity::Target(_) => None,
        }
    }

    pub fn as_target(&self) -> Option<&Target> {
        match self {
            Entity::Target(t) => Some(t),
            Entity::Character(_) => None,
        }
    }

    pub fn as_target_mut(&mut self) -> Option<&mut Target> {
        match self {
            Entity::Target(t) => Some(t),
            Entity::Character(_) => None,
        }
    }
}
