//! Damage calculation and the hit pipeline

pub mod formula;
mod pipeline;

pub use pipeline::{apply_stagger, attach_effect, attach_to_container, deal_damage, deal_true_damage};
