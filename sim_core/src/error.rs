//! Error taxonomy for the simulation core

use crate::types::MvKind;
use thiserror::Error;

/// All failure kinds the core can produce.
///
/// Only `InvalidInput` surfaces to the caller of `run_simulation`; everything
/// else is either trapped (logged and the tick continues) or collected into
/// the result's diagnostics list.
#[derive(Debug, Clone, Error)]
pub enum SimError {
    /// Structurally invalid input: non-positive duration, malformed timeline
    /// entry, stat override with the wrong shape.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A reaction kind absent from the configured multiplier table.
    #[error("unknown reaction kind: {0:?}")]
    UnknownReaction(MvKind),

    /// A referenced catalog name (character, weapon, equipment, set) does not
    /// exist. Skipped at the boundary and recorded as a diagnostic.
    #[error("unknown reference: {0}")]
    UnknownReference(String),

    /// Party resource insufficient to start an action. The command stays
    /// queued and is retried next tick.
    #[error("resource denied: {0}")]
    ResourceDenied(String),

    /// A failure inside an entity's tick hook. Trapped by the scheduler; the
    /// tick continues with the next entity.
    #[error("entity failure in {entity}: {reason}")]
    EntityFailure { entity: String, reason: String },

    /// Configuration parse or validation failure at setup.
    #[error("config error: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SimError::EntityFailure {
            entity: "dummy".to_string(),
            reason: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "entity failure in dummy: boom");
    }
}
