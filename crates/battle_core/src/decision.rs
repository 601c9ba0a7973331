//! Decision requests and the id indirection that guards them.
//!
//! When a unit's wait reaches zero the scheduler opens a decision: a
//! request for input carrying a fresh opaque id. Input is accepted only
//! if it quotes a live decision id, which makes duplicate or delayed
//! network submissions harmless - a stale id simply no longer matches
//! anything.

use serde::{Deserialize, Serialize};

use crate::state::GameState;
use crate::units::UnitId;

/// Opaque, single-use token identifying one decision request.
///
/// Drawn from a monotonic counter and never reused, so a consumed or
/// superseded decision can never be replayed by a slow client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DecisionId(pub u64);

impl std::fmt::Display for DecisionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "d{}", self.0)
    }
}

/// An outstanding request for player input. At most one per unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingDecision {
    /// The token input must quote to resolve this decision.
    pub id: DecisionId,
}

/// Open a decision for a unit whose wait has matured.
///
/// Opening a second decision for an already-pending unit is a scheduler
/// bug, not a runtime case: it trips a debug assertion and the existing
/// decision is kept.
pub fn open_decision(state: &mut GameState, unit_id: UnitId) -> DecisionId {
    if let Some(existing) = state.pending_decisions.get(&unit_id) {
        debug_assert!(false, "decision already pending for unit {unit_id}");
        return existing.id;
    }

    let id = DecisionId(state.next_decision_id);
    state.next_decision_id += 1;
    state.pending_decisions.insert(unit_id, PendingDecision { id });
    tracing::debug!(unit = unit_id, decision = %id, "decision opened");
    id
}

/// Consume a pending decision by id, returning the unit it belonged to.
///
/// Returns `None` for unknown, already-consumed, or superseded ids; the
/// caller turns that into an `invalid-action` effect with no state
/// change.
pub fn take_submission(state: &mut GameState, decision_id: DecisionId) -> Option<UnitId> {
    let unit_id = state
        .pending_decisions
        .iter()
        .find(|(_, pending)| pending.id == decision_id)
        .map(|(unit_id, _)| *unit_id)?;

    state.pending_decisions.remove(&unit_id);
    Some(unit_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique_and_monotonic() {
        let mut state = GameState::default();
        let a = open_decision(&mut state, 1);
        let b = open_decision(&mut state, 2);
        assert!(b > a);
        assert_eq!(state.pending_decisions.len(), 2);
    }

    #[test]
    fn test_take_submission_consumes() {
        let mut state = GameState::default();
        let id = open_decision(&mut state, 4);

        assert_eq!(take_submission(&mut state, id), Some(4));
        assert!(state.pending_decisions.is_empty());
        // Second submission with the same id is stale.
        assert_eq!(take_submission(&mut state, id), None);
    }

    #[test]
    fn test_unknown_id_is_rejected() {
        let mut state = GameState::default();
        open_decision(&mut state, 4);
        assert_eq!(take_submission(&mut state, DecisionId(999)), None);
        assert_eq!(state.pending_decisions.len(), 1);
    }
}
