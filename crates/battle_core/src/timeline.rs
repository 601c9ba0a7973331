//! Per-unit timeline positions.
//!
//! Every live unit has exactly one timeline entry. `Wait` counts down
//! toward a decision; `Act` counts up toward executing a committed
//! intent. The scheduler in [`battle`](crate::battle) advances entries
//! once per simulated frame in ascending unit-id order.

use serde::{Deserialize, Serialize};

/// Where a unit sits on the battle timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimelinePos {
    /// Counting down toward a decision. `value == 0` means a decision is
    /// due; a unit with an open pending decision freezes here.
    Wait {
        /// Frames remaining until decision time.
        value: u32,
    },
    /// Counting up toward executing the committed intent.
    Act {
        /// Frames elapsed since the intent was committed.
        current: u32,
        /// Frame count at which the action executes. Always >= 1, and
        /// `current <= target` between frames.
        target: u32,
    },
}

impl TimelinePos {
    /// A fresh act entry for a committed intent.
    ///
    /// `target` is clamped to at least one frame so every act is
    /// observable before it executes.
    #[must_use]
    pub fn acting(target: u32) -> Self {
        Self::Act {
            current: 0,
            target: target.max(1),
        }
    }

    /// Whether this entry is waiting for a decision right now.
    #[must_use]
    pub const fn is_decision_due(&self) -> bool {
        matches!(self, Self::Wait { value: 0 })
    }

    /// Push this entry back by `amount` frames.
    ///
    /// Waiting units wait longer; acting units lose progress, floored
    /// at zero.
    pub fn setback(&mut self, amount: u32) {
        match self {
            Self::Wait { value } => *value += amount,
            Self::Act { current, .. } => *current = current.saturating_sub(amount),
        }
    }
}
