//! The four-resource pool of a conversation session.
//!
//! - **Initiative** is the spendable currency gating card plays.
//! - **Momentum** is forward pressure, built by successful plays.
//! - **Doubt** accrues as tension and is cleared by listening.
//! - **Cadence** tracks pacing and swings with the rhythm of play.
//!
//! The pool is owned by the session and mutated only through session and
//! facade operations; effect branches receive it by explicit reference.

use serde::{Deserialize, Serialize};

/// Cadence never drops below this during a conversation.
pub const CADENCE_FLOOR: i32 = -5;

/// One of the four conversation resources.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    Initiative,
    Momentum,
    Doubt,
    Cadence,
}

impl ResourceKind {
    /// Lowercase name used in content files and descriptions.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            ResourceKind::Initiative => "initiative",
            ResourceKind::Momentum => "momentum",
            ResourceKind::Doubt => "doubt",
            ResourceKind::Cadence => "cadence",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Mutable resource state of one conversation.
///
/// Initiative, momentum, and doubt are floored at zero; cadence at
/// [`CADENCE_FLOOR`]. Deltas that would cross a floor clamp to it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourcePool {
    initiative: i32,
    momentum: i32,
    doubt: i32,
    cadence: i32,
}

impl ResourcePool {
    /// A zeroed pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A pool seeded with explicit values, clamped to their floors.
    #[must_use]
    pub fn seeded(initiative: i32, momentum: i32, doubt: i32, cadence: i32) -> Self {
        Self {
            initiative: initiative.max(0),
            momentum: momentum.max(0),
            doubt: doubt.max(0),
            cadence: cadence.max(CADENCE_FLOOR),
        }
    }

    #[must_use]
    pub fn initiative(&self) -> i32 {
        self.initiative
    }

    #[must_use]
    pub fn momentum(&self) -> i32 {
        self.momentum
    }

    #[must_use]
    pub fn doubt(&self) -> i32 {
        self.doubt
    }

    #[must_use]
    pub fn cadence(&self) -> i32 {
        self.cadence
    }

    /// Read a resource by kind.
    #[must_use]
    pub fn get(&self, kind: ResourceKind) -> i32 {
        match kind {
            ResourceKind::Initiative => self.initiative,
            ResourceKind::Momentum => self.momentum,
            ResourceKind::Doubt => self.doubt,
            ResourceKind::Cadence => self.cadence,
        }
    }

    /// Apply a delta to a resource, clamping at its floor.
    pub fn apply(&mut self, kind: ResourceKind, delta: i32) {
        let slot = match kind {
            ResourceKind::Initiative => &mut self.initiative,
            ResourceKind::Momentum => &mut self.momentum,
            ResourceKind::Doubt => &mut self.doubt,
            ResourceKind::Cadence => &mut self.cadence,
        };
        let floor = match kind {
            ResourceKind::Cadence => CADENCE_FLOOR,
            _ => 0,
        };
        *slot = (*slot + delta).max(floor);
    }

    /// Check whether a card's initiative cost is affordable.
    #[must_use]
    pub fn can_afford(&self, cost: i32) -> bool {
        self.initiative >= cost
    }

    /// Deduct an initiative cost.
    ///
    /// Callers must have checked affordability; an unaffordable deduction
    /// is a bookkeeping bug, not a player error.
    pub fn spend_initiative(&mut self, cost: i32) {
        debug_assert!(self.initiative >= cost);
        self.initiative = (self.initiative - cost).max(0);
    }

    /// Clear doubt completely, returning how much was cleared.
    pub fn clear_doubt(&mut self) -> i32 {
        std::mem::take(&mut self.doubt)
    }
}
