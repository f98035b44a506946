//! Epoch marks for the incremental walk.
//!
//! Every traversal stamps the sets it visits with a fresh [`Mark`]: a
//! monotonically increasing epoch paired with the [`Phase`] that produced it.
//! Comparing a set's stored marks against the current one tells the walk
//! whether the set was visited, or changed, during this traversal, without
//! ever resetting per-set state between resolves.

use std::fmt;

/// The three phases of a resolve, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Phase {
    Satisfaction = 1,
    Selection = 2,
    Resolution = 3,
}

impl Phase {
    pub fn order(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Satisfaction => "satisfaction",
            Phase::Selection => "selection",
            Phase::Resolution => "resolution",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Mark {
    epoch: u64,
    order: u8,
}

impl Mark {
    /// Initial value of every set's marks. Orders before every phase.
    pub const NONE: Mark = Mark { epoch: 0, order: 0 };

    pub(crate) fn new(epoch: u64, phase: Phase) -> Self {
        Self {
            epoch,
            order: phase.order(),
        }
    }

    pub fn epoch(self) -> u64 {
        self.epoch
    }

    pub fn order(self) -> u8 {
        self.order
    }

    /// Whether this mark was produced by a phase that runs before `phase`.
    pub fn precedes(self, phase: Phase) -> bool {
        self.order < phase.order()
    }
}
