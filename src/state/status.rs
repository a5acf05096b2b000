//! Frontier status definitions for address records
//!
//! An address record starts out `Pending`, is handed to exactly one fetch task
//! by moving it to `Claimed`, and ends in `Done` or `Failed`.

use std::fmt;

/// Represents the current state of an address record in the frontier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrontierStatus {
    /// Discovered and waiting to be claimed
    Pending,

    /// Handed to a fetch task
    Claimed,

    /// Fetched and its links ingested
    Done,

    /// Fetch or body read failed
    Failed,
}

impl FrontierStatus {
    /// Returns true if no further transition is expected
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Returns true if the move from `self` to `next` is a legal transition
    ///
    /// Reclaiming a stuck record (Claimed -> Pending) is not a regular
    /// transition and is handled by the store's lease reclaim.
    pub fn can_transition_to(&self, next: FrontierStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Claimed)
                | (Self::Pending, Self::Failed)
                | (Self::Claimed, Self::Failed)
                | (Self::Claimed, Self::Done)
        )
    }

    /// Converts the status to its database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Claimed => "claimed",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }

    /// Parses a status from its database string representation
    ///
    /// Returns None if the string doesn't match any known status.
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "claimed" => Some(Self::Claimed),
            "done" => Some(Self::Done),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    /// Returns every status that may move directly to `target`
    pub fn sources_of(target: FrontierStatus) -> Vec<Self> {
        Self::all()
            .into_iter()
            .filter(|status| status.can_transition_to(target))
            .collect()
    }

    /// Returns all statuses
    pub fn all() -> [Self; 4] {
        [Self::Pending, Self::Claimed, Self::Done, Self::Failed]
    }
}

impl fmt::Display for FrontierStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}
