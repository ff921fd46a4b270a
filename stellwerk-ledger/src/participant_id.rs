use serde::{Deserialize, Serialize};
use std::fmt;

/// The index of a participant in the ordered network roster.
#[derive(
    Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ParticipantId(u32);

impl ParticipantId {
    /// The reserved id used as the proposer of the genesis block.
    pub const GENESIS: Self = Self(u32::MAX);

    /// Create a participant id from a roster index.
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// The roster index of this participant.
    #[must_use]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if *self == Self::GENESIS {
            f.write_str("genesis")
        } else {
            self.0.fmt(f)
        }
    }
}

impl From<u32> for ParticipantId {
    fn from(index: u32) -> Self {
        Self(index)
    }
}

impl From<ParticipantId> for u32 {
    fn from(id: ParticipantId) -> Self {
        id.0
    }
}
