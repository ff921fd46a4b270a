use std::collections::{HashMap, HashSet};
use stellwerk_ledger::{Block, BlockHash, ParticipantId};

/// Where a participant stands within the current round.
///
/// The phase is derived from which fields of the [`RoundState`] are
/// set. Finalization replaces the whole state, so a finalized round is
/// only observable through the grown ledger, not as a lingering phase.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Phase {
    /// No beacon received yet.
    Idle,
    /// Beacon received and leader computed, waiting for its proposal.
    AwaitingProposal,
    /// Voted for a pending block, tallying commit votes.
    Voted,
}

/// Per-round scratch state of a single participant.
///
/// The state is never shared between participants, and it is replaced
/// wholesale (at the start of every round and again right after a
/// block is finalized) instead of being cleared field by field.
#[derive(Debug, Default, Clone)]
pub struct RoundState {
    pub(super) beacon: Option<u64>,
    pub(super) leader: Option<ParticipantId>,
    pub(super) pending_block: Option<Block>,
    pub(super) votes: HashMap<BlockHash, HashSet<ParticipantId>>,
}

impl RoundState {
    /// The current phase, derived from the set fields.
    #[must_use]
    pub fn phase(&self) -> Phase {
        match (&self.beacon, &self.pending_block) {
            (None, _) => Phase::Idle,
            (Some(_), None) => Phase::AwaitingProposal,
            (Some(_), Some(_)) => Phase::Voted,
        }
    }

    /// The beacon value observed this round.
    #[must_use]
    pub const fn beacon(&self) -> Option<u64> {
        self.beacon
    }

    /// The leader elected for this round.
    #[must_use]
    pub const fn leader(&self) -> Option<ParticipantId> {
        self.leader
    }

    /// The block this participant voted for, while the round is open.
    #[must_use]
    pub const fn pending_block(&self) -> Option<&Block> {
        self.pending_block.as_ref()
    }

    /// The number of distinct voters recorded for `block_hash`.
    #[must_use]
    pub fn vote_count(&self, block_hash: &BlockHash) -> usize {
        self.votes.get(block_hash).map_or(0, HashSet::len)
    }
}
