//! Messages broadcast between participants within a round.

use serde::{Deserialize, Serialize};
use sigillum::Signature;
use stellwerk_ledger::{Block, BlockHash, ParticipantId};

/// Messages used to reach agreement on one block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ConsensusMessage {
    /// The elected leader proposes a block extending its chain tip.
    Propose(Block),

    /// A participant votes to finalize a pending block.
    Commit(Vote),
}

/// A commit vote for a single proposed block.
///
/// Votes only exist in flight; nothing persists them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vote {
    /// The hash of the block this vote commits to.
    pub block_hash: BlockHash,

    /// The voting participant.
    pub voter: ParticipantId,

    /// The voter's signature over `block_hash`.
    pub signature: Signature,
}
