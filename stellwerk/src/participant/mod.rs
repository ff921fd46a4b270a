//! The per-participant consensus state machine.
//!
//! A participant owns its [`Ledger`] and its [`RoundState`] and acts
//! only on message content, never on arrival order. All handlers
//! return what the participant wants to broadcast in response; wiring
//! the emissions to the other participants is the coordinator's job.

mod round_state;

pub use round_state::{Phase, RoundState};

use crate::message::{ConsensusMessage, Vote};
use sigillum::{Identity, PeerId};
use stellwerk_ledger::{Block, BlockHash, Body, Ledger, ParticipantId, RoundNumber, Transaction};
use std::time::SystemTime;

/// A single consensus participant.
pub struct Participant {
    id: ParticipantId,
    identity: Identity,
    roster: Vec<PeerId>,
    ledger: Ledger,
    round_state: RoundState,
}

impl Participant {
    /// Create a participant at position `id` of the `roster`.
    ///
    /// The `identity` must be the one registered at that roster
    /// position.
    #[must_use]
    pub fn new(id: ParticipantId, identity: Identity, roster: Vec<PeerId>) -> Self {
        assert!(
            roster.get(id.as_usize()).map_or(false, |peer_id| peer_id == identity.id()),
            "the identity is not at its place in the roster"
        );
        Self {
            id,
            identity,
            roster,
            ledger: Ledger::new(),
            round_state: RoundState::default(),
        }
    }

    /// The id of this participant.
    #[must_use]
    pub const fn id(&self) -> ParticipantId {
        self.id
    }

    /// The ordered roster of all peers, this participant included.
    #[must_use]
    pub fn roster(&self) -> &[PeerId] {
        &self.roster
    }

    /// This participant's chain of finalized blocks.
    #[must_use]
    pub const fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// The transient state of the current round.
    #[must_use]
    pub const fn round_state(&self) -> &RoundState {
        &self.round_state
    }

    /// Observe the shared beacon for a new round.
    ///
    /// Replaces the round state wholesale and computes the leader as
    /// `beacon % N`. Any two participants observing the same value over
    /// the same roster compute the same leader.
    #[allow(clippy::cast_possible_truncation)]
    pub fn on_beacon(&mut self, value: u64) {
        let leader = ParticipantId::new((value % self.roster.len() as u64) as u32);
        self.round_state = RoundState {
            beacon: Some(value),
            leader: Some(leader),
            ..RoundState::default()
        };
        log::debug!(
            "Participant {}: beacon {}, leader of this round is {}.",
            self.id,
            value,
            leader
        );
    }

    /// Propose a block for `round` if this participant is the elected
    /// leader. Everyone else does nothing here.
    #[must_use]
    pub fn propose_if_leader(&self, round: RoundNumber) -> Option<ConsensusMessage> {
        if self.round_state.leader != Some(self.id) {
            return None;
        }

        let body = Body {
            proposer: self.id,
            round,
            prev_block_hash: self.ledger.tip().hash(),
            timestamp: SystemTime::now(),
            transactions: self.sample_transactions(round),
        };
        let mut block = Block::new(body);
        if let Err(err) = block.sign(&self.identity) {
            log::error!("Participant {}: could not sign proposal: {}", self.id, err);
            return None;
        }

        log::debug!(
            "Participant {}: proposing block {:?} for round {}.",
            self.id,
            block.hash(),
            round
        );
        Some(ConsensusMessage::Propose(block))
    }

    /// Handle a broadcast proposal.
    ///
    /// The block is accepted only when it comes from this round's
    /// leader *and* extends the local chain tip; anything else is
    /// dropped without a vote. On acceptance the block becomes the
    /// pending block and the returned commit vote is broadcast.
    pub fn on_proposal(&mut self, block: Block) -> Option<ConsensusMessage> {
        if self.round_state.leader != Some(block.proposer()) {
            log::trace!(
                "Participant {}: discarding proposal from non-leader {}.",
                self.id,
                block.proposer()
            );
            return None;
        }
        if block.body().prev_block_hash != self.ledger.tip().hash() {
            log::trace!(
                "Participant {}: discarding proposal that does not extend the local tip.",
                self.id
            );
            return None;
        }

        let block_hash = block.hash();
        let signature = match self.identity.sign(&block_hash) {
            Ok(signature) => signature,
            Err(err) => {
                log::error!("Participant {}: could not sign vote: {}", self.id, err);
                return None;
            }
        };

        self.round_state.pending_block = Some(block);
        log::debug!(
            "Participant {}: accepted pending block {:?}.",
            self.id,
            block_hash
        );

        Some(ConsensusMessage::Commit(Vote {
            block_hash,
            voter: self.id,
            signature,
        }))
    }

    /// Handle a broadcast commit vote.
    ///
    /// Votes for anything but the pending block are dropped, including
    /// duplicates after finalization already reset the round. Voters
    /// are tallied with set semantics; once the full roster has voted,
    /// the pending block is finalized. Returns the hash of a block
    /// finalized by this very vote.
    pub fn on_vote(&mut self, vote: Vote) -> Option<BlockHash> {
        match &self.round_state.pending_block {
            Some(pending) if pending.hash() == vote.block_hash => {}
            _ => {
                log::trace!(
                    "Participant {}: ignoring vote for unrecognized block {:?}.",
                    self.id,
                    vote.block_hash
                );
                return None;
            }
        }

        let votes = self
            .round_state
            .votes
            .entry(vote.block_hash)
            .or_default();
        votes.insert(vote.voter);
        log::trace!(
            "Participant {}: {} of {} votes for block {:?}.",
            self.id,
            votes.len(),
            self.roster.len(),
            vote.block_hash
        );

        if votes.len() == self.roster.len() {
            self.finalize(vote.block_hash)
        } else {
            None
        }
    }

    /// Feed one broadcast message to this participant and collect what
    /// it emits in response.
    pub fn handle(&mut self, message: ConsensusMessage) -> Option<ConsensusMessage> {
        match message {
            ConsensusMessage::Propose(block) => self.on_proposal(block),
            ConsensusMessage::Commit(vote) => {
                self.on_vote(vote);
                None
            }
        }
    }

    /// Append the pending block to the ledger and reset the round.
    ///
    /// The presence check on the pending block makes a second
    /// quorum-reaching event for an already finalized hash a no-op.
    fn finalize(&mut self, block_hash: BlockHash) -> Option<BlockHash> {
        let block = self.round_state.pending_block.take()?;
        let round = block.round();
        if let Err(err) = self.ledger.append(block) {
            log::error!(
                "Participant {}: could not append finalized block: {}",
                self.id,
                err
            );
            return None;
        }
        self.round_state = RoundState::default();
        log::info!(
            "Participant {}: finalized block {:?} in round {}.",
            self.id,
            block_hash,
            round
        );
        Some(block_hash)
    }

    /// Stand-in traffic so proposed blocks carry a payload.
    fn sample_transactions(&self, round: RoundNumber) -> Vec<Transaction> {
        #[allow(clippy::cast_possible_truncation)]
        let receiver = ParticipantId::new(((self.id.as_usize() + 1) % self.roster.len()) as u32);
        vec![Transaction::new(self.id, receiver, 10 * u64::from(round))]
    }
}

/// Build a fully wired roster: one participant per name, each holding a
/// fresh identity and the shared ordered list of all peer ids.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn build_roster(names: &[String]) -> Vec<Participant> {
    let identities: Vec<Identity> = names.iter().map(|_| Identity::generate()).collect();
    let roster: Vec<PeerId> = identities
        .iter()
        .map(|identity| identity.id().clone())
        .collect();
    for (peer_id, name) in roster.iter().zip(names) {
        peer_id.clone().set_name(name);
    }

    identities
        .into_iter()
        .enumerate()
        .map(|(index, identity)| {
            Participant::new(ParticipantId::new(index as u32), identity, roster.clone())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::SystemTime;

    fn roster(n: usize) -> Vec<Participant> {
        let names: Vec<String> = (0..n).map(|i| format!("p{}", i)).collect();
        build_roster(&names)
    }

    fn proposal_of(participants: &[Participant], leader: usize, round: u64) -> Block {
        match participants[leader].propose_if_leader(RoundNumber::from(round)) {
            Some(ConsensusMessage::Propose(block)) => block,
            other => panic!("leader did not propose: {:?}", other.is_some()),
        }
    }

    #[test]
    fn the_beacon_elects_the_same_leader_everywhere() {
        let mut participants = roster(4);
        for participant in &mut participants {
            participant.on_beacon(6);
        }
        for participant in &participants {
            assert_eq!(
                participant.round_state().leader(),
                Some(ParticipantId::new(2))
            );
            assert_eq!(participant.round_state().phase(), Phase::AwaitingProposal);
        }
    }

    #[test]
    fn oversized_beacon_values_are_normalized() {
        let mut participants = roster(3);
        participants[0].on_beacon(u64::MAX);
        let leader = participants[0].round_state().leader().unwrap();
        assert!(leader.as_usize() < 3);
    }

    #[test]
    fn only_the_leader_proposes() {
        let mut participants = roster(4);
        for participant in &mut participants {
            participant.on_beacon(6);
        }
        for (index, participant) in participants.iter().enumerate() {
            let proposal = participant.propose_if_leader(RoundNumber::from(1));
            assert_eq!(proposal.is_some(), index == 2);
        }
    }

    #[test]
    fn a_proposal_from_a_non_leader_is_discarded() {
        let mut participants = roster(3);
        for participant in &mut participants {
            participant.on_beacon(1);
        }

        // participant 0 fakes a proposal although 1 leads the round
        let forged = Block::new(Body {
            proposer: ParticipantId::new(0),
            round: RoundNumber::from(1),
            prev_block_hash: participants[2].ledger().tip().hash(),
            timestamp: SystemTime::now(),
            transactions: Vec::new(),
        });

        assert!(participants[2].on_proposal(forged).is_none());
        assert_eq!(participants[2].round_state().phase(), Phase::AwaitingProposal);
        assert_eq!(participants[2].ledger().height(), 1);
    }

    #[test]
    fn a_proposal_off_the_local_tip_is_discarded() {
        let mut participants = roster(3);
        for participant in &mut participants {
            participant.on_beacon(1);
        }

        let off_tip = Block::new(Body {
            proposer: ParticipantId::new(1),
            round: RoundNumber::from(1),
            prev_block_hash: BlockHash::default(),
            timestamp: SystemTime::now(),
            transactions: Vec::new(),
        });

        assert!(participants[0].on_proposal(off_tip).is_none());
        assert_eq!(participants[0].round_state().phase(), Phase::AwaitingProposal);
    }

    #[test]
    fn accepting_a_proposal_emits_a_vote() {
        let mut participants = roster(3);
        for participant in &mut participants {
            participant.on_beacon(1);
        }
        let block = proposal_of(&participants, 1, 1);
        let block_hash = block.hash();

        match participants[0].on_proposal(block) {
            Some(ConsensusMessage::Commit(vote)) => {
                assert_eq!(vote.block_hash, block_hash);
                assert_eq!(vote.voter, ParticipantId::new(0));
                participants[0].roster()[0]
                    .verify(&vote.block_hash, &vote.signature)
                    .unwrap();
            }
            other => panic!("expected a commit vote, got {:?}", other.is_some()),
        }
        assert_eq!(participants[0].round_state().phase(), Phase::Voted);
    }

    #[test]
    fn votes_before_the_proposal_are_dropped() {
        let mut participants = roster(3);
        for participant in &mut participants {
            participant.on_beacon(1);
        }
        let block = proposal_of(&participants, 1, 1);

        let vote = match participants[1].on_proposal(block.clone()) {
            Some(ConsensusMessage::Commit(vote)) => vote,
            _ => unreachable!(),
        };

        // participant 0 has not yet seen the proposal
        assert!(participants[0].on_vote(vote.clone()).is_none());
        assert_eq!(participants[0].round_state().vote_count(&block.hash()), 0);

        // after the proposal arrived, the same vote counts
        let _ = participants[0].on_proposal(block.clone());
        assert!(participants[0].on_vote(vote).is_none());
        assert_eq!(participants[0].round_state().vote_count(&block.hash()), 1);
    }

    #[test]
    fn duplicate_votes_count_once() {
        let mut participants = roster(3);
        for participant in &mut participants {
            participant.on_beacon(1);
        }
        let block = proposal_of(&participants, 1, 1);
        let hash = block.hash();

        let votes: Vec<Vote> = (0..3)
            .map(|voter| match participants[voter].on_proposal(block.clone()) {
                Some(ConsensusMessage::Commit(vote)) => vote,
                _ => unreachable!(),
            })
            .collect();

        assert!(participants[0].on_vote(votes[1].clone()).is_none());
        assert!(participants[0].on_vote(votes[1].clone()).is_none());
        assert_eq!(participants[0].round_state().vote_count(&hash), 1);
        assert_eq!(participants[0].ledger().height(), 1);
    }

    #[test]
    fn a_full_quorum_finalizes_exactly_once() {
        let mut participants = roster(3);
        for participant in &mut participants {
            participant.on_beacon(1);
        }
        let block = proposal_of(&participants, 1, 1);
        let hash = block.hash();

        let votes: Vec<Vote> = (0..3)
            .map(|voter| match participants[voter].on_proposal(block.clone()) {
                Some(ConsensusMessage::Commit(vote)) => vote,
                _ => unreachable!(),
            })
            .collect();

        assert!(participants[0].on_vote(votes[0].clone()).is_none());
        assert!(participants[0].on_vote(votes[1].clone()).is_none());
        // the last distinct voter completes the quorum
        assert_eq!(participants[0].on_vote(votes[2].clone()), Some(hash));

        assert_eq!(participants[0].ledger().height(), 2);
        assert_eq!(participants[0].ledger().tip().hash(), hash);
        assert_eq!(participants[0].round_state().phase(), Phase::Idle);

        // a late duplicate after the reset must not append again
        assert!(participants[0].on_vote(votes[1].clone()).is_none());
        assert_eq!(participants[0].ledger().height(), 2);
    }
}
