use crate::{Block, BlockHash, Error, RoundNumber};

/// The append-only chain of finalized blocks owned by one participant.
///
/// Only the owning participant's finalization step appends; there is no
/// rollback. Rounds that never finalize leave a gap in the round
/// numbers, so consecutive blocks link by hash and strictly increasing
/// rounds rather than by dense numbering.
#[derive(Debug)]
pub struct Ledger {
    blocks: Vec<Block>,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    /// Create a ledger seeded with the genesis block.
    #[must_use]
    pub fn new() -> Self {
        Self {
            blocks: vec![Block::genesis()],
        }
    }

    /// The number of blocks in the chain, genesis included.
    #[must_use]
    pub fn height(&self) -> u64 {
        self.blocks.len() as u64
    }

    /// The most recently finalized block.
    #[must_use]
    pub fn tip(&self) -> &Block {
        self.blocks
            .last()
            .expect("a ledger always holds the genesis block")
    }

    /// Look up the block finalized in `round`.
    #[must_use]
    pub fn at(&self, round: RoundNumber) -> Option<&Block> {
        let index = self
            .blocks
            .binary_search_by_key(&round, Block::round)
            .ok()?;
        Some(&self.blocks[index])
    }

    /// Append a finalized `block` to the chain.
    ///
    /// The block must reference the current tip by hash and carry a
    /// round number above the tip's.
    pub fn append(&mut self, block: Block) -> Result<(), Error> {
        if block.body().prev_block_hash != self.tip().hash() {
            return Err(Error::BlockHashDoesNotMatch);
        }

        if block.round() <= self.tip().round() {
            return Err(Error::RoundNumberDoesNotFit);
        }

        self.blocks.push(block);
        Ok(())
    }

    /// Iterate over the chain from genesis to tip.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Block> {
        self.blocks.iter()
    }

    /// The hash sequence of the chain, used for convergence checks.
    #[must_use]
    pub fn hashes(&self) -> Vec<BlockHash> {
        self.blocks.iter().map(Block::hash).collect()
    }
}
