use crate::{Error, ParticipantId, RoundNumber, Transaction};
use blake2::{
    digest::{generic_array::typenum::Unsigned, FixedOutput},
    Blake2b, Digest,
};
use serde::{Deserialize, Serialize};
use sigillum::{Identity, Signable, Signature};
use std::{
    convert::Infallible,
    fmt,
    hash::{Hash, Hasher},
    time::SystemTime,
};

/// A `Block` stores the transactions agreed on in one consensus round.
///
/// The hash is computed once, when the block is built from its `Body`,
/// and never changes afterwards. The proposer's signature is the only
/// late-bound field: it is attached exactly once, before the block is
/// handed to the broadcast layer.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Block {
    body: Body,
    hash: BlockHash,
    signature: Option<Signature>,
}

impl Block {
    /// Build a block from its `body`.
    #[must_use]
    pub fn new(body: Body) -> Self {
        let hash = body.hash();
        Self {
            body,
            hash,
            signature: None,
        }
    }

    /// The genesis block every ledger is seeded with.
    ///
    /// All fields are fixed values, so every participant constructs a
    /// byte-identical anchor and the chains stay comparable by hash.
    #[must_use]
    pub fn genesis() -> Self {
        Self::new(Body {
            proposer: ParticipantId::GENESIS,
            round: RoundNumber::default(),
            prev_block_hash: BlockHash::default(),
            timestamp: SystemTime::UNIX_EPOCH,
            transactions: Vec::new(),
        })
    }

    /// The `Body` of the block.
    #[must_use]
    pub const fn body(&self) -> &Body {
        &self.body
    }

    /// The cached hash of the block's body.
    #[must_use]
    pub const fn hash(&self) -> BlockHash {
        self.hash
    }

    /// The round this block was proposed in.
    #[must_use]
    pub const fn round(&self) -> RoundNumber {
        self.body.round
    }

    /// The participant that proposed this block.
    #[must_use]
    pub const fn proposer(&self) -> ParticipantId {
        self.body.proposer
    }

    /// The proposer's signature, once attached.
    #[must_use]
    pub const fn signature(&self) -> Option<&Signature> {
        self.signature.as_ref()
    }

    /// Attach the proposer's signature over the block hash.
    ///
    /// A block is signed exactly once.
    pub fn sign(&mut self, identity: &Identity) -> Result<(), Error> {
        if self.signature.is_some() {
            return Err(Error::AlreadySigned);
        }
        self.signature = Some(identity.sign(&self.hash)?);
        Ok(())
    }
}

/// The `Body` of a `Block`: everything the block hash covers.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Body {
    /// The participant that proposed the block.
    pub proposer: ParticipantId,

    /// The round the block belongs to.
    pub round: RoundNumber,

    /// The `BlockHash` of the previous block in the chain.
    pub prev_block_hash: BlockHash,

    /// The time the proposer built the block.
    pub timestamp: SystemTime,

    /// The transactions carried by the block.
    pub transactions: Vec<Transaction>,
}

impl Body {
    /// Calculate the hash of the body.
    ///
    /// The body is serialized canonically (fixed field order), so
    /// re-hashing always reproduces the same value.
    #[must_use]
    pub fn hash(&self) -> BlockHash {
        let val = postcard::to_stdvec(self).unwrap();

        let result = Blake2b::digest(&val);

        let mut body_hash = BlockHash([0; HASH_SIZE]);
        body_hash.0.copy_from_slice(&result);
        body_hash
    }
}

const HASH_SIZE: usize = <Blake2b as FixedOutput>::OutputSize::USIZE;

/// The datatype of block hashes.
///
/// The default value is the all-zero digest referenced by the genesis
/// block as its predecessor.
#[derive(Copy, Clone)]
#[allow(clippy::module_name_repetitions)]
pub struct BlockHash([u8; HASH_SIZE]);

impl fmt::Debug for BlockHash {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl Default for BlockHash {
    fn default() -> Self {
        Self([0; HASH_SIZE])
    }
}

impl PartialEq for BlockHash {
    fn eq(&self, other: &Self) -> bool {
        self.0[..] == other.0[..]
    }
}

impl Eq for BlockHash {}

#[allow(clippy::derive_hash_xor_eq)]
impl Hash for BlockHash {
    fn hash<H>(&self, h: &mut H)
    where
        H: Hasher,
    {
        self.0[..].hash(h);
    }
}

impl Signable for BlockHash {
    type SignableData = Vec<u8>;
    type Error = Infallible;
    fn signable_data(&self) -> Result<Self::SignableData, Self::Error> {
        Ok(self.0.to_vec())
    }
}

hexutil::impl_hex!(BlockHash, HASH_SIZE, |&self| &self.0, |data| {
    Ok(Self(data))
});
