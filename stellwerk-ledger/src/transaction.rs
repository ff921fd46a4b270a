use crate::ParticipantId;
use blake2::{
    digest::{generic_array::typenum::Unsigned, FixedOutput},
    Blake2b, Digest,
};
use serde::{Deserialize, Serialize};
use std::{fmt, time::SystemTime};

const DIGEST_SIZE: usize = <Blake2b as FixedOutput>::OutputSize::USIZE;

/// A payment moving `amount` from one participant to another.
///
/// The `id` is derived from all other fields once, at construction,
/// and is never recomputed afterwards.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Transaction {
    /// The paying participant.
    pub sender: ParticipantId,
    /// The receiving participant.
    pub receiver: ParticipantId,
    /// The transferred amount.
    pub amount: u64,
    /// The time the transaction was created.
    pub created_at: SystemTime,
    id: TxId,
}

impl Transaction {
    /// Create a transaction, deriving its id from the content.
    #[must_use]
    pub fn new(sender: ParticipantId, receiver: ParticipantId, amount: u64) -> Self {
        let created_at = SystemTime::now();
        let id = TxId::digest_of(&(sender, receiver, amount, created_at));
        Self {
            sender,
            receiver,
            amount,
            created_at,
            id,
        }
    }

    /// The content-derived id of this transaction.
    #[must_use]
    pub const fn id(&self) -> &TxId {
        &self.id
    }
}

/// The content-derived identifier of a `Transaction`.
#[derive(Copy, Clone)]
pub struct TxId([u8; DIGEST_SIZE]);

impl TxId {
    fn digest_of(content: &impl Serialize) -> Self {
        let bytes = postcard::to_stdvec(content).unwrap();
        let result = Blake2b::digest(&bytes);

        let mut id = Self([0; DIGEST_SIZE]);
        id.0.copy_from_slice(&result);
        id
    }
}

impl fmt::Debug for TxId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl PartialEq for TxId {
    fn eq(&self, other: &Self) -> bool {
        self.0[..] == other.0[..]
    }
}

impl Eq for TxId {}

hexutil::impl_hex!(TxId, DIGEST_SIZE, |&self| &self.0, |data| { Ok(Self(data)) });

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn different_content_yields_different_ids() {
        let a = Transaction::new(ParticipantId::new(0), ParticipantId::new(1), 10);
        let b = Transaction::new(ParticipantId::new(0), ParticipantId::new(1), 20);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn the_id_survives_serialization() {
        let transaction = Transaction::new(ParticipantId::new(2), ParticipantId::new(0), 30);
        let bytes = postcard::to_stdvec(&transaction).unwrap();
        let restored: Transaction = postcard::from_bytes(&bytes).unwrap();
        assert_eq!(transaction.id(), restored.id());
    }
}
