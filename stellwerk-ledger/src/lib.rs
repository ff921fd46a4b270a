#![warn(missing_docs, clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::missing_errors_doc, clippy::similar_names)]

//! Chain data model shared by all consensus participants.
//!
//! A [`Ledger`] is the append-only sequence of finalized [`Block`]s a
//! single participant owns. Every ledger is seeded with the same
//! genesis block, which is the anchor that allows independently grown
//! chains to be compared by hash equality alone.

mod block;
mod error;
mod ledger;
mod participant_id;
mod round;
mod transaction;

pub use block::{Block, BlockHash, Body};
pub use error::Error;
pub use ledger::Ledger;
pub use participant_id::ParticipantId;
pub use round::RoundNumber;
pub use transaction::{Transaction, TxId};
