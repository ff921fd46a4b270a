#![warn(missing_docs, clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::missing_errors_doc,
    clippy::similar_names,
    clippy::doc_markdown
)]

//! Beacon-driven round consensus over a fixed participant roster.
//!
//! ## Overview
//!
//! `Stellwerk` simulates a small permissioned network that agrees on an
//! append-only chain of blocks, one round at a time. Every round a
//! shared random beacon is observed identically by all participants and
//! elects a leader, the leader proposes a block on top of its chain
//! tip, and the block is finalized once votes from the full roster have
//! been observed. Like its namesake interlocking tower, nothing moves
//! until every switch agrees.
//!
//! Participants only ever talk through the broadcast layer and keep
//! strictly local state, so an identical chain on every node is a
//! property the simulation *verifies* rather than assumes.

pub mod beacon;
pub mod coordinator;
pub mod message;
pub mod network;
pub mod participant;
pub mod simulation;
