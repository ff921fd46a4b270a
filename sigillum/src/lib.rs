#![warn(missing_docs, clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::missing_errors_doc, clippy::similar_names)]

//! Cryptographic identities and signatures for consensus participants.
//!
//! A *sigillum* is the seal a participant presses onto everything it
//! emits. The consensus core treats signatures as opaque bytes, so this
//! crate only needs to hand out identities, sign things, and verify a
//! signature against the signer's public id.
//!
//! ```
//! use sigillum::{Identity, Signable};
//!
//! // anything that can produce signable bytes can be signed
//! struct Payload(String);
//!
//! impl<'a> Signable for &'a Payload {
//!     type SignableData = &'a [u8];
//!     type Error = std::convert::Infallible;
//!     fn signable_data(&self) -> Result<Self::SignableData, Self::Error> {
//!         Ok(self.0.as_bytes())
//!     }
//! }
//!
//! let identity = Identity::generate();
//! let payload = Payload("weiche 7 liegt rechts".to_string());
//!
//! let signature = identity.sign(&payload).unwrap();
//! identity.id().verify(&payload, &signature).unwrap();
//! ```

#[macro_use]
mod macros;

mod error;
mod identity;
mod signable;
mod signature;

pub use error::Error;
pub use identity::{Identity, PeerId};
pub use signable::Signable;
pub use signature::Signature;
