use err_derive::Error;
use std::error::Error as StdError;

type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// An error of the `sigillum` crate.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// An invalid hexadecimal value was used.
    #[error(display = "invalid hex: {}", 0)]
    HexError(#[error(from)] hex::FromHexError),

    /// An invalid signature was used.
    #[error(display = "invalid signature: {}", 0)]
    SignatureError(#[error(from)] ed25519_dalek::SignatureError),

    /// A `Signable` failed to create its signable data.
    #[error(display = "unable to create signable data: {}", 0)]
    SignableError(BoxError),
}

impl Error {
    pub(crate) fn signable_error(err: impl StdError + Send + Sync + 'static) -> Self {
        Self::SignableError(err.into())
    }
}
