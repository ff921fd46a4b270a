use err_derive::Error;

/// An error of the chain data model.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The `Block` hash does not match the previous block hash.
    #[error(display = "Block hash does not match the previous block hash.")]
    BlockHashDoesNotMatch,

    /// The `Block` round does not come after the previous block round.
    #[error(display = "Block round does not fit the previous block round.")]
    RoundNumberDoesNotFit,

    /// The `Block` already carries its proposer's signature.
    #[error(display = "Block is already signed.")]
    AlreadySigned,

    /// The `Block` could not be signed.
    #[error(display = "{}", 0)]
    Signature(#[error(from)] sigillum::Error),
}
