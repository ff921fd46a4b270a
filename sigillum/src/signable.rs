use std::error::Error as StdError;

/// A `Signable` is something that can be signed.
///
/// The implementation decides how to produce the byte representation
/// that is fed into the signature scheme.
///
/// ```
/// use sigillum::Signable;
/// use std::convert::Infallible;
///
/// // ---------------- Sign by creating a Vec ----------------
/// struct SignCreateVec(u8, u8);
///
/// impl Signable for SignCreateVec {
///     type SignableData = Vec<u8>;
///     type Error = Infallible;
///     fn signable_data(&self) -> Result<Self::SignableData, Self::Error> {
///         Ok(vec![self.0, self.1])
///     }
/// }
///
/// // ---------------- Sign by owning a reference ----------------
/// struct SignStr<'a>(&'a str);
///
/// impl<'a> Signable for SignStr<'a> {
///     type SignableData = &'a [u8];
///     type Error = Infallible;
///     fn signable_data(&self) -> Result<Self::SignableData, Self::Error> {
///         Ok(self.0.as_bytes())
///     }
/// }
///
/// fn test_signable(message: impl Signable, expected: impl AsRef<[u8]>) {
///     assert_eq!(message.signable_data().unwrap().as_ref(), expected.as_ref());
/// }
///
/// test_signable(SignCreateVec(4, 2), [4, 2]);
/// test_signable(SignStr("42"), [b'4', b'2']);
/// ```
pub trait Signable: Sized {
    /// The type for representing signable data.
    type SignableData: AsRef<[u8]>;

    /// The type of error that can occur while creating the signable data.
    type Error: StdError + Send + Sync + 'static;

    /// Create a signable representation from self.
    fn signable_data(&self) -> Result<Self::SignableData, Self::Error>;
}

impl<'a, S> Signable for &'a S
where
    S: Signable,
{
    type SignableData = S::SignableData;
    type Error = S::Error;
    fn signable_data(&self) -> Result<Self::SignableData, Self::Error> {
        S::signable_data(self)
    }
}
