use crate::{Error, Signable, Signature};
use ed25519_dalek::{ExpandedSecretKey, PublicKey, SecretKey, Verifier};
use hex::FromHex;
use lazy_static::lazy_static;
use std::{
    collections::HashMap,
    fmt,
    hash::{Hash, Hasher},
    sync::RwLock,
};

const SECRET_LEN: usize = ed25519_dalek::SECRET_KEY_LENGTH;
const PUBLIC_LEN: usize = ed25519_dalek::PUBLIC_KEY_LENGTH;

/// A cryptographic identity holds the private key used to sign messages.
pub struct Identity {
    id: PeerId,
    secret: SecretKey,
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Identity").field("id", &self.id).finish()
    }
}

impl Identity {
    fn from_secret_key(secret: SecretKey) -> Self {
        let id = PeerId((&secret).into());
        Self { id, secret }
    }

    /// Create an identity from its hexadecimal representation.
    pub fn from_hex(hex: &str) -> Result<Self, Error> {
        let bytes: [u8; SECRET_LEN] = FromHex::from_hex(hex)?;
        let secret = SecretKey::from_bytes(&bytes)?;
        Ok(Self::from_secret_key(secret))
    }

    /// Generate a new random identity.
    #[must_use]
    pub fn generate() -> Self {
        let secret = SecretKey::generate(&mut rand::rngs::OsRng {});
        Self::from_secret_key(secret)
    }

    /// Get the public id of the identity.
    #[must_use]
    pub const fn id(&self) -> &PeerId {
        &self.id
    }

    /// Create a hexadecimal representation of the private key.
    #[must_use]
    pub fn hex(&self) -> String {
        hex::encode(self.secret.as_bytes())
    }

    /// Create a signature of a `message` that implements `Signable`.
    pub fn sign<S>(&self, message: S) -> Result<Signature, Error>
    where
        S: Signable,
    {
        let expanded = ExpandedSecretKey::from(&self.secret);
        let data = message.signable_data().map_err(Error::signable_error)?;
        Ok(Signature(expanded.sign(data.as_ref(), &self.id.0)))
    }
}

/// The public identifier of a network peer.
#[derive(Clone, PartialEq, Eq)]
pub struct PeerId(pub(crate) PublicKey);

#[allow(clippy::derive_hash_xor_eq)]
impl Hash for PeerId {
    fn hash<H>(&self, h: &mut H)
    where
        H: Hasher,
    {
        self.0.as_bytes().hash(h)
    }
}

impl fmt::Debug for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match PEER_NAMES
            .read()
            .ok()
            .as_ref()
            .and_then(|names| names.get(self))
        {
            Some(name) => f.write_str(name),
            None => fmt::Display::fmt(self, f),
        }
    }
}

hexutil::impl_hex!(PeerId, PUBLIC_LEN, |&self| self.0.as_bytes(), |data| {
    PublicKey::from_bytes(&data)
        .map(Self)
        .map_err(|_| hexutil::FromHexError::InvalidValue)
});

lazy_static! {
    static ref PEER_NAMES: RwLock<HashMap<PeerId, String>> = RwLock::new(HashMap::new());
}

impl PeerId {
    /// Set an alias `name` for this `PeerId`.
    ///
    /// The `name` is used when the peer id is printed with `std::fmt::Debug`.
    pub fn set_name(self, name: &impl ToString) {
        PEER_NAMES.write().unwrap().insert(self, name.to_string());
    }

    /// Verify a `signature` of a `message` that implements `Signable`.
    pub fn verify<S>(&self, message: S, signature: &Signature) -> Result<(), Error>
    where
        S: Signable,
    {
        let data = message.signable_data().map_err(Error::signable_error)?;
        Ok(self.0.verify(data.as_ref(), &signature.0)?)
    }

    /// Get a reference to a binary representation.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_roundtrip_preserves_the_identity() {
        let identity = Identity::generate();
        let restored = Identity::from_hex(&identity.hex()).unwrap();
        assert_eq!(identity.id(), restored.id());
    }

    #[test]
    fn peer_id_parses_its_own_hex() {
        let identity = Identity::generate();
        let peer_id: PeerId = identity.id().to_string().parse().unwrap();
        assert_eq!(&peer_id, identity.id());
    }
}
