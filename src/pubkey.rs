//! ECDSA public keys used to authenticate the TESLA root key.
//!
//! This module contains the [`PublicKey`] struct, which wraps either a P-256 or
//! (when the `p521` feature is enabled) a P-521 ECDSA verifying key together
//! with its public key ID. A `PublicKey` must be marked [`Validated`] before it
//! can be used to check a DSM-KROOT signature; see
//! [validation](crate::validation) for the meaning of the validation type
//! parameter.

use crate::validation::{NotValidated, Validated};

/// An ECDSA verifying key, tagged by the curve used.
///
/// The curve in use is given by the [`EcdsaFunction`](crate::bitfields::EcdsaFunction)
/// field of the DSM-KROOT message that is being checked against this key.
#[derive(Clone, Copy, Debug)]
pub enum VerifyingKey {
    /// A P-256 (secp256r1) verifying key.
    P256(p256::ecdsa::VerifyingKey),
    /// A P-521 verifying key.
    #[cfg(feature = "p521")]
    P521(p521::ecdsa::VerifyingKey),
}

/// An ECDSA public key, together with its public key ID.
///
/// The `V` type parameter indicates whether the key has been validated against
/// the Merkle tree root (for a key carried in a DSM-PKR) or otherwise
/// established as trustworthy (for the key the receiver is configured with).
#[derive(Clone, Copy, Debug)]
pub struct PublicKey<V> {
    key: VerifyingKey,
    id: u8,
    _validated: V,
}

impl PublicKey<NotValidated> {
    /// Constructs a `PublicKey` from a P-256 verifying key and a public key ID.
    pub fn from_p256(key: p256::ecdsa::VerifyingKey, public_key_id: u8) -> PublicKey<NotValidated> {
        PublicKey {
            key: VerifyingKey::P256(key),
            id: public_key_id,
            _validated: NotValidated {},
        }
    }

    /// Constructs a `PublicKey` from a P-521 verifying key and a public key ID.
    #[cfg(feature = "p521")]
    pub fn from_p521(key: p521::ecdsa::VerifyingKey, public_key_id: u8) -> PublicKey<NotValidated> {
        PublicKey {
            key: VerifyingKey::P521(key),
            id: public_key_id,
            _validated: NotValidated {},
        }
    }
}

impl<V> PublicKey<V> {
    /// Gives the public key ID.
    pub fn public_key_id(&self) -> u8 {
        self.id
    }

    /// Gives the verifying key.
    pub fn verifying_key(&self) -> VerifyingKey {
        self.key
    }

    /// Marks a public key as validated, without actually performing validation.
    ///
    /// This is used for the public key that the receiver is configured with
    /// (which is trusted out of band, typically an operator-supplied SEC1
    /// encoded point), and can also be used by a caller that warm-starts from
    /// a previously-validated key.
    pub fn force_valid(self) -> PublicKey<Validated> {
        PublicKey {
            key: self.key,
            id: self.id,
            _validated: Validated {},
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn public_key_id_roundtrip() {
        let key = p256::ecdsa::VerifyingKey::from(
            &p256::ecdsa::SigningKey::from_bytes(&[1u8; 32].into()).unwrap(),
        );
        let pubkey = PublicKey::from_p256(key, 3).force_valid();
        assert_eq!(pubkey.public_key_id(), 3);
        assert!(matches!(pubkey.verifying_key(), VerifyingKey::P256(_)));
    }
}
