use base64::{Engine, prelude::BASE64_URL_SAFE_NO_PAD};
use ed25519_dalek::{Signer as _, SigningKey, VerifyingKey};
use jose_jwk::{EcCurves, Jwk, Key, OkpCurves};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use multibase::Base;
use rand::rngs::OsRng;
use thiserror::Error;
use xdid_core::{
    did::{Did, MethodId, MethodName},
    document::{Document, Purpose, VerificationMethod},
};

use crate::NAME;

/// Verification method type used for every key in a did:dht document.
pub const VERIFICATION_METHOD_TYPE: &str = "JsonWebKey";

/// Relationships the identity key is added to in a new document.
pub const IDENTITY_PURPOSES: [Purpose; 4] = [
    Purpose::Authentication,
    Purpose::AssertionMethod,
    Purpose::CapabilityInvocation,
    Purpose::CapabilityDelegation,
];

pub trait Signer {
    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, SignError>;
}

#[derive(Error, Debug)]
pub enum SignError {
    #[error("signing failed")]
    SigningFailed,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("unsupported key algorithm")]
    UnsupportedAlgorithm,
    #[error("malformed public key")]
    MalformedPublicKey,
}

/// Key types with an index in the did:dht type registry.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum KeyType {
    Ed25519,
    Secp256k1,
}

impl KeyType {
    pub fn index(self) -> u8 {
        match self {
            KeyType::Ed25519 => 0,
            KeyType::Secp256k1 => 1,
        }
    }

    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(KeyType::Ed25519),
            1 => Some(KeyType::Secp256k1),
            _ => None,
        }
    }
}

/// Extracts the raw public key bytes stored in a `k=` field:
/// 32 bytes for Ed25519, a 33 byte compressed SEC1 point for secp256k1.
pub fn jwk_to_raw(jwk: &Jwk) -> Result<(KeyType, Vec<u8>), KeyError> {
    match &jwk.key {
        Key::Okp(okp) if matches!(okp.crv, OkpCurves::Ed25519) => {
            let x: &[u8] = okp.x.as_ref();
            if x.len() != ed25519_dalek::PUBLIC_KEY_LENGTH {
                return Err(KeyError::MalformedPublicKey);
            }
            Ok((KeyType::Ed25519, x.to_vec()))
        }
        Key::Ec(ec) if matches!(ec.crv, EcCurves::P256K) => {
            let mut sec1 = vec![0x04];
            sec1.extend(ec.x.as_ref());
            sec1.extend(ec.y.as_ref());

            let key = k256::PublicKey::from_sec1_bytes(&sec1)
                .map_err(|_| KeyError::MalformedPublicKey)?;

            Ok((
                KeyType::Secp256k1,
                key.to_encoded_point(true).as_bytes().to_vec(),
            ))
        }
        _ => Err(KeyError::UnsupportedAlgorithm),
    }
}

/// Builds a public JWK from raw key bytes.
pub fn raw_to_jwk(key_type: KeyType, raw: &[u8]) -> Result<Jwk, KeyError> {
    if raw.is_empty() {
        return Err(KeyError::MalformedPublicKey);
    }

    let value = match key_type {
        KeyType::Ed25519 => {
            let bytes: [u8; 32] = raw.try_into().map_err(|_| KeyError::MalformedPublicKey)?;
            VerifyingKey::from_bytes(&bytes).map_err(|_| KeyError::MalformedPublicKey)?;

            serde_json::json!({
                "kty": "OKP",
                "crv": "Ed25519",
                "x": BASE64_URL_SAFE_NO_PAD.encode(raw),
            })
        }
        KeyType::Secp256k1 => {
            let key =
                k256::PublicKey::from_sec1_bytes(raw).map_err(|_| KeyError::MalformedPublicKey)?;
            let point = key.to_encoded_point(false);

            let (Some(x), Some(y)) = (point.x(), point.y()) else {
                return Err(KeyError::MalformedPublicKey);
            };

            serde_json::json!({
                "kty": "EC",
                "crv": "secp256k1",
                "x": BASE64_URL_SAFE_NO_PAD.encode(x),
                "y": BASE64_URL_SAFE_NO_PAD.encode(y),
            })
        }
    };

    serde_json::from_value(value).map_err(|_| KeyError::MalformedPublicKey)
}

/// Ed25519 identity key of a did:dht. The public key is the method-specific
/// id, and signs the BEP44 records published for it.
#[derive(Clone)]
pub struct DidDhtKeyPair(SigningKey);

impl DidDhtKeyPair {
    /// Generate a new identity key.
    pub fn generate() -> Self {
        Self(SigningKey::generate(&mut OsRng))
    }

    pub fn from_secret_bytes(secret: &[u8; 32]) -> Self {
        Self(SigningKey::from_bytes(secret))
    }

    pub fn public_bytes(&self) -> [u8; 32] {
        self.0.verifying_key().to_bytes()
    }

    pub fn to_did(&self) -> Did {
        Did {
            method_name: MethodName(NAME.to_string()),
            method_id: MethodId(Base::Base32Z.encode(self.public_bytes())),
        }
    }

    /// A new document holding only the identity key, as `#0`.
    pub fn to_document(&self) -> Result<Document, KeyError> {
        let did = self.to_did();
        let jwk = raw_to_jwk(KeyType::Ed25519, &self.public_bytes())?;

        let mut document = Document::new(did.clone());
        document.add_verification_method(
            VerificationMethod {
                id: format!("{did}#0"),
                typ: VERIFICATION_METHOD_TYPE.to_string(),
                controller: did,
                public_key_jwk: jwk,
            },
            &IDENTITY_PURPOSES,
        );

        Ok(document)
    }
}

impl Signer for DidDhtKeyPair {
    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, SignError> {
        Ok(self.0.sign(message).to_bytes().to_vec())
    }
}
