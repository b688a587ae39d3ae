//! [BEP44](https://www.bittorrent.org/beps/bep_0044.html) mutable items.

use std::collections::BTreeMap;

use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use thiserror::Error;

use crate::{
    bencode::{self, Value},
    keys::{SignError, Signer},
};

pub const MAX_PAYLOAD_LEN: usize = 1000;
pub const SIGNATURE_LEN: usize = 64;
const SEQ_LEN: usize = 8;

pub const MIN_WIRE_LEN: usize = SIGNATURE_LEN + SEQ_LEN;
pub const MAX_WIRE_LEN: usize = MIN_WIRE_LEN + MAX_PAYLOAD_LEN;

/// A signed, sequence-numbered record.
///
/// The signature covers `seq` and `payload`; changing either invalidates it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bep44Record {
    pub identity_key: Vec<u8>,
    pub seq: i64,
    pub signature: [u8; SIGNATURE_LEN],
    pub payload: Vec<u8>,
}

#[derive(Error, Debug)]
pub enum Bep44Error {
    #[error("payload is empty")]
    PayloadEmpty,
    #[error("payload of {0} bytes exceeds 1000")]
    PayloadTooLarge(usize),
    #[error("record of {0} bytes is shorter than 72")]
    RecordTooShort(usize),
    #[error("record of {0} bytes exceeds 1072")]
    RecordTooLarge(usize),
    #[error(transparent)]
    Sign(#[from] SignError),
    #[error("signer returned {0} bytes, expected 64")]
    SignatureLength(usize),
    #[error("invalid identity key")]
    InvalidIdentityKey,
    #[error("signature verification failed")]
    InvalidSignature,
}

impl Bep44Record {
    pub fn sign(
        payload: Vec<u8>,
        seq: i64,
        identity_key: Vec<u8>,
        signer: &impl Signer,
    ) -> Result<Self, Bep44Error> {
        if payload.is_empty() {
            return Err(Bep44Error::PayloadEmpty);
        }

        if payload.len() > MAX_PAYLOAD_LEN {
            return Err(Bep44Error::PayloadTooLarge(payload.len()));
        }

        let signature = signer.sign(&signable(seq, &payload))?;
        let signature = <[u8; SIGNATURE_LEN]>::try_from(signature.as_slice())
            .map_err(|_| Bep44Error::SignatureLength(signature.len()))?;

        Ok(Self {
            identity_key,
            seq,
            signature,
            payload,
        })
    }

    /// `sig || seq (big-endian) || payload`, the layout relays exchange.
    pub fn to_wire(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(MIN_WIRE_LEN + self.payload.len());
        out.extend(self.signature);
        out.extend(self.seq.to_be_bytes());
        out.extend(&self.payload);
        out
    }

    pub fn from_wire(identity_key: Vec<u8>, bytes: &[u8]) -> Result<Self, Bep44Error> {
        if bytes.len() < MIN_WIRE_LEN {
            return Err(Bep44Error::RecordTooShort(bytes.len()));
        }

        if bytes.len() > MAX_WIRE_LEN {
            return Err(Bep44Error::RecordTooLarge(bytes.len()));
        }

        let (signature, rest) = bytes.split_at(SIGNATURE_LEN);
        let (seq, payload) = rest.split_at(SEQ_LEN);

        let mut seq_bytes = [0; SEQ_LEN];
        seq_bytes.copy_from_slice(seq);

        let mut sig_bytes = [0; SIGNATURE_LEN];
        sig_bytes.copy_from_slice(signature);

        Ok(Self {
            identity_key,
            seq: i64::from_be_bytes(seq_bytes),
            signature: sig_bytes,
            payload: payload.to_vec(),
        })
    }

    /// Checks the Ed25519 signature against the identity key.
    pub fn verify(&self) -> Result<(), Bep44Error> {
        let key = <[u8; 32]>::try_from(self.identity_key.as_slice())
            .map_err(|_| Bep44Error::InvalidIdentityKey)?;
        let key = VerifyingKey::from_bytes(&key).map_err(|_| Bep44Error::InvalidIdentityKey)?;

        let signature = Signature::from_bytes(&self.signature);

        key.verify(&signable(self.seq, &self.payload), &signature)
            .map_err(|_| Bep44Error::InvalidSignature)
    }
}

/// The bytes a record signature covers: the canonical bencoding of
/// `{"seq": seq, "v": payload}` without the enclosing dictionary markers,
/// e.g. `3:seqi1e1:v5:hello`.
pub fn signable(seq: i64, payload: &[u8]) -> Vec<u8> {
    let mut entries = BTreeMap::new();
    entries.insert(b"seq".to_vec(), Value::Integer(seq));
    entries.insert(b"v".to_vec(), Value::Bytes(payload.to_vec()));

    let encoded = bencode::encode(&Value::Dict(entries));
    encoded[1..encoded.len() - 1].to_vec()
}
