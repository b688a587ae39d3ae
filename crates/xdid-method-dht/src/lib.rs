//! [xdid](https://github.com/unavi-xyz/xdid) implementation of [did:dht](https://did-dht.com).
//!
//! A did:dht document is encoded as DNS TXT records, wrapped in a signed
//! [BEP44](https://www.bittorrent.org/beps/bep_0044.html) record and stored
//! in the Mainline DHT through a Pkarr relay.
//!
//! ## Example
//!
//! ```no_run
//! use xdid_core::Method;
//! use xdid_method_dht::{MethodDidDht, keys::DidDhtKeyPair};
//!
//! #[tokio::main]
//! async fn main() {
//!     let keys = DidDhtKeyPair::generate();
//!     let did = keys.to_did();
//!     let document = keys.to_document().unwrap();
//!
//!     let method = MethodDidDht::new().unwrap();
//!     method.publish(&did, &document, &keys).await.unwrap();
//!
//!     let resolved = method.resolve(&did).await.into_document().unwrap();
//!     assert_eq!(resolved, document);
//! }
//! ```

use std::{
    collections::HashMap,
    sync::{Mutex, PoisonError},
    time::Duration,
};

use multibase::Base;
use reqwest::{Client, ClientBuilder, Url};
use serde::Deserialize;
use thiserror::Error;
use time::OffsetDateTime;
use tracing::{debug, warn};
use xdid_core::{
    Method, ResolutionError, ResolveFuture,
    did::Did,
    document::Document,
    resolution::{DocumentMetadata, ResolutionResult},
};

use crate::{
    bep44::{Bep44Error, Bep44Record},
    document::WireError,
    keys::Signer,
    relay::{RelayClient, RelayError},
};

pub use reqwest;

pub mod bencode;
pub mod bep44;
pub mod dns;
pub mod document;
pub mod keys;
pub mod relay;

pub const NAME: &str = "dht";

pub const DEFAULT_RELAY: &str = "https://diddht.tbddev.org";

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct RelayConfig {
    pub url: String,
    /// Applies to each relay request. No timeout if unset.
    pub timeout: Option<Duration>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_RELAY.to_string(),
            timeout: None,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to build http client: {0}")]
    Client(#[from] reqwest::Error),
    #[error("invalid relay url: {0}")]
    Url(#[from] url::ParseError),
}

#[derive(Error, Debug)]
pub enum IdentityKeyError {
    #[error("method is not dht")]
    MethodName,
    #[error("failed to decode z-base-32: {0}")]
    Decode(#[from] multibase::Error),
    #[error("identity key must be 32 bytes, got {0}")]
    Length(usize),
}

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("not a did:dht identifier: {0}")]
    InvalidDid(#[from] IdentityKeyError),
    #[error(transparent)]
    Relay(#[from] RelayError),
    #[error(transparent)]
    Record(#[from] Bep44Error),
    #[error(transparent)]
    Wire(#[from] WireError),
    #[error("record holds document for {0}")]
    IdMismatch(Did),
}

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("not a did:dht identifier: {0}")]
    InvalidDid(#[from] IdentityKeyError),
    #[error("document id {0} does not match the published DID")]
    IdMismatch(Did),
    #[error(transparent)]
    Wire(#[from] WireError),
    #[error(transparent)]
    Record(#[from] Bep44Error),
    #[error(transparent)]
    Relay(#[from] RelayError),
}

/// A successfully resolved record.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub document: Document,
    pub seq: i64,
}

pub struct MethodDidDht {
    relay: RelayClient,
    /// Last published sequence number per identity key.
    seqs: Mutex<HashMap<[u8; 32], i64>>,
}

impl MethodDidDht {
    /// Creates a method using the default relay.
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_config(RelayConfig::default())
    }

    pub fn from_config(config: RelayConfig) -> Result<Self, ConfigError> {
        let mut builder = ClientBuilder::new();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder.build()?;
        let url = Url::parse(&config.url)?;

        Ok(Self::with_client(client, url))
    }

    pub fn with_client(client: Client, url: Url) -> Self {
        Self {
            relay: RelayClient::new(client, url),
            seqs: Mutex::default(),
        }
    }

    pub fn relay(&self) -> &RelayClient {
        &self.relay
    }

    /// Fetches, verifies, and decodes the document published for `did`.
    pub async fn resolve_document(&self, did: &Did) -> Result<Resolved, ResolveError> {
        let identity_key = identity_key(did)?;

        let bytes = self.relay.get(&did.method_id.0).await?;

        let record = Bep44Record::from_wire(identity_key.to_vec(), &bytes)?;
        record.verify()?;

        let document = document::decode_document(&record.payload, did)?;

        if document.id != *did {
            return Err(ResolveError::IdMismatch(document.id));
        }

        Ok(Resolved {
            document,
            seq: record.seq,
        })
    }

    /// Signs and publishes a document, returning the sequence number used.
    ///
    /// Sequence numbers are the current unix time in seconds, raised when
    /// needed to stay strictly increasing across publishes from this method.
    pub async fn publish(
        &self,
        did: &Did,
        document: &Document,
        signer: &impl Signer,
    ) -> Result<i64, PublishError> {
        let identity_key = identity_key(did)?;

        if document.id != *did {
            return Err(PublishError::IdMismatch(document.id.clone()));
        }

        let payload = document::encode_document(document)?;
        let seq = self.next_seq(identity_key);

        let record = Bep44Record::sign(payload, seq, identity_key.to_vec(), signer)?;
        record.verify()?;

        if let Err(e) = self.relay.put(&did.method_id.0, record.to_wire()).await {
            warn!("Failed to publish {did}: {e}");
            return Err(e.into());
        }

        debug!("Published {did} with seq {seq}");

        Ok(seq)
    }

    fn next_seq(&self, identity_key: [u8; 32]) -> i64 {
        let now = OffsetDateTime::now_utc().unix_timestamp();

        let mut seqs = self.seqs.lock().unwrap_or_else(PoisonError::into_inner);

        let seq = match seqs.get(&identity_key) {
            Some(last) => now.max(last.saturating_add(1)),
            None => now,
        };
        seqs.insert(identity_key, seq);

        seq
    }
}

/// The Ed25519 public key a did:dht identifier encodes.
pub fn identity_key(did: &Did) -> Result<[u8; 32], IdentityKeyError> {
    if did.method_name.0 != NAME {
        return Err(IdentityKeyError::MethodName);
    }

    let bytes = Base::Base32Z.decode(&did.method_id.0)?;
    bytes
        .try_into()
        .map_err(|bytes: Vec<u8>| IdentityKeyError::Length(bytes.len()))
}

impl Method for MethodDidDht {
    fn method_name(&self) -> &'static str {
        NAME
    }

    fn resolve<'a>(&'a self, did: &'a Did) -> ResolveFuture<'a> {
        Box::pin(async move {
            match self.resolve_document(did).await {
                Ok(resolved) => ResolutionResult::ok(
                    resolved.document,
                    DocumentMetadata {
                        version_id: Some(resolved.seq.to_string()),
                    },
                ),
                Err(e) => {
                    debug!("Failed to resolve {did}: {e}");
                    ResolutionError::InvalidDid.into()
                }
            }
        })
    }
}
