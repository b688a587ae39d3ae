use std::str::FromStr;

use thiserror::Error;
use tracing::debug;
use xdid_core::{Method, ResolutionError, did::Did, resolution::ResolutionResult};

/// Resolves DIDs using a fixed set of methods.
///
/// The set is chosen at construction and never changes, so a resolver can be
/// shared freely (e.g. behind an `Arc`).
pub struct DidResolver {
    methods: Vec<Box<dyn Method>>,
}

#[derive(Error, Debug)]
pub enum MethodError {
    #[cfg(feature = "did-dht")]
    #[error("failed to construct did:dht resolver: {0}")]
    DidDht(#[from] xdid_method_dht::ConfigError),
    #[cfg(feature = "did-web")]
    #[error("failed to construct did:web resolver: {0}")]
    DidWeb(#[from] xdid_method_web::reqwest::Error),
}

impl DidResolver {
    /// Creates a new resolver with all enabled methods.
    pub fn new() -> Result<Self, MethodError> {
        let methods: Vec<Box<dyn Method>> = vec![
            #[cfg(feature = "did-dht")]
            Box::new(xdid_method_dht::MethodDidDht::new()?),
            #[cfg(feature = "did-web")]
            Box::new(xdid_method_web::MethodDidWeb::new()?),
        ];

        Ok(Self::from_methods(methods))
    }

    /// Creates a resolver from a custom set of methods.
    /// If two methods share a name, the first one is used.
    pub fn from_methods(methods: Vec<Box<dyn Method>>) -> Self {
        Self { methods }
    }

    /// Names of the supported methods.
    pub fn method_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.methods.iter().map(|m| m.method_name())
    }

    pub async fn resolve(&self, did: &Did) -> ResolutionResult {
        let Some(method) = self
            .methods
            .iter()
            .find(|m| m.method_name() == did.method_name.0)
        else {
            debug!("No method for {did}");
            return ResolutionError::MethodNotSupported.into();
        };

        method.resolve(did).await
    }

    /// Parses and resolves a DID string.
    pub async fn resolve_str(&self, did: &str) -> ResolutionResult {
        match Did::from_str(did) {
            Ok(did) => self.resolve(&did).await,
            Err(e) => {
                debug!("Failed to parse {did}: {e}");
                ResolutionError::InvalidDid.into()
            }
        }
    }
}
