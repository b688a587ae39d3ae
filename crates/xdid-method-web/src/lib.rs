//! [xdid](https://github.com/unavi-xyz/xdid) implementation of [did:web](https://w3c-ccg.github.io/did-method-web/).

use reqwest::{Client, ClientBuilder};
use tracing::debug;
use xdid_core::{
    Method, ResolutionError, ResolveFuture,
    did::Did,
    document::Document,
    resolution::{DocumentMetadata, ResolutionResult},
};

pub use reqwest;

mod parse;

const NAME: &str = "web";

pub struct MethodDidWeb {
    client: Client,
}

impl MethodDidWeb {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = ClientBuilder::new().build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    async fn fetch(&self, did: &Did) -> Result<Document, ResolutionError> {
        if did.method_name.0 != NAME {
            return Err(ResolutionError::InvalidDid);
        }

        let url = parse::parse_url(did);

        let res = self.client.get(&url).send().await.map_err(|e| {
            debug!("Failed to fetch {url}: {e}");
            ResolutionError::InternalError
        })?;

        if !res.status().is_success() {
            debug!("{url} responded with {}", res.status());
            return Err(ResolutionError::NotFound);
        }

        let document = res.json::<Document>().await.map_err(|e| {
            debug!("Invalid document at {url}: {e}");
            ResolutionError::InvalidDidDocument
        })?;

        if document.id != *did {
            debug!("Document at {url} is for {}", document.id);
            return Err(ResolutionError::InvalidDidDocument);
        }

        Ok(document)
    }
}

impl Method for MethodDidWeb {
    fn method_name(&self) -> &'static str {
        NAME
    }

    fn resolve<'a>(&'a self, did: &'a Did) -> ResolveFuture<'a> {
        Box::pin(async move {
            match self.fetch(did).await {
                Ok(document) => ResolutionResult::ok(document, DocumentMetadata::default()),
                Err(e) => e.into(),
            }
        })
    }
}
