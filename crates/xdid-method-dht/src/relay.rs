//! HTTP client for a [Pkarr](https://github.com/pubky/pkarr) relay.

use reqwest::{Client, StatusCode, Url, header::CONTENT_TYPE};
use thiserror::Error;

use crate::bep44::MAX_WIRE_LEN;

#[derive(Error, Debug)]
pub enum RelayError {
    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),
    #[error("relay responded with {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("relay response exceeds 1072 bytes")]
    TooLarge,
}

/// Stores and fetches BEP44 wire bytes by z-base-32 identifier.
#[derive(Debug, Clone)]
pub struct RelayClient {
    client: Client,
    url: Url,
}

impl RelayClient {
    pub fn new(client: Client, url: Url) -> Self {
        Self { client, url }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    fn endpoint(&self, id: &str) -> String {
        format!("{}/{id}", self.url.as_str().trim_end_matches('/'))
    }

    /// Fetches the wire bytes stored for `id`. Responses longer than a BEP44
    /// record are rejected without being read in full.
    pub async fn get(&self, id: &str) -> Result<Vec<u8>, RelayError> {
        let req = self.client.get(self.endpoint(id)).build()?;
        let mut res = self.client.execute(req).await?;

        let status = res.status();
        if status != StatusCode::OK {
            let body = res.text().await.unwrap_or_default();
            return Err(RelayError::Status { status, body });
        }

        if res
            .content_length()
            .is_some_and(|len| len > MAX_WIRE_LEN as u64)
        {
            return Err(RelayError::TooLarge);
        }

        let mut bytes = Vec::new();
        while let Some(chunk) = res.chunk().await? {
            if bytes.len() + chunk.len() > MAX_WIRE_LEN {
                return Err(RelayError::TooLarge);
            }
            bytes.extend_from_slice(&chunk);
        }

        Ok(bytes)
    }

    pub async fn put(&self, id: &str, bytes: Vec<u8>) -> Result<(), RelayError> {
        let req = self
            .client
            .put(self.endpoint(id))
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(bytes)
            .build()?;
        let res = self.client.execute(req).await?;

        let status = res.status();
        if status != StatusCode::OK {
            let body = res.text().await.unwrap_or_default();
            return Err(RelayError::Status { status, body });
        }

        Ok(())
    }
}
