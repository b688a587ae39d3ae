use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use thiserror::Error;

use crate::document::Document;

/// [DID resolution result](https://www.w3.org/TR/did-core/#did-resolution).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ResolutionResult {
    #[serde(rename = "didResolutionMetadata")]
    pub resolution_metadata: ResolutionMetadata,
    #[serde(rename = "didDocument")]
    pub document: Option<Document>,
    #[serde(rename = "didDocumentMetadata", default)]
    pub document_metadata: DocumentMetadata,
}

impl ResolutionResult {
    pub fn ok(document: Document, document_metadata: DocumentMetadata) -> Self {
        Self {
            resolution_metadata: ResolutionMetadata::default(),
            document: Some(document),
            document_metadata,
        }
    }

    pub fn error(error: ResolutionError) -> Self {
        Self {
            resolution_metadata: ResolutionMetadata { error: Some(error) },
            document: None,
            document_metadata: DocumentMetadata::default(),
        }
    }

    /// The resolved document, or the resolution error code.
    pub fn into_document(self) -> Result<Document, ResolutionError> {
        match (self.resolution_metadata.error, self.document) {
            (Some(e), _) => Err(e),
            (None, Some(doc)) => Ok(doc),
            (None, None) => Err(ResolutionError::NotFound),
        }
    }
}

impl From<ResolutionError> for ResolutionResult {
    fn from(value: ResolutionError) -> Self {
        Self::error(value)
    }
}

#[skip_serializing_none]
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionMetadata {
    pub error: Option<ResolutionError>,
}

#[skip_serializing_none]
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    pub version_id: Option<String>,
}

/// [Error codes](https://www.w3.org/TR/did-spec-registries/#error) surfaced at
/// the resolution boundary.
#[derive(Error, Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ResolutionError {
    #[error("invalidDid")]
    InvalidDid,
    #[error("invalidDidUrl")]
    InvalidDidUrl,
    #[error("notFound")]
    NotFound,
    #[error("methodNotSupported")]
    MethodNotSupported,
    #[error("representationNotSupported")]
    RepresentationNotSupported,
    #[error("invalidDidDocument")]
    InvalidDidDocument,
    #[error("internalError")]
    InternalError,
}
