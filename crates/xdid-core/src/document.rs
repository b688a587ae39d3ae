use jose_jwk::Jwk;
use serde::{Deserialize, Serialize};
use serde_with::{OneOrMany, serde_as, skip_serializing_none};
use thiserror::Error;

use crate::{did::Did, did_url::DidUrl};

/// [DID document](https://www.w3.org/TR/did-core/#did-documents).
///
/// Relationship lists hold verification method ids, never the methods
/// themselves. A method may be referenced by any number of relationships.
#[serde_as]
#[skip_serializing_none]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(rename = "@context")]
    #[serde_as(as = "Option<OneOrMany<_>>")]
    pub context: Option<Vec<String>>,
    pub id: Did,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub also_known_as: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[serde_as(as = "OneOrMany<_>")]
    pub controller: Vec<Did>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub verification_method: Vec<VerificationMethod>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub service: Vec<Service>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assertion_method: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authentication: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub key_agreement: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub capability_invocation: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub capability_delegation: Vec<String>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    #[error("no matching verification method")]
    NoVerificationMethod,
}

impl Document {
    /// Creates an empty document for the given DID.
    pub fn new(id: Did) -> Self {
        Self {
            context: None,
            id,
            also_known_as: Vec::new(),
            controller: Vec::new(),
            verification_method: Vec::new(),
            service: Vec::new(),
            assertion_method: Vec::new(),
            authentication: Vec::new(),
            key_agreement: Vec::new(),
            capability_invocation: Vec::new(),
            capability_delegation: Vec::new(),
        }
    }

    /// Appends a verification method, referencing it from each of the given
    /// relationships. Duplicate ids are not checked.
    pub fn add_verification_method(&mut self, method: VerificationMethod, purposes: &[Purpose]) {
        for purpose in purposes {
            self.relationship_mut(*purpose).push(method.id.clone());
        }

        self.verification_method.push(method);
    }

    pub fn add_service(&mut self, service: Service) {
        self.service.push(service);
    }

    /// Verification method ids referenced by a relationship.
    pub fn relationship(&self, purpose: Purpose) -> &[String] {
        match purpose {
            Purpose::Authentication => &self.authentication,
            Purpose::AssertionMethod => &self.assertion_method,
            Purpose::KeyAgreement => &self.key_agreement,
            Purpose::CapabilityInvocation => &self.capability_invocation,
            Purpose::CapabilityDelegation => &self.capability_delegation,
        }
    }

    fn relationship_mut(&mut self, purpose: Purpose) -> &mut Vec<String> {
        match purpose {
            Purpose::Authentication => &mut self.authentication,
            Purpose::AssertionMethod => &mut self.assertion_method,
            Purpose::KeyAgreement => &mut self.key_agreement,
            Purpose::CapabilityInvocation => &mut self.capability_invocation,
            Purpose::CapabilityDelegation => &mut self.capability_delegation,
        }
    }

    pub fn verification_method(&self, id: &str) -> Option<&VerificationMethod> {
        self.verification_method.iter().find(|vm| vm.id == id)
    }

    /// Selects a verification method.
    /// Fragment-only ids must be made absolute by the caller before selecting by id.
    pub fn select_verification_method(
        &self,
        selector: &MethodSelector,
    ) -> Result<&VerificationMethod, DocumentError> {
        let id = match selector {
            MethodSelector::First => {
                return self
                    .verification_method
                    .first()
                    .ok_or(DocumentError::NoVerificationMethod);
            }
            MethodSelector::Purpose(purpose) => self
                .relationship(*purpose)
                .first()
                .ok_or(DocumentError::NoVerificationMethod)?,
            MethodSelector::Id(id) => id,
        };

        self.verification_method(id)
            .ok_or(DocumentError::NoVerificationMethod)
    }

    /// Returns the verification method that the provided [DidUrl] is
    /// referencing, restricted to a given [Purpose].
    pub fn resolve_verification_method(
        &self,
        url: &DidUrl,
        purpose: Purpose,
    ) -> Option<&VerificationMethod> {
        if url.did != self.id {
            return None;
        }

        let absolute = url.to_string();

        let id = self.relationship(purpose).iter().find(|id| {
            **id == absolute
                || id
                    .strip_prefix('#')
                    .is_some_and(|frag| url.fragment.as_deref() == Some(frag))
        })?;

        self.verification_method(id)
    }
}

/// [Verification relationship](https://www.w3.org/TR/did-core/#verification-relationships).
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum Purpose {
    Authentication,
    AssertionMethod,
    KeyAgreement,
    CapabilityInvocation,
    CapabilityDelegation,
}

/// How [Document::select_verification_method] picks a method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodSelector {
    /// The first verification method in the document.
    First,
    /// The method referenced first by a relationship.
    Purpose(Purpose),
    /// Exact id match.
    Id(String),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VerificationMethod {
    pub id: String,
    #[serde(rename = "type")]
    pub typ: String,
    pub controller: Did,
    pub public_key_jwk: Jwk,
}

#[serde_as]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: String,
    #[serde(rename = "type")]
    pub typ: String,
    #[serde_as(as = "OneOrMany<_>")]
    pub service_endpoint: Vec<String>,
}
