//! Core types for DID methods to implement.

use std::{future::Future, pin::Pin};

use did::Did;
use resolution::ResolutionResult;

pub mod did;
pub mod did_url;
pub mod document;
pub mod resolution;
mod uri;

pub use resolution::ResolutionError;

pub type ResolveFuture<'a> = Pin<Box<dyn Future<Output = ResolutionResult> + Send + 'a>>;

/// A DID method. Implementations must be safe to share between threads, as
/// resolvers call them concurrently.
pub trait Method: Send + Sync {
    fn method_name(&self) -> &'static str;

    /// Attempt to resolve the provided DID to its DID document.
    /// Failures are reported through the result's resolution metadata.
    fn resolve<'a>(&'a self, did: &'a Did) -> ResolveFuture<'a>;
}
