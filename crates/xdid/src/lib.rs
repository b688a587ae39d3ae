//! Simple [DID](https://www.w3.org/TR/did-core/) library.
//!
//! ## Example
//!
//! ```no_run
//! use xdid::{methods::dht::keys::DidDhtKeyPair, resolver::DidResolver};
//!
//! #[tokio::main]
//! async fn main() {
//!     // Generate a new did:dht.
//!     let keys = DidDhtKeyPair::generate();
//!     let did = keys.to_did();
//!
//!     assert!(did.to_string().starts_with("did:dht:"));
//!
//!     // Resolve the DID document.
//!     let resolver = DidResolver::new().unwrap();
//!     let result = resolver.resolve(&did).await;
//!
//!     match result.into_document() {
//!         Ok(document) => assert_eq!(document.id, did),
//!         Err(e) => println!("{did} is not published: {e}"),
//!     }
//! }
//! ```

pub mod resolver;

pub mod core {
    pub use xdid_core::*;
}

pub mod methods {
    #[cfg(feature = "did-dht")]
    pub mod dht {
        pub use xdid_method_dht::*;
    }

    #[cfg(feature = "did-web")]
    pub mod web {
        pub use xdid_method_web::*;
    }
}
