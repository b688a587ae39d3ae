use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::uri::{is_idchar, is_pct_encoded_with};

/// Failure to parse a DID or DID URL. Every variant is a form of invalid DID syntax.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid DID syntax: missing \"did:\" prefix")]
    MissingPrefix,
    #[error("invalid DID syntax: method name must contain only lowercase letters and digits")]
    MethodName,
    #[error("invalid DID syntax: method-specific id contains invalid characters")]
    MethodId,
    #[error("invalid DID syntax: malformed parameter {0:?}")]
    Param(String),
    #[error("invalid DID syntax: duplicate parameter {0:?}")]
    DuplicateParam(String),
    #[error("invalid DID syntax: malformed path")]
    Path,
    #[error("invalid DID syntax: malformed query")]
    Query,
    #[error("invalid DID syntax: malformed fragment")]
    Fragment,
}

/// [DID](https://www.w3.org/TR/did-core/#did-syntax).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Did {
    pub method_name: MethodName,
    pub method_id: MethodId,
}

impl Display for Did {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "did:{}:{}", self.method_name.0, self.method_id.0)
    }
}

impl FromStr for Did {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s.strip_prefix("did:").ok_or(ParseError::MissingPrefix)?;
        let (method_name, method_specific_id) =
            rest.split_once(':').ok_or(ParseError::MethodId)?;

        Ok(Did {
            method_name: MethodName::from_str(method_name)?,
            method_id: MethodId::from_str(method_specific_id)?,
        })
    }
}

impl Serialize for Did {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Did {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodName(pub String);

impl FromStr for MethodName {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // method-name = 1*method-char
        if !s.is_empty()
            && s.chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        {
            Ok(MethodName(s.to_string()))
        } else {
            Err(ParseError::MethodName)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodId(pub String);

impl FromStr for MethodId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // method-specific-id = *( *idchar ":" ) 1*idchar
        let last_nonempty = s.rsplit(':').next().is_some_and(|v| !v.is_empty());

        if last_nonempty && s.split(':').all(|v| is_pct_encoded_with(v, is_idchar)) {
            Ok(MethodId(s.to_string()))
        } else {
            Err(ParseError::MethodId)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_did_example() {
        let did = Did {
            method_name: MethodName("example".to_string()),
            method_id: MethodId("1234-5678-abcdef".to_string()),
        };

        let serialized = did.to_string();
        assert_eq!(serialized, "did:example:1234-5678-abcdef");

        let deserialized = Did::from_str(&serialized).expect("deserialize failed");
        assert_eq!(deserialized, did);
    }

    #[test]
    fn test_colon_segments() {
        let did = Did::from_str("did:web:example.com%3A3000:user:alice").unwrap();
        assert_eq!(did.method_name.0, "web");
        assert_eq!(did.method_id.0, "example.com%3A3000:user:alice");
    }

    #[test]
    fn test_invalid() {
        assert_eq!(Did::from_str("dod:web:a"), Err(ParseError::MissingPrefix));
        assert_eq!(Did::from_str("did:Web:a"), Err(ParseError::MethodName));
        assert_eq!(Did::from_str("did::a"), Err(ParseError::MethodName));
        assert_eq!(Did::from_str("did:web"), Err(ParseError::MethodId));
        assert_eq!(Did::from_str("did:web:"), Err(ParseError::MethodId));
        assert_eq!(Did::from_str("did:web:a:"), Err(ParseError::MethodId));
        assert_eq!(Did::from_str("did:web:a b"), Err(ParseError::MethodId));
        assert_eq!(Did::from_str("did:web:%zz"), Err(ParseError::MethodId));
        assert_eq!(Did::from_str("did:web:%4"), Err(ParseError::MethodId));
    }

    #[test]
    fn test_serde_string() {
        let did = Did::from_str("did:dht:abc").unwrap();
        let value = serde_json::to_value(&did).unwrap();
        assert_eq!(value, serde_json::json!("did:dht:abc"));

        let back: Did = serde_json::from_value(value).unwrap();
        assert_eq!(back, did);
    }
}
