use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    did::{Did, ParseError},
    uri::{is_param_char, is_pchar, is_pct_encoded_with, is_segment},
};

/// [DID URL](https://www.w3.org/TR/did-core/#did-url-syntax).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DidUrl {
    pub did: Did,
    /// [DID parameters](https://www.w3.org/TR/did-core/#did-parameters), in
    /// the order they appear. Keys are unique.
    pub params: Vec<(String, String)>,
    /// [DID path](https://www.w3.org/TR/did-core/#path). `path-abempty` component from
    /// [RFC 3986](https://www.rfc-editor.org/rfc/rfc3986#section-3.3).
    pub path_abempty: Option<String>,
    /// [DID query](https://www.w3.org/TR/did-core/#query). `query` component from
    /// [RFC 3986](https://www.rfc-editor.org/rfc/rfc3986#section-3.3).
    pub query: Option<String>,
    /// [DID fragment](https://www.w3.org/TR/did-core/#fragment). `fragment` component from
    /// [RFC 3986](https://www.rfc-editor.org/rfc/rfc3986#section-3.3).
    pub fragment: Option<String>,
}

impl DidUrl {
    /// Parses a DID URL, panicking if it is invalid.
    /// Intended for fixtures and tests.
    #[track_caller]
    pub fn must_parse(s: &str) -> Self {
        match Self::from_str(s) {
            Ok(v) => v,
            Err(e) => panic!("failed to parse DID URL {s:?}: {e}"),
        }
    }

    /// The value of the DID parameter `key`, if present.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

impl From<Did> for DidUrl {
    fn from(did: Did) -> Self {
        Self {
            did,
            params: Vec::new(),
            path_abempty: None,
            query: None,
            fragment: None,
        }
    }
}

impl Serialize for DidUrl {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DidUrl {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl Display for DidUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.did)?;

        for (key, value) in self.params.iter() {
            write!(f, ";{key}={value}")?;
        }

        if let Some(ref path) = self.path_abempty {
            f.write_str(path)?;
        }

        if let Some(ref query) = self.query {
            write!(f, "?{query}")?;
        }

        if let Some(ref fragment) = self.fragment {
            write!(f, "#{fragment}")?;
        }

        Ok(())
    }
}

impl FromStr for DidUrl {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let did_end = s.find([';', '/', '?', '#']).unwrap_or(s.len());
        let (did_str, mut rest) = s.split_at(did_end);

        let did = Did::from_str(did_str)?;

        let mut query = None;
        let mut fragment = None;

        if let Some((before_fragment, frag)) = rest.split_once('#') {
            if !is_query_or_fragment(frag) {
                return Err(ParseError::Fragment);
            }
            fragment = Some(frag.to_string());
            rest = before_fragment;
        }

        if let Some((before_query, qry)) = rest.split_once('?') {
            if !is_query_or_fragment(qry) {
                return Err(ParseError::Query);
            }
            query = Some(qry.to_string());
            rest = before_query;
        }

        let (params_str, path) = rest.split_at(rest.find('/').unwrap_or(rest.len()));

        // did-url = did path-abempty [ "?" query ] [ "#" fragment ], with
        // the did optionally followed by *( ";" param ).
        let mut params: Vec<(String, String)> = Vec::new();

        for param in params_str.split(';').skip(1) {
            let Some((key, value)) = param.split_once('=') else {
                return Err(ParseError::Param(param.to_string()));
            };

            if key.is_empty()
                || !is_pct_encoded_with(key, is_param_char)
                || !is_pct_encoded_with(value, is_param_char)
            {
                return Err(ParseError::Param(param.to_string()));
            }

            if params.iter().any(|(k, _)| k == key) {
                return Err(ParseError::DuplicateParam(key.to_string()));
            }

            params.push((key.to_string(), value.to_string()));
        }

        // path-abempty  = *( "/" segment )
        let path_abempty = if path.is_empty() {
            None
        } else {
            if !path.split('/').all(is_segment) {
                return Err(ParseError::Path);
            }

            Some(path.to_string())
        };

        Ok(DidUrl {
            did,
            params,
            path_abempty,
            query,
            fragment,
        })
    }
}

/// query = *( pchar / "/" / "?" ), fragment likewise.
fn is_query_or_fragment(value: &str) -> bool {
    is_pct_encoded_with(value, |c| is_pchar(c) || c == '/' || c == '?')
}
