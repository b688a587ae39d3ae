//! Mapping between a [Document] and the DNS TXT records stored in a did:dht
//! record.
//!
//! ```text
//! _did.      v=1;id=did:dht:<id>;vm=k0,k1;auth=k0;asm=k0,k1;srv=s0
//! _k0._did.  id=0;t=0;k=<base64url key>
//! _k1._did.  id=1;t=1;k=<base64url key>;c=did:example:controller
//! _s0._did.  id=dwn;t=DecentralizedWebNode;se=https://dwn.example.org
//! ```

use std::collections::{BTreeMap, HashMap, HashSet};

use base64::{Engine, prelude::BASE64_URL_SAFE_NO_PAD};
use thiserror::Error;
use tracing::debug;
use url::Url;
use xdid_core::{
    did::{Did, ParseError},
    document::{Document, Purpose, Service, VerificationMethod},
};

use crate::{
    dns::{self, PacketError, TxtRecord},
    keys::{self, KeyError, KeyType, VERIFICATION_METHOD_TYPE},
};

const VERSION: &str = "1";

const ROOT: &str = "_did.";
const CONTROLLER: &str = "_cnt._did.";
const ALSO_KNOWN_AS: &str = "_aka._did.";

const RELATIONSHIPS: [(Purpose, &str); 5] = [
    (Purpose::Authentication, "auth"),
    (Purpose::AssertionMethod, "asm"),
    (Purpose::KeyAgreement, "agm"),
    (Purpose::CapabilityInvocation, "inv"),
    (Purpose::CapabilityDelegation, "del"),
];

#[derive(Error, Debug)]
pub enum WireError {
    #[error(transparent)]
    Packet(#[from] PacketError),
    #[error(transparent)]
    Key(#[from] KeyError),
    #[error(transparent)]
    Did(#[from] ParseError),
    #[error("missing root record")]
    MissingRootRecord,
    #[error("record {0} is missing field {1}")]
    MissingField(String, &'static str),
    #[error("malformed field in record {0}: {1}")]
    MalformedField(String, String),
    #[error("unsupported version: {0}")]
    UnsupportedVersion(String),
    #[error("invalid service endpoint: {0}")]
    InvalidServiceEndpoint(String),
    #[error("relationship references unknown verification method: {0}")]
    UnknownVerificationMethod(String),
    #[error("value contains a reserved character: {0}")]
    ReservedCharacter(String),
}

/// Encodes a document into a DNS message.
pub fn encode_document(document: &Document) -> Result<Vec<u8>, WireError> {
    let records = to_records(document)?;
    Ok(dns::encode_packet(&records)?)
}

/// Decodes a document from a DNS message published for `did`.
/// The root record's `id` field, when present, takes precedence.
pub fn decode_document(packet: &[u8], did: &Did) -> Result<Document, WireError> {
    let records = dns::decode_packet(packet)?;
    from_records(&records, did)
}

pub fn to_records(document: &Document) -> Result<Vec<TxtRecord>, WireError> {
    let did = &document.id;
    let methods = &document.verification_method;

    // Dense keys are numbered by id, so the numbering does not depend on
    // declaration order.
    let mut by_id: Vec<usize> = (0..methods.len()).collect();
    by_id.sort_by(|a, b| methods[*a].id.cmp(&methods[*b].id));

    let mut dense = vec![0; methods.len()];
    for (key, index) in by_id.iter().enumerate() {
        dense[*index] = key;
    }

    let key_of = |id: &str| {
        methods
            .iter()
            .position(|vm| vm.id == id)
            .map(|index| format!("k{}", dense[index]))
            .ok_or_else(|| WireError::UnknownVerificationMethod(id.to_string()))
    };

    let mut fields = vec![format!("v={VERSION}"), format!("id={did}")];

    let vm = dense.iter().map(|k| format!("k{k}")).collect::<Vec<_>>();
    push_list(&mut fields, "vm", &vm);

    for (purpose, name) in RELATIONSHIPS {
        let keys = document
            .relationship(purpose)
            .iter()
            .map(|id| key_of(id))
            .collect::<Result<Vec<_>, _>>()?;
        push_list(&mut fields, name, &keys);
    }

    let srv = (0..document.service.len())
        .map(|i| format!("s{i}"))
        .collect::<Vec<_>>();
    push_list(&mut fields, "srv", &srv);

    let cnt = document
        .controller
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>();
    push_list(&mut fields, "cnt", &cnt);

    for aka in &document.also_known_as {
        reserved(aka, true)?;
    }
    push_list(&mut fields, "aka", &document.also_known_as);

    let mut records = vec![TxtRecord::new(ROOT, fields.join(";"))];

    for (key, index) in by_id.iter().enumerate() {
        let vm = &methods[*index];
        let (key_type, raw) = keys::jwk_to_raw(&vm.public_key_jwk)?;

        let mut fields = vec![
            format!("id={}", reserved(shorten_id(did, &vm.id), false)?),
            format!("t={}", key_type.index()),
            format!("k={}", BASE64_URL_SAFE_NO_PAD.encode(raw)),
        ];

        if vm.controller != *did {
            fields.push(format!("c={}", vm.controller));
        }

        records.push(TxtRecord::new(format!("_k{key}.{ROOT}"), fields.join(";")));
    }

    for (key, service) in document.service.iter().enumerate() {
        for endpoint in &service.service_endpoint {
            reserved(endpoint, true)?;
        }

        let fields = [
            format!("id={}", reserved(shorten_id(did, &service.id), false)?),
            format!("t={}", reserved(&service.typ, false)?),
            format!("se={}", service.service_endpoint.join(",")),
        ];

        records.push(TxtRecord::new(format!("_s{key}.{ROOT}"), fields.join(";")));
    }

    Ok(records)
}

pub fn from_records(records: &[TxtRecord], did: &Did) -> Result<Document, WireError> {
    let mut owners = BTreeMap::<String, String>::new();
    for record in records {
        owners
            .entry(normalize_owner(&record.name))
            .or_default()
            .push_str(&record.text);
    }

    let root = owners.get(ROOT).ok_or(WireError::MissingRootRecord)?;
    let root = Fields::parse(ROOT, root)?;

    if let Some(version) = root.get("v") {
        if version != VERSION {
            return Err(WireError::UnsupportedVersion(version.to_string()));
        }
    }

    let did = match root.get("id") {
        Some(id) => id.parse::<Did>()?,
        None => did.clone(),
    };
    let mut document = Document::new(did.clone());

    let controllers = list(root.get("cnt")).chain(list(owners.get(CONTROLLER).map(String::as_str)));
    for controller in controllers {
        document.controller.push(controller.parse()?);
    }

    document.also_known_as = list(root.get("aka"))
        .chain(list(owners.get(ALSO_KNOWN_AS).map(String::as_str)))
        .map(str::to_string)
        .collect();

    let mut relationships = HashMap::<&str, Vec<Purpose>>::new();
    for (purpose, name) in RELATIONSHIPS {
        for key in list(root.get(name)) {
            let entry = relationships.entry(key).or_default();
            if !entry.contains(&purpose) {
                entry.push(purpose);
            }
        }
    }

    let methods = ordered(list(root.get("vm")), 'k', &owners);
    for (index, owner, text) in methods {
        let vm = decode_method(&did, owner, text)?;
        let purposes = relationships
            .get(format!("k{index}").as_str())
            .map(Vec::as_slice)
            .unwrap_or_default();

        document.add_verification_method(vm, purposes);
    }

    let services = ordered(list(root.get("srv")), 's', &owners);
    for (_, owner, text) in services {
        document.add_service(decode_service(&did, owner, text)?);
    }

    Ok(document)
}

fn decode_method(did: &Did, owner: &str, text: &str) -> Result<VerificationMethod, WireError> {
    let fields = Fields::parse(owner, text)?;

    let index = fields
        .require("t")?
        .parse::<u8>()
        .map_err(|_| KeyError::MalformedPublicKey)?;
    let key_type = KeyType::from_index(index).ok_or(KeyError::MalformedPublicKey)?;

    let raw = BASE64_URL_SAFE_NO_PAD
        .decode(fields.require("k")?)
        .map_err(|_| KeyError::MalformedPublicKey)?;

    let controller = match fields.get("c") {
        Some(c) => c.parse()?,
        None => did.clone(),
    };

    Ok(VerificationMethod {
        id: expand_id(did, fields.require("id")?),
        typ: VERIFICATION_METHOD_TYPE.to_string(),
        controller,
        public_key_jwk: keys::raw_to_jwk(key_type, &raw)?,
    })
}

fn decode_service(did: &Did, owner: &str, text: &str) -> Result<Service, WireError> {
    let fields = Fields::parse(owner, text)?;

    let service_endpoint = fields
        .require("se")?
        .split(',')
        .map(|endpoint| match Url::parse(endpoint) {
            Ok(_) => Ok(endpoint.to_string()),
            Err(_) => Err(WireError::InvalidServiceEndpoint(endpoint.to_string())),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Service {
        id: expand_id(did, fields.require("id")?),
        typ: fields.require("t")?.to_string(),
        service_endpoint,
    })
}

/// Orders the `_k*` or `_s*` records: first as listed in the root record,
/// then any unlisted records by index.
fn ordered<'a>(
    listed: impl Iterator<Item = &'a str>,
    prefix: char,
    owners: &'a BTreeMap<String, String>,
) -> Vec<(usize, &'a str, &'a str)> {
    let mut records = BTreeMap::new();
    for (owner, text) in owners {
        if let Some(index) = dense_index(owner, prefix) {
            records.insert(index, (owner.as_str(), text.as_str()));
        }
    }

    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(records.len());

    for key in listed {
        let index = key
            .strip_prefix(prefix)
            .and_then(|i| i.parse::<usize>().ok());

        match index.and_then(|i| records.get(&i).map(|r| (i, r))) {
            Some((i, (owner, text))) => {
                if seen.insert(i) {
                    out.push((i, *owner, *text));
                }
            }
            None => debug!("no record for listed key {key}"),
        }
    }

    for (i, (owner, text)) in records {
        if seen.insert(i) {
            out.push((i, owner, text));
        }
    }

    out
}

/// `_k3._did.` -> 3
fn dense_index(owner: &str, prefix: char) -> Option<usize> {
    let index = owner
        .strip_suffix(ROOT)?
        .strip_prefix('_')?
        .strip_prefix(prefix)?
        .strip_suffix('.')?;

    if index.len() > 1 && index.starts_with('0') {
        return None;
    }

    index.parse().ok()
}

/// Drops any labels after `_did`, so `_k0._did.<id>.` becomes `_k0._did.`.
fn normalize_owner(name: &str) -> String {
    let labels = name.trim_end_matches('.').split('.').collect::<Vec<_>>();

    match labels.iter().position(|l| *l == "_did") {
        Some(pos) => format!("{}.", labels[..=pos].join(".")),
        None => name.to_string(),
    }
}

/// `<did>#frag` -> `frag`. Other ids are written unchanged.
fn shorten_id<'a>(did: &Did, id: &'a str) -> &'a str {
    let prefix = format!("{did}#");

    match id.strip_prefix(&prefix) {
        Some(frag) if !frag.is_empty() && !frag.contains(':') && !frag.starts_with('#') => frag,
        _ => id,
    }
}

fn expand_id(did: &Did, id: &str) -> String {
    if id.starts_with('#') || id.contains(':') {
        id.to_string()
    } else {
        format!("{did}#{id}")
    }
}

fn reserved(value: &str, in_list: bool) -> Result<&str, WireError> {
    if value.contains(';') || (in_list && value.contains(',')) {
        return Err(WireError::ReservedCharacter(value.to_string()));
    }
    Ok(value)
}

fn push_list(fields: &mut Vec<String>, name: &str, values: &[String]) {
    if !values.is_empty() {
        fields.push(format!("{name}={}", values.join(",")));
    }
}

fn list(value: Option<&str>) -> impl Iterator<Item = &str> {
    value
        .unwrap_or_default()
        .split(',')
        .filter(|v| !v.is_empty())
}

/// `key=value` pairs of a single record.
struct Fields<'a> {
    owner: &'a str,
    entries: Vec<(&'a str, &'a str)>,
}

impl<'a> Fields<'a> {
    fn parse(owner: &'a str, text: &'a str) -> Result<Self, WireError> {
        let entries = text
            .split(';')
            .filter(|f| !f.is_empty())
            .map(|f| {
                f.split_once('=')
                    .ok_or_else(|| WireError::MalformedField(owner.to_string(), f.to_string()))
            })
            .collect::<Result<_, _>>()?;

        Ok(Self { owner, entries })
    }

    fn get(&self, key: &str) -> Option<&'a str> {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| *v)
    }

    fn require(&self, key: &'static str) -> Result<&'a str, WireError> {
        self.get(key)
            .ok_or_else(|| WireError::MissingField(self.owner.to_string(), key))
    }
}

#[cfg(test)]
mod tests {
    use jose_jwk::Jwk;
    use k256::elliptic_curve::sec1::ToEncodedPoint;

    use super::*;
    use crate::keys::DidDhtKeyPair;

    fn pair(seed: u8) -> DidDhtKeyPair {
        DidDhtKeyPair::from_secret_bytes(&[seed; 32])
    }

    fn did() -> Did {
        pair(7).to_did()
    }

    fn key(seed: u8) -> String {
        BASE64_URL_SAFE_NO_PAD.encode(pair(seed).public_bytes())
    }

    fn decode(records: Vec<TxtRecord>) -> Result<Document, WireError> {
        let packet = dns::encode_packet(&records).unwrap();
        decode_document(&packet, &did())
    }

    #[test]
    fn test_single_key_round_trip() {
        let document = pair(7).to_document().unwrap();

        let decoded = decode_document(&encode_document(&document).unwrap(), &did()).unwrap();
        assert_eq!(decoded, document);

        let id = format!("{}#0", did());
        assert_eq!(decoded.verification_method[0].id, id);
        assert_eq!(decoded.authentication, vec![id.clone()]);
        assert_eq!(decoded.assertion_method, vec![id.clone()]);
        assert_eq!(decoded.capability_invocation, vec![id.clone()]);
        assert_eq!(decoded.capability_delegation, vec![id]);
    }

    #[test]
    fn test_records() {
        let did = did();
        let records = to_records(&pair(7).to_document().unwrap()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "_did.");
        assert_eq!(
            records[0].text,
            format!("v=1;id={did};vm=k0;auth=k0;asm=k0;inv=k0;del=k0")
        );
        assert_eq!(records[1].name, "_k0._did.");
        assert_eq!(records[1].text, format!("id=0;t=0;k={}", key(7)));
        assert!(records.iter().all(|r| r.ttl == 7200));
    }

    #[test]
    fn test_full_round_trip() {
        let did = did();
        let mut document = Document::new(did.clone());
        document.controller = vec!["did:example:controller".parse().unwrap()];
        document.also_known_as = vec!["https://example.org/alice".to_string()];

        let secp = k256::SecretKey::from_slice(&[9; 32]).unwrap();
        let secp = secp.public_key().to_encoded_point(true);

        // Declared out of id order, so dense keys differ from positions.
        document.add_verification_method(
            VerificationMethod {
                id: format!("{did}#signing"),
                typ: VERIFICATION_METHOD_TYPE.to_string(),
                controller: "did:example:controller".parse().unwrap(),
                public_key_jwk: keys::raw_to_jwk(KeyType::Secp256k1, secp.as_bytes()).unwrap(),
            },
            &[Purpose::AssertionMethod, Purpose::KeyAgreement],
        );
        document.add_verification_method(
            VerificationMethod {
                id: format!("{did}#0"),
                typ: VERIFICATION_METHOD_TYPE.to_string(),
                controller: did.clone(),
                public_key_jwk: keys::raw_to_jwk(KeyType::Ed25519, &pair(7).public_bytes())
                    .unwrap(),
            },
            &[Purpose::AssertionMethod, Purpose::Authentication],
        );
        document.add_service(Service {
            id: format!("{did}#dwn"),
            typ: "DecentralizedWebNode".to_string(),
            service_endpoint: vec![
                "https://dwn.example.org/dwn".to_string(),
                "https://backup.example.org".to_string(),
            ],
        });

        let records = to_records(&document).unwrap();
        assert_eq!(
            records[0].text,
            format!(
                "v=1;id={did};vm=k1,k0;auth=k0;asm=k1,k0;agm=k1;srv=s0;\
                 cnt=did:example:controller;aka=https://example.org/alice"
            )
        );
        assert_eq!(
            records[2].text,
            format!(
                "id=signing;t=1;k={};c=did:example:controller",
                BASE64_URL_SAFE_NO_PAD.encode(secp.as_bytes())
            )
        );
        assert_eq!(
            records[3].text,
            "id=dwn;t=DecentralizedWebNode;se=https://dwn.example.org/dwn,https://backup.example.org"
        );

        let decoded = decode_document(&encode_document(&document).unwrap(), &did).unwrap();
        assert_eq!(decoded, document);
    }

    #[test]
    fn test_multi_key_out_of_order() {
        let did = did();
        let document = decode(vec![
            TxtRecord::new(
                "_did.",
                format!("v=1;id={did};vm=k0,k1,k2;auth=k0;asm=k1;inv=k2;del=k0"),
            ),
            TxtRecord::new("_k0._did.", format!("id=0;t=0;k={}", key(1))),
            TxtRecord::new("_k2._did.", format!("id=2;t=0;k={}", key(3))),
            TxtRecord::new("_k1._did.", format!("id=1;t=0;k={}", key(2))),
        ])
        .unwrap();

        let ids = document
            .verification_method
            .iter()
            .map(|vm| vm.id.clone())
            .collect::<Vec<_>>();
        assert_eq!(
            ids,
            vec![format!("{did}#0"), format!("{did}#1"), format!("{did}#2")]
        );

        assert_eq!(document.authentication, vec![format!("{did}#0")]);
        assert_eq!(document.assertion_method, vec![format!("{did}#1")]);
        assert_eq!(document.capability_invocation, vec![format!("{did}#2")]);
        assert_eq!(document.capability_delegation, vec![format!("{did}#0")]);
        assert!(document.key_agreement.is_empty());

        let (_, raw) = keys::jwk_to_raw(&document.verification_method[2].public_key_jwk).unwrap();
        assert_eq!(raw, pair(3).public_bytes());
    }

    #[test]
    fn test_unlisted_keys() {
        let did = did();
        let document = decode(vec![
            TxtRecord::new("_did.", format!("v=1;id={did};vm=k1;auth=k3")),
            TxtRecord::new("_k3._did.", format!("id=three;t=0;k={}", key(3))),
            TxtRecord::new("_k1._did.", format!("id=one;t=0;k={}", key(1))),
        ])
        .unwrap();

        assert_eq!(document.verification_method.len(), 2);
        assert_eq!(document.verification_method[0].id, format!("{did}#one"));
        assert_eq!(document.verification_method[1].id, format!("{did}#three"));
        assert_eq!(document.authentication, vec![format!("{did}#three")]);
    }

    #[test]
    fn test_service_endpoint() {
        let did = did();
        let service = |se: &str| {
            decode(vec![
                TxtRecord::new("_did.", format!("v=1;id={did};srv=s0")),
                TxtRecord::new("_s0._did.", format!("id=dwn;t=DecentralizedWebNode;se={se}")),
            ])
        };

        assert!(matches!(
            service("not a uri"),
            Err(WireError::InvalidServiceEndpoint(_))
        ));
        assert!(matches!(
            service("https://dwn.example.org/dwn,"),
            Err(WireError::InvalidServiceEndpoint(_))
        ));

        let document = service("https://dwn.example.org/dwn").unwrap();
        assert_eq!(document.service.len(), 1);
        assert_eq!(document.service[0].id, format!("{did}#dwn"));
        assert_eq!(document.service[0].typ, "DecentralizedWebNode");
        assert_eq!(
            document.service[0].service_endpoint,
            vec!["https://dwn.example.org/dwn"]
        );
    }

    #[test]
    fn test_owner_suffix() {
        let did = did();
        let suffix = &did.method_id.0;

        let document = decode(vec![
            TxtRecord::new(format!("_did.{suffix}."), format!("id={did};vm=k0;auth=k0")),
            TxtRecord::new(format!("_k0._did.{suffix}."), format!("id=0;t=0;k={}", key(7))),
        ])
        .unwrap();

        assert_eq!(document.verification_method.len(), 1);
        assert_eq!(document.authentication, vec![format!("{did}#0")]);
    }

    #[test]
    fn test_unknown_owners() {
        let did = did();
        let document = decode(vec![
            TxtRecord::new("_did.", format!("v=1;id={did}")),
            TxtRecord::new("_typ._did.", "id=7"),
            TxtRecord::new("_x.example.", "anything"),
        ])
        .unwrap();

        assert_eq!(document, Document::new(did));
    }

    #[test]
    fn test_controller_and_aka_records() {
        let did = did();
        let document = decode(vec![
            TxtRecord::new("_did.", format!("id={did};cnt=did:example:a;aka=urn:a")),
            TxtRecord::new("_cnt._did.", "did:example:b,did:example:c"),
            TxtRecord::new("_aka._did.", "urn:b"),
        ])
        .unwrap();

        let controllers = document
            .controller
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>();
        assert_eq!(
            controllers,
            vec!["did:example:a", "did:example:b", "did:example:c"]
        );
        assert_eq!(document.also_known_as, vec!["urn:a", "urn:b"]);
    }

    #[test]
    fn test_missing_root() {
        let result = decode(vec![TxtRecord::new("_k0._did.", "id=0;t=0;k=abc")]);
        assert!(matches!(result, Err(WireError::MissingRootRecord)));

        let result = decode(vec![TxtRecord::new("_did.", format!("v=2;id={}", did()))]);
        assert!(matches!(result, Err(WireError::UnsupportedVersion(_))));
    }

    #[test]
    fn test_root_without_id() {
        let did = did();
        let document = decode(vec![
            TxtRecord::new("_did.", "v=1;vm=k0;auth=k0"),
            TxtRecord::new("_k0._did.", format!("id=0;t=0;k={}", key(7))),
        ])
        .unwrap();

        assert_eq!(document.id, did);
        assert_eq!(document.verification_method[0].id, format!("{did}#0"));
        assert_eq!(document.verification_method[0].controller, did);
        assert_eq!(document.authentication, vec![format!("{did}#0")]);

        let other = pair(8).to_did();
        let document = decode(vec![TxtRecord::new("_did.", format!("v=1;id={other}"))]).unwrap();
        assert_eq!(document.id, other);
    }

    #[test]
    fn test_malformed_key() {
        let did = did();
        let method = |fields: &str| {
            decode(vec![
                TxtRecord::new("_did.", format!("id={did};vm=k0")),
                TxtRecord::new("_k0._did.", fields),
            ])
        };

        for fields in [
            "id=0;t=0;k=".to_string(),
            format!("id=0;t=9;k={}", key(1)),
            format!("id=0;t=x;k={}", key(1)),
            "id=0;t=0;k=AAAA".to_string(),
            "id=0;t=1;k=AAAA".to_string(),
            "id=0;t=0;k=!!".to_string(),
        ] {
            assert!(
                matches!(
                    method(&fields),
                    Err(WireError::Key(KeyError::MalformedPublicKey))
                ),
                "{fields}"
            );
        }

        assert!(matches!(
            method("id=0;t=0"),
            Err(WireError::MissingField(_, "k"))
        ));
        assert!(matches!(
            method("id=0;t"),
            Err(WireError::MalformedField(_, _))
        ));
    }

    #[test]
    fn test_unsupported_algorithm() {
        let did = did();
        let jwk: Jwk = serde_json::from_value(serde_json::json!({
            "kty": "OKP",
            "crv": "X25519",
            "x": "hSDwCYkwp1R0i33ctD73Wg2_Og0mOBr066SpjqqbTmo",
        }))
        .unwrap();

        let mut document = Document::new(did.clone());
        document.add_verification_method(
            VerificationMethod {
                id: format!("{did}#0"),
                typ: VERIFICATION_METHOD_TYPE.to_string(),
                controller: did,
                public_key_jwk: jwk,
            },
            &[Purpose::KeyAgreement],
        );

        assert!(matches!(
            encode_document(&document),
            Err(WireError::Key(KeyError::UnsupportedAlgorithm))
        ));
    }

    #[test]
    fn test_unknown_relationship_target() {
        let mut document = pair(7).to_document().unwrap();
        document.key_agreement.push("#missing".to_string());

        assert!(matches!(
            encode_document(&document),
            Err(WireError::UnknownVerificationMethod(_))
        ));
    }

    #[test]
    fn test_reserved_characters() {
        let mut document = pair(7).to_document().unwrap();
        document.also_known_as.push("a,b".to_string());

        assert!(matches!(
            encode_document(&document),
            Err(WireError::ReservedCharacter(_))
        ));
    }

    #[test]
    fn test_ids() {
        let did = did();

        assert_eq!(shorten_id(&did, &format!("{did}#0")), "0");
        assert_eq!(shorten_id(&did, "#0"), "#0");
        assert_eq!(
            shorten_id(&did, "did:example:other#0"),
            "did:example:other#0"
        );
        assert_eq!(shorten_id(&did, &format!("{did}#a:b")), format!("{did}#a:b"));

        assert_eq!(expand_id(&did, "0"), format!("{did}#0"));
        assert_eq!(expand_id(&did, "#0"), "#0");
        assert_eq!(expand_id(&did, "did:example:other#0"), "did:example:other#0");
    }

    #[test]
    fn test_normalize_owner() {
        assert_eq!(normalize_owner("_did."), "_did.");
        assert_eq!(normalize_owner("_k0._did.abc."), "_k0._did.");
        assert_eq!(normalize_owner("_did.abc"), "_did.");
        assert_eq!(normalize_owner("other.example."), "other.example.");

        assert_eq!(dense_index("_k12._did.", 'k'), Some(12));
        assert_eq!(dense_index("_k01._did.", 'k'), None);
        assert_eq!(dense_index("_s0._did.", 'k'), None);
        assert_eq!(dense_index("_cnt._did.", 's'), None);
    }
}
