//! [Bencode](https://www.bittorrent.org/beps/bep_0003.html#bencoding) values.
//!
//! Dictionaries are kept in a [BTreeMap], so keys are always emitted in
//! lexicographic byte order and the encoding of a value is canonical.

use std::collections::BTreeMap;

use thiserror::Error;

/// Deepest list or dictionary nesting accepted by [decode].
pub const MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Bytes(Vec<u8>),
    Integer(i64),
    List(Vec<Value>),
    Dict(BTreeMap<Vec<u8>, Value>),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BencodeError {
    #[error("malformed bencode: unexpected end of input")]
    UnexpectedEof,
    #[error("malformed bencode: missing terminator")]
    MissingTerminator,
    #[error("malformed bencode: invalid length prefix")]
    InvalidLength,
    #[error("malformed bencode: invalid integer")]
    InvalidInteger,
    #[error("malformed bencode: unexpected byte {0:#04x}")]
    UnexpectedByte(u8),
    #[error("malformed bencode: trailing bytes after value")]
    TrailingBytes,
    #[error("malformed bencode: nesting exceeds 64 levels")]
    TooDeep,
}

impl Value {
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&BTreeMap<Vec<u8>, Value>> {
        match self {
            Value::Dict(v) => Some(v),
            _ => None,
        }
    }
}

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Value::Bytes(value.to_vec())
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Bytes(value.as_bytes().to_vec())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

pub fn encode(value: &Value) -> Vec<u8> {
    let mut out = Vec::new();
    encode_into(value, &mut out);
    out
}

fn encode_into(value: &Value, out: &mut Vec<u8>) {
    match value {
        Value::Bytes(bytes) => encode_bytes(bytes, out),
        Value::Integer(i) => {
            out.push(b'i');
            out.extend(i.to_string().as_bytes());
            out.push(b'e');
        }
        Value::List(items) => {
            out.push(b'l');
            for item in items {
                encode_into(item, out);
            }
            out.push(b'e');
        }
        Value::Dict(entries) => {
            out.push(b'd');
            for (key, item) in entries {
                encode_bytes(key, out);
                encode_into(item, out);
            }
            out.push(b'e');
        }
    }
}

fn encode_bytes(bytes: &[u8], out: &mut Vec<u8>) {
    out.extend(bytes.len().to_string().as_bytes());
    out.push(b':');
    out.extend(bytes);
}

/// Decodes exactly one value, rejecting any trailing input.
pub fn decode(input: &[u8]) -> Result<Value, BencodeError> {
    let (value, rest) = decode_value(input, 0)?;

    if !rest.is_empty() {
        return Err(BencodeError::TrailingBytes);
    }

    Ok(value)
}

/// Decodes one value from the front of `input`, returning it with the
/// remaining bytes. `depth` counts the enclosing lists and dictionaries.
fn decode_value(input: &[u8], depth: usize) -> Result<(Value, &[u8]), BencodeError> {
    let (&first, rest) = input.split_first().ok_or(BencodeError::UnexpectedEof)?;

    if matches!(first, b'l' | b'd') && depth >= MAX_DEPTH {
        return Err(BencodeError::TooDeep);
    }

    match first {
        b'i' => {
            let end = find_terminator(rest, b'e')?;
            let i = parse_integer(&rest[..end])?;
            Ok((Value::Integer(i), &rest[end + 1..]))
        }
        b'l' => {
            let mut items = Vec::new();
            let mut rest = rest;

            loop {
                match rest.first() {
                    None => return Err(BencodeError::MissingTerminator),
                    Some(b'e') => return Ok((Value::List(items), &rest[1..])),
                    Some(_) => {
                        let (item, next) = decode_value(rest, depth + 1)?;
                        items.push(item);
                        rest = next;
                    }
                }
            }
        }
        b'd' => {
            let mut entries = BTreeMap::new();
            let mut rest = rest;

            loop {
                match rest.first() {
                    None => return Err(BencodeError::MissingTerminator),
                    Some(b'e') => return Ok((Value::Dict(entries), &rest[1..])),
                    Some(_) => {
                        let (key, next) = decode_bytes(rest)?;
                        let (item, next) = decode_value(next, depth + 1)?;
                        entries.insert(key, item);
                        rest = next;
                    }
                }
            }
        }
        b'0'..=b'9' => {
            let (bytes, rest) = decode_bytes(input)?;
            Ok((Value::Bytes(bytes), rest))
        }
        other => Err(BencodeError::UnexpectedByte(other)),
    }
}

fn decode_bytes(input: &[u8]) -> Result<(Vec<u8>, &[u8]), BencodeError> {
    let colon = find_terminator(input, b':')?;
    let digits = &input[..colon];

    if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
        return Err(BencodeError::InvalidLength);
    }

    let len: usize = std::str::from_utf8(digits)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or(BencodeError::InvalidLength)?;

    let body = &input[colon + 1..];
    if body.len() < len {
        return Err(BencodeError::UnexpectedEof);
    }

    Ok((body[..len].to_vec(), &body[len..]))
}

fn find_terminator(input: &[u8], terminator: u8) -> Result<usize, BencodeError> {
    input
        .iter()
        .position(|b| *b == terminator)
        .ok_or(BencodeError::MissingTerminator)
}

fn parse_integer(digits: &[u8]) -> Result<i64, BencodeError> {
    let s = std::str::from_utf8(digits).map_err(|_| BencodeError::InvalidInteger)?;
    let unsigned = s.strip_prefix('-').unwrap_or(s);

    // Leading zeros and negative zero are not allowed.
    if unsigned.is_empty()
        || !unsigned.bytes().all(|b| b.is_ascii_digit())
        || (unsigned.len() > 1 && unsigned.starts_with('0'))
        || s == "-0"
    {
        return Err(BencodeError::InvalidInteger);
    }

    s.parse().map_err(|_| BencodeError::InvalidInteger)
}
