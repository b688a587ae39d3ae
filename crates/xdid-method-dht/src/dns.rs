//! Minimal DNS message codec, limited to what a did:dht payload needs:
//! a response carrying TXT records in its answer section.

use thiserror::Error;

pub const TTL: u32 = 7200;

const HEADER_LEN: usize = 12;
const TYPE_TXT: u16 = 16;
const CLASS_IN: u16 = 1;
/// QR (response) and AA (authoritative answer).
const FLAGS: u16 = 0x8400;

const MAX_LABEL_LEN: usize = 63;
const MAX_NAME_LEN: usize = 255;
const MAX_STRING_LEN: usize = 255;
const MAX_POINTER_HOPS: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxtRecord {
    /// Owner name, dot separated with a trailing dot (`_k0._did.`).
    pub name: String,
    pub ttl: u32,
    /// Character-strings of the record, concatenated.
    pub text: String,
}

impl TxtRecord {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ttl: TTL,
            text: text.into(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PacketError {
    #[error("packet truncated")]
    Truncated,
    #[error("label too long: {0}")]
    LabelTooLong(String),
    #[error("empty label in name: {0}")]
    EmptyLabel(String),
    #[error("name exceeds 255 bytes")]
    NameTooLong,
    #[error("compression pointer loop")]
    PointerLoop,
    #[error("too many records")]
    TooManyRecords,
    #[error("record data too long")]
    RecordTooLong,
    #[error("text is not valid UTF-8")]
    InvalidUtf8,
    #[error("unexpected label type {0:#04x}")]
    LabelType(u8),
}

/// Packs TXT records into the answer section of a DNS response with no
/// questions.
pub fn encode_packet(records: &[TxtRecord]) -> Result<Vec<u8>, PacketError> {
    let answers = u16::try_from(records.len()).map_err(|_| PacketError::TooManyRecords)?;

    let mut out = Vec::new();
    out.extend(0u16.to_be_bytes()); // id
    out.extend(FLAGS.to_be_bytes());
    out.extend(0u16.to_be_bytes()); // questions
    out.extend(answers.to_be_bytes());
    out.extend(0u16.to_be_bytes()); // authority
    out.extend(0u16.to_be_bytes()); // additional

    for record in records {
        write_name(&record.name, &mut out)?;
        out.extend(TYPE_TXT.to_be_bytes());
        out.extend(CLASS_IN.to_be_bytes());
        out.extend(record.ttl.to_be_bytes());

        let rdata = txt_rdata(&record.text);
        let len = u16::try_from(rdata.len()).map_err(|_| PacketError::RecordTooLong)?;
        out.extend(len.to_be_bytes());
        out.extend(rdata);
    }

    Ok(out)
}

fn write_name(name: &str, out: &mut Vec<u8>) -> Result<(), PacketError> {
    let trimmed = name.strip_suffix('.').unwrap_or(name);
    let mut len = 1;

    if !trimmed.is_empty() {
        for label in trimmed.split('.') {
            if label.is_empty() {
                return Err(PacketError::EmptyLabel(name.to_string()));
            }
            if label.len() > MAX_LABEL_LEN {
                return Err(PacketError::LabelTooLong(label.to_string()));
            }

            len += label.len() + 1;
            if len > MAX_NAME_LEN {
                return Err(PacketError::NameTooLong);
            }

            out.push(label.len() as u8);
            out.extend(label.as_bytes());
        }
    }

    out.push(0);
    Ok(())
}

/// Splits text into character-strings of at most 255 bytes.
fn txt_rdata(text: &str) -> Vec<u8> {
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len() + bytes.len() / MAX_STRING_LEN + 1);

    if bytes.is_empty() {
        out.push(0);
        return out;
    }

    for chunk in bytes.chunks(MAX_STRING_LEN) {
        out.push(chunk.len() as u8);
        out.extend(chunk);
    }

    out
}

/// Reads the TXT records from the answer section of a DNS message.
/// Questions are skipped, as are answers of any other type.
pub fn decode_packet(packet: &[u8]) -> Result<Vec<TxtRecord>, PacketError> {
    let mut reader = Reader { packet, pos: 0 };

    let header = reader.take(HEADER_LEN)?;
    let questions = u16::from_be_bytes([header[4], header[5]]);
    let answers = u16::from_be_bytes([header[6], header[7]]);

    for _ in 0..questions {
        reader.name()?;
        reader.take(4)?; // type, class
    }

    let mut records = Vec::new();

    for _ in 0..answers {
        let name = reader.name()?;
        let typ = reader.u16()?;
        let _class = reader.u16()?;
        let ttl = reader.u32()?;
        let len = reader.u16()? as usize;
        let rdata = reader.take(len)?;

        if typ != TYPE_TXT {
            continue;
        }

        records.push(TxtRecord {
            name,
            ttl,
            text: read_txt(rdata)?,
        });
    }

    Ok(records)
}

fn read_txt(mut rdata: &[u8]) -> Result<String, PacketError> {
    let mut text = Vec::with_capacity(rdata.len());

    while let Some((&len, rest)) = rdata.split_first() {
        let len = len as usize;
        if rest.len() < len {
            return Err(PacketError::Truncated);
        }

        text.extend(&rest[..len]);
        rdata = &rest[len..];
    }

    String::from_utf8(text).map_err(|_| PacketError::InvalidUtf8)
}

struct Reader<'a> {
    packet: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], PacketError> {
        let end = self.pos.checked_add(n).ok_or(PacketError::Truncated)?;
        let bytes = self
            .packet
            .get(self.pos..end)
            .ok_or(PacketError::Truncated)?;
        self.pos = end;
        Ok(bytes)
    }

    fn u16(&mut self) -> Result<u16, PacketError> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    fn u32(&mut self) -> Result<u32, PacketError> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Reads a possibly compressed name, leaving the reader after the name's
    /// in-place bytes.
    fn name(&mut self) -> Result<String, PacketError> {
        let mut name = String::new();
        let mut pos = self.pos;
        let mut resume = None;
        let mut hops = 0;

        loop {
            let len = *self.packet.get(pos).ok_or(PacketError::Truncated)?;

            match len & 0xc0 {
                0x00 => {
                    if len == 0 {
                        pos += 1;
                        break;
                    }

                    let start = pos + 1;
                    let end = start + len as usize;
                    let label = self
                        .packet
                        .get(start..end)
                        .ok_or(PacketError::Truncated)?;
                    let label = std::str::from_utf8(label).map_err(|_| PacketError::InvalidUtf8)?;

                    name.push_str(label);
                    name.push('.');

                    if name.len() > MAX_NAME_LEN {
                        return Err(PacketError::NameTooLong);
                    }

                    pos = end;
                }
                0xc0 => {
                    let low = *self.packet.get(pos + 1).ok_or(PacketError::Truncated)?;

                    hops += 1;
                    if hops > MAX_POINTER_HOPS {
                        return Err(PacketError::PointerLoop);
                    }

                    if resume.is_none() {
                        resume = Some(pos + 2);
                    }

                    pos = (((len & 0x3f) as usize) << 8) | low as usize;
                }
                _ => return Err(PacketError::LabelType(len)),
            }
        }

        self.pos = resume.unwrap_or(pos);

        if name.is_empty() {
            name.push('.');
        }

        Ok(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header() {
        let packet = encode_packet(&[TxtRecord::new("_did.", "v=1")]).unwrap();

        assert_eq!(&packet[..12], &[0, 0, 0x84, 0, 0, 0, 0, 1, 0, 0, 0, 0]);
        assert_eq!(&packet[12..18], &[4, b'_', b'd', b'i', b'd', 0]);
        // type, class, ttl
        assert_eq!(&packet[18..26], &[0, 16, 0, 1, 0, 0, 0x1c, 0x20]);
        assert_eq!(&packet[26..28], &[0, 4]);
        assert_eq!(&packet[28..], &[3, b'v', b'=', b'1']);
    }

    #[test]
    fn test_round_trip() {
        let records = vec![
            TxtRecord::new("_did.", "v=1;vm=k0"),
            TxtRecord::new("_k0._did.", "id=0;t=0;k=abc"),
            TxtRecord::new("_s0._did.", ""),
        ];

        let packet = encode_packet(&records).unwrap();
        assert_eq!(decode_packet(&packet).unwrap(), records);
    }

    #[test]
    fn test_long_text() {
        let text = "x".repeat(600);
        let packet = encode_packet(&[TxtRecord::new("_did.", text.clone())]).unwrap();

        // 255 + 255 + 90, each with a length byte.
        let rdlength = u16::from_be_bytes([packet[26], packet[27]]);
        assert_eq!(rdlength, 603);

        let records = decode_packet(&packet).unwrap();
        assert_eq!(records[0].text, text);
    }

    #[test]
    fn test_compression_and_questions() {
        let mut packet = vec![0, 0, 0x84, 0, 0, 1, 0, 2, 0, 0, 0, 0];

        // Question: _did.example. TXT IN
        packet.extend([4, b'_', b'd', b'i', b'd', 7]);
        packet.extend(b"example");
        packet.extend([0, 0, 16, 0, 1]);

        // Answer pointing at the question name.
        packet.extend([0xc0, 12, 0, 16, 0, 1, 0, 0, 0, 60, 0, 4, 3]);
        packet.extend(b"v=1");

        // Answer with a label followed by a pointer.
        packet.extend([3, b'_', b'k', b'0', 0xc0, 12, 0, 16, 0, 1, 0, 0, 0, 60, 0, 2, 1, b'a']);

        let records = decode_packet(&packet).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "_did.example.");
        assert_eq!(records[0].ttl, 60);
        assert_eq!(records[0].text, "v=1");
        assert_eq!(records[1].name, "_k0._did.example.");
        assert_eq!(records[1].text, "a");
    }

    #[test]
    fn test_skips_other_types() {
        let mut packet = vec![0, 0, 0x84, 0, 0, 0, 0, 2, 0, 0, 0, 0];

        // A record
        packet.extend([1, b'a', 0, 0, 1, 0, 1, 0, 0, 0, 60, 0, 4, 127, 0, 0, 1]);
        packet.extend([4, b'_', b'd', b'i', b'd', 0, 0, 16, 0, 1, 0, 0, 0, 60, 0, 2, 1, b'b']);

        let records = decode_packet(&packet).unwrap();
        assert_eq!(records, vec![TxtRecord {
            name: "_did.".to_string(),
            ttl: 60,
            text: "b".to_string(),
        }]);
    }

    #[test]
    fn test_malformed() {
        assert_eq!(decode_packet(&[0; 5]), Err(PacketError::Truncated));

        let mut packet = encode_packet(&[TxtRecord::new("_did.", "v=1")]).unwrap();
        packet.pop();
        assert_eq!(decode_packet(&packet), Err(PacketError::Truncated));

        let mut looping = vec![0, 0, 0x84, 0, 0, 0, 0, 1, 0, 0, 0, 0];
        looping.extend([0xc0, 12]);
        assert_eq!(decode_packet(&looping), Err(PacketError::PointerLoop));

        let mut bad_txt = vec![0, 0, 0x84, 0, 0, 0, 0, 1, 0, 0, 0, 0];
        bad_txt.extend([0, 0, 16, 0, 1, 0, 0, 0, 60, 0, 2, 5, b'a']);
        assert_eq!(decode_packet(&bad_txt), Err(PacketError::Truncated));
    }

    #[test]
    fn test_invalid_names() {
        let long = "a".repeat(64);
        assert_eq!(
            encode_packet(&[TxtRecord::new(format!("{long}."), "")]),
            Err(PacketError::LabelTooLong(long))
        );
        assert!(matches!(
            encode_packet(&[TxtRecord::new("a..b.", "")]),
            Err(PacketError::EmptyLabel(_))
        ));
    }
}
