//! Canonical CBOR encoding of entity metadata.
//!
//! Records are encoded as a CBOR (RFC 8949) map with deterministic rules:
//! - Map keys: text, sorted by their CBOR-encoded bytes
//! - Integers: smallest valid encoding
//! - Lengths: definite only
//! - Absent optional fields are omitted, present ones are always written
//!
//! Decoding is strict: unknown keys, duplicate keys, trailing bytes and any
//! encoding that does not re-encode to the exact same bytes are rejected, so
//! byte equality and field equality of decoded records coincide.

use ciborium::value::Value;

use crate::error::CoreError;
use crate::metadata::EntityMetadata;

/// CBOR map key names.
mod keys {
    pub const VERSION: &str = "v";
    pub const SERIAL: &str = "serial";
    pub const NAME: &str = "name";
    pub const URL: &str = "url";
    pub const EMAIL: &str = "email";
    pub const KEYBASE: &str = "keybase";
    pub const TWITTER: &str = "twitter";
}

/// A value in the metadata map.
enum Field<'a> {
    Uint(u64),
    Text(&'a str),
}

/// Encode entity metadata to canonical CBOR bytes.
pub fn encode_metadata(meta: &EntityMetadata) -> Vec<u8> {
    let mut entries = vec![
        (keys::VERSION, Field::Uint(meta.v.into())),
        (keys::SERIAL, Field::Uint(meta.serial)),
    ];

    let optional = [
        (keys::NAME, &meta.name),
        (keys::URL, &meta.url),
        (keys::EMAIL, &meta.email),
        (keys::KEYBASE, &meta.keybase),
        (keys::TWITTER, &meta.twitter),
    ];
    for (key, value) in optional {
        if let Some(value) = value {
            entries.push((key, Field::Text(value)));
        }
    }

    let mut buf = Vec::new();
    encode_map_canonical(&mut buf, &entries);
    buf
}

/// Encode an unsigned integer with the given major type.
fn encode_uint(buf: &mut Vec<u8>, major: u8, n: u64) {
    let mt = major << 5;
    if n < 24 {
        buf.push(mt | (n as u8));
    } else if n <= 0xff {
        buf.push(mt | 24);
        buf.push(n as u8);
    } else if n <= 0xffff {
        buf.push(mt | 25);
        buf.extend_from_slice(&(n as u16).to_be_bytes());
    } else if n <= 0xffff_ffff {
        buf.push(mt | 26);
        buf.extend_from_slice(&(n as u32).to_be_bytes());
    } else {
        buf.push(mt | 27);
        buf.extend_from_slice(&n.to_be_bytes());
    }
}

/// Encode a text string (major type 3).
fn encode_text(buf: &mut Vec<u8>, s: &str) {
    encode_uint(buf, 3, s.len() as u64);
    buf.extend_from_slice(s.as_bytes());
}

/// Encode a map canonically (major type 5).
///
/// Keys are sorted by their encoded byte comparison.
fn encode_map_canonical(buf: &mut Vec<u8>, entries: &[(&str, Field<'_>)]) {
    let mut pairs: Vec<(Vec<u8>, &Field<'_>)> = entries
        .iter()
        .map(|(k, v)| {
            let mut key_buf = Vec::new();
            encode_text(&mut key_buf, k);
            (key_buf, v)
        })
        .collect();

    pairs.sort_by(|a, b| a.0.cmp(&b.0));

    encode_uint(buf, 5, pairs.len() as u64);
    for (key_bytes, value) in pairs {
        buf.extend_from_slice(&key_bytes);
        match value {
            Field::Uint(n) => encode_uint(buf, 0, *n),
            Field::Text(s) => encode_text(buf, s),
        }
    }
}

/// Decode entity metadata from canonical CBOR bytes.
pub fn decode_metadata(bytes: &[u8]) -> Result<EntityMetadata, CoreError> {
    let mut cursor = std::io::Cursor::new(bytes);
    let value: Value = ciborium::from_reader(&mut cursor)
        .map_err(|e| CoreError::CorruptPayload(e.to_string()))?;
    if cursor.position() as usize != bytes.len() {
        return Err(CoreError::CorruptPayload("trailing bytes after record".into()));
    }

    let map = match value {
        Value::Map(m) => m,
        _ => return Err(CoreError::CorruptPayload("expected map".into())),
    };

    let mut v = None;
    let mut serial = None;
    let mut meta = EntityMetadata::new(0);

    for (key, value) in map {
        let key = match key {
            Value::Text(k) => k,
            _ => return Err(CoreError::CorruptPayload("non-text map key".into())),
        };

        let slot = match key.as_str() {
            keys::VERSION => {
                let n = as_uint(&key, &value)?;
                let n = u16::try_from(n)
                    .map_err(|_| CoreError::CorruptPayload(format!("version out of range: {n}")))?;
                set_once(&mut v, n, &key)?;
                continue;
            }
            keys::SERIAL => {
                let n = as_uint(&key, &value)?;
                set_once(&mut serial, n, &key)?;
                continue;
            }
            keys::NAME => &mut meta.name,
            keys::URL => &mut meta.url,
            keys::EMAIL => &mut meta.email,
            keys::KEYBASE => &mut meta.keybase,
            keys::TWITTER => &mut meta.twitter,
            other => return Err(CoreError::CorruptPayload(format!("unknown field: {other}"))),
        };

        let text = match value {
            Value::Text(s) => s,
            _ => return Err(CoreError::CorruptPayload(format!("{key}: expected text"))),
        };
        set_once(slot, text, &key)?;
    }

    meta.v = v.ok_or_else(|| CoreError::CorruptPayload("missing version".into()))?;
    meta.serial = serial.ok_or_else(|| CoreError::CorruptPayload("missing serial".into()))?;

    if encode_metadata(&meta) != bytes {
        return Err(CoreError::CorruptPayload("non-canonical encoding".into()));
    }

    Ok(meta)
}

fn as_uint(key: &str, value: &Value) -> Result<u64, CoreError> {
    match value {
        Value::Integer(i) => u64::try_from(*i)
            .map_err(|_| CoreError::CorruptPayload(format!("{key}: expected unsigned integer"))),
        _ => Err(CoreError::CorruptPayload(format!("{key}: expected integer"))),
    }
}

fn set_once<T>(slot: &mut Option<T>, value: T, key: &str) -> Result<(), CoreError> {
    if slot.is_some() {
        return Err(CoreError::CorruptPayload(format!("duplicate field: {key}")));
    }
    *slot = Some(value);
    Ok(())
}
