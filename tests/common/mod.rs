//! Byte-level fixture writer for stone archives.
#![allow(dead_code)]

use byteorder::{BigEndian, WriteBytesExt};
use libstone::stone1::FORMAT_MARKER;
use xxhash_rust::xxh3::xxh3_64;

pub const META: u8 = 1;
pub const CONTENT: u8 = 2;
pub const LAYOUT: u8 = 3;
pub const INDEX: u8 = 4;
pub const ATTRIBUTES: u8 = 5;

pub const NONE: u8 = 1;
pub const ZSTD: u8 = 2;

pub fn prelude(num_payloads: u16, stone_type: u8) -> Vec<u8> {
    let mut out = Vec::with_capacity(32);
    out.extend_from_slice(b"\0mos");
    out.write_u16::<BigEndian>(num_payloads).unwrap();
    out.extend_from_slice(&FORMAT_MARKER);
    out.push(stone_type);
    out.write_u32::<BigEndian>(1).unwrap();
    out
}

/// One payload: header plus stored body.  The checksum covers `plain`.
pub fn payload(kind: u8, num_records: u32, plain: &[u8], compression: u8) -> Vec<u8> {
    let stored = match compression {
        ZSTD => zstd::encode_all(plain, 3).unwrap(),
        _    => plain.to_vec(),
    };
    payload_raw(kind, num_records, plain.len() as u64, &stored, compression, xxh3_64(plain))
}

/// Like [`payload`] but with the checksum over the stored bytes.
pub fn payload_stored_checksum(kind: u8, num_records: u32, plain: &[u8], compression: u8) -> Vec<u8> {
    let stored = match compression {
        ZSTD => zstd::encode_all(plain, 3).unwrap(),
        _    => plain.to_vec(),
    };
    payload_raw(kind, num_records, plain.len() as u64, &stored, compression, xxh3_64(&stored))
}

pub fn payload_raw(
    kind:        u8,
    num_records: u32,
    plain_size:  u64,
    stored:      &[u8],
    compression: u8,
    checksum:    u64,
) -> Vec<u8> {
    let mut out = Vec::with_capacity(32 + stored.len());
    out.write_u64::<BigEndian>(stored.len() as u64).unwrap();
    out.write_u64::<BigEndian>(plain_size).unwrap();
    out.write_u64::<BigEndian>(checksum).unwrap();
    out.write_u32::<BigEndian>(num_records).unwrap();
    out.write_u16::<BigEndian>(1).unwrap();
    out.push(kind);
    out.push(compression);
    out.extend_from_slice(stored);
    out
}

pub fn archive(payloads: &[Vec<u8>]) -> Vec<u8> {
    let mut out = prelude(payloads.len() as u16, 1);
    for p in payloads {
        out.extend_from_slice(p);
    }
    out
}

// ── Records ──────────────────────────────────────────────────────────────────

pub fn meta(tag: u16, field_kind: u8, value: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    out.write_u32::<BigEndian>(value.len() as u32).unwrap();
    out.write_u16::<BigEndian>(tag).unwrap();
    out.push(field_kind);
    out.push(0);
    out.extend_from_slice(value);
    out
}

pub fn meta_string(tag: u16, value: &str) -> Vec<u8> {
    meta(tag, 9, &[value.as_bytes(), b"\0"].concat())
}

pub fn layout(file_type: u8, source: &[u8], target: &str) -> Vec<u8> {
    layout_raw(file_type, source, target.as_bytes())
}

/// Layout record with a target that need not be UTF-8.
pub fn layout_raw(file_type: u8, source: &[u8], target: &[u8]) -> Vec<u8> {
    let target = [target, b"\0"].concat();
    let mut out = Vec::new();
    out.write_u32::<BigEndian>(0).unwrap();
    out.write_u32::<BigEndian>(0).unwrap();
    out.write_u32::<BigEndian>(0o755).unwrap();
    out.write_u32::<BigEndian>(0).unwrap();
    out.write_u16::<BigEndian>(source.len() as u16).unwrap();
    out.write_u16::<BigEndian>(target.len() as u16).unwrap();
    out.push(file_type);
    out.extend_from_slice(&[0u8; 11]);
    out.extend_from_slice(source);
    out.extend_from_slice(&target);
    out
}

pub fn index(start: u64, end: u64, hash: u128) -> Vec<u8> {
    let mut out = Vec::new();
    out.write_u64::<BigEndian>(start).unwrap();
    out.write_u64::<BigEndian>(end).unwrap();
    out.write_u128::<BigEndian>(hash).unwrap();
    out
}

pub fn attribute(key: &[u8], value: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    out.write_u64::<BigEndian>(key.len() as u64).unwrap();
    out.write_u64::<BigEndian>(value.len() as u64).unwrap();
    out.extend_from_slice(key);
    out.extend_from_slice(value);
    out
}
