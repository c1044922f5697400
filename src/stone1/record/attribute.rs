use std::io::Read;

use serde::Serialize;

use crate::error::{read_array, read_vec, Result};
use crate::walker::BeWalker;

/// Free-form key/value pair; neither side is interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeRecord {
    #[serde(serialize_with = "hex::serde::serialize")]
    pub key:   Vec<u8>,
    #[serde(serialize_with = "hex::serde::serialize")]
    pub value: Vec<u8>,
}

impl AttributeRecord {
    pub fn decode<R: Read + ?Sized>(src: &mut R) -> Result<Self> {
        let lengths: [u8; 16] = read_array(src)?;
        let mut wlk = BeWalker::new(&lengths);
        let key_len = wlk.read_u64()?;
        let val_len = wlk.read_u64()?;
        let key   = read_vec(src, key_len)?;
        let value = read_vec(src, val_len)?;
        Ok(Self { key, value })
    }
}
