//! Recursive-length-prefix encoding.
//!
//! Only the writer side is needed: transactions are encoded for signing and
//! contract addresses are derived from `rlp([sender, nonce])`.

use num_bigint::BigUint;

/// Accumulates RLP-encoded items; [`RlpWriter::into_list`] wraps them in a
/// list header.
#[derive(Debug, Default, Clone)]
pub struct RlpWriter {
    payload: Vec<u8>,
}

impl RlpWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes a byte string item.
    pub fn write_bytes(&mut self, data: &[u8]) -> &mut Self {
        if data.len() == 1 && data[0] < 0x80 {
            self.payload.push(data[0]);
        } else {
            write_header(&mut self.payload, data.len(), 0x80);
            self.payload.extend_from_slice(data);
        }
        self
    }

    /// Writes an unsigned integer as its minimal big-endian byte string.
    pub fn write_u64(&mut self, value: u64) -> &mut Self {
        let bytes = value.to_be_bytes();
        let first = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
        self.write_bytes(&bytes[first..])
    }

    pub fn write_biguint(&mut self, value: &BigUint) -> &mut Self {
        if value.bits() == 0 {
            return self.write_bytes(&[]);
        }
        self.write_bytes(&value.to_bytes_be())
    }

    /// Writes `nested` as a list item.
    pub fn write_list(&mut self, nested: RlpWriter) -> &mut Self {
        let encoded = nested.into_list();
        self.payload.extend_from_slice(&encoded);
        self
    }

    /// Encodes every written item as one list.
    pub fn into_list(self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.payload.len() + 9);
        write_header(&mut out, self.payload.len(), 0xc0);
        out.extend_from_slice(&self.payload);
        out
    }
}

fn write_header(out: &mut Vec<u8>, len: usize, offset: u8) {
    if len < 56 {
        out.push(offset + len as u8);
        return;
    }
    let len_bytes = (len as u64).to_be_bytes();
    let first = len_bytes.iter().position(|b| *b != 0).unwrap_or(len_bytes.len());
    let significant = &len_bytes[first..];
    out.push(offset + 55 + significant.len() as u8);
    out.extend_from_slice(significant);
}
