//! Fixed-size ledger primitives.

use crate::error::{CoreError, CoreResult};
use crate::hash::keccak256;
use crate::rlp::RlpWriter;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::Deref;
use std::str::FromStr;

/// Size of an account address in bytes.
pub const ADDRESS_SIZE: usize = 20;
/// Size of a block or transaction hash in bytes.
pub const HASH_SIZE: usize = 32;

fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

fn decode_fixed<const N: usize>(s: &str) -> CoreResult<[u8; N]> {
    let raw = hex::decode(strip_hex_prefix(s.trim()))?;
    if raw.len() != N {
        return Err(CoreError::InvalidLength {
            expected: N,
            actual: raw.len(),
        });
    }
    let mut out = [0u8; N];
    out.copy_from_slice(&raw);
    Ok(out)
}

/// A 20-byte account address.
///
/// Parsing is case-insensitive, so two spellings of the same address (all
/// lowercase, checksummed, upper case) compare equal once parsed.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; ADDRESS_SIZE]);

impl Address {
    /// The all-zero address.
    pub const ZERO: Address = Address([0u8; ADDRESS_SIZE]);

    pub const fn new(bytes: [u8; ADDRESS_SIZE]) -> Self {
        Self(bytes)
    }

    /// Creates an address from a slice, failing unless it is exactly 20 bytes.
    pub fn from_slice(bytes: &[u8]) -> CoreResult<Self> {
        if bytes.len() != ADDRESS_SIZE {
            return Err(CoreError::InvalidLength {
                expected: ADDRESS_SIZE,
                actual: bytes.len(),
            });
        }
        let mut out = [0u8; ADDRESS_SIZE];
        out.copy_from_slice(bytes);
        Ok(Self(out))
    }

    /// Derives the address controlled by an uncompressed secp256k1 public key
    /// (65 bytes with the `0x04` prefix, or the bare 64-byte point).
    pub fn from_public_key(uncompressed: &[u8]) -> CoreResult<Self> {
        let point = match uncompressed.len() {
            65 if uncompressed[0] == 0x04 => &uncompressed[1..],
            64 => uncompressed,
            len => {
                return Err(CoreError::InvalidLength {
                    expected: 65,
                    actual: len,
                })
            }
        };
        let digest = keccak256(point);
        Self::from_slice(&digest[12..])
    }

    /// Derives the address of a contract created by `sender` at `nonce`.
    pub fn contract_address(sender: &Address, nonce: u64) -> Self {
        let mut writer = RlpWriter::new();
        writer.write_bytes(sender.as_bytes()).write_u64(nonce);
        let digest = keccak256(&writer.into_list());
        let mut out = [0u8; ADDRESS_SIZE];
        out.copy_from_slice(&digest[12..]);
        Self(out)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_SIZE] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; ADDRESS_SIZE]
    }

    /// Mixed-case checksum encoding (EIP-55).
    pub fn to_checksum(&self) -> String {
        let lower = hex::encode(self.0);
        let digest = keccak256(lower.as_bytes());
        let mut out = String::with_capacity(2 + lower.len());
        out.push_str("0x");
        for (i, ch) in lower.chars().enumerate() {
            let nibble = if i % 2 == 0 {
                digest[i / 2] >> 4
            } else {
                digest[i / 2] & 0x0f
            };
            if ch.is_ascii_alphabetic() && nibble >= 8 {
                out.push(ch.to_ascii_uppercase());
            } else {
                out.push(ch);
            }
        }
        out
    }
}

impl FromStr for Address {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_fixed::<ADDRESS_SIZE>(s)
            .map(Self)
            .map_err(|_| CoreError::InvalidAddress(s.to_string()))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl From<[u8; ADDRESS_SIZE]> for Address {
    fn from(bytes: [u8; ADDRESS_SIZE]) -> Self {
        Self(bytes)
    }
}

/// A 32-byte hash (block hash, transaction hash, log topic).
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct H256([u8; HASH_SIZE]);

/// Transaction hashes are plain 32-byte hashes.
pub type TxHash = H256;

impl H256 {
    pub const ZERO: H256 = H256([0u8; HASH_SIZE]);

    pub const fn new(bytes: [u8; HASH_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> CoreResult<Self> {
        if bytes.len() != HASH_SIZE {
            return Err(CoreError::InvalidLength {
                expected: HASH_SIZE,
                actual: bytes.len(),
            });
        }
        let mut out = [0u8; HASH_SIZE];
        out.copy_from_slice(bytes);
        Ok(Self(out))
    }

    /// Hashes `data` with Keccak-256.
    pub fn keccak(data: &[u8]) -> Self {
        Self(keccak256(data))
    }

    pub fn as_bytes(&self) -> &[u8; HASH_SIZE] {
        &self.0
    }
}

impl FromStr for H256 {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_fixed::<HASH_SIZE>(s).map(Self)
    }
}

impl fmt::Display for H256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for H256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "H256({self})")
    }
}

impl From<[u8; HASH_SIZE]> for H256 {
    fn from(bytes: [u8; HASH_SIZE]) -> Self {
        Self(bytes)
    }
}

/// Variable-length binary data rendered as `0x`-prefixed hex on the wire.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Bytes(Vec<u8>);

impl Bytes {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }
}

impl Deref for Bytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl AsRef<[u8]> for Bytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for Bytes {
    fn from(value: Vec<u8>) -> Self {
        Self(value)
    }
}

impl From<&[u8]> for Bytes {
    fn from(value: &[u8]) -> Self {
        Self(value.to_vec())
    }
}

impl FromStr for Bytes {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(hex::decode(strip_hex_prefix(s.trim()))?))
    }
}

impl fmt::Display for Bytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(&self.0))
    }
}

impl fmt::Debug for Bytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bytes({self})")
    }
}

macro_rules! impl_hex_serde {
    ($($ty:ty),*) => {$(
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    )*};
}

impl_hex_serde!(Address, H256, Bytes);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_parsing_ignores_case() {
        let lower: Address = "0xda8a06f1c910cab18ad187be1faa2b8606c2ec86".parse().unwrap();
        let mixed: Address = "0xDa8A06F1C910CAB18aD187be1faA2b8606C2ec86".parse().unwrap();
        assert_eq!(lower, mixed);
        assert_eq!(
            lower.to_string(),
            "0xda8a06f1c910cab18ad187be1faa2b8606c2ec86"
        );
    }

    #[test]
    fn address_rejects_wrong_length_and_non_hex() {
        assert!("0x1234".parse::<Address>().is_err());
        assert!("0xzz8a06f1c910cab18ad187be1faa2b8606c2ec86"
            .parse::<Address>()
            .is_err());
        assert!("14.6".parse::<Address>().is_err());
    }

    #[test]
    fn checksum_matches_eip55_vector() {
        let address: Address = "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed".parse().unwrap();
        assert_eq!(
            address.to_checksum(),
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"
        );
    }

    #[test]
    fn contract_address_from_sender_and_nonce() {
        let sender: Address = "0x6ac7ea33f8831ea9dcc53393aaa88b25a785dbf0".parse().unwrap();
        assert_eq!(
            Address::contract_address(&sender, 0).to_string(),
            "0xcd234a471b72ba2f1ccf0a70fcaba648a5eecd8d"
        );
        assert_eq!(
            Address::contract_address(&sender, 1).to_string(),
            "0x343c43a37d37dff08ae8c4a11544c718abb4fcf8"
        );
    }

    #[test]
    fn hashes_serialize_as_hex_strings() {
        let hash = H256::keccak(b"");
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(
            json,
            "\"0xc5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470\""
        );
        let back: H256 = serde_json::from_str(&json).unwrap();
        assert_eq!(back, hash);
    }
}
