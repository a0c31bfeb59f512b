//! secp256k1 key pairs.

use crate::{WalletError, WalletResult};
use ledgerkit_core::{Address, H256};
use secp256k1::{
    ecdsa::{RecoverableSignature, RecoveryId},
    Message, PublicKey, SecretKey, SECP256K1,
};
use std::fmt;

pub const PRIVATE_KEY_SIZE: usize = 32;

/// A recoverable signature split into its wire components.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    pub r: [u8; 32],
    pub s: [u8; 32],
    /// Recovery id, `0` or `1`.
    pub recovery_id: u8,
}

impl Signature {
    /// Recovers the signing address for `hash`.
    pub fn recover(&self, hash: &H256) -> WalletResult<Address> {
        let recovery_id = RecoveryId::from_i32(i32::from(self.recovery_id))?;
        let mut compact = [0u8; 64];
        compact[..32].copy_from_slice(&self.r);
        compact[32..].copy_from_slice(&self.s);
        let signature = RecoverableSignature::from_compact(&compact, recovery_id)?;
        let message = Message::from_digest_slice(hash.as_bytes())?;
        let public = SECP256K1.recover_ecdsa(&message, &signature)?;
        Ok(Address::from_public_key(&public.serialize_uncompressed())?)
    }
}

/// A private key with its derived public key and address.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyPair {
    secret_key: SecretKey,
    public_key: PublicKey,
    address: Address,
}

impl KeyPair {
    /// Generates a random key pair.
    pub fn generate() -> WalletResult<Self> {
        loop {
            let bytes: [u8; PRIVATE_KEY_SIZE] = rand::random();
            // Out-of-range scalars are astronomically rare; draw again.
            if let Ok(key_pair) = Self::from_private_key(&bytes) {
                return Ok(key_pair);
            }
        }
    }

    pub fn from_private_key(private_key: &[u8]) -> WalletResult<Self> {
        if private_key.len() != PRIVATE_KEY_SIZE {
            return Err(WalletError::InvalidKey(format!(
                "expected {PRIVATE_KEY_SIZE} bytes, got {}",
                private_key.len()
            )));
        }
        let secret_key = SecretKey::from_slice(private_key)
            .map_err(|e| WalletError::InvalidKey(e.to_string()))?;
        let public_key = PublicKey::from_secret_key(SECP256K1, &secret_key);
        let address = Address::from_public_key(&public_key.serialize_uncompressed())?;
        Ok(Self {
            secret_key,
            public_key,
            address,
        })
    }

    /// Parses a hex private key, with or without `0x`.
    pub fn from_hex(private_key: &str) -> WalletResult<Self> {
        let digits = private_key.strip_prefix("0x").unwrap_or(private_key);
        let bytes = hex::decode(digits).map_err(|e| WalletError::InvalidKey(e.to_string()))?;
        Self::from_private_key(&bytes)
    }

    pub fn private_key(&self) -> [u8; PRIVATE_KEY_SIZE] {
        self.secret_key.secret_bytes()
    }

    /// Uncompressed public key (65 bytes, `0x04` prefix).
    pub fn public_key(&self) -> [u8; 65] {
        self.public_key.serialize_uncompressed()
    }

    pub fn compressed_public_key(&self) -> [u8; 33] {
        self.public_key.serialize()
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Signs a 32-byte digest (RFC 6979 nonces, low-s).
    pub fn sign_hash(&self, hash: &H256) -> WalletResult<Signature> {
        let message = Message::from_digest_slice(hash.as_bytes())?;
        let signature = SECP256K1.sign_ecdsa_recoverable(&message, &self.secret_key);
        let (recovery_id, compact) = signature.serialize_compact();
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&compact[..32]);
        s.copy_from_slice(&compact[32..]);
        Ok(Signature {
            r,
            s,
            recovery_id: recovery_id.to_i32() as u8,
        })
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}
