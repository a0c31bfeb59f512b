//! Legacy transaction signing with EIP-155 replay protection.

use crate::key_pair::{KeyPair, Signature};
use crate::WalletResult;
use ledgerkit_core::{Address, Bytes, RlpWriter, H256};
use num_bigint::BigUint;

/// A fully populated legacy transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyTransaction {
    pub nonce: u64,
    pub gas_price: BigUint,
    pub gas: u64,
    pub to: Option<Address>,
    pub value: BigUint,
    pub data: Bytes,
    pub chain_id: u64,
}

impl LegacyTransaction {
    fn write_fields(&self, writer: &mut RlpWriter) {
        writer
            .write_u64(self.nonce)
            .write_biguint(&self.gas_price)
            .write_u64(self.gas);
        match &self.to {
            Some(to) => writer.write_bytes(to.as_bytes()),
            None => writer.write_bytes(&[]),
        };
        writer.write_biguint(&self.value).write_bytes(&self.data);
    }

    /// Hash signed under EIP-155: `rlp([nonce, gasPrice, gas, to, value, data, chainId, 0, 0])`.
    pub fn signing_hash(&self) -> H256 {
        let mut writer = RlpWriter::new();
        self.write_fields(&mut writer);
        writer
            .write_u64(self.chain_id)
            .write_u64(0)
            .write_u64(0);
        H256::keccak(&writer.into_list())
    }

    /// `v` carrying the chain id: `recovery_id + 35 + 2 * chain_id`.
    pub fn v(&self, signature: &Signature) -> u64 {
        u64::from(signature.recovery_id) + 35 + 2 * self.chain_id
    }

    pub fn encode_signed(&self, signature: &Signature) -> Vec<u8> {
        let mut writer = RlpWriter::new();
        self.write_fields(&mut writer);
        writer
            .write_u64(self.v(signature))
            .write_biguint(&BigUint::from_bytes_be(&signature.r))
            .write_biguint(&BigUint::from_bytes_be(&signature.s));
        writer.into_list()
    }

    /// Signs with `key_pair` and returns the raw transaction bytes.
    pub fn sign(&self, key_pair: &KeyPair) -> WalletResult<Vec<u8>> {
        let signature = key_pair.sign_hash(&self.signing_hash())?;
        Ok(self.encode_signed(&signature))
    }
}
