//! Wire helpers: hex quantities and request objects.

use ledgerkit_core::TransactionRequest;
use num_bigint::BigUint;
use serde_json::{Map, Value};

/// Parses a `0x`-prefixed hex quantity.
pub fn parse_quantity(raw: &str) -> Result<BigUint, String> {
    let digits = raw
        .strip_prefix("0x")
        .ok_or_else(|| format!("quantity {raw:?} lacks 0x prefix"))?;
    if digits.is_empty() {
        return Err(format!("quantity {raw:?} has no digits"));
    }
    BigUint::parse_bytes(digits.as_bytes(), 16).ok_or_else(|| format!("invalid quantity {raw:?}"))
}

pub(crate) fn parse_u64_quantity(raw: &str) -> Result<u64, String> {
    let digits = raw
        .strip_prefix("0x")
        .ok_or_else(|| format!("quantity {raw:?} lacks 0x prefix"))?;
    u64::from_str_radix(digits, 16).map_err(|e| format!("invalid quantity {raw:?}: {e}"))
}

/// Formats a quantity the way nodes expect it (`0x0`, `0x1a`, no leading zeros).
pub fn format_quantity(value: &BigUint) -> String {
    format!("0x{}", value.to_str_radix(16))
}

/// Builds the transaction object taken by `eth_sendTransaction`,
/// `eth_call` and `eth_estimateGas`. Unset fields are omitted.
pub fn transaction_request_to_json(tx: &TransactionRequest) -> Value {
    let mut object = Map::new();
    if let Some(from) = &tx.from {
        object.insert("from".to_string(), Value::String(from.to_string()));
    }
    if let Some(to) = &tx.to {
        object.insert("to".to_string(), Value::String(to.to_string()));
    }
    if !tx.data.is_empty() {
        object.insert("data".to_string(), Value::String(tx.data.to_string()));
    }
    if let Some(value) = &tx.value {
        object.insert("value".to_string(), Value::String(format_quantity(value)));
    }
    if let Some(gas) = tx.gas {
        object.insert("gas".to_string(), Value::String(format!("{gas:#x}")));
    }
    if let Some(gas_price) = &tx.gas_price {
        object.insert("gasPrice".to_string(), Value::String(format_quantity(gas_price)));
    }
    if let Some(nonce) = tx.nonce {
        object.insert("nonce".to_string(), Value::String(format!("{nonce:#x}")));
    }
    Value::Object(object)
}

/// Serde adapters for quantity fields.
pub(crate) mod quantity {
    use serde::{de, Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_u64_quantity(&raw).map_err(de::Error::custom)
    }

    pub mod option {
        use serde::{de, Deserialize, Deserializer};

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<u64>, D::Error> {
            match Option::<String>::deserialize(deserializer)? {
                Some(raw) => super::super::parse_u64_quantity(&raw)
                    .map(Some)
                    .map_err(de::Error::custom),
                None => Ok(None),
            }
        }
    }

    pub mod big {
        use num_bigint::BigUint;
        use serde::{de, Deserialize, Deserializer};

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<BigUint, D::Error> {
            let raw = String::deserialize(deserializer)?;
            super::super::parse_quantity(&raw).map_err(de::Error::custom)
        }
    }
}
