//! Compiled program artifacts.

use crate::abi::Abi;
use crate::error::{CoreError, CoreResult};
use crate::primitives::Bytes;
use serde::Deserialize;
use std::path::Path;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawArtifact {
    #[serde(default)]
    contract_name: String,
    abi: serde_json::Value,
    #[serde(default)]
    bytecode: String,
}

/// A compiler output bundle: interface description plus creation bytecode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractArtifact {
    pub contract_name: String,
    pub abi: Abi,
    pub bytecode: Bytes,
}

impl ContractArtifact {
    pub fn new(contract_name: impl Into<String>, abi: Abi, bytecode: Bytes) -> Self {
        Self {
            contract_name: contract_name.into(),
            abi,
            bytecode,
        }
    }

    /// Parses the JSON bundle (`contractName`, `abi`, `bytecode`).
    ///
    /// Bytecode that still carries unlinked library placeholders is not valid
    /// hex and is rejected here.
    pub fn from_value(value: serde_json::Value) -> CoreResult<Self> {
        let raw: RawArtifact = serde_json::from_value(value)
            .map_err(|err| CoreError::InvalidArtifact(err.to_string()))?;
        let abi = Abi::from_json(&raw.abi)
            .map_err(|err| CoreError::InvalidArtifact(err.to_string()))?;
        let bytecode: Bytes = raw.bytecode.parse().map_err(|_| {
            CoreError::InvalidArtifact(format!(
                "bytecode of {} is not valid hex (unlinked library?)",
                raw.contract_name
            ))
        })?;
        Ok(Self {
            contract_name: raw.contract_name,
            abi,
            bytecode,
        })
    }

    pub fn from_json_str(json: &str) -> CoreResult<Self> {
        let value = serde_json::from_str(json)
            .map_err(|err| CoreError::InvalidArtifact(err.to_string()))?;
        Self::from_value(value)
    }

    pub fn load(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|err| {
            CoreError::InvalidArtifact(format!("{}: {err}", path.display()))
        })?;
        Self::from_json_str(&json)
    }

    /// Abstract contracts and interfaces compile to empty bytecode.
    pub fn is_deployable(&self) -> bool {
        !self.bytecode.is_empty()
    }
}
