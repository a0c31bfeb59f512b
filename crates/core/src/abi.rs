//! Contract ABI description and call encoding.
//!
//! The ABI is read from the JSON interface emitted by the compiler. Only the
//! encoding direction is implemented: function calls, constructor arguments
//! and event topics.

use crate::hash::keccak256;
use crate::primitives::{Address, H256};
use num_bigint::{BigInt, BigUint, Sign};
use num_traits::{One, Zero};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

const WORD: usize = 32;

/// ABI encoding errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AbiError {
    #[error("Unsupported ABI type: {0}")]
    UnsupportedType(String),

    #[error("Function not found: {0}")]
    FunctionNotFound(String),

    #[error("{name} expects {expected} arguments, got {actual}")]
    ArgumentCount {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("Argument {index} of {name} does not match type {expected}")]
    ArgumentType {
        name: String,
        index: usize,
        expected: String,
    },

    #[error("Value out of range for {0}")]
    ValueOutOfRange(String),

    #[error("Invalid ABI JSON: {0}")]
    InvalidJson(String),
}

pub type AbiResult<T> = std::result::Result<T, AbiError>;

/// Parameter types understood by the encoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamType {
    Address,
    Bool,
    Uint(usize),
    Int(usize),
    String,
    Bytes,
    FixedBytes(usize),
    Array(Box<ParamType>),
}

impl ParamType {
    /// Parses a canonical Solidity type name (`uint256`, `address`, `bytes32[]`, ...).
    pub fn parse(name: &str) -> AbiResult<Self> {
        let name = name.trim();
        if let Some(inner) = name.strip_suffix("[]") {
            return Ok(ParamType::Array(Box::new(ParamType::parse(inner)?)));
        }
        let unsupported = || AbiError::UnsupportedType(name.to_string());
        let parsed = match name {
            "address" => ParamType::Address,
            "bool" => ParamType::Bool,
            "string" => ParamType::String,
            "bytes" => ParamType::Bytes,
            "uint" => ParamType::Uint(256),
            "int" => ParamType::Int(256),
            _ => {
                if let Some(bits) = name.strip_prefix("uint") {
                    ParamType::Uint(parse_bits(bits).ok_or_else(unsupported)?)
                } else if let Some(bits) = name.strip_prefix("int") {
                    ParamType::Int(parse_bits(bits).ok_or_else(unsupported)?)
                } else if let Some(len) = name.strip_prefix("bytes") {
                    match len.parse::<usize>() {
                        Ok(len) if (1..=32).contains(&len) => ParamType::FixedBytes(len),
                        _ => return Err(unsupported()),
                    }
                } else {
                    return Err(unsupported());
                }
            }
        };
        Ok(parsed)
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(
            self,
            ParamType::String | ParamType::Bytes | ParamType::Array(_)
        )
    }
}

fn parse_bits(bits: &str) -> Option<usize> {
    let bits = bits.parse::<usize>().ok()?;
    (bits > 0 && bits <= 256 && bits % 8 == 0).then_some(bits)
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::Address => write!(f, "address"),
            ParamType::Bool => write!(f, "bool"),
            ParamType::Uint(bits) => write!(f, "uint{bits}"),
            ParamType::Int(bits) => write!(f, "int{bits}"),
            ParamType::String => write!(f, "string"),
            ParamType::Bytes => write!(f, "bytes"),
            ParamType::FixedBytes(len) => write!(f, "bytes{len}"),
            ParamType::Array(inner) => write!(f, "{inner}[]"),
        }
    }
}

/// A value to encode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Address(Address),
    Bool(bool),
    Uint(BigUint),
    Int(BigInt),
    String(String),
    Bytes(Vec<u8>),
    FixedBytes(Vec<u8>),
    Array(Vec<Token>),
}

impl Token {
    fn is_dynamic(&self) -> bool {
        matches!(self, Token::String(_) | Token::Bytes(_) | Token::Array(_))
    }

    /// Checks whether this token can be encoded as `kind`.
    pub fn type_check(&self, kind: &ParamType) -> bool {
        match (self, kind) {
            (Token::Address(_), ParamType::Address)
            | (Token::Bool(_), ParamType::Bool)
            | (Token::Uint(_), ParamType::Uint(_))
            | (Token::Int(_), ParamType::Int(_))
            | (Token::String(_), ParamType::String)
            | (Token::Bytes(_), ParamType::Bytes) => true,
            (Token::Uint(_), ParamType::Int(_)) => true,
            (Token::FixedBytes(bytes), ParamType::FixedBytes(len)) => bytes.len() == *len,
            (Token::Array(items), ParamType::Array(inner)) => {
                items.iter().all(|item| item.type_check(inner))
            }
            _ => false,
        }
    }
}

impl From<Address> for Token {
    fn from(value: Address) -> Self {
        Token::Address(value)
    }
}

impl From<bool> for Token {
    fn from(value: bool) -> Self {
        Token::Bool(value)
    }
}

impl From<u64> for Token {
    fn from(value: u64) -> Self {
        Token::Uint(BigUint::from(value))
    }
}

impl From<u128> for Token {
    fn from(value: u128) -> Self {
        Token::Uint(BigUint::from(value))
    }
}

impl From<BigUint> for Token {
    fn from(value: BigUint) -> Self {
        Token::Uint(value)
    }
}

impl From<i64> for Token {
    fn from(value: i64) -> Self {
        Token::Int(BigInt::from(value))
    }
}

impl From<&str> for Token {
    fn from(value: &str) -> Self {
        Token::String(value.to_string())
    }
}

impl From<String> for Token {
    fn from(value: String) -> Self {
        Token::String(value)
    }
}

/// Encodes `tokens` as a tuple using the standard head/tail layout.
pub fn encode(tokens: &[Token]) -> AbiResult<Vec<u8>> {
    let mut bodies = Vec::with_capacity(tokens.len());
    for token in tokens {
        bodies.push(encode_token(token)?);
    }

    let head_len: usize = tokens.len() * WORD;
    let mut head = Vec::with_capacity(head_len);
    let mut tail = Vec::new();
    for (token, body) in tokens.iter().zip(bodies) {
        if token.is_dynamic() {
            head.extend_from_slice(&usize_word(head_len + tail.len()));
            tail.extend_from_slice(&body);
        } else {
            head.extend_from_slice(&body);
        }
    }
    head.extend_from_slice(&tail);
    Ok(head)
}

fn encode_token(token: &Token) -> AbiResult<Vec<u8>> {
    let encoded = match token {
        Token::Address(address) => {
            let mut word = vec![0u8; WORD];
            word[12..].copy_from_slice(address.as_bytes());
            word
        }
        Token::Bool(value) => usize_word(usize::from(*value)).to_vec(),
        Token::Uint(value) => uint_word(value)?.to_vec(),
        Token::Int(value) => int_word(value)?.to_vec(),
        Token::FixedBytes(bytes) => {
            if bytes.len() > WORD {
                return Err(AbiError::ValueOutOfRange(format!("bytes{}", bytes.len())));
            }
            let mut word = vec![0u8; WORD];
            word[..bytes.len()].copy_from_slice(bytes);
            word
        }
        Token::String(value) => encode_dynamic_bytes(value.as_bytes()),
        Token::Bytes(value) => encode_dynamic_bytes(value),
        Token::Array(items) => {
            let mut out = usize_word(items.len()).to_vec();
            out.extend_from_slice(&encode(items)?);
            out
        }
    };
    Ok(encoded)
}

fn encode_dynamic_bytes(data: &[u8]) -> Vec<u8> {
    let padded = data.len().div_ceil(WORD) * WORD;
    let mut out = Vec::with_capacity(WORD + padded);
    out.extend_from_slice(&usize_word(data.len()));
    out.extend_from_slice(data);
    out.resize(WORD + padded, 0);
    out
}

fn usize_word(value: usize) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[WORD - 8..].copy_from_slice(&(value as u64).to_be_bytes());
    word
}

fn uint_word(value: &BigUint) -> AbiResult<[u8; WORD]> {
    let bytes = value.to_bytes_be();
    if bytes.len() > WORD {
        return Err(AbiError::ValueOutOfRange("uint256".to_string()));
    }
    let mut word = [0u8; WORD];
    word[WORD - bytes.len()..].copy_from_slice(&bytes);
    Ok(word)
}

fn int_word(value: &BigInt) -> AbiResult<[u8; WORD]> {
    let modulus = BigInt::one() << 256;
    let half = BigInt::one() << 255;
    if *value >= half || *value < -half.clone() {
        return Err(AbiError::ValueOutOfRange("int256".to_string()));
    }
    let unsigned = if value.sign() == Sign::Minus {
        value + &modulus
    } else {
        value.clone()
    };
    let magnitude = unsigned.to_biguint().unwrap_or_else(BigUint::zero);
    uint_word(&magnitude)
}

fn check_arguments(name: &str, params: &[AbiParam], args: &[Token]) -> AbiResult<()> {
    if params.len() != args.len() {
        return Err(AbiError::ArgumentCount {
            name: name.to_string(),
            expected: params.len(),
            actual: args.len(),
        });
    }
    for (index, (param, arg)) in params.iter().zip(args).enumerate() {
        let kind = param.param_type()?;
        if !arg.type_check(&kind) {
            return Err(AbiError::ArgumentType {
                name: name.to_string(),
                index,
                expected: kind.to_string(),
            });
        }
    }
    Ok(())
}

fn canonical_signature(name: &str, params: &[AbiParam]) -> AbiResult<String> {
    let types = params
        .iter()
        .map(|p| p.param_type().map(|t| t.to_string()))
        .collect::<AbiResult<Vec<_>>>()?;
    Ok(format!("{name}({})", types.join(",")))
}

/// One input or output of a function, constructor or event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiParam {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub indexed: bool,
}

impl AbiParam {
    pub fn param_type(&self) -> AbiResult<ParamType> {
        ParamType::parse(&self.kind)
    }
}

/// A callable entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbiFunction {
    pub name: String,
    pub inputs: Vec<AbiParam>,
    pub outputs: Vec<AbiParam>,
    pub state_mutability: String,
}

impl AbiFunction {
    pub fn signature(&self) -> AbiResult<String> {
        canonical_signature(&self.name, &self.inputs)
    }

    pub fn selector(&self) -> AbiResult<[u8; 4]> {
        let digest = keccak256(self.signature()?.as_bytes());
        Ok([digest[0], digest[1], digest[2], digest[3]])
    }

    /// True for `view`/`pure` functions, which are read with `eth_call`.
    pub fn is_constant(&self) -> bool {
        matches!(self.state_mutability.as_str(), "view" | "pure")
    }

    /// Selector followed by the encoded arguments.
    pub fn encode_input(&self, args: &[Token]) -> AbiResult<Vec<u8>> {
        check_arguments(&self.name, &self.inputs, args)?;
        let mut data = self.selector()?.to_vec();
        data.extend_from_slice(&encode(args)?);
        Ok(data)
    }
}

/// An event declaration; used to label receipt logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbiEvent {
    pub name: String,
    pub inputs: Vec<AbiParam>,
    pub anonymous: bool,
}

impl AbiEvent {
    pub fn signature(&self) -> AbiResult<String> {
        canonical_signature(&self.name, &self.inputs)
    }

    /// The `topics[0]` value logs of this event carry.
    pub fn topic(&self) -> AbiResult<H256> {
        Ok(H256::keccak(self.signature()?.as_bytes()))
    }
}

#[derive(Debug, Deserialize)]
struct RawItem {
    #[serde(rename = "type", default = "default_item_kind")]
    kind: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    inputs: Vec<AbiParam>,
    #[serde(default)]
    outputs: Vec<AbiParam>,
    #[serde(default, rename = "stateMutability")]
    state_mutability: Option<String>,
    #[serde(default)]
    constant: Option<bool>,
    #[serde(default)]
    payable: Option<bool>,
    #[serde(default)]
    anonymous: bool,
}

fn default_item_kind() -> String {
    "function".to_string()
}

impl RawItem {
    fn mutability(&self) -> String {
        if let Some(value) = &self.state_mutability {
            return value.clone();
        }
        match (self.constant, self.payable) {
            (Some(true), _) => "view".to_string(),
            (_, Some(true)) => "payable".to_string(),
            _ => "nonpayable".to_string(),
        }
    }
}

/// The interface of a compiled program.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "Vec<serde_json::Value>")]
pub struct Abi {
    constructor: Option<Vec<AbiParam>>,
    functions: BTreeMap<String, Vec<AbiFunction>>,
    events: Vec<AbiEvent>,
}

impl TryFrom<Vec<serde_json::Value>> for Abi {
    type Error = AbiError;

    fn try_from(items: Vec<serde_json::Value>) -> AbiResult<Self> {
        let mut abi = Abi::default();
        for item in items {
            let raw: RawItem = serde_json::from_value(item)
                .map_err(|err| AbiError::InvalidJson(err.to_string()))?;
            match raw.kind.as_str() {
                "constructor" => abi.constructor = Some(raw.inputs),
                "function" => {
                    let state_mutability = raw.mutability();
                    abi.functions
                        .entry(raw.name.clone())
                        .or_default()
                        .push(AbiFunction {
                            name: raw.name,
                            inputs: raw.inputs,
                            outputs: raw.outputs,
                            state_mutability,
                        });
                }
                "event" => abi.events.push(AbiEvent {
                    name: raw.name,
                    inputs: raw.inputs,
                    anonymous: raw.anonymous,
                }),
                // fallback / receive / error entries carry nothing to encode
                _ => {}
            }
        }
        Ok(abi)
    }
}

impl Abi {
    /// Parses the `abi` array of a compiler artifact.
    pub fn from_json(value: &serde_json::Value) -> AbiResult<Self> {
        serde_json::from_value(value.clone()).map_err(|err| AbiError::InvalidJson(err.to_string()))
    }

    pub fn constructor_inputs(&self) -> &[AbiParam] {
        self.constructor.as_deref().unwrap_or(&[])
    }

    /// All overloads declared under `name`.
    pub fn functions_named(&self, name: &str) -> &[AbiFunction] {
        self.functions.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn functions(&self) -> impl Iterator<Item = &AbiFunction> {
        self.functions.values().flatten()
    }

    pub fn events(&self) -> &[AbiEvent] {
        &self.events
    }

    /// Picks the entry point for `name` and `args`.
    ///
    /// `name` may be a bare name or a full signature such as
    /// `transfer(address,uint256)`; bare names are disambiguated between
    /// overloads by argument count and types.
    pub fn function(&self, name: &str, args: &[Token]) -> AbiResult<&AbiFunction> {
        if name.contains('(') {
            return self
                .functions()
                .find(|f| f.signature().map(|s| s == name).unwrap_or(false))
                .ok_or_else(|| AbiError::FunctionNotFound(name.to_string()));
        }
        let overloads = self.functions_named(name);
        match overloads {
            [] => Err(AbiError::FunctionNotFound(name.to_string())),
            [single] => Ok(single),
            _ => overloads
                .iter()
                .find(|f| check_arguments(&f.name, &f.inputs, args).is_ok())
                .ok_or_else(|| AbiError::FunctionNotFound(name.to_string())),
        }
    }

    /// Encodes a call to `name` with `args`.
    pub fn encode_call(&self, name: &str, args: &[Token]) -> AbiResult<Vec<u8>> {
        self.function(name, args)?.encode_input(args)
    }

    /// Appends encoded constructor arguments to `bytecode`.
    pub fn encode_deploy(&self, bytecode: &[u8], args: &[Token]) -> AbiResult<Vec<u8>> {
        check_arguments("constructor", self.constructor_inputs(), args)?;
        let mut data = bytecode.to_vec();
        data.extend_from_slice(&encode(args)?);
        Ok(data)
    }

    /// Finds the event whose topic matches `topic0`.
    pub fn event_for_topic(&self, topic0: &H256) -> Option<&AbiEvent> {
        self.events
            .iter()
            .filter(|event| !event.anonymous)
            .find(|event| event.topic().map(|t| &t == topic0).unwrap_or(false))
    }
}
