//! "Send as" selectors.
//!
//! Callers pick an identity by index, by address or by handing over the
//! identity itself. Every accepted shape converts into [`Sender`] through
//! [`IntoSender`]; anything else is a usage error raised before the network
//! is touched.

use crate::error::{HarnessError, HarnessResult};
use ledgerkit_core::{Address, Signer};
use ledgerkit_wallets::{ManagedAccount, Wallet};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

pub(crate) const UNRECOGNISED_SELECTOR: &str =
    "Unrecognised input parameter. It should be index, address or wallet instance";

fn unrecognised() -> HarnessError {
    HarnessError::Usage(UNRECOGNISED_SELECTOR.to_string())
}

/// Which identity a call should be sent as.
#[derive(Clone)]
pub enum Sender {
    /// Position in the wrapper's bound identities.
    Index(usize),
    Address(Address),
    Identity(Arc<dyn Signer>),
}

impl fmt::Debug for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sender::Index(index) => f.debug_tuple("Index").field(index).finish(),
            Sender::Address(address) => f.debug_tuple("Address").field(address).finish(),
            Sender::Identity(signer) => f.debug_tuple("Identity").field(&signer.address()).finish(),
        }
    }
}

/// Conversion into an optional [`Sender`]; `None` selects the default
/// identity.
pub trait IntoSender {
    fn into_sender(self) -> HarnessResult<Option<Sender>>;
}

impl IntoSender for Sender {
    fn into_sender(self) -> HarnessResult<Option<Sender>> {
        Ok(Some(self))
    }
}

impl<T: IntoSender> IntoSender for Option<T> {
    fn into_sender(self) -> HarnessResult<Option<Sender>> {
        match self {
            Some(inner) => inner.into_sender(),
            None => Ok(None),
        }
    }
}

macro_rules! impl_integer_selector {
    ($($ty:ty),*) => {$(
        impl IntoSender for $ty {
            fn into_sender(self) -> HarnessResult<Option<Sender>> {
                let index = usize::try_from(self).map_err(|_| unrecognised())?;
                Ok(Some(Sender::Index(index)))
            }
        }
    )*};
}

impl_integer_selector!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);

impl IntoSender for f64 {
    fn into_sender(self) -> HarnessResult<Option<Sender>> {
        if !self.is_finite() || self.fract() != 0.0 || self < 0.0 || self >= usize::MAX as f64 {
            return Err(unrecognised());
        }
        Ok(Some(Sender::Index(self as usize)))
    }
}

impl IntoSender for f32 {
    fn into_sender(self) -> HarnessResult<Option<Sender>> {
        f64::from(self).into_sender()
    }
}

impl IntoSender for Address {
    fn into_sender(self) -> HarnessResult<Option<Sender>> {
        Ok(Some(Sender::Address(self)))
    }
}

impl IntoSender for &Address {
    fn into_sender(self) -> HarnessResult<Option<Sender>> {
        Ok(Some(Sender::Address(*self)))
    }
}

impl IntoSender for &str {
    fn into_sender(self) -> HarnessResult<Option<Sender>> {
        let address: Address = self.trim().parse().map_err(|_| unrecognised())?;
        Ok(Some(Sender::Address(address)))
    }
}

impl IntoSender for String {
    fn into_sender(self) -> HarnessResult<Option<Sender>> {
        self.as_str().into_sender()
    }
}

impl IntoSender for &String {
    fn into_sender(self) -> HarnessResult<Option<Sender>> {
        self.as_str().into_sender()
    }
}

impl IntoSender for Arc<dyn Signer> {
    fn into_sender(self) -> HarnessResult<Option<Sender>> {
        Ok(Some(Sender::Identity(self)))
    }
}

impl IntoSender for &Arc<dyn Signer> {
    fn into_sender(self) -> HarnessResult<Option<Sender>> {
        Ok(Some(Sender::Identity(Arc::clone(self))))
    }
}

impl IntoSender for Arc<Wallet> {
    fn into_sender(self) -> HarnessResult<Option<Sender>> {
        Ok(Some(Sender::Identity(self)))
    }
}

impl IntoSender for &Arc<Wallet> {
    fn into_sender(self) -> HarnessResult<Option<Sender>> {
        Arc::clone(self).into_sender()
    }
}

impl IntoSender for Arc<ManagedAccount> {
    fn into_sender(self) -> HarnessResult<Option<Sender>> {
        Ok(Some(Sender::Identity(self)))
    }
}

impl IntoSender for ManagedAccount {
    fn into_sender(self) -> HarnessResult<Option<Sender>> {
        Arc::new(self).into_sender()
    }
}

/// Dynamic selectors, e.g. read from a fixture file. Integers select by
/// index and strings by address; every other shape is rejected.
impl IntoSender for &Value {
    fn into_sender(self) -> HarnessResult<Option<Sender>> {
        match self {
            Value::Number(number) => match number.as_u64() {
                Some(index) => index.into_sender(),
                None => number.as_f64().ok_or_else(unrecognised)?.into_sender(),
            },
            Value::String(address) => address.as_str().into_sender(),
            _ => Err(unrecognised()),
        }
    }
}

impl IntoSender for Value {
    fn into_sender(self) -> HarnessResult<Option<Sender>> {
        (&self).into_sender()
    }
}
