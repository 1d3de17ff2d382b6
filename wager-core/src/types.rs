use crate::error::{EscrowError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Authenticated caller identity, as assigned by the transport.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identity {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for Identity {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Value in indivisible base units.
///
/// Serialized as a decimal string so the full `u128` range survives JSON and
/// tagged enums. Plain JSON numbers are accepted on input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Amount(u128);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    pub const fn from_units(units: u128) -> Self {
        Self(units)
    }

    pub const fn to_units(self) -> u128 {
        self.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_add(rhs.0).map(Amount)
    }

    pub fn checked_sub(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_sub(rhs.0).map(Amount)
    }

    pub fn checked_mul(self, factor: u128) -> Option<Amount> {
        self.0.checked_mul(factor).map(Amount)
    }

    pub fn saturating_add(self, rhs: Amount) -> Amount {
        Amount(self.0.saturating_add(rhs.0))
    }

    /// Checked addition surfaced as [`EscrowError::Overflow`].
    pub fn try_add(self, rhs: Amount) -> Result<Amount> {
        self.checked_add(rhs).ok_or(EscrowError::Overflow)
    }

    pub fn try_sub(self, rhs: Amount) -> Result<Amount> {
        self.checked_sub(rhs).ok_or(EscrowError::Overflow)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Amount {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct AmountVisitor;

        impl serde::de::Visitor<'_> for AmountVisitor {
            type Value = Amount;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an unsigned amount as a number or decimal string")
            }

            fn visit_u64<E: serde::de::Error>(self, v: u64) -> std::result::Result<Amount, E> {
                Ok(Amount(v as u128))
            }

            fn visit_u128<E: serde::de::Error>(self, v: u128) -> std::result::Result<Amount, E> {
                Ok(Amount(v))
            }

            fn visit_i64<E: serde::de::Error>(self, v: i64) -> std::result::Result<Amount, E> {
                u128::try_from(v)
                    .map(Amount)
                    .map_err(|_| E::custom(format!("negative amount {}", v)))
            }

            fn visit_str<E: serde::de::Error>(self, v: &str) -> std::result::Result<Amount, E> {
                v.parse::<u128>().map(Amount).map_err(E::custom)
            }
        }

        deserializer.deserialize_any(AmountVisitor)
    }
}

impl From<u64> for Amount {
    fn from(units: u64) -> Self {
        Self(units as u128)
    }
}

/// Context of a single atomic call: who is calling and the fresh value
/// attached to it. The value only counts as received if the call succeeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub caller: Identity,
    pub value: Amount,
}

impl Call {
    pub fn new(caller: impl Into<Identity>) -> Self {
        Self {
            caller: caller.into(),
            value: Amount::ZERO,
        }
    }

    pub fn paying(caller: impl Into<Identity>, value: Amount) -> Self {
        Self {
            caller: caller.into(),
            value,
        }
    }

    /// Non-payable operations reject any attached value.
    pub fn ensure_no_value(&self) -> Result<()> {
        if self.value.is_zero() {
            Ok(())
        } else {
            Err(EscrowError::value_mismatch(Amount::ZERO, self.value))
        }
    }
}
