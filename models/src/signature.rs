//! Wallet signature over a challenge.

use crate::{ErrorLocation, ModelError};

use std::fmt;
use std::panic::Location;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::Zeroize;

/// A signature produced by the wallet.
///
/// The signature is a bearer credential for the cached session, so `Debug` never
/// shows it and the buffer is wiped on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct Signature {
    inner: String,
}

impl Signature {
    #[track_caller]
    pub fn new(raw: impl Into<String>) -> Result<Self, ModelError> {
        let inner = raw.into().trim().to_string();

        if inner.is_empty() {
            return Err(ModelError::Validation {
                message: String::from("Signature cannot be empty"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(Self { inner })
    }

    /// Raw value, only for putting on the wire or into the session slot.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature([REDACTED; {} chars])", self.inner.len())
    }
}

impl Drop for Signature {
    fn drop(&mut self) {
        self.inner.zeroize();
    }
}

impl Serialize for Signature {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.inner)
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Signature::new(raw).map_err(serde::de::Error::custom)
    }
}
