//! Wallet address as handed out by the signer.

use crate::{ErrorLocation, ModelError};

use std::fmt;
use std::panic::Location;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

const ADDRESS_PATTERN: &str = r"^0x[0-9a-fA-F]{40}$";
const SHORT_PREFIX_LEN: usize = 5;
const SHORT_SUFFIX_LEN: usize = 4;

static ADDRESS_REGEX: OnceLock<Regex> = OnceLock::new();

fn address_regex() -> &'static Regex {
    ADDRESS_REGEX.get_or_init(|| Regex::new(ADDRESS_PATTERN).expect("valid regex pattern"))
}

/// An Ethereum-style account address (`0x` followed by 40 hex digits).
///
/// The original casing is preserved because it is part of the signed challenge text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    #[track_caller]
    pub fn parse(raw: impl Into<String>) -> Result<Self, ModelError> {
        let raw = raw.into();
        let trimmed = raw.trim();

        if !address_regex().is_match(trimmed) {
            return Err(ModelError::Validation {
                message: format!("Invalid wallet address: {trimmed}"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Display form used by the wallet badge: first five and last four characters.
    pub fn short(&self) -> String {
        let len = self.0.len();
        format!(
            "{}...{}",
            &self.0[..SHORT_PREFIX_LEN],
            &self.0[len - SHORT_SUFFIX_LEN..]
        )
    }
}

impl TryFrom<String> for Address {
    type Error = ModelError;

    #[track_caller]
    fn try_from(value: String) -> Result<Self, Self::Error> {
        Address::parse(value)
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
