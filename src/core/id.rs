/*!
 * Signal Identifiers
 * Canonical UUID wrapper so that case and format variants of one UUID collide
 */

use super::errors::{SignalError, SignalResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Canonical signal UUID (lowercase, hyphenated)
///
/// Every UUID that enters the router passes through [`SignalUuid::parse`],
/// so `"{ABCDEF00-...}"`, `"abcdef00..."` and `"urn:uuid:abcdef00-..."` all
/// address the same signal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SignalUuid(String);

impl SignalUuid {
    /// Parse and normalize any accepted UUID notation
    pub fn parse(input: &str) -> SignalResult<Self> {
        Uuid::parse_str(input.trim())
            .map(Self::from_uuid)
            .map_err(|_| SignalError::InvalidUuid(input.to_string()))
    }

    /// Fresh random (v4) UUID
    pub fn generate() -> Self {
        Self::from_uuid(Uuid::new_v4())
    }

    /// The nil UUID, used as the default value of uuid parameters
    pub fn nil() -> Self {
        Self::from_uuid(Uuid::nil())
    }

    fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid.hyphenated().to_string())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Normalize a UUID string into its canonical form
pub fn normalize_uuid(input: &str) -> SignalResult<String> {
    SignalUuid::parse(input).map(String::from)
}

impl fmt::Display for SignalUuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for SignalUuid {
    type Err = SignalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for SignalUuid {
    type Error = SignalError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<SignalUuid> for String {
    fn from(id: SignalUuid) -> Self {
        id.0
    }
}

impl AsRef<str> for SignalUuid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
