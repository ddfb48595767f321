//! Search identifiers, resolved addresses and on-chain type filters.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::InputError;

/// Reserved suffix of SuiNS names.
pub const DOMAIN_SUFFIX: &str = ".sui";

/// Raw user input, classified once at capture time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identifier {
    /// Opaque chain address, used as-is.
    AddressLiteral(CanonicalAddress),
    /// SuiNS name, kept exactly as typed for messaging.
    DomainName(String),
}

impl Identifier {
    /// Trim the input and classify it by the reserved suffix.
    pub fn parse(raw: &str) -> Result<Self, InputError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(InputError::Empty);
        }
        if is_domain(trimmed) {
            return Ok(Identifier::DomainName(trimmed.to_string()));
        }
        CanonicalAddress::new(trimmed)
            .map(Identifier::AddressLiteral)
            .ok_or(InputError::Empty)
    }

    /// The identifier as the user typed it (after trimming).
    pub fn as_str(&self) -> &str {
        match self {
            Identifier::AddressLiteral(addr) => addr.as_str(),
            Identifier::DomainName(name) => name,
        }
    }

    pub fn is_domain(&self) -> bool {
        matches!(self, Identifier::DomainName(_))
    }

    /// Lowercased form sent to name services. `None` for address literals.
    pub fn normalized_domain(&self) -> Option<String> {
        match self {
            Identifier::DomainName(name) => Some(name.to_lowercase()),
            Identifier::AddressLiteral(_) => None,
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn is_domain(s: &str) -> bool {
    let suffix_len = DOMAIN_SUFFIX.len();
    s.len() >= suffix_len
        && s.is_char_boundary(s.len() - suffix_len)
        && s[s.len() - suffix_len..].eq_ignore_ascii_case(DOMAIN_SUFFIX)
}

/// Chain address used for ownership queries. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CanonicalAddress(String);

impl CanonicalAddress {
    /// Returns `None` for empty or whitespace-only input.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn short(&self) -> String {
        short_address(&self.0)
    }
}

impl fmt::Display for CanonicalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// `0x1234...abcd` style abbreviation for display.
pub fn short_address(address: &str) -> String {
    if address.is_empty() {
        return "N/A".to_string();
    }
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 10 {
        return address.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

/// Fully-qualified Move struct type: `package::module::Name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TypeFilter {
    package: String,
    module: String,
    name: String,
}

impl TypeFilter {
    pub fn package(&self) -> &str {
        &self.package
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The string form used in `StructType` predicates.
    pub fn struct_type(&self) -> String {
        format!("{}::{}::{}", self.package, self.module, self.name)
    }
}

impl FromStr for TypeFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split("::").collect();
        if parts.len() != 3 || parts.iter().any(|p| p.is_empty()) {
            return Err(format!(
                "Invalid struct type '{}': expected package::module::Name",
                s
            ));
        }
        if !parts[0].starts_with("0x") {
            return Err(format!(
                "Invalid struct type '{}': package must be a 0x-prefixed address",
                s
            ));
        }
        Ok(Self {
            package: parts[0].to_string(),
            module: parts[1].to_string(),
            name: parts[2].to_string(),
        })
    }
}

impl TryFrom<String> for TypeFilter {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TypeFilter> for String {
    fn from(filter: TypeFilter) -> Self {
        filter.struct_type()
    }
}

impl fmt::Display for TypeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}::{}", self.package, self.module, self.name)
    }
}
