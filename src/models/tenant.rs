//! Tenant identifiers: the first path segment of every launch route.

use std::fmt;
use thiserror::Error;

const TENANT_MAX_LEN: usize = 64;

/// A validated tenant identifier.
///
/// Tenants name a folder directly beneath the repository root, so the
/// identifier must be usable as a single path segment: ASCII letters,
/// digits, `-`, `_` and `.`, no leading dot and no `..`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TenantId(String);

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid tenant `{name}`: {reason}")]
pub struct InvalidTenant {
    pub name: String,
    pub reason: &'static str,
}

impl TenantId {
    pub fn parse(name: &str) -> Result<Self, InvalidTenant> {
        let invalid = |reason| InvalidTenant {
            name: name.to_string(),
            reason,
        };

        if name.is_empty() || name.len() > TENANT_MAX_LEN {
            return Err(invalid("must be between 1 and 64 characters"));
        }
        if !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        {
            return Err(invalid(
                "allowed characters are letters, digits, dots, hyphens and underscores",
            ));
        }
        if name.starts_with('.') || name.contains("..") {
            return Err(invalid("must not start with a dot or contain `..`"));
        }

        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
