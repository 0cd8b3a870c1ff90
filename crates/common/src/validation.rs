//! Input validation and safe clock helpers.

use anyhow::{anyhow, Result};
use std::time::{SystemTime, UNIX_EPOCH};

/// Maximum length for tenant identifiers.
pub const MAX_TENANT_ID_LENGTH: usize = 256;

/// Current Unix timestamp in seconds, degrading to 0 with a warning
/// instead of panicking when the system clock is before the epoch.
pub fn safe_unix_timestamp() -> u64 {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(duration) => duration.as_secs(),
        Err(e) => {
            tracing::warn!(
                error = %e,
                "system clock is before UNIX epoch, using timestamp 0"
            );
            0
        }
    }
}

/// Validate an opaque tenant identifier: non-empty, bounded length, no
/// control characters.
pub fn validate_tenant_id(tenant_id: &str) -> Result<()> {
    if tenant_id.is_empty() {
        return Err(anyhow!("tenant id must not be empty"));
    }
    if tenant_id.len() > MAX_TENANT_ID_LENGTH {
        return Err(anyhow!(
            "tenant id exceeds {} characters",
            MAX_TENANT_ID_LENGTH
        ));
    }
    if tenant_id.chars().any(|c| c.is_control()) {
        return Err(anyhow!("tenant id contains control characters"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_unix_timestamp_is_positive() {
        assert!(safe_unix_timestamp() > 1_600_000_000);
    }

    #[test]
    fn test_validate_tenant_id() {
        assert!(validate_tenant_id("org-1234").is_ok());
        assert!(validate_tenant_id("").is_err());
        assert!(validate_tenant_id("bad\nid").is_err());
        assert!(validate_tenant_id(&"x".repeat(300)).is_err());
    }
}
