//! Tag-length policy for GCM instances.
//!
//! SP 800-38D permits tags of 4 to 16 bytes. Tags below 12 bytes are only
//! appropriate for tightly bounded usage, so the policy can warn about them
//! or forbid them outright.

use serde::{Deserialize, Serialize};

use crate::error::{error_codes, CryptoError, CryptoResult, SecuritySeverity};

/// Smallest tag length the mode defines
pub const MIN_TAG_LEN: usize = 4;

/// Largest tag length, a full block
pub const MAX_TAG_LEN: usize = 16;

/// Tags shorter than this draw a warning under the default policy
pub const RECOMMENDED_MIN_TAG_LEN: usize = 12;

/// Tag-length policy applied by sessions and the [`Gcm`](crate::gcm::Gcm) façade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GcmConfig {
    /// Tag length used by the convenience encrypt calls
    pub default_tag_len: usize,
    /// Shortest tag accepted when producing or checking
    pub min_tag_len: usize,
    /// Tags shorter than this are accepted but logged
    pub warn_below_tag_len: usize,
}

impl Default for GcmConfig {
    fn default() -> Self {
        Self {
            default_tag_len: MAX_TAG_LEN,
            min_tag_len: MIN_TAG_LEN,
            warn_below_tag_len: RECOMMENDED_MIN_TAG_LEN,
        }
    }
}

impl GcmConfig {
    /// Policy that refuses tags below the recommended minimum
    pub fn strict() -> Self {
        Self {
            min_tag_len: RECOMMENDED_MIN_TAG_LEN,
            ..Self::default()
        }
    }

    /// Check that the policy itself is coherent
    pub fn validate(&self) -> CryptoResult<()> {
        for (name, value) in [
            ("default_tag_len", self.default_tag_len),
            ("min_tag_len", self.min_tag_len),
        ] {
            if !(MIN_TAG_LEN..=MAX_TAG_LEN).contains(&value) {
                return Err(CryptoError::invalid_parameter_with_code(
                    name,
                    &format!("{} to {} bytes", MIN_TAG_LEN, MAX_TAG_LEN),
                    &format!("{} bytes", value),
                    error_codes::INVALID_CONFIG,
                ));
            }
        }

        if self.default_tag_len < self.min_tag_len {
            return Err(CryptoError::invalid_parameter_with_code(
                "default_tag_len",
                &format!("at least min_tag_len ({} bytes)", self.min_tag_len),
                &format!("{} bytes", self.default_tag_len),
                error_codes::INVALID_CONFIG,
            ));
        }

        Ok(())
    }

    /// Decide whether a tag of `len` bytes may be produced or checked.
    ///
    /// Lengths outside 4..=16 are parameter errors; lengths the mode allows
    /// but the policy does not are policy violations.
    pub fn check_tag_len(&self, len: usize) -> CryptoResult<()> {
        if !(MIN_TAG_LEN..=MAX_TAG_LEN).contains(&len) {
            return Err(CryptoError::invalid_parameter_with_code(
                "tag",
                &format!("{} to {} bytes", MIN_TAG_LEN, MAX_TAG_LEN),
                &format!("{} bytes", len),
                error_codes::INVALID_TAG_LENGTH,
            ));
        }

        if len < self.min_tag_len {
            return Err(CryptoError::security_violation(
                "min_tag_len",
                &format!(
                    "tag of {} bytes below configured minimum of {}",
                    len, self.min_tag_len
                ),
                SecuritySeverity::High,
            ));
        }

        if len < self.warn_below_tag_len {
            log::warn!(
                "using a {}-byte GCM tag; tags below {} bytes weaken forgery resistance",
                len,
                self.warn_below_tag_len
            );
        }

        Ok(())
    }
}
