/*!
 * Error Handling for the GCM Engine
 *
 * Two disjoint failure families: local parameter/state violations, which are
 * programmer errors surfaced synchronously, and authentication failure, which
 * is the only cryptographic outcome and deliberately carries no detail.
 */

use thiserror::Error;

/// Error type for all GCM operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CryptoError {
    #[error("Invalid parameter: {parameter} - {expected} - got {actual}")]
    InvalidParameter {
        parameter: String,
        expected: String,
        actual: String,
        error_code: u32,
    },

    #[error("Invalid state: {operation} not allowed while {state}")]
    InvalidState {
        operation: String,
        state: String,
        error_code: u32,
    },

    /// Tag verification failed. Never says which bytes differed.
    #[error("Authentication failed")]
    AuthenticationFailed { error_code: u32 },

    #[error("Security policy violation: {policy} - {details}")]
    SecurityPolicyViolation {
        policy: String,
        details: String,
        error_code: u32,
        severity: SecuritySeverity,
    },
}

/// Security severity levels for policy violations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecuritySeverity {
    Low,
    Medium,
    High,
    Critical,
}

/// Error code constants for different error categories
pub mod error_codes {
    // Parameter errors: 1000-1999
    pub const INVALID_IV_LENGTH: u32 = 1001;
    pub const INVALID_TAG_LENGTH: u32 = 1002;
    pub const INVALID_KEY_LENGTH: u32 = 1003;
    pub const OUTPUT_TOO_SHORT: u32 = 1004;
    pub const INVALID_CONFIG: u32 = 1005;

    // State machine errors: 2000-2999
    pub const SESSION_NOT_STARTED: u32 = 2001;
    pub const SESSION_FINISHED: u32 = 2002;
    pub const AAD_AFTER_DATA: u32 = 2003;
    pub const UNALIGNED_BLOCK: u32 = 2004;
    pub const REPLAY_MIXED_WITH_KEYSTREAM: u32 = 2005;

    // Authentication errors: 3000-3999
    pub const GCM_AUTHENTICATION_FAILED: u32 = 3001;

    // Security policy errors: 5000-5999
    pub const TAG_BELOW_POLICY_MINIMUM: u32 = 5001;
}

impl CryptoError {
    /// Get the numeric error code for this error
    pub fn error_code(&self) -> u32 {
        match self {
            CryptoError::InvalidParameter { error_code, .. } => *error_code,
            CryptoError::InvalidState { error_code, .. } => *error_code,
            CryptoError::AuthenticationFailed { error_code } => *error_code,
            CryptoError::SecurityPolicyViolation { error_code, .. } => *error_code,
        }
    }

    /// Get the error category/type as a string
    pub fn error_type(&self) -> &'static str {
        match self {
            CryptoError::InvalidParameter { .. } => "InvalidParameter",
            CryptoError::InvalidState { .. } => "InvalidState",
            CryptoError::AuthenticationFailed { .. } => "AuthenticationFailed",
            CryptoError::SecurityPolicyViolation { .. } => "SecurityPolicyViolation",
        }
    }

    /// Get a user-friendly error message
    pub fn user_friendly_message(&self) -> String {
        match self {
            CryptoError::InvalidParameter {
                parameter,
                expected,
                ..
            } => {
                format!(
                    "Invalid parameter '{}'. Expected {}.",
                    parameter, expected
                )
            }
            CryptoError::InvalidState { operation, .. } => {
                format!(
                    "Operation '{}' was called out of order. Start a new message first.",
                    operation
                )
            }
            CryptoError::AuthenticationFailed { .. } => {
                "Message authentication failed. Discard all decrypted data.".to_string()
            }
            CryptoError::SecurityPolicyViolation {
                policy, severity, ..
            } => match severity {
                SecuritySeverity::Critical => format!(
                    "Critical security violation: {}. Immediate action required.",
                    policy
                ),
                SecuritySeverity::High => format!(
                    "High-priority security issue: {}. Please address promptly.",
                    policy
                ),
                SecuritySeverity::Medium => {
                    format!("Security concern: {}. Review recommended.", policy)
                }
                SecuritySeverity::Low => format!("Minor security notice: {}.", policy),
            },
        }
    }

    /// Whether this error is the cryptographic verification outcome
    pub fn is_authentication_failure(&self) -> bool {
        matches!(self, CryptoError::AuthenticationFailed { .. })
    }
}

/// Convenience constructors for common error types
impl CryptoError {
    pub fn invalid_parameter(parameter: &str, expected: &str, actual: &str) -> Self {
        Self::invalid_parameter_with_code(parameter, expected, actual, 9999)
    }

    pub fn invalid_parameter_with_code(
        parameter: &str,
        expected: &str,
        actual: &str,
        error_code: u32,
    ) -> Self {
        CryptoError::InvalidParameter {
            parameter: parameter.to_string(),
            expected: expected.to_string(),
            actual: actual.to_string(),
            error_code,
        }
    }

    pub fn invalid_state(operation: &str, state: &str, error_code: u32) -> Self {
        CryptoError::InvalidState {
            operation: operation.to_string(),
            state: state.to_string(),
            error_code,
        }
    }

    pub fn authentication_failed() -> Self {
        CryptoError::AuthenticationFailed {
            error_code: error_codes::GCM_AUTHENTICATION_FAILED,
        }
    }

    pub fn security_violation(policy: &str, details: &str, severity: SecuritySeverity) -> Self {
        CryptoError::SecurityPolicyViolation {
            policy: policy.to_string(),
            details: details.to_string(),
            error_code: error_codes::TAG_BELOW_POLICY_MINIMUM,
            severity,
        }
    }
}

/// Result type alias for cryptographic operations
pub type CryptoResult<T> = Result<T, CryptoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_generation() {
        let error = CryptoError::invalid_parameter_with_code(
            "iv",
            "at least 1 byte",
            "0 bytes",
            error_codes::INVALID_IV_LENGTH,
        );
        assert_eq!(error.error_code(), error_codes::INVALID_IV_LENGTH);
        assert_eq!(error.error_type(), "InvalidParameter");
    }

    #[test]
    fn test_authentication_failure_is_opaque() {
        let error = CryptoError::authentication_failed();
        assert!(error.is_authentication_failure());
        assert_eq!(error.to_string(), "Authentication failed");
        assert_eq!(error.error_code(), error_codes::GCM_AUTHENTICATION_FAILED);
    }

    #[test]
    fn test_user_friendly_message() {
        let error = CryptoError::security_violation(
            "min_tag_len",
            "tag of 4 bytes below minimum of 12",
            SecuritySeverity::High,
        );
        let message = error.user_friendly_message();
        assert!(message.contains("High-priority security issue"));
    }

    #[test]
    fn test_invalid_state_message() {
        let error = CryptoError::invalid_state("put", "idle", error_codes::SESSION_NOT_STARTED);
        assert!(error.to_string().contains("put"));
        assert!(error.user_friendly_message().contains("out of order"));
        assert!(!error.is_authentication_failure());
    }
}
