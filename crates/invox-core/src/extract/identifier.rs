//! Job-identifier normalization.
//!
//! Invoices carry the project/job identifier in a loosely formatted cell
//! (`"REQ-123456-99"`, `"JOB1234567"`, ...). The accounting system wants a
//! canonical fixed-width code, reconstructed from the digit runs alone.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::NormalizeError;
use crate::models::config::CorePolicy;

lazy_static! {
    static ref DIGIT_RUN: Regex = Regex::new(r"\d+").unwrap();
}

/// Normalizer for raw job identifiers.
pub struct IdentifierNormalizer {
    policy: CorePolicy,
}

impl IdentifierNormalizer {
    /// Create a normalizer with the strict default policy.
    pub fn new() -> Self {
        Self {
            policy: CorePolicy::Strict,
        }
    }

    /// Set the core-length policy.
    pub fn with_policy(mut self, policy: CorePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Normalize a raw identifier into its canonical padded form.
    ///
    /// The prefix is `REQ` when the raw string contains `REQ` (any case),
    /// otherwise `JB`. All digit runs are concatenated in order of
    /// appearance; more than 7 digits means the value carries a two-digit
    /// trailing suffix, which is dropped. A 6-digit core pads to
    /// `<prefix>0000<core>`, a 7-digit core to `<prefix>000<core>`.
    ///
    /// Pure function: no side effects, same input always yields the same
    /// output.
    pub fn normalize(&self, raw: &str) -> Result<String, NormalizeError> {
        let prefix = if raw.to_ascii_uppercase().contains("REQ") {
            "REQ"
        } else {
            "JB"
        };

        let digits: String = DIGIT_RUN.find_iter(raw).map(|m| m.as_str()).collect();
        if digits.is_empty() {
            return Err(NormalizeError::NoDigits);
        }

        let core = if digits.len() > 7 {
            &digits[..digits.len() - 2]
        } else {
            digits.as_str()
        };

        match (core.len(), self.policy) {
            (6, _) => Ok(format!("{prefix}0000{core}")),
            (7, _) => Ok(format!("{prefix}000{core}")),
            (_, CorePolicy::Legacy) => Ok(format!("{prefix}000{core}")),
            (len, CorePolicy::Strict) => Err(NormalizeError::CoreLength {
                digits: core.to_string(),
                len,
            }),
        }
    }
}

impl Default for IdentifierNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalize a raw identifier with the strict default policy.
pub fn normalize_identifier(raw: &str) -> Result<String, NormalizeError> {
    IdentifierNormalizer::new().normalize(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_req_with_suffix() {
        // 8 digits: the trailing "99" is a suffix and is dropped.
        assert_eq!(
            normalize_identifier("REQ-123456-99").unwrap(),
            "REQ0000123456"
        );
    }

    #[test]
    fn test_seven_digit_core_kept() {
        assert_eq!(normalize_identifier("JOB1234567").unwrap(), "JB0001234567");
    }

    #[test]
    fn test_no_digits() {
        assert_eq!(
            normalize_identifier("no-digits-here"),
            Err(NormalizeError::NoDigits)
        );
    }

    #[test]
    fn test_req_detection_is_case_insensitive() {
        assert_eq!(
            normalize_identifier("req 0123456").unwrap(),
            "REQ0000123456"
        );
    }

    #[test]
    fn test_digit_runs_concatenate_in_order() {
        assert_eq!(normalize_identifier("JB 12-34-56").unwrap(), "JB0000123456");
    }

    #[test]
    fn test_nine_digit_value_trims_to_seven() {
        assert_eq!(normalize_identifier("123456789").unwrap(), "JB0001234567");
    }

    #[test]
    fn test_strict_rejects_short_core() {
        assert_eq!(
            normalize_identifier("JB-12345"),
            Err(NormalizeError::CoreLength {
                digits: "12345".to_string(),
                len: 5,
            })
        );
    }

    #[test]
    fn test_strict_rejects_long_trimmed_core() {
        // 10 digits trim to 8, still outside {6, 7}.
        assert!(matches!(
            normalize_identifier("1234567890"),
            Err(NormalizeError::CoreLength { len: 8, .. })
        ));
    }

    #[test]
    fn test_legacy_pads_any_length() {
        let normalizer = IdentifierNormalizer::new().with_policy(CorePolicy::Legacy);
        assert_eq!(normalizer.normalize("JB-12345").unwrap(), "JB00012345");
        assert_eq!(normalizer.normalize("1234567890").unwrap(), "JB00012345678");
    }
}
