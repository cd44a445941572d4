//! Tracking-number (radicado) generation.
//!
//! A tracking number looks like `PQR-20250115-1234`: a configurable prefix,
//! the creation date, and a four-digit disambiguator. The disambiguator is
//! not unique on its own, so callers must probe the store and retry; see
//! [`DEFAULT_MAX_ATTEMPTS`].

use rand::Rng;
use regex::Regex;

use crate::error::CoreError;
use crate::types::Timestamp;

/// Prefix used when none is configured.
pub const DEFAULT_PREFIX: &str = "PQR";

/// Retry budget for finding an unused tracking number.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

/// Maximum prefix length accepted by [`validate_prefix`].
pub const MAX_PREFIX_LENGTH: usize = 10;

/// Builds candidate tracking numbers for new cases.
#[derive(Debug, Clone)]
pub struct TrackingNumberGenerator {
    prefix: String,
}

impl Default for TrackingNumberGenerator {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
        }
    }
}

impl TrackingNumberGenerator {
    /// Create a generator with the given prefix.
    pub fn new(prefix: impl Into<String>) -> Result<Self, CoreError> {
        let prefix = prefix.into();
        validate_prefix(&prefix)?;
        Ok(Self { prefix })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Generate a candidate for the current instant.
    pub fn generate(&self) -> String {
        self.generate_at(chrono::Utc::now(), 0)
    }

    /// Generate a candidate for `now`.
    ///
    /// The first attempt uses the last four digits of the millisecond
    /// timestamp. Retries draw a random disambiguator instead, since a retry
    /// issued within the same millisecond would otherwise reproduce the
    /// colliding value.
    pub fn generate_at(&self, now: Timestamp, attempt: u32) -> String {
        let disambiguator = if attempt == 0 {
            now.timestamp_millis().rem_euclid(10_000)
        } else {
            rand::rng().random_range(0..10_000)
        };
        format!(
            "{}-{}-{:04}",
            self.prefix,
            now.format("%Y%m%d"),
            disambiguator
        )
    }

    /// Whether `value` has the shape of a tracking number from this generator.
    pub fn is_well_formed(&self, value: &str) -> bool {
        let pattern = format!(r"^{}-(\d{{8}})-\d{{4}}$", regex::escape(&self.prefix));
        let Ok(re) = Regex::new(&pattern) else {
            return false;
        };
        re.captures(value)
            .and_then(|caps| caps.get(1))
            .is_some_and(|date| {
                chrono::NaiveDate::parse_from_str(date.as_str(), "%Y%m%d").is_ok()
            })
    }
}

/// Normalize user-typed tracking numbers (surrounding whitespace, lowercase).
pub fn normalize(value: &str) -> String {
    value.trim().to_ascii_uppercase()
}

/// Validate a configured prefix: 1-10 uppercase ASCII letters or digits.
pub fn validate_prefix(prefix: &str) -> Result<(), CoreError> {
    let ok = !prefix.is_empty()
        && prefix.len() <= MAX_PREFIX_LENGTH
        && prefix
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit());
    if ok {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Tracking prefix '{prefix}' must be 1-{MAX_PREFIX_LENGTH} uppercase letters or digits"
        )))
    }
}
