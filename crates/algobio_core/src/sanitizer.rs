//! Nucleotide sequence sanitization.

use algobio_error::{ConfigError, ValidationError, ValidationErrorKind};
use derive_getters::Getters;
use tracing::{debug, instrument};

/// Residues a cleaned sequence may contain.
pub const NUCLEOTIDE_ALPHABET: [char; 5] = ['A', 'C', 'T', 'G', 'N'];

/// Normalizes raw text into a bounded sequence over [`NUCLEOTIDE_ALPHABET`].
///
/// Cleaning strips whitespace, uppercases, drops every character outside the
/// alphabet and keeps at most `max_len` residues. The minimum length is
/// checked after filtering, so only valid residues count toward it.
///
/// # Examples
///
/// ```
/// use algobio_core::SequenceSanitizer;
///
/// let sanitizer = SequenceSanitizer::new(4, 6).unwrap();
/// assert_eq!(sanitizer.clean("acgtACGTxyz\n").unwrap(), "ACGTAC");
/// assert!(sanitizer.clean("xyz").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Getters)]
pub struct SequenceSanitizer {
    /// Minimum number of valid residues
    min_len: usize,
    /// Maximum number of residues kept
    max_len: usize,
}

impl SequenceSanitizer {
    /// Create a sanitizer with the given length bounds.
    ///
    /// # Errors
    ///
    /// Returns an error if `max_len` is zero or smaller than `min_len`.
    pub fn new(min_len: usize, max_len: usize) -> Result<Self, ConfigError> {
        if max_len == 0 {
            return Err(ConfigError::new("max_len must be greater than zero"));
        }
        if max_len < min_len {
            return Err(ConfigError::new(format!(
                "max_len ({}) must not be smaller than min_len ({})",
                max_len, min_len
            )));
        }
        Ok(Self { min_len, max_len })
    }

    /// Clean a raw sequence.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationErrorKind::SequenceTooShort`] when fewer than
    /// `min_len` valid residues remain.
    #[instrument(skip_all, fields(raw_len = raw.len()))]
    pub fn clean(&self, raw: &str) -> Result<String, ValidationError> {
        let mut cleaned: String = raw
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| c.to_ascii_uppercase())
            .filter(|c| NUCLEOTIDE_ALPHABET.contains(c))
            .collect();

        if cleaned.len() < self.min_len {
            debug!(
                length = cleaned.len(),
                min_len = self.min_len,
                "Sequence rejected after cleaning"
            );
            return Err(ValidationError::new(ValidationErrorKind::SequenceTooShort {
                length: cleaned.len(),
                min_len: self.min_len,
            }));
        }

        // Every retained character is ASCII, so byte truncation is a prefix.
        cleaned.truncate(self.max_len);
        debug!(length = cleaned.len(), "Sequence cleaned");
        Ok(cleaned)
    }
}
