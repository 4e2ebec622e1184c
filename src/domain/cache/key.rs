//! Cache key construction and validation
//!
//! Keys are hierarchical: `<entity>:<shape>:<params...>`. The leading entity segment
//! is the unit of invalidation, so every key built here starts with the prefix returned
//! by [`CacheKeyBuilder::entity_prefix`].

use sha2::{Digest, Sha256};

use crate::domain::DomainError;

/// Separator between key segments
pub const KEY_SEPARATOR: char = ':';

/// Maximum length of a logical cache key in bytes
pub const MAX_KEY_LENGTH: usize = 512;

/// Free-text segments longer than this are replaced by a digest
const MAX_TERM_LENGTH: usize = 64;

/// Validates a logical cache key
pub fn validate_key(key: &str) -> Result<(), DomainError> {
    validate_key_like("Cache key", key)
}

/// Validates a prefix passed to prefix removal
pub fn validate_prefix(prefix: &str) -> Result<(), DomainError> {
    validate_key_like("Cache key prefix", prefix)
}

fn validate_key_like(what: &str, value: &str) -> Result<(), DomainError> {
    if value.is_empty() {
        return Err(DomainError::validation(format!("{} cannot be empty", what)));
    }

    if value.len() > MAX_KEY_LENGTH {
        return Err(DomainError::validation(format!(
            "{} cannot exceed {} bytes",
            what, MAX_KEY_LENGTH
        )));
    }

    if value.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(DomainError::validation(format!(
            "{} cannot contain whitespace or control characters",
            what
        )));
    }

    Ok(())
}

fn is_key_safe(c: char) -> bool {
    !(c.is_whitespace() || c.is_control() || c == KEY_SEPARATOR)
}

/// Builder for hierarchical cache keys
#[derive(Debug, Clone)]
pub struct CacheKeyBuilder {
    segments: Vec<String>,
}

impl CacheKeyBuilder {
    /// Starts a key for the given entity collection (e.g. `products`)
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            segments: vec![Self::sanitize(&entity.into())],
        }
    }

    /// The invalidation prefix shared by every key of an entity collection
    pub fn entity_prefix(entity: &str) -> String {
        format!("{}{}", Self::sanitize(entity), KEY_SEPARATOR)
    }

    /// Appends a structured segment (identifier, page number, ...)
    ///
    /// Characters that would break the hierarchy are replaced with `_`.
    pub fn segment(mut self, value: impl ToString) -> Self {
        self.segments.push(Self::sanitize(&value.to_string()));
        self
    }

    /// Appends a free-text segment such as a search term
    ///
    /// The term is trimmed and lowercased. Terms that are long or contain characters
    /// outside the key alphabet are replaced by a stable digest.
    pub fn term(mut self, value: &str) -> Self {
        let normalized = value.trim().to_lowercase();

        let segment = if normalized.len() <= MAX_TERM_LENGTH && normalized.chars().all(is_key_safe)
        {
            normalized
        } else {
            Self::digest(&normalized)
        };

        self.segments.push(segment);
        self
    }

    /// Builds the final key
    pub fn build(&self) -> String {
        self.segments.join(&KEY_SEPARATOR.to_string())
    }

    fn sanitize(raw: &str) -> String {
        raw.chars()
            .map(|c| if is_key_safe(c) { c } else { '_' })
            .collect()
    }

    // Stable across processes, which matters for the networked store.
    fn digest(input: &str) -> String {
        let hash = Sha256::digest(input.as_bytes());
        format!("h-{}", &hex::encode(hash)[..16])
    }
}
