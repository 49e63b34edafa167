//! Runtime tokens
//!
//! A runtime token identifies one execution instance and, together with the
//! job name, is the key used to retrieve its result. Tokens are UTC
//! timestamps with microsecond precision, so they sort lexically in the
//! order they were minted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicI64, Ordering};

const TOKEN_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Opaque, lexically sortable correlation key of a run
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuntimeToken(String);

impl RuntimeToken {
    fn from_micros(micros: i64) -> Self {
        let instant = DateTime::<Utc>::from_timestamp_micros(micros).unwrap_or_else(Utc::now);
        Self(instant.format(TOKEN_FORMAT).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RuntimeToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for RuntimeToken {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for RuntimeToken {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Mints strictly increasing runtime tokens
///
/// Safe to share between request handlers and background tasks. When the
/// clock has not moved past the last minted instant, the next token is
/// bumped by one microsecond.
#[derive(Debug)]
pub struct RuntimeTokenGenerator {
    last_micros: AtomicI64,
}

impl RuntimeTokenGenerator {
    pub fn new() -> Self {
        Self {
            last_micros: AtomicI64::new(0),
        }
    }

    /// Mints the next token
    pub fn next(&self) -> RuntimeToken {
        let now = Utc::now().timestamp_micros();

        let previous = self
            .last_micros
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last + 1))
            })
            .unwrap_or_else(|last| last);

        RuntimeToken::from_micros(now.max(previous + 1))
    }
}

impl Default for RuntimeTokenGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn test_sequential_tokens_sort_in_mint_order() {
        let generator = RuntimeTokenGenerator::new();
        let tokens: Vec<RuntimeToken> = (0..1_000).map(|_| generator.next()).collect();

        let mut sorted = tokens.clone();
        sorted.sort();
        assert_eq!(sorted, tokens);

        let unique: HashSet<_> = tokens.iter().collect();
        assert_eq!(unique.len(), tokens.len());
    }

    #[test]
    fn test_concurrent_tokens_are_distinct() {
        let generator = Arc::new(RuntimeTokenGenerator::new());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let generator = Arc::clone(&generator);
                std::thread::spawn(move || {
                    (0..500).map(|_| generator.next()).collect::<Vec<_>>()
                })
            })
            .collect();

        let mut all = Vec::new();
        for handle in handles {
            let tokens = handle.join().unwrap();
            assert!(tokens.windows(2).all(|pair| pair[0] < pair[1]));
            all.extend(tokens);
        }

        let unique: HashSet<_> = all.iter().collect();
        assert_eq!(unique.len(), 8 * 500);
    }

    #[test]
    fn test_token_format() {
        let token = RuntimeTokenGenerator::new().next();
        // YYYY-MM-DD HH:MM:SS.ffffff
        assert_eq!(token.as_str().len(), 26);
        assert_eq!(&token.as_str()[10..11], " ");
        assert_eq!(&token.as_str()[19..20], ".");
    }

    #[test]
    fn test_token_serializes_as_plain_string() {
        let token = RuntimeToken::from("2026-01-01 00:00:00.000001");
        assert_eq!(
            serde_json::to_string(&token).unwrap(),
            "\"2026-01-01 00:00:00.000001\""
        );
    }
}
