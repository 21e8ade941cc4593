//! Registration code value type
//!
//! Codes are stored and compared upper-case without separators, and shown to
//! people in hyphen-separated triples (`AB3-XQ9-77Z`).

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Symbols a code may contain
pub const CODE_ALPHABET: &[u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

const GROUP_SIZE: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct RegistrationCode(String);

/// Why a presented code could not be normalised
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodeFormatError {
    #[error("code is empty")]
    Empty,

    #[error("expected {expected} characters, got {actual}")]
    WrongLength { expected: usize, actual: usize },

    #[error("invalid character '{0}'")]
    InvalidCharacter(char),
}

impl RegistrationCode {
    /// Normalise user input: drop separators, upper-case, then check length and alphabet
    pub fn parse(input: &str, expected_len: usize) -> Result<Self, CodeFormatError> {
        let normalized: String = input
            .chars()
            .filter(|c| !is_separator(*c))
            .map(|c| c.to_ascii_uppercase())
            .collect();

        if normalized.is_empty() {
            return Err(CodeFormatError::Empty);
        }

        if let Some(bad) = normalized.chars().find(|c| !is_code_symbol(*c)) {
            return Err(CodeFormatError::InvalidCharacter(bad));
        }

        let actual = normalized.chars().count();
        if actual != expected_len {
            return Err(CodeFormatError::WrongLength {
                expected: expected_len,
                actual,
            });
        }

        Ok(Self(normalized))
    }

    /// Wrap symbols already drawn from [`CODE_ALPHABET`]
    pub(crate) fn from_generated(symbols: String) -> Self {
        Self(symbols)
    }

    /// Canonical stored form
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Human-facing form grouped in triples
    pub fn display(&self) -> String {
        self.0
            .as_bytes()
            .chunks(GROUP_SIZE)
            .map(|group| String::from_utf8_lossy(group))
            .collect::<Vec<_>>()
            .join("-")
    }
}

impl fmt::Display for RegistrationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

fn is_separator(c: char) -> bool {
    c == '-' || c.is_whitespace()
}

fn is_code_symbol(c: char) -> bool {
    c.is_ascii_uppercase() || c.is_ascii_digit()
}
