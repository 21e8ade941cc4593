//! Check-in code generation

use rand::distributions::{Distribution, Uniform};
use rand::rngs::OsRng;

use crate::models::{RegistrationCode, CODE_ALPHABET};

/// Draw `length` symbols uniformly from [`CODE_ALPHABET`] using the OS CSPRNG.
///
/// `Uniform` rejection-samples the index, so every symbol has probability 1/36.
pub fn generate_code(length: usize) -> String {
    let index = Uniform::from(0..CODE_ALPHABET.len());
    index
        .sample_iter(OsRng)
        .take(length)
        .map(|i| char::from(CODE_ALPHABET[i]))
        .collect()
}

/// Source of fresh registration codes
pub trait CodeSource: Send + Sync {
    fn next_code(&self, length: usize) -> RegistrationCode;
}

/// Cryptographically random codes
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomCodes;

impl CodeSource for RandomCodes {
    fn next_code(&self, length: usize) -> RegistrationCode {
        RegistrationCode::from_generated(generate_code(length))
    }
}
