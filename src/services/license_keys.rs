//! License key synthesis from a stored generator
//!
//! A key is `prefix + chunk (separator chunk)* + suffix`, each chunk holding
//! `chunk_length` characters drawn uniformly from the generator's charset.
//! Keys produced in one batch are distinct.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use rand::{seq::SliceRandom, Rng};
use serde::Serialize;

use crate::models::Generator;
use crate::utils::AppError;

/// Upper bound on draws per requested key before giving up on uniqueness
const MAX_ATTEMPTS_PER_KEY: usize = 32;

/// Longest key body, in drawn characters, a generator may describe
const MAX_KEY_SYMBOLS: u64 = 4096;

/// One freshly issued key with the limits inherited from its generator
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedKey {
    pub license_key: String,
    pub generator_id: i64,
    pub expires_at: Option<DateTime<Utc>>,
    pub times_activated_max: Option<u32>,
}

pub struct LicenseKeyGenerator<'a> {
    generator: &'a Generator,
    alphabet: Vec<char>,
}

impl<'a> LicenseKeyGenerator<'a> {
    pub fn new(generator: &'a Generator) -> Result<Self, AppError> {
        let alphabet: Vec<char> = generator.charset.chars().collect();
        if alphabet.is_empty() {
            return Err(AppError::validation(
                "charset",
                "Generator charset is invalid.",
            ));
        }
        if generator.chunks == 0 || generator.chunk_length == 0 {
            return Err(AppError::validation(
                if generator.chunks == 0 { "chunks" } else { "chunk_length" },
                format!(
                    "Generator {} cannot produce keys with {} chunk(s) of length {}.",
                    generator.id, generator.chunks, generator.chunk_length
                ),
            ));
        }
        if symbols(generator) > MAX_KEY_SYMBOLS {
            return Err(AppError::validation(
                "chunk_length",
                format!(
                    "Generator {} describes keys longer than {} characters.",
                    generator.id, MAX_KEY_SYMBOLS
                ),
            ));
        }
        Ok(Self {
            generator,
            alphabet,
        })
    }

    /// Number of distinct keys this generator can produce, saturating
    pub fn capacity(&self) -> u128 {
        let base = self.alphabet.iter().collect::<HashSet<_>>().len() as u128;
        if base <= 1 {
            return base;
        }
        u32::try_from(symbols(self.generator))
            .ok()
            .and_then(|exp| base.checked_pow(exp))
            .unwrap_or(u128::MAX)
    }

    /// Draw a single key string
    pub fn generate_one<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        let separator = self.generator.separator.as_deref().unwrap_or("");
        let chunks: Vec<String> = (0..self.generator.chunks)
            .map(|_| {
                (0..self.generator.chunk_length)
                    .filter_map(|_| self.alphabet.choose(rng))
                    .collect()
            })
            .collect();

        format!(
            "{}{}{}",
            self.generator.prefix.as_deref().unwrap_or(""),
            chunks.join(separator),
            self.generator.suffix.as_deref().unwrap_or("")
        )
    }

    /// Issue `count` distinct keys at `issued_at`
    pub fn generate_batch<R: Rng + ?Sized>(
        &self,
        count: usize,
        issued_at: DateTime<Utc>,
        rng: &mut R,
    ) -> Result<Vec<GeneratedKey>, AppError> {
        if (count as u128) > self.capacity() {
            return Err(AppError::bad_request(format!(
                "Generator {} can only produce {} distinct keys.",
                self.generator.id,
                self.capacity()
            )));
        }

        let expires_at = self
            .generator
            .expires_in
            .map(|days| issued_at + Duration::days(i64::from(days)));

        let mut seen = HashSet::with_capacity(count);
        let mut keys = Vec::with_capacity(count);
        let mut attempts = 0;
        while keys.len() < count {
            if attempts >= count.saturating_mul(MAX_ATTEMPTS_PER_KEY) {
                return Err(AppError::internal(format!(
                    "Could not draw {} distinct keys from generator {}",
                    count, self.generator.id
                )));
            }
            attempts += 1;

            let key = self.generate_one(rng);
            if seen.insert(key.clone()) {
                keys.push(GeneratedKey {
                    license_key: key,
                    generator_id: self.generator.id,
                    expires_at,
                    times_activated_max: self.generator.times_activated_max,
                });
            }
        }

        Ok(keys)
    }

    /// Issue `count` distinct keys now, using the thread-local RNG
    pub fn generate(&self, count: usize) -> Result<Vec<GeneratedKey>, AppError> {
        self.generate_batch(count, Utc::now(), &mut rand::thread_rng())
    }
}

fn symbols(generator: &Generator) -> u64 {
    u64::from(generator.chunks) * u64::from(generator.chunk_length)
}
