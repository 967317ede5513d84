//! Test factories for generating test data
//!
//! Factories store generators directly through the repository, bypassing the
//! HTTP layer, so tests can set up state before exercising an endpoint.

use std::sync::atomic::{AtomicU64, Ordering};

use license_manager::{
    db::{DbPool, GeneratorRepository},
    models::{Generator, NewGenerator},
};

static COUNTER: AtomicU64 = AtomicU64::new(0);

/// Builder for stored generators
pub struct GeneratorFactory {
    new: NewGenerator,
    actor: Option<i64>,
}

impl Default for GeneratorFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl GeneratorFactory {
    pub fn new() -> Self {
        let n = COUNTER.fetch_add(1, Ordering::SeqCst);
        Self {
            new: NewGenerator {
                name: Some(format!("Generator {}", n)),
                charset: Some("ABCDEFGH12345678".to_string()),
                chunks: Some(4),
                chunk_length: Some(4),
                separator: Some("-".to_string()),
                ..NewGenerator::default()
            },
            actor: None,
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.new.name = Some(name.to_string());
        self
    }

    pub fn with_charset(mut self, charset: &str) -> Self {
        self.new.charset = Some(charset.to_string());
        self
    }

    pub fn with_layout(mut self, chunks: u32, chunk_length: u32) -> Self {
        self.new.chunks = Some(chunks);
        self.new.chunk_length = Some(chunk_length);
        self
    }

    pub fn with_limits(mut self, times_activated_max: Option<u32>, expires_in: Option<u32>) -> Self {
        self.new.times_activated_max = times_activated_max;
        self.new.expires_in = expires_in;
        self
    }

    pub fn created_by(mut self, actor: i64) -> Self {
        self.actor = Some(actor);
        self
    }

    /// Store the generator and return the persisted record
    pub async fn insert(self, db: &DbPool) -> Generator {
        GeneratorRepository::new(db)
            .insert(&self.new, self.actor)
            .await
            .expect("Failed to insert test generator")
    }
}
