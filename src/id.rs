//! Identifier generation
//!
//! Records saved without an `id` get one from the configured generator.

use std::fmt;

use uuid::Uuid;

/// Produces short, unique, URL-safe identifiers
pub trait IdGenerator: Send + Sync + fmt::Debug {
    fn generate(&self) -> String;
}

/// Default generator: random v4 UUID in its 32-character hex form.
///
/// The hex form contains no punctuation, so the identifier survives path
/// normalization unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn generate(&self) -> String {
        Uuid::new_v4().simple().to_string()
    }
}

/// Adapts a closure into an [`IdGenerator`]
pub struct FnIdGenerator<F>(pub F);

impl<F> IdGenerator for FnIdGenerator<F>
where
    F: Fn() -> String + Send + Sync,
{
    fn generate(&self) -> String {
        (self.0)()
    }
}

impl<F> fmt::Debug for FnIdGenerator<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnIdGenerator")
    }
}
