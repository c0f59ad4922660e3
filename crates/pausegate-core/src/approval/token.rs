use uuid::Uuid;

use crate::error::Result;
use crate::models::ResumeToken;

const TOKEN_PREFIX: &str = "rt_";

/// Source of fresh resume tokens.
pub trait TokenGenerator: Send + Sync {
    fn generate(&self) -> Result<ResumeToken>;
}

/// Random v4 UUID tokens (122 bits of OS entropy).
///
/// `Uuid::new_v4` panics if the OS entropy source fails. That failure is
/// fatal to the process and never surfaces as an error.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidTokenGenerator;

impl TokenGenerator for UuidTokenGenerator {
    fn generate(&self) -> Result<ResumeToken> {
        Ok(ResumeToken::new(format!(
            "{TOKEN_PREFIX}{}",
            Uuid::new_v4().simple()
        )))
    }
}
