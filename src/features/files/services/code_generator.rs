use rand::RngCore;
use tracing::debug;

use crate::core::error::Result;
use crate::features::files::services::Registry;
use crate::shared::constants::{CODE_LENGTH, CODE_PREFIX};

/// Generates unpredictable retrieval codes, e.g. `FV-3F9A0C1D`
///
/// Candidates come from the thread-local CSPRNG (OS-seeded ChaCha), so codes
/// cannot be enumerated from one another.
#[derive(Debug, Clone)]
pub struct CodeGenerator {
    prefix: String,
    length: usize,
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self::new(CODE_PREFIX, CODE_LENGTH)
    }
}

impl CodeGenerator {
    /// # Arguments
    /// * `prefix` - Fixed prefix of every code
    /// * `length` - Number of uppercase hex characters after the prefix
    pub fn new(prefix: impl Into<String>, length: usize) -> Self {
        Self {
            prefix: prefix.into(),
            length,
        }
    }

    /// Draw one random code without checking the registry
    pub fn candidate(&self) -> String {
        let mut bytes = vec![0u8; self.length.div_ceil(2)];
        rand::rng().fill_bytes(&mut bytes);

        let mut digits = hex::encode_upper(bytes);
        digits.truncate(self.length);

        format!("{}{}", self.prefix, digits)
    }

    /// Draw codes until one is not live in the registry.
    ///
    /// The registry can still be claimed by a concurrent upload between this
    /// call and the insert; `Registry::put` reports that and the caller
    /// draws again.
    pub async fn generate(&self, registry: &Registry) -> Result<String> {
        loop {
            let code = self.candidate();
            if !registry.contains(&code).await? {
                return Ok(code);
            }
            debug!("Retrieval code {} already live, drawing again", code);
        }
    }
}
