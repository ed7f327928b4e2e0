use tracing::{error, warn};

/// One-way password hashing.
///
/// Implementations must salt per call and emit a self-describing digest
/// (algorithm, cost, salt and hash in one string), so the stored value alone
/// is enough for later verification.
pub trait Hasher: Send + Sync {
    fn hash(&self, raw: &str) -> anyhow::Result<String>;

    /// Checks a plaintext candidate against a stored digest. Fails closed:
    /// a malformed or truncated digest is a mismatch, never an error.
    fn verify(&self, raw: &str, digest: &str) -> bool;
}

/// bcrypt-backed hasher with a fixed cost factor.
#[derive(Debug, Clone, Copy)]
pub struct BcryptHasher {
    cost: u32,
}

impl BcryptHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }
}

impl Default for BcryptHasher {
    fn default() -> Self {
        // DEFAULT_COST (12) keeps hashing in the low hundreds of milliseconds,
        // acceptable for an interactive prompt.
        Self::new(bcrypt::DEFAULT_COST)
    }
}

impl Hasher for BcryptHasher {
    fn hash(&self, raw: &str) -> anyhow::Result<String> {
        let digest = bcrypt::hash(raw, self.cost).map_err(|e| {
            error!(error = %e, "bcrypt hash error");
            anyhow::anyhow!(e)
        })?;
        Ok(digest)
    }

    fn verify(&self, raw: &str, digest: &str) -> bool {
        match bcrypt::verify(raw, digest) {
            Ok(matched) => matched,
            Err(e) => {
                // Corrupted or non-bcrypt storage; treat as mismatch.
                warn!(error = %e, "stored digest did not parse");
                false
            }
        }
    }
}
