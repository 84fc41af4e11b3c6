/// Password hashing and verification using Argon2id
use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
    },
    Algorithm, Argon2, Params, Version,
};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HashError {
    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Malformed password digest: {0}")]
    MalformedDigest(String),

    #[error("Invalid hash cost: {0}")]
    InvalidCost(String),
}

/// Argon2 work factor
///
/// Raising any field makes each hash (and each brute-force guess) slower.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashCost {
    /// Memory size in KiB
    pub memory_kib: u32,
    /// Number of passes over memory
    pub iterations: u32,
    /// Degree of parallelism (lanes)
    pub parallelism: u32,
}

impl HashCost {
    /// Minimal cost profile for tests and local development
    pub const fn fast() -> Self {
        Self {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        }
    }
}

impl Default for HashCost {
    /// Argon2 recommended defaults (19 MiB, 2 passes, 1 lane)
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

impl FromStr for HashCost {
    type Err = HashError;

    /// Parse a named cost profile (`default` or `fast`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "default" => Ok(Self::default()),
            "fast" => Ok(Self::fast()),
            other => Err(HashError::InvalidCost(format!(
                "unknown profile '{}', expected 'default' or 'fast'",
                other
            ))),
        }
    }
}

/// Salted one-way credential hasher
///
/// Every call to [`PasswordHasher::hash`] draws a fresh 16-byte salt, so the
/// same plaintext never yields the same digest twice. Digests are PHC strings
/// carrying their own parameters, so a hasher with one cost profile can verify
/// digests produced under another.
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
    cost: HashCost,
}

impl PasswordHasher {
    pub fn new(cost: HashCost) -> Result<Self, HashError> {
        let params = Params::new(cost.memory_kib, cost.iterations, cost.parallelism, None)
            .map_err(|e| HashError::InvalidCost(e.to_string()))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
            cost,
        })
    }

    pub fn cost(&self) -> HashCost {
        self.cost
    }

    /// Hash a plaintext password into a PHC-formatted digest
    ///
    /// ## Errors
    ///
    /// Returns `HashError::Hashing` if Argon2 cannot produce output. Callers
    /// treat this as fatal for the request; it is not retried.
    pub fn hash(&self, plaintext: &str) -> Result<String, HashError> {
        let salt = SaltString::generate(&mut OsRng);

        let digest = self
            .argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| HashError::Hashing(e.to_string()))?
            .to_string();

        Ok(digest)
    }

    /// Verify a plaintext password against a stored digest
    ///
    /// Uses constant-time comparison. Returns `Ok(false)` on mismatch and an
    /// error only when the digest itself cannot be parsed or evaluated.
    pub fn verify(&self, plaintext: &str, digest: &str) -> Result<bool, HashError> {
        let parsed = PasswordHash::new(digest)
            .map_err(|e| HashError::MalformedDigest(e.to_string()))?;

        match self.argon2.verify_password(plaintext.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(HashError::Hashing(e.to_string())),
        }
    }
}

impl std::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHasher")
            .field("cost", &self.cost)
            .finish()
    }
}
