use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString, rand_core::OsRng},
};
use base64::{Engine as _, engine::general_purpose};
use rand::RngCore;
use rand::rngs::OsRng as SystemRng;

// Session tokens carry 256 bits of OS randomness
const SESSION_TOKEN_SIZE: usize = 32;

// Fixed input for the dummy hash that absorbs logins for unknown emails
const DUMMY_PASSWORD: &str = "medirisk-dummy-password";

#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("Invalid password hash parameters: {0}")]
    Params(String),

    #[error("Failed to hash password: {0}")]
    Hash(String),

    #[error("Invalid password hash: {0}")]
    Malformed(String),
}

/// Argon2id cost factors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashCost {
    pub memory_kib: u32,
    pub iterations: u32,
}

impl Default for HashCost {
    // argon2 crate defaults (OWASP minimum for Argon2id)
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
        }
    }
}

/// Salted Argon2id hashing with a configurable cost.
///
/// Hashes are stored as PHC strings, so verification reads the cost back
/// from the stored hash and keeps working after the configured cost changes.
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
    dummy_hash: String,
}

impl PasswordHasher {
    pub fn new(cost: HashCost) -> Result<Self, CryptoError> {
        let params = Params::new(cost.memory_kib, cost.iterations, Params::DEFAULT_P_COST, None)
            .map_err(|e| CryptoError::Params(e.to_string()))?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        let dummy_hash = hash_with(&argon2, DUMMY_PASSWORD)?;
        Ok(Self { argon2, dummy_hash })
    }

    // Hash a password with a fresh random salt
    pub fn hash_password(&self, password: &str) -> Result<String, CryptoError> {
        hash_with(&self.argon2, password)
    }

    // Verify a password against a stored PHC string
    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool, CryptoError> {
        let parsed = PasswordHash::new(hash).map_err(|e| CryptoError::Malformed(e.to_string()))?;
        Ok(self.argon2.verify_password(password.as_bytes(), &parsed).is_ok())
    }

    /// Spend one verification on a throwaway hash. Used when the email is
    /// unknown so that both login failures cost the same.
    pub fn verify_dummy(&self, password: &str) {
        let _ = self.verify_password(password, &self.dummy_hash);
    }
}

fn hash_with(argon2: &Argon2<'_>, password: &str) -> Result<String, CryptoError> {
    let salt = SaltString::generate(&mut OsRng);
    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| CryptoError::Hash(e.to_string()))
}

pub struct CryptoUtils;

impl CryptoUtils {
    // Generates an opaque session token
    pub fn generate_session_token() -> String {
        let mut bytes = [0u8; SESSION_TOKEN_SIZE];
        SystemRng.fill_bytes(&mut bytes);
        Self::encode_base64(&bytes)
    }

    // Encode bytes to URL-safe base64 without padding
    pub fn encode_base64(data: &[u8]) -> String {
        general_purpose::URL_SAFE_NO_PAD.encode(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_hasher() -> PasswordHasher {
        PasswordHasher::new(HashCost { memory_kib: 64, iterations: 1 }).expect("valid params")
    }

    #[test]
    fn test_hash_and_verify() {
        let hasher = fast_hasher();
        let hash = hasher.hash_password("pw123").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify_password("pw123", &hash).unwrap());
        assert!(!hasher.verify_password("wrongpw", &hash).unwrap());
    }

    #[test]
    fn test_same_password_gets_distinct_salts() {
        let hasher = fast_hasher();
        let a = hasher.hash_password("pw123").unwrap();
        let b = hasher.hash_password("pw123").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        let hasher = fast_hasher();
        assert!(matches!(
            hasher.verify_password("pw", "not-a-phc-string"),
            Err(CryptoError::Malformed(_))
        ));
    }

    #[test]
    fn test_invalid_cost_rejected() {
        let result = PasswordHasher::new(HashCost { memory_kib: 1, iterations: 0 });
        assert!(matches!(result, Err(CryptoError::Params(_))));
    }

    #[test]
    fn test_session_tokens_are_unique() {
        let a = CryptoUtils::generate_session_token();
        let b = CryptoUtils::generate_session_token();
        assert_ne!(a, b);
        // 32 bytes -> 43 base64 characters without padding
        assert_eq!(a.len(), 43);
    }
}
