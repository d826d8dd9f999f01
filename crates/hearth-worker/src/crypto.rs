use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;

use crate::util::random_bytes;

const OUTPUT_LEN: usize = 32;
pub const SALT_LEN: usize = 64;

/// Stored credential: PBKDF2-SHA256 output plus the parameters needed to re-derive it.
pub struct PasswordHash {
    pub hash: Vec<u8>,
    pub salt: Vec<u8>,
    pub iterations: u32,
}

/// Derive the stored hash for a plaintext password with a fresh random salt.
pub fn hash_new_password(password: &str, iterations: u32) -> PasswordHash {
    let salt = random_bytes(SALT_LEN);
    let hash = hash_password(password.as_bytes(), &salt, iterations);
    PasswordHash {
        hash,
        salt,
        iterations,
    }
}

pub fn hash_password(secret: &[u8], salt: &[u8], iterations: u32) -> Vec<u8> {
    let mut out = vec![0u8; OUTPUT_LEN];
    pbkdf2_hmac::<Sha256>(secret, salt, iterations.max(1), &mut out);
    out
}

pub fn verify_password_hash(secret: &[u8], salt: &[u8], expected: &[u8], iterations: u32) -> bool {
    if iterations == 0 || expected.len() != OUTPUT_LEN {
        return false;
    }

    // Derive and constant-time compare.
    let mut out = vec![0u8; OUTPUT_LEN];
    pbkdf2_hmac::<Sha256>(secret, salt, iterations, &mut out);
    subtle::ConstantTimeEq::ct_eq(out.as_ref(), expected).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verifies_only_the_original_password() {
        let stored = hash_new_password("password123", 1_000);
        assert_eq!(stored.salt.len(), SALT_LEN);
        assert!(verify_password_hash(b"password123", &stored.salt, &stored.hash, 1_000));
        assert!(!verify_password_hash(b"password124", &stored.salt, &stored.hash, 1_000));
        assert!(!verify_password_hash(b"password123", &stored.salt, &stored.hash, 999));
        assert!(!verify_password_hash(b"password123", &stored.salt, &stored.hash[..8], 1_000));
    }

    #[test]
    fn salts_differ_between_users() {
        let a = hash_new_password("same", 10);
        let b = hash_new_password("same", 10);
        assert_ne!(a.salt, b.salt);
        assert_ne!(a.hash, b.hash);
    }
}
