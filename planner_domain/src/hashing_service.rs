use crate::error::AuthError;
use planner_data::entities::SaltedHash;
use rand::{thread_rng, RngCore};
use ring::digest::SHA256_OUTPUT_LEN;
use ring::pbkdf2;
use std::num::NonZeroU32;

pub const PBKDF2_SHA256: &str = "pbkdf2-sha256";

pub trait HashingService: Send + Sync {
    /// Hash with a fresh random salt. Rejects empty and oversized passwords.
    fn hash_password(&self, value: &str) -> Result<SaltedHash, AuthError>;

    /// Never fails: a mismatch or an unreadable stored hash is just `false`.
    fn verify(&self, value: &str, salted_hash: &SaltedHash) -> bool;
}

#[derive(Clone)]
pub struct Pbkdf2HashingService {
    iterations: NonZeroU32,
    salt_length: usize,
    max_password_length: usize,
}

impl Pbkdf2HashingService {
    pub fn new(iterations: NonZeroU32, salt_length: usize, max_password_length: usize) -> Self {
        Pbkdf2HashingService {
            iterations,
            salt_length,
            max_password_length,
        }
    }

    fn check_length(&self, value: &str) -> Result<(), AuthError> {
        if value.is_empty() {
            return Err(AuthError::InvalidInput("password must not be empty".to_string()));
        }
        if value.len() > self.max_password_length {
            return Err(AuthError::InvalidInput(format!(
                "password must be at most {} bytes",
                self.max_password_length
            )));
        }
        Ok(())
    }
}

impl HashingService for Pbkdf2HashingService {
    fn hash_password(&self, value: &str) -> Result<SaltedHash, AuthError> {
        self.check_length(value)?;

        let mut salt = vec![0u8; self.salt_length];
        thread_rng().fill_bytes(&mut salt);

        let mut hash = [0u8; SHA256_OUTPUT_LEN];
        pbkdf2::derive(
            pbkdf2::PBKDF2_HMAC_SHA256,
            self.iterations,
            &salt,
            value.as_bytes(),
            &mut hash,
        );

        Ok(SaltedHash {
            algorithm: PBKDF2_SHA256.to_string(),
            iterations: self.iterations.get(),
            salt: hex::encode(salt),
            hash: hex::encode(hash),
        })
    }

    fn verify(&self, value: &str, salted_hash: &SaltedHash) -> bool {
        if self.check_length(value).is_err() || salted_hash.algorithm != PBKDF2_SHA256 {
            return false;
        }

        let Some(iterations) = NonZeroU32::new(salted_hash.iterations) else {
            return false;
        };
        let (Ok(salt), Ok(hash)) = (hex::decode(&salted_hash.salt), hex::decode(&salted_hash.hash))
        else {
            return false;
        };

        pbkdf2::verify(
            pbkdf2::PBKDF2_HMAC_SHA256,
            iterations,
            &salt,
            value.as_bytes(),
            &hash,
        )
        .is_ok()
    }
}
