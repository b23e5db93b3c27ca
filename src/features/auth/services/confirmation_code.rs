//! One-time confirmation codes for the sign-up flow.
//!
//! The plain code is mailed to the user; only an HMAC-SHA256 digest keyed
//! with `CONFIRMATION_CODE_SECRET` and bound to the user id is stored.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use uuid::Uuid;

use crate::core::error::{AppError, Result};

type HmacSha256 = Hmac<Sha256>;

/// A freshly generated code and the digest to persist
#[derive(Debug, Clone)]
pub struct IssuedCode {
    pub code: String,
    pub digest: String,
}

pub struct ConfirmationCodes {
    secret: Vec<u8>,
}

impl ConfirmationCodes {
    pub fn new(secret: &str) -> Self {
        Self {
            secret: secret.as_bytes().to_vec(),
        }
    }

    fn mac(&self, user_id: i64, code: &str) -> Result<HmacSha256> {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| AppError::Internal(format!("Invalid HMAC key: {}", e)))?;
        mac.update(format!("{}:{}", user_id, code).as_bytes());
        Ok(mac)
    }

    pub fn generate(&self, user_id: i64) -> Result<IssuedCode> {
        let code = Uuid::new_v4().simple().to_string();
        let digest = self.digest(user_id, &code)?;
        Ok(IssuedCode { code, digest })
    }

    pub fn digest(&self, user_id: i64, code: &str) -> Result<String> {
        Ok(hex::encode(self.mac(user_id, code)?.finalize().into_bytes()))
    }

    /// Constant-time comparison of `code` against a stored digest
    pub fn verify(&self, user_id: i64, code: &str, stored_digest: &str) -> bool {
        let Ok(expected) = hex::decode(stored_digest) else {
            return false;
        };
        match self.mac(user_id, code) {
            Ok(mac) => mac.verify_slice(&expected).is_ok(),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_code_verifies() {
        let codes = ConfirmationCodes::new("secret");
        let issued = codes.generate(7).unwrap();

        assert_eq!(issued.code.len(), 32);
        assert_eq!(issued.digest.len(), 64);
        assert_ne!(issued.code, issued.digest);
        assert!(codes.verify(7, &issued.code, &issued.digest));
    }

    #[test]
    fn test_code_is_bound_to_user() {
        let codes = ConfirmationCodes::new("secret");
        let issued = codes.generate(7).unwrap();
        assert!(!codes.verify(8, &issued.code, &issued.digest));
    }

    #[test]
    fn test_wrong_code_or_secret_fails() {
        let codes = ConfirmationCodes::new("secret");
        let issued = codes.generate(7).unwrap();

        assert!(!codes.verify(7, "0000", &issued.digest));
        assert!(!ConfirmationCodes::new("other").verify(7, &issued.code, &issued.digest));
        assert!(!codes.verify(7, &issued.code, "not-hex"));
    }

    #[test]
    fn test_each_generation_is_unique() {
        let codes = ConfirmationCodes::new("secret");
        let a = codes.generate(1).unwrap();
        let b = codes.generate(1).unwrap();
        assert_ne!(a.code, b.code);
        assert!(!codes.verify(1, &a.code, &b.digest));
    }
}
