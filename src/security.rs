use std::fmt;
use std::sync::Arc;

use subtle::ConstantTimeEq;

/// The admin panel password.
///
/// Comparison runs in constant time for equal-length inputs, and the secret
/// never appears in `Debug` output.
#[derive(Clone)]
pub struct AdminCredential {
    secret: Arc<str>,
}

impl AdminCredential {
    pub fn new(secret: &str) -> Self {
        Self {
            secret: Arc::from(secret),
        }
    }

    pub fn verify(&self, candidate: &str) -> bool {
        if self.secret.is_empty() || candidate.len() != self.secret.len() {
            return false;
        }
        candidate.as_bytes().ct_eq(self.secret.as_bytes()).into()
    }
}

impl fmt::Debug for AdminCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AdminCredential(***)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify() {
        let credential = AdminCredential::new("password123");
        assert!(credential.verify("password123"));
        assert!(!credential.verify("password124"));
        assert!(!credential.verify("password12"));
        assert!(!credential.verify(""));
    }

    #[test]
    fn test_empty_secret_never_verifies() {
        let credential = AdminCredential::new("");
        assert!(!credential.verify(""));
    }

    #[test]
    fn test_debug_hides_secret() {
        let debug = format!("{:?}", AdminCredential::new("hunter2"));
        assert!(!debug.contains("hunter2"));
    }
}
