//! Admission policies evaluated before a request body is parsed.
//!
//! An [`AuthValidator`] sees only the raw [`Transaction`]. The dispatcher runs
//! it first and answers `401 Unauthorized` on refusal without touching the
//! body or the handler registry.

use crate::Transaction;

/// Decides whether a transaction is admitted.
pub trait AuthValidator: Send + Sync {
    fn admit(&self, transaction: &Transaction) -> bool;
}

impl<F> AuthValidator for F
where
    F: Fn(&Transaction) -> bool + Send + Sync,
{
    fn admit(&self, transaction: &Transaction) -> bool {
        self(transaction)
    }
}

/// Admits every transaction. Used when no validator is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdmitAll;

impl AuthValidator for AdmitAll {
    fn admit(&self, _transaction: &Transaction) -> bool {
        true
    }
}

/// Admits transactions presenting a shared token in a header.
///
/// The header value may be the bare token or `Bearer <token>`.
#[derive(Debug, Clone)]
pub struct SharedSecret {
    header: String,
    token: String,
}

impl SharedSecret {
    /// Expects `token` in the `authorization` header.
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_header("authorization", token)
    }

    pub fn with_header(header: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            token: token.into(),
        }
    }
}

impl AuthValidator for SharedSecret {
    fn admit(&self, transaction: &Transaction) -> bool {
        let Some(value) = transaction.header(&self.header) else {
            return false;
        };
        let presented = value.strip_prefix("Bearer ").unwrap_or(value).trim();
        constant_time_eq(presented.as_bytes(), self.token.as_bytes())
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admit_all() {
        assert!(AdmitAll.admit(&Transaction::default()));
    }

    #[test]
    fn test_closure_validator() {
        let only_local = |transaction: &Transaction| {
            transaction
                .remote_addr()
                .map(|addr| addr.ip().is_loopback())
                .unwrap_or(false)
        };

        let local = Transaction::new("{}").with_remote_addr("127.0.0.1:5000".parse().unwrap());
        let remote = Transaction::new("{}").with_remote_addr("203.0.113.9:5000".parse().unwrap());
        assert!(only_local.admit(&local));
        assert!(!only_local.admit(&remote));
        assert!(!only_local.admit(&Transaction::default()));
    }

    #[test]
    fn test_shared_secret_accepts_bare_and_bearer() {
        let validator = SharedSecret::new("s3cret");

        let bare = Transaction::default().with_header("Authorization", "s3cret");
        let bearer = Transaction::default().with_header("Authorization", "Bearer s3cret");
        assert!(validator.admit(&bare));
        assert!(validator.admit(&bearer));
    }

    #[test]
    fn test_shared_secret_rejects_wrong_or_missing_token() {
        let validator = SharedSecret::with_header("x-telemetry-token", "s3cret");

        let wrong = Transaction::default().with_header("x-telemetry-token", "s3cre7");
        let other_header = Transaction::default().with_header("authorization", "s3cret");
        assert!(!validator.admit(&wrong));
        assert!(!validator.admit(&other_header));
        assert!(!validator.admit(&Transaction::default()));
    }
}
