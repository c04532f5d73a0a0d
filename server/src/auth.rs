//! Session token verification.
//!
//! Tokens are issued elsewhere as `"<session_id>.<secret>"`. The sessions
//! table keeps only an argon2 hash of the secret.

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use async_trait::async_trait;

use crate::error::AuthError;
use crate::persistence::Database;

/// Account behind a verified token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthIdentity {
    pub user_id: u64,
    pub username: String,
}

#[async_trait]
pub trait AuthService: Send + Sync {
    async fn verify(&self, token: &str) -> Result<AuthIdentity, AuthError>;
}

/// Split a token into session id and secret
pub fn parse_token(token: &str) -> Result<(i64, &str), AuthError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }
    let (id, secret) = token.split_once('.').ok_or(AuthError::MalformedToken)?;
    let id: i64 = id.parse().map_err(|_| AuthError::MalformedToken)?;
    if secret.is_empty() {
        return Err(AuthError::MalformedToken);
    }
    Ok((id, secret))
}

/// Check a secret against a stored argon2 hash
pub fn verify_secret(secret: &str, stored_hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(stored_hash).map_err(|e| AuthError::Hash(e.to_string()))?;
    Argon2::default()
        .verify_password(secret.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidToken)
}

/// Sessions stored in PostgreSQL
pub struct SessionAuth {
    db: Database,
}

impl SessionAuth {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AuthService for SessionAuth {
    async fn verify(&self, token: &str) -> Result<AuthIdentity, AuthError> {
        let (session_id, secret) = parse_token(token)?;

        let session = self
            .db
            .find_session(session_id)
            .await
            .map_err(|e| AuthError::Database(e.to_string()))?
            .ok_or(AuthError::InvalidToken)?;

        // Hashing blocks, so run it off the runtime threads
        let secret = secret.to_string();
        let hash = session.secret_hash.clone();
        tokio::task::spawn_blocking(move || verify_secret(&secret, &hash))
            .await
            .map_err(|e| AuthError::Hash(e.to_string()))??;

        Ok(AuthIdentity {
            user_id: session.user_id,
            username: session.username,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argon2::password_hash::{PasswordHasher, SaltString};

    #[test]
    fn test_parse_token() {
        assert_eq!(parse_token("42.abc").unwrap(), (42, "abc"));
        assert_eq!(parse_token(" 7.x.y ").unwrap(), (7, "x.y"));
        assert!(matches!(parse_token(""), Err(AuthError::MissingToken)));
        assert!(matches!(parse_token("abc"), Err(AuthError::MalformedToken)));
        assert!(matches!(parse_token("abc.def"), Err(AuthError::MalformedToken)));
        assert!(matches!(parse_token("5."), Err(AuthError::MalformedToken)));
    }

    #[test]
    fn test_verify_secret() {
        let salt = SaltString::from_b64("c29tZXNhbHRzb21lc2FsdA").unwrap();
        let hash = Argon2::default()
            .hash_password(b"hunter2", &salt)
            .unwrap()
            .to_string();

        assert!(verify_secret("hunter2", &hash).is_ok());
        assert!(matches!(verify_secret("hunter3", &hash), Err(AuthError::InvalidToken)));
        assert!(matches!(verify_secret("hunter2", "not a hash"), Err(AuthError::Hash(_))));
    }
}
