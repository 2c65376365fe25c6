//! # User Repository
//!
//! End-user accounts and the credential check.
//!
//! The comparison strategy is injected via
//! [`tokenize_core::auth::CredentialVerifier`]; the repository only
//! fetches the stored secret and delegates.

use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use tokenize_core::auth::CredentialVerifier;
use tokenize_core::validation::validate_identity;
use tokenize_core::{LedgerError, UserAccount};

/// Repository for user account operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Registers a new user.
    ///
    /// ## Failure kinds
    /// - identity without the '@' marker → `InvalidIdentity`
    /// - duplicate identity → `AlreadyExists` (the first registration's
    ///   row is untouched by the failed attempt)
    pub async fn register(&self, name: &str, identity: &str, secret: &str) -> DbResult<()> {
        if validate_identity(identity).is_err() {
            return Err(DbError::Ledger(LedgerError::InvalidIdentity {
                identity: identity.to_string(),
            }));
        }

        let result = sqlx::query(
            r#"
            INSERT INTO users (name, identity, secret)
            VALUES (?1, ?2, ?3)
            "#,
        )
        .bind(name)
        .bind(identity)
        .bind(secret)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {
                info!(identity = %identity, "Registered user");
                Ok(())
            }
            Err(err) => {
                let db_err = DbError::from(err);
                if db_err.is_unique_violation() {
                    Err(DbError::Ledger(LedgerError::AlreadyExists {
                        identity: identity.to_string(),
                    }))
                } else {
                    Err(db_err)
                }
            }
        }
    }

    /// Verifies a login attempt.
    ///
    /// Unknown identities simply return `false`; the caller cannot
    /// distinguish a wrong secret from a missing account.
    pub async fn authenticate(
        &self,
        identity: &str,
        secret: &str,
        verifier: &dyn CredentialVerifier,
    ) -> DbResult<bool> {
        debug!(identity = %identity, "Authenticating user");

        let stored: Option<String> = sqlx::query_scalar(
            r#"
            SELECT secret
            FROM users
            WHERE identity = ?1
            "#,
        )
        .bind(identity)
        .fetch_optional(&self.pool)
        .await?;

        Ok(match stored {
            Some(stored) => verifier.verify(secret, &stored),
            None => false,
        })
    }

    /// Finds a user by identity.
    pub async fn find(&self, identity: &str) -> DbResult<Option<UserAccount>> {
        let user = sqlx::query_as::<_, UserAccount>(
            r#"
            SELECT id, name, identity, secret
            FROM users
            WHERE identity = ?1
            "#,
        )
        .bind(identity)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use tokenize_core::auth::PlaintextVerifier;

    #[tokio::test]
    async fn register_and_authenticate() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.users();

        repo.register("Alice", "alice@example.com", "1234")
            .await
            .unwrap();

        assert!(repo
            .authenticate("alice@example.com", "1234", &PlaintextVerifier)
            .await
            .unwrap());
        assert!(!repo
            .authenticate("alice@example.com", "4321", &PlaintextVerifier)
            .await
            .unwrap());
        assert!(!repo
            .authenticate("nobody@example.com", "1234", &PlaintextVerifier)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn duplicate_identity_fails_and_first_row_survives() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.users();

        repo.register("Alice", "alice@example.com", "1234")
            .await
            .unwrap();

        let err = repo
            .register("Imposter", "alice@example.com", "9999")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Ledger(LedgerError::AlreadyExists { .. })
        ));

        let user = repo.find("alice@example.com").await.unwrap().unwrap();
        assert_eq!(user.name, "Alice");
        assert_eq!(user.secret, "1234");
    }

    #[tokio::test]
    async fn identity_without_marker_is_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let err = db
            .users()
            .register("Bob", "not-an-email", "pw")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Ledger(LedgerError::InvalidIdentity { .. })
        ));
        assert!(db.users().find("not-an-email").await.unwrap().is_none());
    }
}
