//! Account registration and login.

use std::sync::Arc;

use crate::crypto::{CryptoError, PasswordHasher};
use crate::models::{NewUser, User};
use crate::store::{StorageError, Store, limits};

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Name, email and password are required")]
    MissingFields,

    #[error("{field} must be at most {max} characters")]
    FieldTooLong { field: &'static str, max: usize },

    #[error("Email already registered")]
    DuplicateEmail,

    /// Returned for both an unknown email and a wrong password.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error(transparent)]
    Hashing(#[from] CryptoError),

    #[error(transparent)]
    Storage(StorageError),
}

impl From<StorageError> for AuthError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::UniqueViolation(_) => Self::DuplicateEmail,
            other => Self::Storage(other),
        }
    }
}

#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn Store>,
    hasher: PasswordHasher,
}

impl AuthService {
    pub fn new(store: Arc<dyn Store>, hasher: PasswordHasher) -> Self {
        Self { store, hasher }
    }

    /// Create an account.
    ///
    /// # Errors
    /// `MissingFields` for blank input, `FieldTooLong` when the name or email
    /// does not fit its column, `DuplicateEmail` when the email is
    /// taken, `Storage` for any other persistence failure.
    pub fn register(&self, name: &str, email: &str, password: &str) -> Result<(), AuthError> {
        let (name, email) = (name.trim(), email.trim());
        if name.is_empty() || email.is_empty() || password.is_empty() {
            return Err(AuthError::MissingFields);
        }
        let checks = [("Name", name, limits::USER_NAME), ("Email", email, limits::USER_EMAIL)];
        for (field, value, max) in checks {
            if value.chars().count() > max {
                return Err(AuthError::FieldTooLong { field, max });
            }
        }

        let password_hash = self.hasher.hash_password(password)?;
        let user = self.store.insert_user(NewUser {
            name: name.to_string(),
            email: email.to_string(),
            password_hash,
        });

        match user {
            Ok(user) => {
                tracing::info!(user_id = user.id, "Account created");
                Ok(())
            }
            Err(e) => {
                let err = AuthError::from(e);
                if matches!(err, AuthError::DuplicateEmail) {
                    tracing::info!("Registration rejected: email already registered");
                } else {
                    tracing::error!("Registration failed: {err}");
                }
                Err(err)
            }
        }
    }

    /// Check credentials and return the matching user.
    ///
    /// # Errors
    /// `InvalidCredentials` when the email is unknown or the password does
    /// not match; `Storage` when the lookup itself fails.
    pub fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let Some(user) = self.store.find_user_by_email(email.trim())? else {
            self.hasher.verify_dummy(password);
            tracing::info!("Login failed");
            return Err(AuthError::InvalidCredentials);
        };

        // A malformed stored hash can never match; treat it like a mismatch.
        let verified = self
            .hasher
            .verify_password(password, &user.password_hash)
            .unwrap_or_else(|e| {
                tracing::warn!(user_id = user.id, "Stored password hash unreadable: {e}");
                false
            });

        if verified {
            tracing::info!(user_id = user.id, "Login succeeded");
            Ok(user)
        } else {
            tracing::info!("Login failed");
            Err(AuthError::InvalidCredentials)
        }
    }
}
