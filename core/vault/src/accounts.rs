//! Account sign-up and login.

use std::sync::Arc;

use crate::gate::AccessGate;
use passvault_common::{Account, Error, Result};
use passvault_crypto::{hash_password, verify_password};
use passvault_storage::AccountStore;

/// Creates accounts and exchanges credentials for bearer tokens.
#[derive(Clone)]
pub struct AccountService {
    gate: Arc<AccessGate>,
    store: Arc<dyn AccountStore>,
}

impl AccountService {
    pub fn new(gate: Arc<AccessGate>, store: Arc<dyn AccountStore>) -> Self {
        Self { gate, store }
    }

    /// Register a new account.
    ///
    /// # Errors
    /// - `Error::InvalidInput` if email or password is empty
    /// - `Error::AlreadyExists` if the email is taken
    pub async fn signup(&self, email: &str, password: &str) -> Result<Account> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(Error::InvalidInput(
                "Email and password are required".to_string(),
            ));
        }

        if self.store.find_account_by_email(email).await?.is_some() {
            return Err(Error::AlreadyExists("User already exists".to_string()));
        }

        let password = password.to_string();
        let hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| Error::Crypto(format!("Password hashing task failed: {}", e)))??;

        let account = self.store.create_account(Account::new(email, hash)).await?;
        tracing::info!(account = %account.id, "Account created");
        Ok(account)
    }

    /// Check credentials and issue a bearer token.
    ///
    /// # Errors
    /// - `Error::Unauthorized` for an unknown email or a wrong password,
    ///   without saying which
    pub async fn login(&self, email: &str, password: &str) -> Result<String> {
        let account = self
            .store
            .find_account_by_email(email.trim())
            .await?
            .ok_or(Error::Unauthorized)?;

        let password = password.to_string();
        let hash = account.password_hash.clone();
        let valid = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(|e| Error::Crypto(format!("Password check task failed: {}", e)))?;
        if !valid {
            tracing::debug!(account = %account.id, "Login rejected");
            return Err(Error::Unauthorized);
        }

        self.gate.issue(&account.id)
    }
}
