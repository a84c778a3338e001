//! Account registration, credential checks and the persisted session.

use chrono::{Duration, Utc};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::model::{Account, SessionRecord, StoredAccount};
use crate::storage::{Storage, StorageKey};

/// Account operations over the `users` and `currentUser` documents.
#[derive(Debug, Clone, Copy)]
pub struct AccountStore<'a> {
    storage: &'a Storage,
}

impl<'a> AccountStore<'a> {
    /// Create a store backed by `storage`.
    #[must_use]
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    fn load(&self) -> Result<Vec<StoredAccount>> {
        self.storage.get_collection(StorageKey::Users)
    }

    /// Register a new account and make it the current session.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmailTaken`] if an account already uses `email`, or a
    /// storage error if persisting fails.
    pub fn register(&self, name: &str, email: &str, password: &str) -> Result<Account> {
        let stored = StoredAccount::new(name.to_string(), email.to_string(), password);
        let account = stored.to_account();

        self.storage
            .update_collection(StorageKey::Users, |users: &mut Vec<StoredAccount>| {
                if users.iter().any(|u| u.email == email) {
                    warn!("Sign-up refused: email already registered");
                    return Err(Error::EmailTaken);
                }
                users.push(stored);
                Ok(())
            })?;

        self.start_session(&account)?;
        info!("Registered account {}", account.id);
        Ok(account)
    }

    /// Check credentials and, on success, make the account the current session.
    ///
    /// A failure leaves any existing session untouched and does not say
    /// which of the two fields was wrong.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCredentials`] if no account matches, or a
    /// storage error.
    pub fn authenticate(&self, email: &str, password: &str) -> Result<Account> {
        let users = self.load()?;
        let Some(stored) = users
            .iter()
            .find(|u| u.email == email && u.verify_password(password))
        else {
            warn!("Sign-in refused");
            return Err(Error::InvalidCredentials);
        };

        let account = stored.to_account();
        self.start_session(&account)?;
        info!("Signed in account {}", account.id);
        Ok(account)
    }

    fn start_session(&self, account: &Account) -> Result<()> {
        self.storage
            .put(StorageKey::CurrentUser, &SessionRecord::start(account.clone()))
    }

    /// Re-establish the persisted session, if any.
    ///
    /// Credentials are not re-checked. When `max_idle` is set, a session
    /// idle for longer than that is discarded instead. A restored session
    /// has its activity timestamp refreshed.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the session cannot be read or written.
    pub fn restore_session(&self, max_idle: Option<Duration>) -> Result<Option<Account>> {
        let Some(session) = self.storage.get::<SessionRecord>(StorageKey::CurrentUser)? else {
            debug!("No stored session");
            return Ok(None);
        };

        if let Some(max_idle) = max_idle {
            let fresh = session
                .last_active_at
                .is_some_and(|at| Utc::now() - at <= max_idle);
            if !fresh {
                info!("Stored session for {} expired", session.account.id);
                self.end_session()?;
                return Ok(None);
            }
        }

        self.start_session(&session.account)?;
        debug!("Restored session for {}", session.account.id);
        Ok(Some(session.account))
    }

    /// Clear the persisted session. Accounts are untouched.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the session cannot be removed.
    pub fn end_session(&self) -> Result<()> {
        self.storage.remove(StorageKey::CurrentUser)?;
        Ok(())
    }

    /// Look up an account by id.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the accounts cannot be read.
    pub fn find(&self, id: &str) -> Result<Option<Account>> {
        Ok(self
            .load()?
            .iter()
            .find(|u| u.id == id)
            .map(StoredAccount::to_account))
    }

    /// Number of registered accounts.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the accounts cannot be read.
    pub fn count(&self) -> Result<usize> {
        Ok(self.load()?.len())
    }
}
