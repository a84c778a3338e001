//! The application object.
//!
//! [`Tracker`] owns storage, the signed-in account and the in-memory view of
//! that account's records. The view is kept equal to the persisted subset of
//! records owned by the session account after every operation.

use tracing::{info, warn};

use crate::accounts::AccountStore;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::filter::{self, RecordFilter};
use crate::forms::{self, SignInForm, SignUpForm};
use crate::model::{Account, ErrorRecord, ErrorRecordPatch, NewErrorRecord};
use crate::records::RecordStore;
use crate::storage::Storage;

/// Session-scoped access to accounts and error records.
#[derive(Debug)]
pub struct Tracker {
    config: Config,
    storage: Storage,
    session: Option<Account>,
    view: Vec<ErrorRecord>,
}

impl Tracker {
    /// Open the configured database and restore any stored session.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be opened or read.
    pub fn open(config: Config) -> Result<Self> {
        let storage = Storage::open(config.database_path())?;
        Self::with_storage(config, storage)
    }

    /// Build a tracker over existing storage and restore any stored session.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub fn with_storage(config: Config, storage: Storage) -> Result<Self> {
        let mut tracker = Self {
            config,
            storage,
            session: None,
            view: Vec::new(),
        };
        let restored = tracker.accounts().restore_session(tracker.config.max_idle())?;
        if let Some(account) = restored {
            tracker.begin(account)?;
        }
        Ok(tracker)
    }

    fn accounts(&self) -> AccountStore<'_> {
        AccountStore::new(&self.storage)
    }

    fn store(&self) -> RecordStore<'_> {
        RecordStore::new(&self.storage)
    }

    fn begin(&mut self, account: Account) -> Result<Account> {
        self.view = self.store().list_for_owner(&account.id)?;
        self.session = Some(account.clone());
        Ok(account)
    }

    fn owner_id(&self) -> Result<String> {
        self.session
            .as_ref()
            .map(|a| a.id.clone())
            .ok_or(Error::NotSignedIn)
    }

    /// The configuration in use.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The underlying storage.
    #[must_use]
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// The signed-in account, if any.
    #[must_use]
    pub fn current_account(&self) -> Option<&Account> {
        self.session.as_ref()
    }

    /// Number of registered accounts.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the accounts cannot be read.
    pub fn account_count(&self) -> Result<usize> {
        self.accounts().count()
    }

    /// Validate the sign-up form, register the account and sign it in.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for form problems, [`Error::EmailTaken`]
    /// for a duplicate email, or a storage error.
    pub fn sign_up(&mut self, form: &SignUpForm) -> Result<Account> {
        form.validate(self.config.accounts.min_password_length)?;
        let account = self
            .accounts()
            .register(&form.name, &form.email, &form.password)?;
        self.begin(account)
    }

    /// Validate the sign-in form and authenticate.
    ///
    /// On failure the current session, if any, is left as it was.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for empty fields,
    /// [`Error::InvalidCredentials`] for a bad pair, or a storage error.
    pub fn sign_in(&mut self, form: &SignInForm) -> Result<Account> {
        form.validate()?;
        let account = self.accounts().authenticate(&form.email, &form.password)?;
        self.begin(account)
    }

    /// Clear the session and the in-memory view.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the stored session cannot be removed.
    pub fn logout(&mut self) -> Result<()> {
        self.accounts().end_session()?;
        if let Some(account) = self.session.take() {
            info!("Signed out {}", account.id);
        }
        self.view.clear();
        Ok(())
    }

    /// The signed-in account's records, in insertion order.
    #[must_use]
    pub fn records(&self) -> &[ErrorRecord] {
        &self.view
    }

    /// The signed-in account's records that pass `filter`.
    #[must_use]
    pub fn filtered(&self, filter: &RecordFilter) -> Vec<&ErrorRecord> {
        filter.apply(&self.view)
    }

    /// Distinct categories among the signed-in account's records.
    #[must_use]
    pub fn categories(&self) -> Vec<&str> {
        filter::categories(&self.view)
    }

    /// Suggested categories the signed-in account has not used yet.
    #[must_use]
    pub fn suggested_categories(&self) -> Vec<&'static str> {
        forms::unused_suggestions(&self.categories())
    }

    /// One of the signed-in account's records.
    #[must_use]
    pub fn record(&self, id: &str) -> Option<&ErrorRecord> {
        self.view.iter().find(|r| r.id == id)
    }

    /// Create a record owned by the signed-in account.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotSignedIn`] without a session,
    /// [`Error::Validation`] for a blank title or description or when the
    /// session account no longer exists, or a storage error.
    pub fn add_record(&mut self, new: NewErrorRecord) -> Result<ErrorRecord> {
        let owner_id = self.owner_id()?;
        if self.accounts().find(&owner_id)?.is_none() {
            warn!("Session account {} is not registered", owner_id);
            return Err(Error::validation("owner", "account no longer exists"));
        }

        let record =
            self.store()
                .add(&owner_id, new, &self.config.records.default_category)?;
        self.view.push(record.clone());
        Ok(record)
    }

    /// Merge `patch` into one of the signed-in account's records.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotSignedIn`] without a session, [`Error::NotFound`]
    /// if the record is not in the account's list, [`Error::Validation`] if
    /// the patch blanks a required field, or a storage error.
    pub fn update_record(&mut self, id: &str, patch: &ErrorRecordPatch) -> Result<ErrorRecord> {
        self.owner_id()?;
        let Some(index) = self.view.iter().position(|r| r.id == id) else {
            return Err(Error::not_found(id));
        };

        let updated = self.store().update(id, patch)?;
        self.view[index] = updated.clone();
        Ok(updated)
    }

    /// Flip a record between in-progress and complete.
    ///
    /// # Errors
    ///
    /// Same as [`Tracker::update_record`].
    pub fn toggle_status(&mut self, id: &str) -> Result<ErrorRecord> {
        self.owner_id()?;
        let status = self
            .record(id)
            .map(|r| r.status.toggled())
            .ok_or_else(|| Error::not_found(id))?;
        self.update_record(id, &ErrorRecordPatch::status(status))
    }

    /// Delete one of the signed-in account's records.
    ///
    /// Deleting a record that is already gone succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotSignedIn`] without a session, or a storage error.
    pub fn delete_record(&mut self, id: &str) -> Result<()> {
        self.owner_id()?;
        if self.record(id).is_some() {
            self.store().delete(id)?;
            self.view.retain(|r| r.id != id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Status;

    fn create_tracker() -> Tracker {
        let storage = Storage::open_in_memory().expect("failed to create test storage");
        Tracker::with_storage(Config::default(), storage).expect("failed to create tracker")
    }

    fn sign_up_form(email: &str) -> SignUpForm {
        SignUpForm {
            name: "Alice".to_string(),
            email: email.to_string(),
            password: "secret1".to_string(),
            confirm_password: "secret1".to_string(),
        }
    }

    fn sign_in_form(email: &str, password: &str) -> SignInForm {
        SignInForm {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    fn persisted_for(tracker: &Tracker, owner: &str) -> Vec<ErrorRecord> {
        tracker.store().list_for_owner(owner).unwrap()
    }

    #[test]
    fn test_starts_signed_out() {
        let tracker = create_tracker();
        assert!(tracker.current_account().is_none());
        assert!(tracker.records().is_empty());
    }

    #[test]
    fn test_operations_require_session() {
        let mut tracker = create_tracker();
        assert!(matches!(
            tracker.add_record(NewErrorRecord::new("T", "D")),
            Err(Error::NotSignedIn)
        ));
        assert!(matches!(tracker.delete_record("x"), Err(Error::NotSignedIn)));
        assert!(matches!(
            tracker.update_record("x", &ErrorRecordPatch::default()),
            Err(Error::NotSignedIn)
        ));
        assert!(matches!(tracker.toggle_status("x"), Err(Error::NotSignedIn)));
    }

    #[test]
    fn test_suggested_categories_skip_used() {
        let mut tracker = create_tracker();
        tracker.sign_up(&sign_up_form("alice@x.com")).unwrap();
        tracker
            .add_record(NewErrorRecord {
                category: "api".to_string(),
                ..NewErrorRecord::new("T", "D")
            })
            .unwrap();

        let suggestions = tracker.suggested_categories();
        assert!(!suggestions.contains(&"api"));
        assert_eq!(suggestions.len(), forms::SUGGESTED_CATEGORIES.len() - 1);
        assert_eq!(suggestions[0], "development");
    }

    #[test]
    fn test_sign_up_validates_form_first() {
        let mut tracker = create_tracker();
        let form = SignUpForm {
            password: "short".to_string(),
            confirm_password: "short".to_string(),
            ..sign_up_form("alice@x.com")
        };
        assert!(tracker.sign_up(&form).unwrap_err().is_validation());
        assert_eq!(tracker.account_count().unwrap(), 0);
    }

    #[test]
    fn test_min_password_length_from_config() {
        let storage = Storage::open_in_memory().unwrap();
        let mut config = Config::default();
        config.accounts.min_password_length = 10;
        let mut tracker = Tracker::with_storage(config, storage).unwrap();

        assert!(tracker.sign_up(&sign_up_form("alice@x.com")).is_err());
    }

    #[test]
    fn test_view_matches_persisted_subset() {
        let mut tracker = create_tracker();
        let alice = tracker.sign_up(&sign_up_form("alice@x.com")).unwrap();
        let first = tracker.add_record(NewErrorRecord::new("A1", "D")).unwrap();

        tracker.sign_up(&sign_up_form("bob@x.com")).unwrap();
        tracker.add_record(NewErrorRecord::new("B1", "D")).unwrap();

        tracker
            .sign_in(&sign_in_form("alice@x.com", "secret1"))
            .unwrap();
        tracker.add_record(NewErrorRecord::new("A2", "D")).unwrap();
        tracker.toggle_status(&first.id).unwrap();

        assert_eq!(tracker.records(), persisted_for(&tracker, &alice.id).as_slice());
        assert_eq!(tracker.records().len(), 2);
    }

    #[test]
    fn test_update_other_owners_record_is_not_found() {
        let mut tracker = create_tracker();
        tracker.sign_up(&sign_up_form("bob@x.com")).unwrap();
        let bobs = tracker.add_record(NewErrorRecord::new("B", "D")).unwrap();
        tracker.sign_up(&sign_up_form("alice@x.com")).unwrap();

        let err = tracker
            .update_record(&bobs.id, &ErrorRecordPatch::status(Status::Complete))
            .unwrap_err();
        assert!(err.is_not_found());

        tracker.delete_record(&bobs.id).unwrap();
        assert_eq!(persisted_for(&tracker, &bobs.owner_id).len(), 1);
    }

    #[test]
    fn test_toggle_status_round_trip() {
        let mut tracker = create_tracker();
        tracker.sign_up(&sign_up_form("alice@x.com")).unwrap();
        let record = tracker.add_record(NewErrorRecord::new("T", "D")).unwrap();

        assert_eq!(
            tracker.toggle_status(&record.id).unwrap().status,
            Status::Complete
        );
        assert_eq!(
            tracker.toggle_status(&record.id).unwrap().status,
            Status::InProgress
        );
        assert!(tracker.toggle_status("missing").unwrap_err().is_not_found());
    }

    #[test]
    fn test_delete_twice() {
        let mut tracker = create_tracker();
        tracker.sign_up(&sign_up_form("alice@x.com")).unwrap();
        let record = tracker.add_record(NewErrorRecord::new("T", "D")).unwrap();

        tracker.delete_record(&record.id).unwrap();
        tracker.delete_record(&record.id).unwrap();
        assert!(tracker.record(&record.id).is_none());
        assert!(tracker.records().is_empty());
    }

    #[test]
    fn test_failed_sign_in_keeps_current_session() {
        let mut tracker = create_tracker();
        let alice = tracker.sign_up(&sign_up_form("alice@x.com")).unwrap();

        let err = tracker
            .sign_in(&sign_in_form("alice@x.com", "wrong"))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidCredentials));
        assert_eq!(tracker.current_account(), Some(&alice));
    }

    #[test]
    fn test_add_rejected_when_account_missing() {
        let storage = Storage::open_in_memory().unwrap();
        let ghost = crate::model::SessionRecord::start(Account {
            id: "ghost".to_string(),
            email: "ghost@x.com".to_string(),
            name: "Ghost".to_string(),
        });
        storage
            .put(crate::storage::StorageKey::CurrentUser, &ghost)
            .unwrap();
        let mut tracker = Tracker::with_storage(Config::default(), storage).unwrap();

        assert!(tracker.current_account().is_some());
        let err = tracker
            .add_record(NewErrorRecord::new("T", "D"))
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_categories_and_filter() {
        let mut tracker = create_tracker();
        tracker.sign_up(&sign_up_form("alice@x.com")).unwrap();
        tracker.add_record(NewErrorRecord::new("T1", "D")).unwrap();
        tracker
            .add_record(NewErrorRecord {
                category: "api".to_string(),
                ..NewErrorRecord::new("T2", "D")
            })
            .unwrap();

        assert_eq!(tracker.categories(), vec!["general", "api"]);
        let filter = RecordFilter {
            category: Some("api".to_string()),
            ..RecordFilter::default()
        };
        assert_eq!(tracker.filtered(&filter).len(), 1);
    }
}
