//! Core data types for errortodos.
//!
//! These are the documents persisted under the tracker's storage keys. Field
//! names on the wire are camelCase, matching documents written by the web
//! client.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generate a fresh opaque identifier.
#[must_use]
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// A registered account as seen by the rest of the application.
///
/// Never carries credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier generated at registration.
    pub id: String,
    /// Email address, unique across accounts.
    pub email: String,
    /// Display name.
    pub name: String,
}

/// An account as persisted in the `users` collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredAccount {
    /// Unique identifier generated at registration.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Email address, unique across accounts.
    pub email: String,
    /// Salted BLAKE3 digest of the password, hex encoded.
    pub password_hash: String,
}

impl StoredAccount {
    /// Create a new account with a fresh id, hashing `password`.
    #[must_use]
    pub fn new(name: String, email: String, password: &str) -> Self {
        let id = new_id();
        let password_hash = hash_password(&id, password);
        Self {
            id,
            name,
            email,
            password_hash,
        }
    }

    /// Check whether `password` matches the stored digest.
    #[must_use]
    pub fn verify_password(&self, password: &str) -> bool {
        hash_password(&self.id, password) == self.password_hash
    }

    /// The credential-free view of this account.
    #[must_use]
    pub fn to_account(&self) -> Account {
        Account {
            id: self.id.clone(),
            email: self.email.clone(),
            name: self.name.clone(),
        }
    }
}

/// Hash a password salted with the owning account's id.
fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(salt.as_bytes());
    hasher.update(&[0]);
    hasher.update(password.as_bytes());
    hasher.finalize().to_hex().to_string()
}

/// The persisted session: the signed-in account plus when it was last used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    /// The signed-in account.
    #[serde(flatten)]
    pub account: Account,
    /// Last time the session was established or restored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_active_at: Option<DateTime<Utc>>,
}

impl SessionRecord {
    /// Start a session for `account` now.
    #[must_use]
    pub fn start(account: Account) -> Self {
        Self {
            account,
            last_active_at: Some(Utc::now()),
        }
    }
}

/// Progress of an error record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    /// Still being worked on.
    #[default]
    InProgress,
    /// Fixed.
    Complete,
}

impl Status {
    /// The other state.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::InProgress => Self::Complete,
            Self::Complete => Self::InProgress,
        }
    }

    /// The stored name of this status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InProgress => "in-progress",
            Self::Complete => "complete",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::InProgress => "In Progress",
            Self::Complete => "Complete",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in-progress" => Ok(Self::InProgress),
            "complete" => Ok(Self::Complete),
            other => Err(format!("unknown status: {other}")),
        }
    }
}

/// One tracked defect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorRecord {
    /// Unique identifier generated at creation.
    pub id: String,
    /// Short title.
    pub title: String,
    /// What went wrong.
    pub description: String,
    /// Steps to reproduce.
    #[serde(rename = "problemStep", default)]
    pub repro_steps: String,
    /// How it was fixed.
    #[serde(rename = "problemFix", default)]
    pub fix_notes: String,
    /// Related code snippet.
    #[serde(default)]
    pub code: String,
    /// Progress.
    #[serde(default)]
    pub status: Status,
    /// Free-form category.
    #[serde(rename = "type")]
    pub category: String,
    /// Screenshot as a data URL.
    #[serde(rename = "imageUrl", default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// Id of the owning account.
    #[serde(rename = "userId")]
    pub owner_id: String,
}

impl ErrorRecord {
    /// Apply every field present in `patch`.
    ///
    /// `id`, `owner_id` and `created_at` are not patchable.
    pub fn apply(&mut self, patch: &ErrorRecordPatch) {
        if let Some(title) = &patch.title {
            self.title.clone_from(title);
        }
        if let Some(description) = &patch.description {
            self.description.clone_from(description);
        }
        if let Some(steps) = &patch.repro_steps {
            self.repro_steps.clone_from(steps);
        }
        if let Some(fix) = &patch.fix_notes {
            self.fix_notes.clone_from(fix);
        }
        if let Some(code) = &patch.code {
            self.code.clone_from(code);
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(category) = &patch.category {
            self.category.clone_from(category);
        }
        if let Some(image) = &patch.image {
            self.image.clone_from(image);
        }
    }
}

/// Fields supplied when creating a record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewErrorRecord {
    /// Short title (required).
    pub title: String,
    /// What went wrong (required).
    pub description: String,
    /// Steps to reproduce.
    pub repro_steps: String,
    /// How it was fixed.
    pub fix_notes: String,
    /// Related code snippet.
    pub code: String,
    /// Initial status.
    pub status: Status,
    /// Category; blank means the configured default.
    pub category: String,
    /// Screenshot as a data URL.
    pub image: Option<String>,
}

impl NewErrorRecord {
    /// A record with just the required fields.
    #[must_use]
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            ..Self::default()
        }
    }
}

/// A partial update to a record. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorRecordPatch {
    /// New title.
    pub title: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New reproduction steps.
    pub repro_steps: Option<String>,
    /// New fix notes.
    pub fix_notes: Option<String>,
    /// New code snippet.
    pub code: Option<String>,
    /// New status.
    pub status: Option<Status>,
    /// New category.
    pub category: Option<String>,
    /// New screenshot; `Some(None)` removes it.
    pub image: Option<Option<String>>,
}

impl ErrorRecordPatch {
    /// A patch that only sets the status.
    #[must_use]
    pub fn status(status: Status) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Whether the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
