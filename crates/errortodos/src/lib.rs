//! `errortodos` - A personal tracker for software errors and their fixes
//!
//! This library provides per-account storage of error records (title,
//! description, reproduction steps, fix notes, code, screenshot, status and
//! category) on top of a local `SQLite` document store.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod accounts;
pub mod attachment;
pub mod cli;
pub mod config;
pub mod error;
pub mod filter;
pub mod forms;
pub mod logging;
pub mod model;
pub mod records;
pub mod storage;
pub mod tracker;

pub use attachment::ImageAttachment;
pub use config::Config;
pub use error::{Error, Result};
pub use filter::RecordFilter;
pub use forms::{SignInForm, SignUpForm};
pub use logging::init_logging;
pub use model::{Account, ErrorRecord, ErrorRecordPatch, NewErrorRecord, Status};
pub use storage::{Storage, StorageKey, StorageStats};
pub use tracker::Tracker;
