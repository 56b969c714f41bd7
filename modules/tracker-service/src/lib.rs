//! Personal activity tracker: a record store over JSON collection files and
//! the HTTP surface in front of it.
//!
//! In-process callers can use `ActivityLog`, `BlogArchive` and `TodoBoard`
//! directly; only the HTTP routes go through the access gate.

pub mod activities;
pub mod blog;
pub mod config;
pub mod error;
pub mod gate;
pub mod routes;
pub mod storage;
pub mod store;
pub mod todos;

pub use activities::ActivityLog;
pub use blog::BlogArchive;
pub use error::{StoreError, StoreResult};
pub use todos::TodoBoard;
