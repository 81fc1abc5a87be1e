//! Kestrel Privacy
//!
//! Persistent grant/deny policy for site permissions and invalid
//! certificates. The policy never caches: every decision re-reads the
//! store, so concurrent mutations are always observed.

mod error;
mod permissions;

pub use error::PrivacyError;
pub use permissions::{Decision, Permission, PermissionPolicy, PermissionRule, Verdict};

pub type Result<T> = std::result::Result<T, PrivacyError>;
