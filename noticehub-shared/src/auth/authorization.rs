//! Role checks for handlers
//!
//! Two roles exist. Admins moderate notices and manage accounts; users read.
//! When open submission is enabled any authenticated user may also submit
//! notices, which still start out pending.
//!
//! # Example
//!
//! ```
//! use noticehub_shared::auth::authorization::{require_admin, AuthzError};
//! use noticehub_shared::auth::middleware::AuthContext;
//!
//! fn moderate(auth: &AuthContext) -> Result<(), AuthzError> {
//!     require_admin(auth)?;
//!     Ok(())
//! }
//! ```

use uuid::Uuid;

use super::middleware::AuthContext;

/// Error type for authorization checks
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthzError {
    /// Caller is not an admin
    #[error("Admin access required")]
    AdminRequired,

    /// Admin tried to act on their own account
    #[error("You cannot perform this action on your own account")]
    SelfTarget,
}

pub fn require_admin(auth: &AuthContext) -> Result<(), AuthzError> {
    if auth.is_admin() {
        Ok(())
    } else {
        Err(AuthzError::AdminRequired)
    }
}

/// Admins always; other users only when `open_submission` is on
pub fn require_notice_submitter(
    auth: &AuthContext,
    open_submission: bool,
) -> Result<(), AuthzError> {
    if open_submission {
        return Ok(());
    }
    require_admin(auth)
}

/// Rejects account actions aimed at the caller's own account
pub fn forbid_self_target(auth: &AuthContext, target: Uuid) -> Result<(), AuthzError> {
    if auth.user_id == target {
        Err(AuthzError::SelfTarget)
    } else {
        Ok(())
    }
}
