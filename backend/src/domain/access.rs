//! Role-based access checks.

use super::{Error, Role, User};

/// Set of roles allowed to perform an operation.
///
/// # Examples
/// ```
/// use contactbook::domain::{Role, RoleAccess};
///
/// let staff = RoleAccess::new(&[Role::Admin, Role::Moderator]);
/// assert!(staff.allows(Role::Moderator));
/// assert!(!staff.allows(Role::User));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleAccess {
    allowed: &'static [Role],
}

/// Roles that may read every user's contacts.
pub const STAFF_ONLY: RoleAccess = RoleAccess::new(&[Role::Admin, Role::Moderator]);

impl RoleAccess {
    pub const fn new(allowed: &'static [Role]) -> Self {
        Self { allowed }
    }

    pub fn allows(&self, role: Role) -> bool {
        self.allowed.contains(&role)
    }

    /// Fail with `403 FORBIDDEN` unless the user's role is allowed.
    pub fn check(&self, user: &User) -> Result<(), Error> {
        if self.allows(user.role) {
            Ok(())
        } else {
            Err(Error::forbidden("FORBIDDEN"))
        }
    }
}
