//! Typed records decoded from the PAM SCIM API.

/// User record returned by the users endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountRecord {
    /// Stable PAM user identifier.
    pub id: String,
    /// Login name, usually an email address.
    pub user_name: String,
    /// Whether the user is active.
    pub active: bool,
    /// Identifiers of groups the user belongs to.
    pub group_ids: Vec<String>,
}

/// Group record returned by the groups endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupRecord {
    /// Stable group identifier.
    pub id: String,
    /// Group display name.
    pub display_name: String,
}

/// Safe (container) record returned by the containers endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafeRecord {
    /// Safe identifier.
    pub id: String,
}

/// Raw grant binding one user to one safe with a list of rights.
///
/// The PAM system holds at most one grant per user and safe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafePermissionGrant {
    /// Grant identifier used for replace and delete calls.
    pub id: String,
    /// `user.value` of the grant.
    pub user_id: String,
    /// `container.value` of the grant.
    pub safe_id: String,
    /// Granted right names in upstream order.
    pub rights: Vec<String>,
}

impl SafePermissionGrant {
    /// Returns whether the grant belongs to the given user.
    #[must_use]
    pub fn belongs_to(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }
}

/// Desired state of a grant sent on create or replace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantPayload {
    /// User receiving the rights.
    pub user_id: String,
    /// Target safe, sent as `container.name`.
    pub safe_id: String,
    /// Full rights list after the change.
    pub rights: Vec<String>,
}

/// Call needed to move a grant to its desired state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrantMutation {
    /// `POST` a new grant.
    Create(GrantPayload),
    /// `PUT` over an existing grant.
    Replace {
        /// Grant being overwritten.
        grant_id: String,
        /// New grant state.
        payload: GrantPayload,
    },
    /// `DELETE` an existing grant.
    Delete {
        /// Grant being removed.
        grant_id: String,
    },
}

impl GrantMutation {
    /// Returns a short verb for logging.
    #[must_use]
    pub fn verb(&self) -> &'static str {
        match self {
            Self::Create(_) => "create",
            Self::Replace { .. } => "replace",
            Self::Delete { .. } => "delete",
        }
    }
}
