//! SCIM filter expressions understood by the PAM API.

use std::fmt::{Display, Formatter};

/// Filter for the users endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountFilter {
    /// `userName eq "<value>"`.
    UserName(String),
}

impl Display for AccountFilter {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UserName(user_name) => write!(formatter, "userName eq \"{user_name}\""),
        }
    }
}

/// Filter for the container permissions endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SafePermissionFilter {
    /// `user.display eq "<userName>"`.
    UserDisplay(String),
    /// `user.value eq "<id>" and container.value eq "<safeId>"`.
    UserOnSafe {
        /// PAM user identifier.
        user_id: String,
        /// Safe identifier.
        safe_id: String,
    },
}

impl Display for SafePermissionFilter {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UserDisplay(user_name) => write!(formatter, "user.display eq \"{user_name}\""),
            Self::UserOnSafe { user_id, safe_id } => write!(
                formatter,
                "user.value eq \"{user_id}\" and container.value eq \"{safe_id}\""
            ),
        }
    }
}

/// Directory service query expression matching a user by system name.
#[must_use]
pub fn directory_user_query(user_name: &str) -> String {
    format!(r#"{{"_and":[{{"SystemName":{{"_like":"{user_name}"}}}},{{"ObjectType":"user"}}]}}"#)
}
