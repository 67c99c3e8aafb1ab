use std::fmt::{Display, Formatter};
use std::str::FromStr;

use pamsync_core::AppError;

/// Attribute change operation sent by the governance platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeOp {
    /// Adds a value to a multi-valued attribute.
    Add,
    /// Removes a value from a multi-valued attribute.
    Remove,
    /// Overwrites an attribute. Not supported by this connector.
    Set,
}

impl ChangeOp {
    /// Returns the transport value of this operation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "Add",
            Self::Remove => "Remove",
            Self::Set => "Set",
        }
    }
}

impl Display for ChangeOp {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for ChangeOp {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Add" => Ok(Self::Add),
            "Remove" => Ok(Self::Remove),
            "Set" => Ok(Self::Set),
            _ => Err(AppError::UnsupportedOperation(value.to_owned())),
        }
    }
}

/// Account attribute targeted by a change.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AccountAttribute {
    /// Group memberships, valued by group id.
    Groups,
    /// Safe roles, valued by safe label.
    SafeRoles,
    /// Safe rights, valued by safe label.
    SafeRights,
    /// Any attribute this connector does not manage.
    Other(String),
}

impl AccountAttribute {
    /// Returns the schema name of the attribute.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Groups => "groups",
            Self::SafeRoles => "safeRoles",
            Self::SafeRights => "safeRights",
            Self::Other(name) => name.as_str(),
        }
    }

    /// Maps a schema attribute name, keeping unknown names.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value {
            "groups" => Self::Groups,
            "safeRoles" => Self::SafeRoles,
            "safeRights" => Self::SafeRights,
            other => Self::Other(other.to_owned()),
        }
    }
}

/// One attribute change applied to an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeChange {
    /// Operation to apply.
    pub op: ChangeOp,
    /// Attribute being changed.
    pub attribute: AccountAttribute,
    /// Group id or safe label.
    pub value: String,
}

impl AttributeChange {
    /// Creates an `Add` change.
    #[must_use]
    pub fn add(attribute: AccountAttribute, value: impl Into<String>) -> Self {
        Self {
            op: ChangeOp::Add,
            attribute,
            value: value.into(),
        }
    }

    /// Creates a `Remove` change.
    #[must_use]
    pub fn remove(attribute: AccountAttribute, value: impl Into<String>) -> Self {
        Self {
            op: ChangeOp::Remove,
            attribute,
            value: value.into(),
        }
    }
}

/// SCIM patch applied to a group's `members` attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupMembershipPatch {
    /// Adds the user to the group.
    AddMember {
        /// PAM user identifier.
        user_id: String,
    },
    /// Removes the user from the group.
    RemoveMember {
        /// PAM user identifier.
        user_id: String,
    },
}

impl GroupMembershipPatch {
    /// Returns the SCIM patch `op` value.
    #[must_use]
    pub fn op(&self) -> &'static str {
        match self {
            Self::AddMember { .. } => "add",
            Self::RemoveMember { .. } => "remove",
        }
    }

    /// Returns the SCIM patch `path` value.
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::AddMember { .. } => "members".to_owned(),
            Self::RemoveMember { user_id } => format!("members[value eq \"{user_id}\"]"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use pamsync_core::AppError;

    use super::{AccountAttribute, ChangeOp, GroupMembershipPatch};

    #[test]
    fn unknown_op_is_unsupported() {
        let parsed = ChangeOp::from_str("Replace");
        assert!(matches!(parsed, Err(AppError::UnsupportedOperation(op)) if op == "Replace"));
    }

    #[test]
    fn unknown_attribute_is_kept() {
        assert_eq!(
            AccountAttribute::parse("department"),
            AccountAttribute::Other("department".to_owned())
        );
        assert_eq!(AccountAttribute::parse("safeRoles").as_str(), "safeRoles");
    }

    #[test]
    fn remove_member_patch_targets_user_filter() {
        let patch = GroupMembershipPatch::RemoveMember {
            user_id: "u-1".to_owned(),
        };
        assert_eq!(patch.op(), "remove");
        assert_eq!(patch.path(), r#"members[value eq "u-1"]"#);
    }
}
