use std::str::FromStr;

use pamsync_core::AppError;

use crate::catalog::{SafeRightDefinition, SafeRoleDefinition};
use crate::label::SafeLabel;
use crate::records::GroupRecord;

/// Entitlement types this connector aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntitlementType {
    /// PAM group membership.
    Group,
    /// Configured safe role on one safe.
    SafeRole,
    /// Atomic safe right on one safe.
    SafeRight,
}

impl EntitlementType {
    /// Returns the schema name of the type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Group => "group",
            Self::SafeRole => "safeRole",
            Self::SafeRight => "safeRight",
        }
    }
}

impl FromStr for EntitlementType {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "group" => Ok(Self::Group),
            "safeRole" => Ok(Self::SafeRole),
            "safeRight" => Ok(Self::SafeRight),
            _ => Err(AppError::Validation(format!(
                "unknown entitlement type '{value}'"
            ))),
        }
    }
}

/// PAM group projected as an entitlement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    id: String,
    display_name: String,
    description: Option<String>,
}

impl Group {
    /// Projects a group record with its looked-up role description.
    #[must_use]
    pub fn from_record(record: GroupRecord, description: Option<String>) -> Self {
        Self {
            id: record.id,
            display_name: record.display_name,
            description,
        }
    }

    /// Returns the group id, also the entitlement identity.
    #[must_use]
    pub fn id(&self) -> &str {
        self.id.as_str()
    }

    /// Returns the display name, also the entitlement uuid.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name.as_str()
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// Safe role or safe right synthesized for one safe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafeEntitlement {
    label: String,
    description: Option<String>,
}

impl SafeEntitlement {
    /// Synthesizes the entitlement for a role on a safe.
    #[must_use]
    pub fn for_role(safe_id: &str, role: &SafeRoleDefinition) -> Self {
        Self {
            label: SafeLabel::new(safe_id, role.name()).to_string(),
            description: role.description().map(str::to_owned),
        }
    }

    /// Synthesizes the entitlement for a right on a safe.
    #[must_use]
    pub fn for_right(safe_id: &str, right: &SafeRightDefinition) -> Self {
        Self {
            label: SafeLabel::new(safe_id, right.name()).to_string(),
            description: right.description().map(str::to_owned),
        }
    }

    /// Returns the `"{safeId} - {name}"` id, also identity, uuid, and display name.
    #[must_use]
    pub fn id(&self) -> &str {
        self.label.as_str()
    }

    /// Returns the configured description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// One entitlement emitted by an entitlement aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entitlement {
    /// A group.
    Group(Group),
    /// A safe role on one safe.
    SafeRole(SafeEntitlement),
    /// A safe right on one safe.
    SafeRight(SafeEntitlement),
}

impl Entitlement {
    /// Returns the entitlement type.
    #[must_use]
    pub fn entitlement_type(&self) -> EntitlementType {
        match self {
            Self::Group(_) => EntitlementType::Group,
            Self::SafeRole(_) => EntitlementType::SafeRole,
            Self::SafeRight(_) => EntitlementType::SafeRight,
        }
    }

    /// Returns the entitlement identity.
    #[must_use]
    pub fn identity(&self) -> &str {
        match self {
            Self::Group(group) => group.id(),
            Self::SafeRole(entitlement) | Self::SafeRight(entitlement) => entitlement.id(),
        }
    }

    /// Returns the entitlement display name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        match self {
            Self::Group(group) => group.display_name(),
            Self::SafeRole(entitlement) | Self::SafeRight(entitlement) => entitlement.id(),
        }
    }

    /// Returns the entitlement description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        match self {
            Self::Group(group) => group.description(),
            Self::SafeRole(entitlement) | Self::SafeRight(entitlement) => {
                entitlement.description()
            }
        }
    }
}
