//! Connector-configured safe role and safe right catalogs.
//!
//! Safe roles are not native PAM objects: they are named bundles of rights
//! that the connector projects onto raw grants by exact set comparison.

use std::collections::BTreeSet;

use pamsync_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

/// Named bundle of safe rights.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SafeRoleDefinitionInput")]
pub struct SafeRoleDefinition {
    name: NonEmptyString,
    description: Option<String>,
    rights: Vec<String>,
}

#[derive(Deserialize)]
struct SafeRoleDefinitionInput {
    name: String,
    #[serde(default)]
    description: Option<String>,
    rights: Vec<String>,
}

impl TryFrom<SafeRoleDefinitionInput> for SafeRoleDefinition {
    type Error = AppError;

    fn try_from(value: SafeRoleDefinitionInput) -> Result<Self, Self::Error> {
        Self::new(value.name, value.description, value.rights)
    }
}

impl SafeRoleDefinition {
    /// Creates a validated role definition.
    ///
    /// The rights list must contain at least one non-empty right name.
    pub fn new(
        name: impl Into<String>,
        description: Option<String>,
        rights: Vec<String>,
    ) -> AppResult<Self> {
        let name = NonEmptyString::new(name)?;
        if rights.is_empty() {
            return Err(AppError::Validation(format!(
                "safe role '{name}' must define at least one right"
            )));
        }

        if rights.iter().any(|right| right.trim().is_empty()) {
            return Err(AppError::Validation(format!(
                "safe role '{name}' contains an empty right name"
            )));
        }

        Ok(Self {
            name,
            description,
            rights,
        })
    }

    /// Returns the role name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the role description, if configured.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the bundled rights in configuration order.
    #[must_use]
    pub fn rights(&self) -> &[String] {
        &self.rights
    }

    /// Returns whether `rights` is exactly this role's rights set.
    #[must_use]
    pub fn matches_rights(&self, rights: &[String]) -> bool {
        same_rights_set(&self.rights, rights)
    }

    /// Returns whether the role bundles `right`.
    #[must_use]
    pub fn contains_right(&self, right: &str) -> bool {
        self.rights.iter().any(|candidate| candidate == right)
    }
}

/// Atomic safe right exposed as an entitlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SafeRightDefinitionInput")]
pub struct SafeRightDefinition {
    name: NonEmptyString,
    description: Option<String>,
}

#[derive(Deserialize)]
struct SafeRightDefinitionInput {
    name: String,
    #[serde(default)]
    description: Option<String>,
}

impl TryFrom<SafeRightDefinitionInput> for SafeRightDefinition {
    type Error = AppError;

    fn try_from(value: SafeRightDefinitionInput) -> Result<Self, Self::Error> {
        Self::new(value.name, value.description)
    }
}

impl SafeRightDefinition {
    /// Creates a validated right definition.
    pub fn new(name: impl Into<String>, description: Option<String>) -> AppResult<Self> {
        Ok(Self {
            name: NonEmptyString::new(name)?,
            description,
        })
    }

    /// Returns the right name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the right description, if configured.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// Read-only catalog of configured safe roles and safe rights.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SafeCatalog {
    roles: Vec<SafeRoleDefinition>,
    rights: Vec<SafeRightDefinition>,
}

impl SafeCatalog {
    /// Creates a catalog from already validated definitions.
    #[must_use]
    pub fn new(roles: Vec<SafeRoleDefinition>, rights: Vec<SafeRightDefinition>) -> Self {
        Self { roles, rights }
    }

    /// Parses the JSON-encoded role and right arrays from configuration.
    pub fn from_json(roles_json: &str, rights_json: &str) -> AppResult<Self> {
        let roles: Vec<SafeRoleDefinition> = serde_json::from_str(roles_json)
            .map_err(|error| AppError::Validation(format!("invalid safe roles catalog: {error}")))?;
        let rights: Vec<SafeRightDefinition> = serde_json::from_str(rights_json).map_err(
            |error| AppError::Validation(format!("invalid safe rights catalog: {error}")),
        )?;

        Ok(Self::new(roles, rights))
    }

    /// Returns configured roles in configuration order.
    #[must_use]
    pub fn roles(&self) -> &[SafeRoleDefinition] {
        &self.roles
    }

    /// Returns configured rights in configuration order.
    #[must_use]
    pub fn rights(&self) -> &[SafeRightDefinition] {
        &self.rights
    }

    /// Returns the first role with the given name.
    #[must_use]
    pub fn find_role(&self, name: &str) -> Option<&SafeRoleDefinition> {
        self.roles.iter().find(|role| role.name() == name)
    }

    /// Returns names of roles whose rights sets collide with an earlier role.
    ///
    /// Colliding roles all match the same grants, so an account shows every
    /// one of them.
    #[must_use]
    pub fn ambiguous_role_names(&self) -> Vec<&str> {
        let mut seen: Vec<BTreeSet<&str>> = Vec::with_capacity(self.roles.len());
        let mut ambiguous = Vec::new();
        for role in &self.roles {
            let canonical = canonical_rights(&role.rights);
            if seen.contains(&canonical) {
                ambiguous.push(role.name());
            } else {
                seen.push(canonical);
            }
        }

        ambiguous
    }
}

/// Compares two rights lists as sets, ignoring order.
///
/// Both sides must also have the same length, so a grant that repeats a
/// right does not match a role listing it once.
#[must_use]
pub fn same_rights_set(left: &[String], right: &[String]) -> bool {
    left.len() == right.len() && canonical_rights(left) == canonical_rights(right)
}

fn canonical_rights(rights: &[String]) -> BTreeSet<&str> {
    rights.iter().map(String::as_str).collect()
}
