use crate::reconciler::SafeLabels;
use crate::records::AccountRecord;

/// Normalized account handed to the governance platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    id: String,
    user_name: String,
    active: bool,
    groups: Vec<String>,
    safe_roles: Vec<String>,
    safe_rights: Vec<String>,
}

impl Account {
    /// Projects a user record and its reconciled labels into an account.
    #[must_use]
    pub fn from_record(record: AccountRecord, labels: SafeLabels) -> Self {
        Self {
            id: record.id,
            user_name: record.user_name,
            active: record.active,
            groups: record.group_ids,
            safe_roles: labels.safe_roles,
            safe_rights: labels.safe_rights,
        }
    }

    /// Returns the account identity (the PAM user id).
    #[must_use]
    pub fn identity(&self) -> &str {
        self.id.as_str()
    }

    /// Returns the account uuid (the user name).
    #[must_use]
    pub fn uuid(&self) -> &str {
        self.user_name.as_str()
    }

    /// Returns the login name.
    #[must_use]
    pub fn user_name(&self) -> &str {
        self.user_name.as_str()
    }

    /// Returns whether the account is active.
    #[must_use]
    pub fn active(&self) -> bool {
        self.active
    }

    /// Returns whether the account is disabled.
    #[must_use]
    pub fn disabled(&self) -> bool {
        !self.active
    }

    /// Returns group ids.
    #[must_use]
    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    /// Returns safe role labels.
    #[must_use]
    pub fn safe_roles(&self) -> &[String] {
        &self.safe_roles
    }

    /// Returns safe right labels.
    #[must_use]
    pub fn safe_rights(&self) -> &[String] {
        &self.safe_rights
    }
}
