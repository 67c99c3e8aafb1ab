use async_trait::async_trait;

use pamsync_core::{AppResult, NonEmptyString};
use pamsync_domain::{
    AccountFilter, AccountRecord, GrantMutation, GroupMembershipPatch, GroupRecord,
    SafePermissionFilter, SafePermissionGrant, SafeRecord,
};

/// Port for the PAM system's SCIM-like REST API.
///
/// Every call authenticates on its own; failures surface as
/// `AppError::Upstream` carrying the call name, status, and body.
#[async_trait]
pub trait PamGateway: Send + Sync {
    /// Verifies that an access token can be obtained.
    async fn test_connection(&self) -> AppResult<()>;

    /// Lists users, optionally narrowed by a filter.
    async fn list_accounts(&self, filter: Option<&AccountFilter>)
    -> AppResult<Vec<AccountRecord>>;

    /// Returns one user by id.
    async fn get_account(&self, account_id: &str) -> AppResult<AccountRecord>;

    /// Lists all groups.
    async fn list_groups(&self) -> AppResult<Vec<GroupRecord>>;

    /// Applies a membership patch to one group.
    async fn update_group_membership(
        &self,
        group_id: &str,
        patch: &GroupMembershipPatch,
    ) -> AppResult<()>;

    /// Returns the role description backing a group, if the role has one.
    async fn find_role_description(&self, role_name: &str) -> AppResult<Option<String>>;

    /// Lists all safes.
    async fn list_safes(&self) -> AppResult<Vec<SafeRecord>>;

    /// Lists every safe permission grant in the tenant.
    async fn list_safe_permissions(&self) -> AppResult<Vec<SafePermissionGrant>>;

    /// Lists safe permission grants matching a filter.
    async fn find_safe_permissions(
        &self,
        filter: &SafePermissionFilter,
    ) -> AppResult<Vec<SafePermissionGrant>>;

    /// Issues the create, replace, or delete call for a grant.
    async fn apply_grant_mutation(&self, mutation: &GrantMutation) -> AppResult<()>;

    /// Resolves a directory user by system name to its internal id.
    async fn resolve_directory_user(&self, user_name: &str) -> AppResult<Option<String>>;

    /// Invites a directory user into the PAM tenant without sending email.
    async fn invite_user(&self, directory_user_id: &str, user_name: &str) -> AppResult<()>;
}

/// Receives entities one at a time from streaming operations.
#[async_trait]
pub trait OutputSink<T>: Send
where
    T: Send + 'static,
{
    /// Emits one entity to the host.
    async fn send(&mut self, item: T) -> AppResult<()>;
}

#[async_trait]
impl<T> OutputSink<T> for Vec<T>
where
    T: Send + 'static,
{
    async fn send(&mut self, item: T) -> AppResult<()> {
        self.push(item);
        Ok(())
    }
}

/// Input payload for account creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateAccountInput {
    /// Login name of the user to provision.
    pub user_name: NonEmptyString,
    /// Group ids to join after creation.
    pub groups: Vec<String>,
    /// Safe role labels to grant after creation.
    pub safe_roles: Vec<String>,
    /// Safe right labels to grant after creation.
    pub safe_rights: Vec<String>,
}
