use async_trait::async_trait;
use pamsync_application::PamGateway;
use pamsync_core::{AppError, AppResult};
use pamsync_domain::{
    AccountFilter, AccountRecord, GrantMutation, GroupMembershipPatch, GroupRecord,
    SafePermissionFilter, SafePermissionGrant, SafeRecord, directory_user_query,
};
use reqwest::header::ACCEPT;
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, error, info};
use url::Url;

use crate::oauth_token_provider::OAuthTokenProvider;
use crate::pam_client_config::PamClientConfig;

mod wire;

use wire::{
    ContainerPermissionBody, ContainerPermissionResource, ContainerResource,
    DirectoryServiceQueryBody, DirectoryServiceQueryResponse, GroupResource, InviteUsersBody,
    PatchOpBody, RoleLookupBody, RoleLookupResponse, ScimListResponse, UserResource,
};

const USERS: [&str; 3] = ["scim", "v2", "users"];
const GROUPS: [&str; 3] = ["scim", "v2", "groups"];
const CONTAINERS: [&str; 3] = ["scim", "v2", "containers"];
const CONTAINER_PERMISSIONS: [&str; 3] = ["scim", "v2", "containerpermissions"];

/// reqwest-backed client for the PAM tenant's SCIM and management APIs.
pub struct HttpPamGateway {
    http_client: reqwest::Client,
    tenant_url: Url,
    token_provider: OAuthTokenProvider,
    directory_service_id: String,
}

impl HttpPamGateway {
    /// Builds the HTTP client and token provider for one tenant.
    pub fn new(config: &PamClientConfig) -> AppResult<Self> {
        if config.tenant_url.cannot_be_a_base() {
            return Err(AppError::Validation(format!(
                "tenant URL '{}' must be an absolute http(s) URL",
                config.tenant_url
            )));
        }

        let http_client = reqwest::Client::builder()
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(|error| {
                AppError::Internal(format!("failed to build PAM HTTP client: {error}"))
            })?;
        let token_provider = OAuthTokenProvider::new(http_client.clone(), config)?;

        Ok(Self {
            http_client,
            tenant_url: config.tenant_url.clone(),
            token_provider,
            directory_service_id: config.directory_service_id.clone(),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> AppResult<Url> {
        let mut url = self.tenant_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                AppError::Validation(format!(
                    "tenant URL '{}' cannot carry a path",
                    self.tenant_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, operation: &'static str, request: RequestBuilder) -> AppResult<Response> {
        let access_token = self.token_provider.access_token().await?;
        let response = request
            .bearer_auth(access_token)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|error| {
                error!(operation, error = %error, "PAM request failed without a response");
                AppError::upstream(operation, None, error.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<response body unavailable>".to_owned());
            error!(operation, status = status.as_u16(), body = %body, "PAM request rejected");
            return Err(AppError::upstream(operation, Some(status.as_u16()), body));
        }

        info!(operation, status = status.as_u16(), "PAM request succeeded");
        Ok(response)
    }

    async fn fetch<T>(&self, operation: &'static str, request: RequestBuilder) -> AppResult<T>
    where
        T: DeserializeOwned,
    {
        self.send(operation, request)
            .await?
            .json::<T>()
            .await
            .map_err(|error| {
                error!(operation, error = %error, "PAM response could not be decoded");
                AppError::Parse(format!("{operation}: failed to decode response: {error}"))
            })
    }

    async fn fetch_list<T, R>(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> AppResult<Vec<R>>
    where
        T: DeserializeOwned,
        R: From<T>,
    {
        let list: ScimListResponse<T> = self.fetch(operation, request).await?;
        debug!(operation, total_results = list.total_results, "decoded SCIM list");
        Ok(list.resources.into_iter().map(R::from).collect())
    }

    async fn fetch_grants(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> AppResult<Vec<SafePermissionGrant>> {
        let list: ScimListResponse<ContainerPermissionResource> =
            self.fetch(operation, request).await?;
        let grants: Vec<SafePermissionGrant> = list
            .resources
            .into_iter()
            .filter_map(ContainerPermissionResource::into_user_grant)
            .collect();
        debug!(
            operation,
            total_results = list.total_results,
            user_grants = grants.len(),
            "decoded container permissions"
        );
        Ok(grants)
    }

    fn container_permission_url(&self, grant_id: Option<&str>) -> AppResult<Url> {
        match grant_id {
            Some(grant_id) => {
                let [scim, version, resource] = CONTAINER_PERMISSIONS;
                self.endpoint(&[scim, version, resource, grant_id])
            }
            None => self.endpoint(&CONTAINER_PERMISSIONS),
        }
    }
}

#[async_trait]
impl PamGateway for HttpPamGateway {
    async fn test_connection(&self) -> AppResult<()> {
        self.token_provider.access_token().await.map(|_| ())
    }

    async fn list_accounts(
        &self,
        filter: Option<&AccountFilter>,
    ) -> AppResult<Vec<AccountRecord>> {
        let mut request = self.http_client.get(self.endpoint(&USERS)?);
        if let Some(filter) = filter {
            request = request.query(&[("filter", filter.to_string())]);
        }

        self.fetch_list::<UserResource, _>("List Accounts", request)
            .await
    }

    async fn get_account(&self, account_id: &str) -> AppResult<AccountRecord> {
        let [scim, version, resource] = USERS;
        let request = self
            .http_client
            .get(self.endpoint(&[scim, version, resource, account_id])?);

        let user: UserResource = self.fetch("Get Account", request).await?;
        Ok(user.into())
    }

    async fn list_groups(&self) -> AppResult<Vec<GroupRecord>> {
        let request = self.http_client.get(self.endpoint(&GROUPS)?);
        self.fetch_list::<GroupResource, _>("List Groups", request)
            .await
    }

    async fn update_group_membership(
        &self,
        group_id: &str,
        patch: &GroupMembershipPatch,
    ) -> AppResult<()> {
        let [scim, version, resource] = GROUPS;
        let request = self
            .http_client
            .patch(self.endpoint(&[scim, version, resource, group_id])?)
            .json(&PatchOpBody::from(patch));

        self.send("Update Group", request).await.map(|_| ())
    }

    async fn find_role_description(&self, role_name: &str) -> AppResult<Option<String>> {
        let request = self
            .http_client
            .post(self.endpoint(&["Roles", "GetRole"])?)
            .json(&RoleLookupBody { name: role_name });

        let response: RoleLookupResponse = self.fetch("Get Role", request).await?;
        Ok(response.into_description())
    }

    async fn list_safes(&self) -> AppResult<Vec<SafeRecord>> {
        let request = self.http_client.get(self.endpoint(&CONTAINERS)?);
        self.fetch_list::<ContainerResource, _>("List Safes", request)
            .await
    }

    async fn list_safe_permissions(&self) -> AppResult<Vec<SafePermissionGrant>> {
        let request = self.http_client.get(self.container_permission_url(None)?);
        self.fetch_grants("Get Safe Permissions", request).await
    }

    async fn find_safe_permissions(
        &self,
        filter: &SafePermissionFilter,
    ) -> AppResult<Vec<SafePermissionGrant>> {
        let request = self
            .http_client
            .get(self.container_permission_url(None)?)
            .query(&[("filter", filter.to_string())]);

        self.fetch_grants("Get User Safe Permissions", request)
            .await
    }

    async fn apply_grant_mutation(&self, mutation: &GrantMutation) -> AppResult<()> {
        let request = match mutation {
            GrantMutation::Create(payload) => self
                .http_client
                .post(self.container_permission_url(None)?)
                .json(&ContainerPermissionBody::new(
                    payload.user_id.as_str(),
                    payload.safe_id.as_str(),
                    &payload.rights,
                )),
            GrantMutation::Replace { grant_id, payload } => self
                .http_client
                .put(self.container_permission_url(Some(grant_id.as_str()))?)
                .json(&ContainerPermissionBody::new(
                    payload.user_id.as_str(),
                    payload.safe_id.as_str(),
                    &payload.rights,
                )),
            GrantMutation::Delete { grant_id } => self
                .http_client
                .delete(self.container_permission_url(Some(grant_id.as_str()))?),
        };

        self.send("Manage Safe Permissions", request)
            .await
            .map(|_| ())
    }

    async fn resolve_directory_user(&self, user_name: &str) -> AppResult<Option<String>> {
        let request = self
            .http_client
            .post(self.endpoint(&["UserMgmt", "DirectoryServiceQuery"])?)
            .json(&DirectoryServiceQueryBody {
                user: directory_user_query(user_name),
                directory_services: [self.directory_service_id.as_str()],
            });

        let response: DirectoryServiceQueryResponse = self.fetch("Get User Id", request).await?;
        Ok(response.into_first_key())
    }

    async fn invite_user(&self, directory_user_id: &str, user_name: &str) -> AppResult<()> {
        let request = self
            .http_client
            .post(self.endpoint(&["UserMgmt", "InviteUsers"])?)
            .json(&InviteUsersBody::new(directory_user_id, user_name));

        self.send("Create User Invite", request).await.map(|_| ())
    }
}
