//! JSON bodies exchanged with the PAM tenant.

use pamsync_domain::{
    AccountRecord, GroupMembershipPatch, GroupRecord, SafePermissionGrant, SafeRecord,
};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

const CONTAINER_PERMISSION_SCHEMA: &str =
    "urn:ietf:params:scim:schemas:pam:1.0:ContainerPermission";
const PATCH_OP_SCHEMA: &str = "urn:ietf:params:scim:api:messages:2.0:PatchOp";

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(value) => Ok(value),
        Value::Number(value) => Ok(value.to_string()),
        other => Err(D::Error::custom(format!(
            "expected a string or numeric identifier, found {other}"
        ))),
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ScimListResponse<T> {
    #[serde(rename = "totalResults", default)]
    pub(super) total_results: u64,
    #[serde(rename = "Resources", default = "Vec::new")]
    pub(super) resources: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ValueRef {
    #[serde(deserialize_with = "string_or_number")]
    value: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct UserResource {
    #[serde(deserialize_with = "string_or_number")]
    id: String,
    #[serde(rename = "userName", default)]
    user_name: String,
    #[serde(default)]
    active: bool,
    #[serde(default)]
    groups: Option<Vec<ValueRef>>,
}

impl From<UserResource> for AccountRecord {
    fn from(resource: UserResource) -> Self {
        Self {
            id: resource.id,
            user_name: resource.user_name,
            active: resource.active,
            group_ids: resource
                .groups
                .unwrap_or_default()
                .into_iter()
                .map(|group| group.value)
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct GroupResource {
    #[serde(deserialize_with = "string_or_number")]
    id: String,
    #[serde(rename = "displayName", default)]
    display_name: String,
}

impl From<GroupResource> for GroupRecord {
    fn from(resource: GroupResource) -> Self {
        Self {
            id: resource.id,
            display_name: resource.display_name,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ContainerResource {
    #[serde(deserialize_with = "string_or_number")]
    id: String,
}

impl From<ContainerResource> for SafeRecord {
    fn from(resource: ContainerResource) -> Self {
        Self { id: resource.id }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ContainerPermissionResource {
    #[serde(deserialize_with = "string_or_number")]
    id: String,
    #[serde(default)]
    user: Option<ValueRef>,
    container: ValueRef,
    #[serde(default)]
    rights: Vec<String>,
}

impl ContainerPermissionResource {
    /// Grants held by groups or other non-user members yield `None`.
    pub(super) fn into_user_grant(self) -> Option<SafePermissionGrant> {
        let user = self.user?;
        Some(SafePermissionGrant {
            id: self.id,
            user_id: user.value,
            safe_id: self.container.value,
            rights: self.rights,
        })
    }
}

#[derive(Debug, Serialize)]
struct UserValue<'a> {
    value: &'a str,
}

#[derive(Debug, Serialize)]
struct ContainerName<'a> {
    name: &'a str,
}

#[derive(Debug, Serialize)]
pub(super) struct ContainerPermissionBody<'a> {
    schemas: [&'static str; 1],
    user: UserValue<'a>,
    container: ContainerName<'a>,
    rights: &'a [String],
}

impl<'a> ContainerPermissionBody<'a> {
    pub(super) fn new(user_id: &'a str, safe_id: &'a str, rights: &'a [String]) -> Self {
        Self {
            schemas: [CONTAINER_PERMISSION_SCHEMA],
            user: UserValue { value: user_id },
            container: ContainerName { name: safe_id },
            rights,
        }
    }
}

#[derive(Debug, Serialize)]
struct PatchOperation<'a> {
    op: &'static str,
    path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<[UserValue<'a>; 1]>,
}

#[derive(Debug, Serialize)]
pub(super) struct PatchOpBody<'a> {
    schemas: [&'static str; 1],
    #[serde(rename = "Operations")]
    operations: [PatchOperation<'a>; 1],
}

impl<'a> From<&'a GroupMembershipPatch> for PatchOpBody<'a> {
    fn from(patch: &'a GroupMembershipPatch) -> Self {
        let value = match patch {
            GroupMembershipPatch::AddMember { user_id } => Some([UserValue {
                value: user_id.as_str(),
            }]),
            GroupMembershipPatch::RemoveMember { .. } => None,
        };

        Self {
            schemas: [PATCH_OP_SCHEMA],
            operations: [PatchOperation {
                op: patch.op(),
                path: patch.path(),
                value,
            }],
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct RoleLookupBody<'a> {
    #[serde(rename = "Name")]
    pub(super) name: &'a str,
}

#[derive(Debug, Deserialize)]
pub(super) struct RoleLookupResponse {
    #[serde(rename = "Result", default)]
    result: Option<RoleLookupResult>,
}

#[derive(Debug, Deserialize)]
struct RoleLookupResult {
    #[serde(rename = "Description", default)]
    description: Option<String>,
}

impl RoleLookupResponse {
    pub(super) fn into_description(self) -> Option<String> {
        self.result.and_then(|result| result.description)
    }
}

#[derive(Debug, Serialize)]
pub(super) struct DirectoryServiceQueryBody<'a> {
    pub(super) user: String,
    #[serde(rename = "directoryServices")]
    pub(super) directory_services: [&'a str; 1],
}

#[derive(Debug, Deserialize)]
pub(super) struct DirectoryServiceQueryResponse {
    #[serde(rename = "Result", default)]
    result: Option<DirectoryQueryResult>,
}

#[derive(Debug, Deserialize)]
struct DirectoryQueryResult {
    #[serde(rename = "User", default)]
    user: Option<DirectoryQueryUsers>,
}

#[derive(Debug, Deserialize)]
struct DirectoryQueryUsers {
    #[serde(rename = "Results", default)]
    results: Vec<DirectoryQueryRow>,
}

#[derive(Debug, Deserialize)]
struct DirectoryQueryRow {
    #[serde(rename = "Entities", default)]
    entities: Vec<DirectoryEntity>,
}

#[derive(Debug, Deserialize)]
struct DirectoryEntity {
    #[serde(rename = "Key", deserialize_with = "string_or_number")]
    key: String,
}

impl DirectoryServiceQueryResponse {
    /// Returns `Result.User.Results[0].Entities[0].Key` when present.
    pub(super) fn into_first_key(self) -> Option<String> {
        self.result
            .and_then(|result| result.user)
            .and_then(|user| user.results.into_iter().next())
            .and_then(|row| row.entities.into_iter().next())
            .map(|entity| entity.key)
    }
}

#[derive(Debug, Serialize)]
struct InviteEntity<'a> {
    #[serde(rename = "Type")]
    entity_type: &'static str,
    #[serde(rename = "Guid")]
    guid: &'a str,
    #[serde(rename = "Name")]
    name: &'a str,
}

#[derive(Debug, Serialize)]
pub(super) struct InviteUsersBody<'a> {
    #[serde(rename = "EmailInvite")]
    email_invite: bool,
    #[serde(rename = "Entities")]
    entities: [InviteEntity<'a>; 1],
}

impl<'a> InviteUsersBody<'a> {
    pub(super) fn new(directory_user_id: &'a str, user_name: &'a str) -> Self {
        Self {
            email_invite: false,
            entities: [InviteEntity {
                entity_type: "user",
                guid: directory_user_id,
                name: user_name,
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use pamsync_domain::{AccountRecord, GroupMembershipPatch, SafePermissionGrant};
    use serde_json::json;

    use super::{
        ContainerPermissionBody, ContainerPermissionResource, DirectoryServiceQueryResponse,
        PatchOpBody, ScimListResponse, UserResource,
    };

    #[test]
    fn user_ids_are_coerced_to_strings() {
        let body = json!({
            "totalResults": 1,
            "Resources": [
                {"id": 42, "userName": "ana@example.com", "active": true, "groups": [{"value": 7}]}
            ]
        });

        let list: ScimListResponse<UserResource> = serde_json::from_value(body)
            .unwrap_or_else(|error| panic!("user list should decode: {error}"));
        let records: Vec<AccountRecord> = list.resources.into_iter().map(Into::into).collect();

        assert_eq!(list.total_results, 1);
        assert_eq!(records[0].id, "42");
        assert_eq!(records[0].group_ids, vec!["7".to_owned()]);
    }

    #[test]
    fn missing_resources_decode_as_empty() {
        let list: ScimListResponse<UserResource> =
            serde_json::from_value(json!({"totalResults": 0}))
                .unwrap_or_else(|error| panic!("empty list should decode: {error}"));

        assert!(list.resources.is_empty());
    }

    #[test]
    fn user_without_groups_has_no_group_ids() {
        let resource: UserResource =
            serde_json::from_value(json!({"id": "u1", "userName": "bo", "groups": null}))
                .unwrap_or_else(|error| panic!("user should decode: {error}"));
        let record = AccountRecord::from(resource);

        assert!(record.group_ids.is_empty());
        assert!(!record.active);
    }

    #[test]
    fn container_permission_maps_user_and_container_values() {
        let resource: ContainerPermissionResource = serde_json::from_value(json!({
            "id": "g-1",
            "user": {"value": "u1", "display": "ana@example.com"},
            "container": {"value": "Finance", "name": "Finance"},
            "rights": ["ListContent", "UseContent"]
        }))
        .unwrap_or_else(|error| panic!("grant should decode: {error}"));

        assert_eq!(
            resource.into_user_grant(),
            Some(SafePermissionGrant {
                id: "g-1".to_owned(),
                user_id: "u1".to_owned(),
                safe_id: "Finance".to_owned(),
                rights: vec!["ListContent".to_owned(), "UseContent".to_owned()],
            })
        );
    }

    #[test]
    fn group_grants_are_skipped_without_rejecting_the_list() {
        let body = json!({
            "Resources": [
                {"id": "g-1", "user": {"value": "u1"}, "container": {"value": "S1"}, "rights": ["ListContent"]},
                {"id": "g-2", "group": {"value": "grp-9"}, "container": {"value": "S1"}, "rights": ["ListContent"]}
            ]
        });

        let list: ScimListResponse<ContainerPermissionResource> = serde_json::from_value(body)
            .unwrap_or_else(|error| panic!("mixed grant list should decode: {error}"));
        let grants: Vec<SafePermissionGrant> = list
            .resources
            .into_iter()
            .filter_map(ContainerPermissionResource::into_user_grant)
            .collect();

        assert_eq!(grants.len(), 1);
        assert_eq!(grants[0].id, "g-1");
        assert_eq!(grants[0].user_id, "u1");
    }

    #[test]
    fn container_permission_body_names_the_safe() {
        let rights = vec!["ListContent".to_owned()];
        let body = serde_json::to_value(ContainerPermissionBody::new("u1", "Finance", &rights))
            .unwrap_or_else(|error| panic!("body should encode: {error}"));

        assert_eq!(
            body,
            json!({
                "schemas": ["urn:ietf:params:scim:schemas:pam:1.0:ContainerPermission"],
                "user": {"value": "u1"},
                "container": {"name": "Finance"},
                "rights": ["ListContent"]
            })
        );
    }

    #[test]
    fn remove_member_patch_has_no_value() {
        let patch = GroupMembershipPatch::RemoveMember {
            user_id: "u1".to_owned(),
        };
        let body = serde_json::to_value(PatchOpBody::from(&patch))
            .unwrap_or_else(|error| panic!("patch should encode: {error}"));

        assert_eq!(
            body,
            json!({
                "schemas": ["urn:ietf:params:scim:api:messages:2.0:PatchOp"],
                "Operations": [{"op": "remove", "path": "members[value eq \"u1\"]"}]
            })
        );
    }

    #[test]
    fn directory_query_without_entities_yields_no_key() {
        let response: DirectoryServiceQueryResponse =
            serde_json::from_value(json!({"Result": {"User": {"Results": []}}}))
                .unwrap_or_else(|error| panic!("response should decode: {error}"));

        assert_eq!(response.into_first_key(), None);
    }
}
